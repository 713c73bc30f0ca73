//! Script based schema migrations.
//!
//! Every `*.sql` file inside the migrations directory is applied at most once,
//! in lexicographic filename order. Applied files are recorded in the
//! `schema_migrations` table and a script is committed together with its
//! record, so the ledger never disagrees with the schema.

use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
};

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, Statement, TransactionTrait, Value,
};
use thiserror::Error;

const LEDGER_DDL: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    filename TEXT PRIMARY KEY,
    applied_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
)";

/// Errors raised while applying migrations.
///
/// Any of them leaves the schema in an unknown state for the caller: the
/// process must not serve traffic after one.
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("migration {filename} failed: {source}")]
    Script {
        filename: String,
        #[source]
        source: DbErr,
    },
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// A script found in the migrations directory and whether it was applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MigrationStatus {
    pub filename: String,
    pub applied: bool,
}

/// Applies the scripts of one directory to a database.
#[derive(Clone, Debug)]
pub struct Migrator {
    dir: PathBuf,
}

impl Migrator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The scripts shipped with this crate.
    pub fn default_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Apply every script not yet recorded and return the applied filenames.
    ///
    /// Stops at the first failing script: earlier scripts stay committed, the
    /// failing one is rolled back and not recorded.
    pub async fn up(&self, db: &DatabaseConnection) -> Result<Vec<String>, MigrationError> {
        ensure_ledger(db).await?;

        let mut applied = Vec::new();
        for filename in self.scripts()? {
            if is_recorded(db, &filename).await? {
                tracing::debug!("migration {filename} already applied");
                continue;
            }

            let path = self.dir.join(&filename);
            let sql = fs::read_to_string(&path)
                .map_err(|source| MigrationError::Io { path, source })?;

            apply_script(db, &filename, &sql).await?;
            tracing::info!("applied migration {filename}");
            applied.push(filename);
        }

        Ok(applied)
    }

    /// List every script in apply order with its applied flag.
    pub async fn status(
        &self,
        db: &DatabaseConnection,
    ) -> Result<Vec<MigrationStatus>, MigrationError> {
        ensure_ledger(db).await?;

        let backend = db.get_database_backend();
        let recorded = db
            .query_all(Statement::from_string(
                backend,
                "SELECT filename FROM schema_migrations",
            ))
            .await?
            .into_iter()
            .map(|row| row.try_get::<String>("", "filename"))
            .collect::<Result<HashSet<_>, _>>()?;

        Ok(self
            .scripts()?
            .into_iter()
            .map(|filename| MigrationStatus {
                applied: recorded.contains(&filename),
                filename,
            })
            .collect())
    }

    /// Filenames of the `.sql` files in the directory, sorted.
    fn scripts(&self) -> Result<Vec<String>, MigrationError> {
        let io_err = |source| MigrationError::Io {
            path: self.dir.clone(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            if !entry.file_type().map_err(io_err)?.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(ToString::to_string) else {
                tracing::warn!("skipping non UTF-8 file in {}", self.dir.display());
                continue;
            };
            if name.ends_with(".sql") {
                files.push(name);
            }
        }
        files.sort();

        Ok(files)
    }
}

async fn ensure_ledger(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute_unprepared(LEDGER_DDL).await?;
    Ok(())
}

async fn is_recorded(db: &DatabaseConnection, filename: &str) -> Result<bool, DbErr> {
    let row = db
        .query_one(Statement::from_sql_and_values(
            db.get_database_backend(),
            "SELECT COUNT(1) AS n FROM schema_migrations WHERE filename = ?",
            [Value::from(filename)],
        ))
        .await?;

    match row {
        Some(row) => Ok(row.try_get::<i64>("", "n")? > 0),
        None => Ok(false),
    }
}

async fn apply_script(
    db: &DatabaseConnection,
    filename: &str,
    sql: &str,
) -> Result<(), MigrationError> {
    let script_err = |source| MigrationError::Script {
        filename: filename.to_string(),
        source,
    };

    let tx = db.begin().await?;

    let result = async {
        if !sql.trim().is_empty() {
            tx.execute_unprepared(sql).await?;
        }
        tx.execute(Statement::from_sql_and_values(
            tx.get_database_backend(),
            "INSERT INTO schema_migrations (filename) VALUES (?)",
            [Value::from(filename)],
        ))
        .await?;
        Ok::<_, DbErr>(())
    }
    .await;

    match result {
        Ok(()) => {
            tx.commit().await.map_err(script_err)?;
            Ok(())
        }
        Err(source) => {
            tracing::error!("migration {filename} failed, rolling back: {source}");
            if let Err(err) = tx.rollback().await {
                tracing::error!("rollback of {filename} failed: {err}");
            }
            Err(script_err(source))
        }
    }
}
