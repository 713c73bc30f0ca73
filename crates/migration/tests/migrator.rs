use std::path::PathBuf;

use migration::{MigrationError, Migrator};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

async fn memory_db() -> DatabaseConnection {
    Database::connect("sqlite::memory:").await.unwrap()
}

fn scratch_dir(files: &[(&str, &str)]) -> PathBuf {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../target/test_dbs")
        .join(format!("migrations_{}", Uuid::new_v4()));
    std::fs::create_dir_all(&root).unwrap();
    for (name, body) in files {
        std::fs::write(root.join(name), body).unwrap();
    }
    root
}

async fn table_exists(db: &DatabaseConnection, table: &str) -> bool {
    let row = db
        .query_one(Statement::from_sql_and_values(
            db.get_database_backend(),
            "SELECT COUNT(1) AS n FROM sqlite_master WHERE type = 'table' AND name = ?",
            [table.into()],
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get::<i64>("", "n").unwrap() == 1
}

async fn recorded(db: &DatabaseConnection) -> Vec<String> {
    db.query_all(Statement::from_string(
        db.get_database_backend(),
        "SELECT filename FROM schema_migrations ORDER BY filename",
    ))
    .await
    .unwrap()
    .into_iter()
    .map(|row| row.try_get::<String>("", "filename").unwrap())
    .collect()
}

#[tokio::test]
async fn shipped_scripts_create_the_schema() {
    let db = memory_db().await;
    let applied = Migrator::new(Migrator::default_dir()).up(&db).await.unwrap();

    assert_eq!(applied.len(), 4);
    let mut sorted = applied.clone();
    sorted.sort();
    assert_eq!(applied, sorted);

    for table in [
        "users",
        "sessions",
        "categories",
        "items",
        "expenses",
        "monthly_budgets",
        "schema_migrations",
    ] {
        assert!(table_exists(&db, table).await, "missing table {table}");
    }
}

#[tokio::test]
async fn rerun_applies_nothing() {
    let db = memory_db().await;
    let migrator = Migrator::new(Migrator::default_dir());

    let first = migrator.up(&db).await.unwrap();
    let second = migrator.up(&db).await.unwrap();

    assert!(!first.is_empty());
    assert!(second.is_empty());
    assert_eq!(recorded(&db).await, first);
}

#[tokio::test]
async fn scripts_run_in_filename_order() {
    let dir = scratch_dir(&[
        ("002_child.sql", "CREATE TABLE child (id INTEGER REFERENCES parent(id));"),
        ("001_parent.sql", "CREATE TABLE parent (id INTEGER PRIMARY KEY);"),
        ("README.md", "not a migration"),
    ]);
    let db = memory_db().await;

    let applied = Migrator::new(&dir).up(&db).await.unwrap();

    assert_eq!(applied, vec!["001_parent.sql", "002_child.sql"]);
    assert!(table_exists(&db, "child").await);
}

#[tokio::test]
async fn failing_script_is_rolled_back_and_not_recorded() {
    let dir = scratch_dir(&[
        ("001_ok.sql", "CREATE TABLE first (x INTEGER);"),
        (
            "002_bad.sql",
            "CREATE TABLE second (x INTEGER);\nINSERT INTO missing_table VALUES (1);",
        ),
        ("003_later.sql", "CREATE TABLE third (x INTEGER);"),
    ]);
    let db = memory_db().await;

    let err = Migrator::new(&dir).up(&db).await.unwrap_err();

    match err {
        MigrationError::Script { filename, .. } => assert_eq!(filename, "002_bad.sql"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(table_exists(&db, "first").await);
    assert!(!table_exists(&db, "second").await);
    assert!(!table_exists(&db, "third").await);
    assert_eq!(recorded(&db).await, vec!["001_ok.sql"]);
}

#[tokio::test]
async fn fixed_script_resumes_after_failure() {
    let dir = scratch_dir(&[
        ("001_ok.sql", "CREATE TABLE first (x INTEGER);"),
        ("002_bad.sql", "CREATE TABLE broken (x INTEGER"),
    ]);
    let db = memory_db().await;
    let migrator = Migrator::new(&dir);

    assert!(migrator.up(&db).await.is_err());

    std::fs::write(dir.join("002_bad.sql"), "CREATE TABLE broken (x INTEGER);").unwrap();
    let applied = migrator.up(&db).await.unwrap();

    assert_eq!(applied, vec!["002_bad.sql"]);
    assert!(table_exists(&db, "broken").await);
}

#[tokio::test]
async fn status_reports_pending_scripts() {
    let dir = scratch_dir(&[("001_a.sql", "CREATE TABLE a (x INTEGER);")]);
    let db = memory_db().await;
    let migrator = Migrator::new(&dir);

    migrator.up(&db).await.unwrap();
    std::fs::write(dir.join("002_b.sql"), "CREATE TABLE b (x INTEGER);").unwrap();

    let status = migrator.status(&db).await.unwrap();
    let flags: Vec<_> = status
        .iter()
        .map(|s| (s.filename.as_str(), s.applied))
        .collect();
    assert_eq!(flags, vec![("001_a.sql", true), ("002_b.sql", false)]);
}

#[tokio::test]
async fn missing_directory_is_an_io_error() {
    let db = memory_db().await;
    let err = Migrator::new("/definitely/not/here").up(&db).await.unwrap_err();
    assert!(matches!(err, MigrationError::Io { .. }));
}
