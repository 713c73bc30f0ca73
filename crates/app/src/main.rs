use migration::Migrator;
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "larder={level},server={level},engine={level},migration={level}",
            level = settings.app.level
        ))
        .init();

    let server = settings.server;
    let db = parse_database(&server.database).await?;

    let migrator = match &server.migrations {
        Some(dir) => Migrator::new(dir),
        None => Migrator::new(Migrator::default_dir()),
    };
    let applied = migrator.up(&db).await?;
    tracing::info!("{} migration(s) applied", applied.len());

    let mut builder = engine::Engine::builder().database(db);
    if let Some(cost) = server.bcrypt_cost {
        builder = builder.bcrypt_cost(cost);
    }
    let engine = builder.build().await?;

    let config = server::ServerConfig {
        session_ttl_days: server.session_ttl_days,
        secure_cookies: server.secure_cookies,
    };
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", server.bind, server.port)).await?;
    server::run_with_listener(engine, config, listener).await?;

    Ok(())
}

async fn parse_database(
    config: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            format!("sqlite:{}?mode=rwc", path)
        }
    };

    Ok(sea_orm::Database::connect(url).await?)
}
