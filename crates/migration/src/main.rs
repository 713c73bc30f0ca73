use migration::Migrator;
use sea_orm::Database;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut args = std::env::args().skip(1);
    let cmd = args.next().unwrap_or_else(|| "up".to_string());

    let db_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:./data/app.db?mode=rwc".to_string());
    let migrator = match std::env::var("MIGRATIONS_DIR") {
        Ok(dir) => Migrator::new(dir),
        Err(_) => Migrator::new(Migrator::default_dir()),
    };

    let db = Database::connect(&db_url).await?;

    match cmd.as_str() {
        "up" => {
            let applied = migrator.up(&db).await?;
            if applied.is_empty() {
                println!("schema up to date");
            }
            for filename in applied {
                println!("applied {filename}");
            }
        }
        "status" => {
            for status in migrator.status(&db).await? {
                let mark = if status.applied { "applied" } else { "pending" };
                println!("{mark:>8}  {}", status.filename);
            }
        }
        _ => {
            eprintln!("Usage: cargo run -p migration -- [up|status]");
            std::process::exit(2);
        }
    }

    Ok(())
}
