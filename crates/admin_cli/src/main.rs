use std::{error::Error, io::Write};

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, EngineError, Role};
use migration::Migrator;
use sea_orm::{Database, DatabaseConnection};

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "larder_admin")]
#[command(about = "Admin utilities for Larder (accounts, catalog, sessions)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./data/app.db?mode=rwc"
    )]
    database_url: String,

    /// Directory of migration scripts; the shipped ones when omitted.
    #[arg(long, env = "MIGRATIONS_DIR")]
    migrations: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Catalog(Catalog),
    Sessions(Sessions),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create an account; the password is prompted for.
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long, default_value = "admin")]
    role: String,
}

#[derive(Args, Debug)]
struct Catalog {
    #[command(subcommand)]
    command: CatalogCommand,
}

#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Insert the default restaurant catalog, skipping what already exists.
    Seed,
    AddCategory(AddCategoryArgs),
    AddItem(AddItemArgs),
}

#[derive(Args, Debug)]
struct AddCategoryArgs {
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct AddItemArgs {
    #[arg(long)]
    category_id: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    unit: String,
}

#[derive(Args, Debug)]
struct Sessions {
    #[command(subcommand)]
    command: SessionsCommand,
}

#[derive(Subcommand, Debug)]
enum SessionsCommand {
    /// Delete expired sessions.
    Purge,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> CliResult<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn say(out: &mut std::io::Stderr, line: &str) -> CliResult<()> {
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(line),
        Print("\r\n")
    )?;
    Ok(())
}

/// Read a line from the terminal, echoing `*` for every character.
fn read_masked(prompt: &str) -> CliResult<String> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                break;
            }
            KeyCode::Backspace if buf.pop().is_some() => {
                execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
            }
            _ => continue,
        }
        out.flush()?;
    }

    Ok(buf)
}

fn read_new_password() -> CliResult<String> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let first = read_masked("Password: ")?;
        if first.trim().is_empty() {
            say(&mut out, "Password must not be empty.")?;
            continue;
        }

        if read_masked("Confirm password: ")? == first {
            return Ok(first);
        }
        say(&mut out, "Passwords do not match. Try again.")?;
    }

    Err("too many attempts".into())
}

async fn connect_db(database_url: &str, migrations: Option<&str>) -> CliResult<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    let migrator = match migrations {
        Some(dir) => Migrator::new(dir),
        None => Migrator::new(Migrator::default_dir()),
    };
    for filename in migrator.up(&db).await? {
        eprintln!("applied migration {filename}");
    }
    Ok(db)
}

async fn create_user(engine: &Engine, args: UserCreateArgs) -> CliResult<()> {
    let password = read_new_password()?;
    let role = Role::from(args.role.as_str());

    match engine
        .create_user(&args.name, &args.email, &password, &role)
        .await
    {
        Ok(id) => {
            println!("created {} user: {} <{}> ({id})", role.as_str(), args.name, args.email);
            Ok(())
        }
        Err(EngineError::Constraint(_)) => {
            eprintln!("user already exists: {}", args.email);
            std::process::exit(1);
        }
        Err(err) => Err(err.into()),
    }
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url, cli.migrations.as_deref()).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => create_user(&engine, args).await?,
        Command::Catalog(Catalog { command }) => match command {
            CatalogCommand::Seed => {
                let report = engine.seed_catalog().await?;
                println!(
                    "seeded catalog: {} categories, {} items created",
                    report.categories_created, report.items_created
                );
            }
            CatalogCommand::AddCategory(args) => {
                let category = engine.create_category(&args.name).await?;
                println!("created category: {} ({})", category.name, category.id);
            }
            CatalogCommand::AddItem(args) => {
                let item = engine
                    .create_item(&args.category_id, &args.name, &args.unit)
                    .await?;
                println!("created item: {} [{}] ({})", item.name, item.unit, item.id);
            }
        },
        Command::Sessions(Sessions {
            command: SessionsCommand::Purge,
        }) => {
            let purged = engine.purge_expired_sessions(Utc::now()).await?;
            println!("purged {purged} expired session(s)");
        }
    }

    Ok(())
}
