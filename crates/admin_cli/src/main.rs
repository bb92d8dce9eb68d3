use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{Engine, EngineError};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

type AdminResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

const SECRET_ATTEMPTS: usize = 3;

#[derive(Parser, Debug)]
#[command(name = "milkmonitor_admin")]
#[command(about = "Farm Milk Monitor maintenance: accounts and stored sessions")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./milkmonitor.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the accounts allowed to sign in.
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
    Sessions {
        #[command(subcommand)]
        command: SessionsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Register an account; the secret is prompted twice.
    Create(CreateArgs),
}

#[derive(Args, Debug)]
struct CreateArgs {
    #[arg(long)]
    email: String,
}

#[derive(Subcommand, Debug)]
enum SessionsCommand {
    /// Delete every expired session.
    Purge,
}

/// Asks for a new secret until two entries agree.
///
/// Empty entries are refused without asking for the confirmation.
fn confirm_secret<F>(mut read: F, mut warn: impl FnMut(&str)) -> AdminResult<String>
where
    F: FnMut(&str) -> AdminResult<String>,
{
    for _ in 0..SECRET_ATTEMPTS {
        let secret = read("Senha: ")?;
        if secret.is_empty() {
            warn("A senha não pode ser vazia.");
            continue;
        }
        if read("Confirme a senha: ")? == secret {
            return Ok(secret);
        }
        warn("As senhas não coincidem.");
    }
    Err("too many attempts".into())
}

async fn open_engine(database_url: &str) -> AdminResult<Engine> {
    let db: DatabaseConnection = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(Engine::builder().database(db).build().await?)
}

async fn create_user(engine: &Engine, args: CreateArgs) -> AdminResult<()> {
    let secret = confirm_secret(
        |prompt| Ok(client::prompt::read_secret(prompt)?),
        |message| eprintln!("{message}"),
    )?;

    match engine.create_user(&args.email, &secret).await {
        Ok(()) => {
            println!("created user: {}", args.email.trim().to_lowercase());
            Ok(())
        }
        Err(EngineError::ExistingKey(name)) => {
            eprintln!("user already exists: {name}");
            std::process::exit(1);
        }
        Err(err) => Err(err.into()),
    }
}

#[tokio::main]
async fn main() -> AdminResult<()> {
    let cli = Cli::parse();
    let engine = open_engine(&cli.database_url).await?;

    match cli.command {
        Command::User {
            command: UserCommand::Create(args),
        } => create_user(&engine, args).await?,
        Command::Sessions {
            command: SessionsCommand::Purge,
        } => {
            let purged = engine.purge_expired_sessions().await?;
            println!("purged {purged} expired sessions");
        }
    }

    Ok(())
}
