use std::io::{BufRead, Write};

use api_types::{
    RecordFilter,
    expense::{Expense, ExpenseCategory, ExpenseNew},
    production::{Production, ProductionNew, Quality},
    sale::{Sale, SaleNew},
};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use client::{
    config::{AppConfig, Overrides},
    error::{AppError, Result},
    gate::{GateDecision, SessionGate},
    http::Client,
    local_state::LocalState,
    prompt,
    views::{self, Credentials, DashboardView, Listed, RecordsView, ReportView},
};
use engine::{Money, Period};
use uuid::Uuid;

mod render;

#[derive(Parser, Debug)]
#[command(name = "milkmonitor", disable_version_flag = true)]
#[command(about = "Record milk production, sales and expenses")]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in (the secret is always prompted).
    Login(LoginArgs),
    Logout,
    Production {
        #[command(subcommand)]
        command: ProductionCommand,
    },
    Sales {
        #[command(subcommand)]
        command: SaleCommand,
    },
    Expenses {
        #[command(subcommand)]
        command: ExpenseCommand,
    },
    /// Summary and daily charts over the last days.
    Dashboard {
        #[arg(long, default_value_t = views::DEFAULT_DASHBOARD_DAYS)]
        days: u32,
    },
    /// Monthly report for a period.
    Report {
        #[arg(long, default_value_t = Period::Month)]
        period: Period,
    },
}

#[derive(Args, Debug)]
struct LoginArgs {
    /// Login email; defaults to the remembered one.
    #[arg(long)]
    email: Option<String>,
    /// Do not remember the email for the next login.
    #[arg(long)]
    forget: bool,
}

/// Protected record command, shared by the three collections.
enum RecordCommand<A> {
    Add(A),
    List(ListArgs),
    Rm(Uuid),
}

macro_rules! record_command {
    ($name:ident, $add:ty) => {
        #[derive(Subcommand, Debug)]
        enum $name {
            /// Register a new record.
            Add($add),
            /// List records, newest first.
            List(ListArgs),
            /// Delete a record by id.
            Rm { id: Uuid },
        }

        impl From<$name> for RecordCommand<$add> {
            fn from(value: $name) -> Self {
                match value {
                    $name::Add(args) => Self::Add(args),
                    $name::List(args) => Self::List(args),
                    $name::Rm { id } => Self::Rm(id),
                }
            }
        }
    };
}

record_command!(ProductionCommand, ProductionAdd);
record_command!(SaleCommand, SaleAdd);
record_command!(ExpenseCommand, ExpenseAdd);

#[derive(Args, Debug)]
struct ListArgs {
    /// First date included (YYYY-MM-DD).
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last date included (YYYY-MM-DD).
    #[arg(long)]
    to: Option<NaiveDate>,
}

#[derive(Args, Debug)]
struct ProductionAdd {
    /// Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    liters: f64,
    #[arg(long)]
    cows: u32,
    #[arg(long, value_parser = parse_quality, default_value = "A")]
    quality: Quality,
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Args, Debug)]
struct SaleAdd {
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    liters: f64,
    /// Price per liter, e.g. `2,50`.
    #[arg(long)]
    price: Money,
    #[arg(long)]
    buyer: String,
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Args, Debug)]
struct ExpenseAdd {
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Amount, e.g. `300,00`.
    #[arg(long)]
    amount: Money,
    #[arg(long, value_parser = parse_category)]
    category: ExpenseCategory,
    #[arg(long)]
    description: String,
}

fn parse_quality(raw: &str) -> std::result::Result<Quality, String> {
    Quality::try_from(raw)
}

fn parse_category(raw: &str) -> std::result::Result<ExpenseCategory, String> {
    ExpenseCategory::try_from(raw)
}

/// Turns the parsed arguments into a new-record payload.
trait IntoNew<R: Listed> {
    fn into_new(self, today: NaiveDate) -> R::New;
}

impl IntoNew<Production> for ProductionAdd {
    fn into_new(self, today: NaiveDate) -> ProductionNew {
        ProductionNew {
            date: self.date.unwrap_or(today),
            quantity_liters: self.liters,
            cow_count: self.cows,
            quality: self.quality,
            notes: self.notes,
        }
    }
}

impl IntoNew<Sale> for SaleAdd {
    fn into_new(self, today: NaiveDate) -> SaleNew {
        SaleNew {
            date: self.date.unwrap_or(today),
            quantity_liters: self.liters,
            price_per_liter_cents: self.price.cents(),
            buyer: self.buyer,
            notes: self.notes,
        }
    }
}

impl IntoNew<Expense> for ExpenseAdd {
    fn into_new(self, today: NaiveDate) -> ExpenseNew {
        ExpenseNew {
            date: self.date.unwrap_or(today),
            amount_cents: self.amount.cents(),
            category: self.category,
            description: self.description,
        }
    }
}

struct Session {
    config: AppConfig,
    state: LocalState,
    client: Client,
}

impl Session {
    fn open(config: AppConfig) -> Result<Self> {
        let state = LocalState::load(&config.state_path)?;
        let client = Client::new(&config.base_url, state.session_token.clone())?;
        Ok(Self {
            config,
            state,
            client,
        })
    }

    async fn save(&mut self) -> Result<()> {
        self.state.session_token = self.client.token().await;
        if self.state.session_token.is_none() {
            self.state.authenticated = false;
        }
        self.state.save(&self.config.state_path)
    }

    /// Runs the gate; a denied gate ends the process.
    async fn require_session(&mut self) -> Result<()> {
        let decision = SessionGate::new(&self.client, self.state.authenticated)
            .check()
            .await;
        match decision {
            GateDecision::Granted(session) => {
                tracing::debug!(
                    "session of {} valid until {}",
                    session.identifier,
                    session.expires_at
                );
                Ok(())
            }
            GateDecision::Denied(reason) if reason.ends_session() => {
                eprintln!("{}. Execute `milkmonitor login`.", reason.message());
                self.state.signed_out();
                self.save().await?;
                std::process::exit(1);
            }
            GateDecision::Denied(reason) => {
                eprintln!("{}. Tente novamente.", reason.message());
                std::process::exit(1);
            }
        }
    }
}

async fn login(session: &mut Session, args: LoginArgs) -> Result<()> {
    let identifier = match args.email.or_else(|| session.state.remembered_identifier.clone()) {
        Some(identifier) => identifier,
        None => read_line("Email: ")?,
    };
    let secret = prompt::read_secret("Senha: ")?;
    let credentials = Credentials {
        identifier,
        secret,
        remember: !args.forget,
    };

    let result = views::login(&session.client, &mut session.state, &credentials).await;
    session.save().await?;
    match result {
        Ok(view) => {
            println!("Bem-vindo, {}!", view.identifier);
            Ok(())
        }
        Err(err) => {
            eprintln!("Erro de autenticação: {err}");
            std::process::exit(1);
        }
    }
}

fn read_line(prompt: &str) -> Result<String> {
    let mut out = std::io::stderr();
    write!(out, "{prompt}")?;
    out.flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

async fn collection<R, A>(session: &mut Session, command: RecordCommand<A>) -> Result<()>
where
    R: Listed + render::Row,
    R::New: engine::Validate,
    A: IntoNew<R>,
{
    session.require_session().await?;

    let outcome = match command {
        RecordCommand::Add(args) => {
            let new = args.into_new(session.config.today()?);
            let mut view = RecordsView::<R>::default();
            let outcome = view.submit(&session.client, new).await;
            render::notice(view.notice());
            if let Ok(record) = &outcome {
                render::records(R::TITLE, std::slice::from_ref(record));
            }
            outcome.map(|_| ())
        }
        RecordCommand::List(args) => {
            let mut view = RecordsView::<R>::new(RecordFilter {
                date_from: args.from,
                date_to: args.to,
            });
            let outcome = view.load(&session.client).await;
            render::notice(view.notice());
            if outcome.is_ok() {
                render::records(R::TITLE, view.records());
            }
            outcome
        }
        RecordCommand::Rm(id) => {
            let mut view = RecordsView::<R>::default();
            let outcome = view.remove(&session.client, id).await;
            render::notice(view.notice());
            outcome
        }
    };

    session.save().await?;
    outcome.map_err(AppError::from)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.overrides)?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(format!(
            "milkmonitor={level},client={level},engine={level}",
            level = config.level
        ))
        .init();

    let mut session = Session::open(config)?;

    match cli.command {
        Command::Login(args) => login(&mut session, args).await?,
        Command::Logout => {
            let result = views::logout(&session.client, &mut session.state).await;
            session.save().await?;
            match result {
                Ok(()) => println!("Sessão encerrada"),
                Err(err) => tracing::warn!("sign-out request failed: {err}"),
            }
        }
        Command::Production { command } => {
            collection::<Production, _>(&mut session, command.into()).await?
        }
        Command::Sales { command } => collection::<Sale, _>(&mut session, command.into()).await?,
        Command::Expenses { command } => {
            collection::<Expense, _>(&mut session, command.into()).await?
        }
        Command::Dashboard { days } => {
            session.require_session().await?;
            let mut view = DashboardView::default();
            let outcome = view.load(&session.client, session.config.today()?, days).await;
            render::notice(view.notice());
            if outcome.is_ok() {
                render::dashboard(&view);
            }
            session.save().await?;
            outcome?;
        }
        Command::Report { period } => {
            session.require_session().await?;
            let mut view = ReportView::new(period);
            let outcome = view.load(&session.client, session.config.today()?).await;
            render::notice(view.notice());
            if outcome.is_ok() {
                render::report(&view);
            }
            session.save().await?;
            outcome?;
        }
    }

    Ok(())
}
