//! Command-line front end for khatima tracking.
//!
//! Usage:
//!
//! ```text
//! khatma <command> [arguments]
//! ```
//!
//! Commands:
//!
//! ```text
//! migrate                          create the khatima tables
//! create [name...]                 create a khatima (blank name: "Untitled Khatima")
//! join <invitation-code>           join a khatima
//! claim <unit-id>                  claim a juz'
//! unclaim <unit-id>                release your claim on a juz'
//! done <unit-id>                   mark a juz' done
//! override <unit-id> <action>      admin override: unclaim, mark_done, or reset
//! rename <project-id> <name...>    rename a khatima
//! show <project-id>                show a khatima with its juz'
//! dashboard                        list your owned, joined, and finished khatimas
//! ```
//!
//! The caller is identified by the UUID in `KHATMA_USER`, standing in for a
//! session layer. Results are printed to stdout as JSON; logs go to stderr.

use khatma::config::{ConfigError, KhatmaConfig};
use khatma::khatima::{
    adapters::{
        StoreAuthGate, UuidInvitationCodes,
        postgres::{KhatimaPgPool, PostgresProjectStore, apply_schema, build_pool},
    },
    domain::{ProjectId, UnitId, UserId},
    ports::RequestContext,
    services::{CreateProjectRequest, ErrorKind, KhatimaService, KhatimaServiceError},
};
use khatma::telemetry::init_tracing;
use mockable::DefaultClock;
use serde::Serialize;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Builder;
use tracing::{error, info};
use uuid::Uuid;

/// Environment variable carrying the caller's user id.
const USER_ENV: &str = "KHATMA_USER";

type Service = KhatimaService<
    PostgresProjectStore,
    StoreAuthGate<PostgresProjectStore>,
    DefaultClock,
    UuidInvitationCodes,
>;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
enum CliError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("KHATMA_USER must hold a user UUID: {0}")]
    Identity(String),
    #[error("runtime init failed: {0}")]
    RuntimeInit(#[source] io::Error),
    #[error("database pool unavailable: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("schema migration failed: {0}")]
    Migration(String),
    #[error(transparent)]
    Service(#[from] KhatimaServiceError),
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
}

impl CliError {
    const fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidArgs(_) | Self::Identity(_) => 2,
            Self::Config(_) | Self::RuntimeInit(_) | Self::Output(_) => 3,
            Self::Pool(_) | Self::Migration(_) => 4,
            Self::Service(err) => match err.kind() {
                ErrorKind::NotFound => 10,
                ErrorKind::Forbidden => 11,
                ErrorKind::Conflict => 12,
                ErrorKind::InvalidArgument => 13,
                ErrorKind::Unauthenticated => 14,
                ErrorKind::StoreUnavailable => 4,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Invocation {
    Migrate,
    Session(Command),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Create { name: String },
    Join { code: String },
    Claim { unit: UnitId },
    Unclaim { unit: UnitId },
    Done { unit: UnitId },
    Override { unit: UnitId, action: String },
    Rename { project: ProjectId, name: String },
    Show { project: ProjectId },
    Dashboard,
}

impl Invocation {
    fn parse(args: &[String]) -> Result<Self, CliError> {
        let Some((command, rest)) = args.split_first() else {
            return Err(CliError::InvalidArgs("missing command".to_owned()));
        };
        let session = match (command.as_str(), rest) {
            ("migrate", []) => return Ok(Self::Migrate),
            ("create", name) => Command::Create {
                name: name.join(" "),
            },
            ("join", [code]) => Command::Join { code: code.clone() },
            ("claim", [unit]) => Command::Claim {
                unit: parse_id(unit).map(UnitId::from_uuid)?,
            },
            ("unclaim", [unit]) => Command::Unclaim {
                unit: parse_id(unit).map(UnitId::from_uuid)?,
            },
            ("done", [unit]) => Command::Done {
                unit: parse_id(unit).map(UnitId::from_uuid)?,
            },
            ("override", [unit, action]) => Command::Override {
                unit: parse_id(unit).map(UnitId::from_uuid)?,
                action: action.clone(),
            },
            ("rename", [project, name @ ..]) if !name.is_empty() => Command::Rename {
                project: parse_id(project).map(ProjectId::from_uuid)?,
                name: name.join(" "),
            },
            ("show", [project]) => Command::Show {
                project: parse_id(project).map(ProjectId::from_uuid)?,
            },
            ("dashboard", []) => Command::Dashboard,
            (
                "migrate" | "join" | "claim" | "unclaim" | "done" | "override" | "rename"
                | "show" | "dashboard",
                _,
            ) => {
                return Err(CliError::InvalidArgs(format!(
                    "wrong number of arguments for '{command}'"
                )));
            }
            (other, _) => {
                return Err(CliError::InvalidArgs(format!("unknown command '{other}'")));
            }
        };
        Ok(Self::Session(session))
    }
}

fn parse_id(raw: &str) -> Result<Uuid, CliError> {
    Uuid::parse_str(raw.trim())
        .map_err(|err| CliError::InvalidArgs(format!("'{raw}' is not a valid id: {err}")))
}

fn request_context(raw_user: Option<&str>) -> Result<RequestContext, CliError> {
    match raw_user.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(RequestContext::anonymous()),
        Some(value) => Uuid::parse_str(value)
            .map(|uuid| RequestContext::authenticated(UserId::from_uuid(uuid)))
            .map_err(|err| CliError::Identity(err.to_string())),
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");
            // Logging may not be initialised yet, so report on stderr too.
            let _report = writeln!(io::stderr(), "khatma: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(args: &[String]) -> Result<(), CliError> {
    let invocation = Invocation::parse(args)?;
    let config = KhatmaConfig::from_env()?;
    // A subscriber installed by an embedding process is kept.
    let _tracing = init_tracing(&config.log_filter);
    let pool = build_pool(&config.database_url, config.pool_size)?;

    let command = match invocation {
        Invocation::Migrate => return migrate(&pool),
        Invocation::Session(command) => command,
    };

    let context = request_context(std::env::var(USER_ENV).ok().as_deref())?;
    let store = Arc::new(PostgresProjectStore::new(pool));
    let service: Service = KhatimaService::new(
        Arc::clone(&store),
        Arc::new(StoreAuthGate::new(store)),
        Arc::new(DefaultClock),
        Arc::new(UuidInvitationCodes),
    );

    build_runtime()?.block_on(async {
        let caller = service.authenticate(&context)?;
        execute(&service, caller, command).await
    })
}

fn build_runtime() -> Result<tokio::runtime::Runtime, CliError> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::RuntimeInit)
}

fn migrate(pool: &KhatimaPgPool) -> Result<(), CliError> {
    let mut connection = pool.get()?;
    apply_schema(&mut connection).map_err(|err| CliError::Migration(err.to_string()))?;
    info!("khatima tables created");
    emit(&serde_json::json!({ "migrated": true }))
}

async fn execute(service: &Service, caller: UserId, command: Command) -> Result<(), CliError> {
    match command {
        Command::Create { name } => {
            emit(&service.create_project(caller, CreateProjectRequest::new(name)).await?)
        }
        Command::Join { code } => emit(&service.join_project(caller, &code).await?),
        Command::Claim { unit } => emit(&service.claim_unit(caller, unit).await?.unit),
        Command::Unclaim { unit } => emit(&service.unclaim_unit(caller, unit).await?.unit),
        Command::Done { unit } => {
            let update = service.mark_unit_done(caller, unit).await?;
            emit(&serde_json::json!({
                "unit": update.unit,
                "project_complete": update.project.is_complete(),
            }))
        }
        Command::Override { unit, action } => {
            let update = service.admin_override(caller, unit, &action).await?;
            emit(&serde_json::json!({
                "unit": update.unit,
                "project_complete": update.project.is_complete(),
            }))
        }
        Command::Rename { project, name } => {
            emit(&service.rename_project(caller, project, &name).await?)
        }
        Command::Show { project } => emit(&service.project_detail(caller, project).await?),
        Command::Dashboard => emit(&service.dashboard(caller).await?),
    }
}

fn emit(value: &impl Serialize) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)
        .map_err(|err| CliError::Output(io::Error::other(err)))?;
    writeln!(stdout).map_err(CliError::Output)
}
