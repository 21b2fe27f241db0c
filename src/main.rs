use clap::Parser;
use finboard::args::{AddSubcommand, Args, Command};
use finboard::{commands, Config, ErrorType, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            match ErrorType::of(&e) {
                Some(t) => ExitCode::from(t.exit_code()),
                None => ExitCode::FAILURE,
            }
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().finboard_home().path();

    // When FINBOARD_IN_TEST_MODE is set and non-empty the mode is Mode::Test, which serves a
    // seeded snapshot from memory instead of calling the backend.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => {
            commands::init(home, init_args.api_url(), init_args.token())
                .await?
                .print()
        }

        Command::Dashboard(dashboard_args) => {
            let config = load_config(home).await?;
            commands::dashboard(config, mode, dashboard_args)
                .await?
                .print()
        }

        Command::Categories => commands::categories(load_config(home).await?, mode)
            .await?
            .print(),

        Command::Add(add_args) => {
            let config = load_config(home).await?;
            match add_args.entity() {
                AddSubcommand::Expense(args) => {
                    commands::add_expense(config, mode, args).await?.print()
                }
                AddSubcommand::Income(args) => {
                    commands::add_income(config, mode, args).await?.print()
                }
                AddSubcommand::Budget(args) => {
                    commands::add_budget(config, mode, args).await?.print()
                }
            }
        }

        Command::Import(import_args) => {
            let config = load_config(home).await?;
            commands::import(config, mode, import_args.file())
                .await?
                .print()
        }
    };
    Ok(())
}

async fn load_config(home: &std::path::Path) -> Result<Config> {
    Config::load(home)
        .await
        .map_err(|e| e.context(ErrorType::Config))
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
