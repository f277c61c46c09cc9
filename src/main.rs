use chrono::Utc;
use clap::Parser;
use cost_report::args::{Args, Command};
use cost_report::{commands, Config, Mode, Providers, Result};
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
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");

    // This allows for running the program without calling AWS. When COST_REPORT_IN_TEST_MODE is
    // set and non-zero in length, then the mode will be Mode::Test, otherwise it will be
    // Mode::Aws.
    let mode = Mode::from_env();
    let today = Utc::now().date_naive();

    let _: () = match args.command() {
        Command::Send(report_args) => {
            let config = Config::load(report_args.event_file(), report_args.overrides()).await?;
            let providers = Providers::new(mode, config.region()).await?;
            commands::send(config, &providers, today).await?.print()
        }

        Command::Render(render_args) => {
            let report_args = render_args.report();
            let config = Config::load(report_args.event_file(), report_args.overrides()).await?;
            let providers = Providers::new(mode, config.region()).await?;
            commands::render(config, &providers, today, render_args.output())
                .await?
                .print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only. The library and
            // the binary share the crate name.
            EnvFilter::new(format!("{}={level}", env!("CARGO_CRATE_NAME")))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
