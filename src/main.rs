//! daisy - attach a secondary slave pool to a Sentinel-managed pod.
//!
//! This is the main entry point that:
//! - Parses the command line
//! - Initializes structured logging
//! - Runs the selected subcommand and maps its outcome to an exit status

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use daisy::RunContext;
use daisy::cli::{
    Cli, Command, CreateArgs, GlobalArgs, LogFormat, OutputFormat, SlavePoolCommand,
};
use daisy::pool::RunReport;

/// Exit status when at least one candidate failed
const EXIT_PARTIAL_FAILURE: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.global.log_format) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::from(2);
    }

    match &cli.command {
        Command::Slavepool {
            command: SlavePoolCommand::Create(args),
        } => slavepool_create(&cli.global, args).await,
    }
}

/// Initialize tracing subscriber. Logs go to stderr so stdout only carries the report.
fn init_tracing(format: LogFormat) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("daisy=info"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
}

async fn slavepool_create(global: &GlobalArgs, args: &CreateArgs) -> ExitCode {
    let ctx = match RunContext::from_args(global, args) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    let report = match daisy::run_create(&ctx).await {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    if let Err(e) = print_report(&report, args.output) {
        error!("Failed to print report: {}", e);
        return ExitCode::FAILURE;
    }

    if report.has_failures() {
        info!(failed = report.failed(), "Slave pool partially created");
        ExitCode::from(EXIT_PARTIAL_FAILURE)
    } else {
        ExitCode::SUCCESS
    }
}

fn print_report(report: &RunReport, format: OutputFormat) -> daisy::Result<()> {
    match format {
        OutputFormat::Text => println!("{}", report.to_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}
