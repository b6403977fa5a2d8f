use anyhow::Result;
use clap::Parser;
use deskpilot_app::cli::{Cli, Command};
use deskpilot_app::commands;
use deskpilot_runtime::RunStatus;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = commands::load(cli.config.as_deref())?;

    match cli.command {
        Command::Run {
            task,
            max_iterations,
        } => {
            let status = commands::run::run(&config, &task, max_iterations).await?;
            Ok(match status {
                RunStatus::Completed => ExitCode::SUCCESS,
                RunStatus::Exhausted | RunStatus::Stalled => ExitCode::FAILURE,
            })
        }
        Command::Screenshot { out_dir, prefix } => {
            commands::screenshot::run(&config, &out_dir, &prefix).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check => {
            commands::check::run(&config).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
