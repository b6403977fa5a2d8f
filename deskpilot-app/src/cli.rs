use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "deskpilot", version, about = "Drive the desktop with a multimodal model")]
pub struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a task until the model reports completion
    Run {
        task: String,
        /// Gateway calls allowed before giving up
        #[arg(short = 'n', long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        max_iterations: Option<usize>,
    },
    /// Capture one processed screenshot to disk
    Screenshot {
        #[arg(long, default_value = "debug_screenshots")]
        out_dir: PathBuf,
        #[arg(long, default_value = "debug")]
        prefix: String,
    },
    /// Verify backend tooling and credentials
    Check,
}
