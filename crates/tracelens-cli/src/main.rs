//! TraceLens CLI
//!
//! Operator-facing diagnostics for the content pipeline: merged traces, stage
//! run history with gating inference, and run-to-run payload diffs.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracelens_core::config::TraceLensConfig;
use tracelens_core::errors::ExError;
use tracelens_core::logging_facility::{self, Profile};
use tracelens_core::render::json::error_envelope;

mod commands;
mod file_service;

use commands::{Output, Session};
use file_service::FileService;

#[derive(Debug, Parser)]
#[command(name = "tracelens")]
#[command(about = "TraceLens - pipeline trace and run diagnostics", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Emit JSON instead of the terminal view
    #[arg(long, global = true)]
    json: bool,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Captured stage-runs response (JSON array)
    #[arg(long, global = true)]
    runs_file: Option<PathBuf>,

    /// Captured precomputed run diff (JSON object)
    #[arg(long, global = true)]
    diff_file: Option<PathBuf>,

    /// Log output profile: development or production
    #[arg(long, global = true, default_value = "development")]
    log_profile: Profile,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Merged pipeline and telemetry timeline for one content id
    Trace(commands::trace::TraceArgs),
    /// Stage run history, IO inspection and run diffs
    Pipeline(commands::pipeline::PipelineArgs),
}

fn run(cli: Cli, output: Output) -> Result<(), ExError> {
    let config = match &cli.global.config {
        Some(path) => TraceLensConfig::load(path)?,
        None => TraceLensConfig::default(),
    };
    tracing::debug!(
        gating_stage = %config.stages.gating_stage,
        body_limit = config.truncation.body_limit,
        io_limit = config.truncation.io_limit,
        "configuration loaded"
    );

    let session = Session {
        config,
        service: FileService {
            runs_file: cli.global.runs_file,
            diff_file: cli.global.diff_file,
            ..FileService::default()
        },
        output,
    };

    match cli.command {
        Commands::Trace(args) => commands::trace::execute(args, session),
        Commands::Pipeline(args) => commands::pipeline::execute(args, session),
    }
}

fn main() {
    let cli = Cli::parse();
    logging_facility::init(cli.global.log_profile);

    let output = Output::detect(cli.global.json);
    if let Err(e) = run(cli, output) {
        if output.json {
            println!("{}", error_envelope(&e));
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}
