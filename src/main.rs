// ABOUTME: Entry point for demoboot — starts the demo server and dashboard in the background.
// ABOUTME: Parses CLI args, sets up logging, loads the launch plan, and runs the orchestrator.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use demoboot::{Config, Orchestrator};

#[derive(Parser)]
#[command(name = "demoboot")]
#[command(about = "Launch the demo server and dashboard in the background")]
#[command(version)]
struct Cli {
    /// Directory the demo runs from (default: current directory)
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Launch plan (default: <base-dir>/demoboot.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip executable and script checks
    #[arg(long)]
    no_preflight: bool,

    /// Verbose diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every service was spawned.
fn run(cli: Cli) -> anyhow::Result<bool> {
    let base_dir = match cli.base_dir {
        Some(dir) => std::path::absolute(&dir)
            .with_context(|| format!("failed to resolve base directory {}", dir.display()))?,
        None => std::env::current_dir().context("failed to resolve current directory")?,
    };
    let config = Config::load(cli.config.as_deref(), &base_dir)?;

    let mut orchestrator = Orchestrator::new(&base_dir, config);
    if cli.no_preflight {
        orchestrator = orchestrator.with_preflight(false);
    }

    let report = orchestrator.run()?;
    for failure in &report.failures {
        eprintln!("Error: {failure}");
    }
    Ok(report.is_success())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "demoboot=debug" } else { "demoboot=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}
