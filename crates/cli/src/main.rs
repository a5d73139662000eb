//! linkvet entry point.
//!
//! Logging goes to stderr so the JSON report on stdout stays machine-readable.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod args;
mod check;
mod prune;
mod report;
mod scan;

use args::{Cli, Command};

const DEFAULT_LOG_FILTER: &str = "linkvet=info,linkvet_client=info,linkvet_core=info";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let outcome = match cli.command {
        Command::Check(args) => check::run(args).await,
        Command::Prune(args) => prune::run(args).await,
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
