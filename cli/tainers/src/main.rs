//! tainers - deterministically named Docker containers from the command line.
//!
//! Reads a JSON container specification, derives the container's name from
//! its configuration, and creates or checks that container through the
//! Docker daemon. Diagnostics go to stderr so `tainers name` output can be
//! captured.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod source;

use commands::{Cli, ERROR_EXIT};
use config::{Config, LogFormat};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error::print_error(&e);
            return ExitCode::from(ERROR_EXIT);
        }
    };

    init_tracing(&config);

    match cli.run(config).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error::print_error(&e);
            ExitCode::from(ERROR_EXIT)
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}
