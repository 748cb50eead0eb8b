//! CLI commands.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tainers_docker::DockerClient;
use tainers_spec::{specify, ContainerSpec, RuntimeClient};
use tracing::debug;

use crate::config::Config;
use crate::error::CliError;
use crate::source::{apply_affix_overrides, parse_params, Source};

/// Exit code when `ensure` cannot vouch for the container.
pub const ENSURE_FAILED: u8 = 255;

/// Exit code for errors (bad specification, runtime failure).
pub const ERROR_EXIT: u8 = 2;

/// tainers - Deterministically named Docker containers.
#[derive(Debug, Parser)]
#[command(name = "tainers")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Specification as a JSON string.
    #[arg(short, long, global = true, conflicts_with = "file")]
    json: Option<String>,

    /// Read the specification from a file (default: standard input).
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Name prefix, overriding the specification's `prefix`.
    #[arg(short, long, global = true)]
    prefix: Option<String>,

    /// Name suffix, overriding the specification's `suffix`.
    #[arg(short, long, global = true)]
    suffix: Option<String>,

    /// Docker daemon socket.
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Create the container; exits 0 only if this call created it.
    Create,

    /// Make sure the container exists; exits 0 if it does afterwards.
    Ensure,

    /// Check whether the container exists.
    Exists,

    /// Print the container name.
    Name,
}

impl Cli {
    /// Run the CLI command and return the process exit code.
    pub async fn run(self, config: Config) -> Result<u8> {
        let socket = self.socket.unwrap_or(config.docker_socket);

        let text = Source::from_args(self.json, self.file).read(std::io::stdin().lock())?;
        let mut params = parse_params(&text)?;
        apply_affix_overrides(&mut params, self.prefix, self.suffix);

        debug!(socket = %socket.display(), "Using Docker socket");
        let runtime: Arc<dyn RuntimeClient> = Arc::new(DockerClient::new(&socket));
        let spec = specify(params, runtime).map_err(CliError::from)?;

        execute(self.command, &spec, &mut std::io::stdout().lock()).await
    }
}

/// Run one command against a specification, returning the exit code.
pub async fn execute<S, W>(command: Commands, spec: &S, out: &mut W) -> Result<u8>
where
    S: ContainerSpec + ?Sized,
    W: Write,
{
    let code = match command {
        Commands::Name => {
            writeln!(out, "{}", spec.name())?;
            0
        }
        Commands::Exists => exit_code(spec.exists().await.map_err(CliError::from)?, 1),
        Commands::Create => exit_code(spec.create().await.map_err(CliError::from)?, 1),
        Commands::Ensure => exit_code(
            spec.ensure().await.map_err(CliError::from)?,
            ENSURE_FAILED,
        ),
    };
    Ok(code)
}

fn exit_code(success: bool, failure: u8) -> u8 {
    if success {
        0
    } else {
        failure
    }
}
