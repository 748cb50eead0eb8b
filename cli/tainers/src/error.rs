//! Error handling and display for the CLI.

use colored::Colorize;
use tainers_spec::{RuntimeError, ValidationError};
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("specification must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("invalid specification: {0}")]
    Validation(#[from] ValidationError),

    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {:#}", "Error:".red().bold(), err);

    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        match cli_err {
            CliError::Validation(ValidationError::MissingImage) => {
                eprintln!(
                    "\n{}",
                    "Hint: add an \"Image\" key, e.g. {\"Image\": \"alpine:latest\"}.".yellow()
                );
            }
            CliError::Runtime(RuntimeError::Other(_)) => {
                eprintln!(
                    "\n{}",
                    "Hint: check that the Docker daemon is running and --socket points at it."
                        .yellow()
                );
            }
            _ => {}
        }
    }
}
