//! Configuration from the environment.

use std::path::PathBuf;

use anyhow::{bail, Result};
use tainers_docker::DEFAULT_SOCKET;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Docker daemon socket.
    pub docker_socket: PathBuf,

    /// Log filter directive (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Only unix:// hosts can be served over the socket client
        let docker_socket = lookup("TAINERS_DOCKER_SOCKET")
            .filter(|s| !s.is_empty())
            .or_else(|| {
                lookup("DOCKER_HOST")
                    .and_then(|host| host.strip_prefix("unix://").map(str::to_string))
            })
            .unwrap_or_else(|| DEFAULT_SOCKET.to_string());

        let log_level = lookup("TAINERS_LOG_LEVEL")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "warn".to_string());

        let log_format = match lookup("TAINERS_LOG_FORMAT").as_deref() {
            None | Some("") | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => bail!("Unknown TAINERS_LOG_FORMAT '{}' (expected text or json)", other),
        };

        Ok(Self {
            docker_socket: PathBuf::from(docker_socket),
            log_level,
            log_format,
        })
    }
}
