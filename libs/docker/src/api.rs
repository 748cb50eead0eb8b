//! Docker Engine HTTP API client.
//!
//! Speaks the Engine API over the daemon's Unix socket. Only the four
//! endpoints specifications need are covered.
//!
//! Reference: https://docs.docker.com/engine/api/latest/

use std::path::Path;

use hyper::body::Bytes;
use hyper::http::uri::{InvalidUri, PathAndQuery};
use hyper::{Body, Client, Method, Request, StatusCode};
use hyperlocal::{UnixClientExt, UnixConnector, Uri};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::reference::split_image_ref;

/// Default Docker daemon socket.
pub const DEFAULT_SOCKET: &str = "/var/run/docker.sock";

/// Errors from the Docker API.
#[derive(Debug, Error)]
pub enum DockerError {
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid request: {0}")]
    Request(#[from] hyper::http::Error),

    #[error("invalid request path: {0}")]
    Uri(#[from] InvalidUri),

    #[error("Docker API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("pull of {image} failed: {message}")]
    Pull { image: String, message: String },
}

impl DockerError {
    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Subset of `GET /containers/{name}/json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerInspect {
    #[serde(rename = "Id")]
    pub id: String,
}

/// Response of `POST /containers/create`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerCreated {
    #[serde(rename = "Id")]
    pub id: String,

    #[serde(rename = "Warnings", default)]
    pub warnings: Option<Vec<String>>,
}

/// Subset of `GET /images/{name}/json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageInspect {
    #[serde(rename = "Id")]
    pub id: String,
}

/// One line of the `POST /images/create` progress stream.
#[derive(Debug, Deserialize)]
struct PullProgress {
    #[serde(default)]
    status: Option<String>,

    #[serde(default)]
    error: Option<String>,
}

/// Error body returned by the daemon.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Docker API client for Unix socket communication.
pub struct DockerClient {
    socket_path: String,
    client: Client<UnixConnector>,
}

impl DockerClient {
    /// Create a new Docker client for the given socket path.
    pub fn new<P: AsRef<Path>>(socket_path: P) -> Self {
        let socket_path = socket_path.as_ref().to_string_lossy().to_string();
        let client = Client::unix();
        Self {
            socket_path,
            client,
        }
    }

    pub fn socket_path(&self) -> &str {
        &self.socket_path
    }

    /// Check if the socket exists.
    pub fn socket_exists(&self) -> bool {
        Path::new(&self.socket_path).exists()
    }

    /// Inspect a container by name or ID.
    pub async fn inspect_container(&self, name: &str) -> Result<ContainerInspect, DockerError> {
        let path = format!("/containers/{}/json", urlencoding::encode(name));
        let body = self.send(Method::GET, &path, None).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Create a container. `config` is the request body (without the name).
    pub async fn create_container(
        &self,
        name: &str,
        config: &serde_json::Value,
    ) -> Result<ContainerCreated, DockerError> {
        let path = format!("/containers/create?name={}", urlencoding::encode(name));
        let body = self
            .send(Method::POST, &path, Some(serde_json::to_vec(config)?))
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Inspect an image by reference.
    pub async fn inspect_image(&self, image: &str) -> Result<ImageInspect, DockerError> {
        let path = format!("/images/{}/json", encode_segments(image));
        let body = self.send(Method::GET, &path, None).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Pull an image, waiting for the pull to finish.
    ///
    /// The daemon answers 200 as soon as the pull starts and reports
    /// failures inside the progress stream, so the stream is checked too.
    pub async fn pull_image(&self, image: &str) -> Result<(), DockerError> {
        let (repo, tag) = split_image_ref(image);
        let path = format!(
            "/images/create?fromImage={}&tag={}",
            urlencoding::encode(repo),
            urlencoding::encode(tag)
        );
        let body = self.send(Method::POST, &path, None).await?;

        for line in body.split(|b| *b == b'\n') {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            let progress: PullProgress = serde_json::from_slice(line)?;
            if let Some(message) = progress.error {
                error!(image = %image, message = %message, "Image pull failed");
                return Err(DockerError::Pull {
                    image: image.to_string(),
                    message,
                });
            }
            if let Some(status) = progress.status {
                debug!(image = %image, status = %status, "Pull progress");
            }
        }

        Ok(())
    }

    /// Perform a request and return the body of a successful response.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Bytes, DockerError> {
        let uri = request_uri(&self.socket_path, path)?;

        debug!(method = %method, path = path, "Request to Docker API");

        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Accept", "application/json");

        let request = match body {
            Some(bytes) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(bytes))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.client.request(request).await?;
        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body()).await?;

        if status.is_success() {
            Ok(body)
        } else {
            let message = error_message(status, &body);
            debug!(status = %status, message = %message, "Docker API error");
            Err(DockerError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

impl std::fmt::Debug for DockerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockerClient")
            .field("socket_path", &self.socket_path)
            .finish()
    }
}

/// Percent-encode each `/`-separated segment of an image reference.
fn encode_segments(reference: &str) -> String {
    reference
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Build the socket URI, rejecting paths `Uri::new` would panic on.
fn request_uri(socket_path: &str, path: &str) -> Result<Uri, DockerError> {
    path.parse::<PathAndQuery>()?;
    Ok(Uri::new(socket_path, path))
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) if body.is_empty() => status.to_string(),
        Err(_) => String::from_utf8_lossy(body).trim().to_string(),
    }
}
