//! `RuntimeClient` implementation backed by the Docker daemon.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tainers_spec::naming::NAME_KEY;
use tainers_spec::{ContainerHandle, ImageHandle, Params, RuntimeClient, RuntimeError};
use tracing::info;

use crate::api::{DockerClient, DockerError};

const NOT_FOUND: u16 = 404;
const CONFLICT: u16 = 409;

#[async_trait]
impl RuntimeClient for DockerClient {
    async fn get_container_by_name(&self, name: &str) -> Result<ContainerHandle, RuntimeError> {
        let inspect = self.inspect_container(name).await.map_err(|e| match e {
            DockerError::Api {
                status: NOT_FOUND,
                message,
            } => RuntimeError::NotFound(message),
            other => into_runtime_error(other),
        })?;

        Ok(ContainerHandle { id: inspect.id })
    }

    async fn create_container(&self, params: &Params) -> Result<ContainerHandle, RuntimeError> {
        let name = params
            .get(NAME_KEY)
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        let created = self
            .create_container(name, &create_body(params))
            .await
            .map_err(|e| match e {
                DockerError::Api {
                    status: CONFLICT,
                    message,
                } => RuntimeError::Conflict(message),
                other => into_runtime_error(other),
            })?;

        for warning in created.warnings.iter().flatten() {
            info!(name = %name, warning = %warning, "Docker create warning");
        }

        Ok(ContainerHandle { id: created.id })
    }

    async fn get_image(&self, image: &str) -> Result<ImageHandle, RuntimeError> {
        self.inspect_image(image).await.map_err(|e| match e {
            DockerError::Api {
                status: NOT_FOUND,
                message,
            } => RuntimeError::NotFound(message),
            other => into_runtime_error(other),
        })?;

        Ok(ImageHandle {
            reference: image.to_string(),
        })
    }

    async fn pull_image(&self, image: &str) -> Result<ImageHandle, RuntimeError> {
        DockerClient::pull_image(self, image)
            .await
            .map_err(into_runtime_error)?;

        Ok(ImageHandle {
            reference: image.to_string(),
        })
    }
}

/// Container create body: every parameter except the name, which the
/// Engine API takes as a query parameter.
pub fn create_body(params: &Params) -> Value {
    let body: Map<String, Value> = params
        .iter()
        .filter(|(k, _)| k.as_str() != NAME_KEY)
        .map(|(k, v)| (k.clone(), Value::from(v.clone())))
        .collect();
    Value::Object(body)
}

fn into_runtime_error(err: DockerError) -> RuntimeError {
    match err {
        DockerError::Api { status, message } => RuntimeError::Api { status, message },
        other => RuntimeError::other(other),
    }
}
