//! Container specifications.
//!
//! A [`Specification`] is a validated, immutable parameter mapping that
//! names exactly one container. [`Bare`] binds it to a runtime and
//! provides the idempotent existence/create/ensure operations.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::{RuntimeError, ValidationError};
use crate::naming::{IMAGE_KEY, NAME_KEY};
use crate::runtime::RuntimeClient;
use crate::Params;

/// Operations every specification-like object supports.
#[async_trait]
pub trait ContainerSpec: Send + Sync {
    /// Name of the container this specification describes.
    fn name(&self) -> &str;

    /// Image reference the container is created from.
    fn image(&self) -> &str;

    /// True if a container with this name exists.
    async fn exists(&self) -> Result<bool, RuntimeError>;

    /// Create the container if absent.
    ///
    /// Returns true only if this invocation created it. A pre-existing
    /// container or a lost creation race returns false.
    async fn create(&self) -> Result<bool, RuntimeError>;

    /// Make sure a container with this name exists.
    ///
    /// Returns true whether it was found, created here, or created by a
    /// concurrent actor. The existing container's configuration is not
    /// compared with this specification.
    async fn ensure(&self) -> Result<bool, RuntimeError>;
}

/// Terminal states of a create attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The container was already there; no create was attempted.
    AlreadyExists,

    /// This invocation created the container.
    Created,

    /// Another actor created it first.
    Conflict,
}

/// Validated container parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Specification {
    params: Params,
    name: String,
    image: String,
}

impl Specification {
    /// Validate parameters. Both `name` and `Image` must be non-empty strings.
    pub fn new(params: Params) -> Result<Self, ValidationError> {
        let name = required_str(&params, NAME_KEY).ok_or(ValidationError::MissingName)?;
        let image = required_str(&params, IMAGE_KEY).ok_or(ValidationError::MissingImage)?;

        Ok(Self {
            name,
            image,
            params,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    /// Full parameter mapping sent to the runtime on create.
    pub fn params(&self) -> &Params {
        &self.params
    }
}

fn required_str(params: &Params, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// A specification bound to a runtime, with no extra behavior.
pub struct Bare {
    spec: Specification,
    runtime: Arc<dyn RuntimeClient>,
}

impl Bare {
    pub fn new(spec: Specification, runtime: Arc<dyn RuntimeClient>) -> Self {
        Self { spec, runtime }
    }

    /// Validate parameters and bind them to a runtime.
    pub fn from_params(
        params: Params,
        runtime: Arc<dyn RuntimeClient>,
    ) -> Result<Self, ValidationError> {
        Ok(Self::new(Specification::new(params)?, runtime))
    }

    pub fn specification(&self) -> &Specification {
        &self.spec
    }

    /// Check for the container and create it if absent.
    ///
    /// Errors other than a naming conflict propagate unchanged.
    pub async fn attempt_create(&self) -> Result<CreateOutcome, RuntimeError> {
        if self.exists().await? {
            debug!(name = %self.spec.name, "Container already exists");
            return Ok(CreateOutcome::AlreadyExists);
        }

        match self.runtime.create_container(&self.spec.params).await {
            Ok(handle) => {
                info!(
                    name = %self.spec.name,
                    image = %self.spec.image,
                    id = %handle.id,
                    "Created container"
                );
                Ok(CreateOutcome::Created)
            }
            Err(RuntimeError::Conflict(message)) => {
                warn!(
                    name = %self.spec.name,
                    message = %message,
                    "Container created concurrently by another actor"
                );
                Ok(CreateOutcome::Conflict)
            }
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for Bare {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bare").field("spec", &self.spec).finish()
    }
}

#[async_trait]
impl ContainerSpec for Bare {
    fn name(&self) -> &str {
        self.spec.name()
    }

    fn image(&self) -> &str {
        self.spec.image()
    }

    async fn exists(&self) -> Result<bool, RuntimeError> {
        match self.runtime.get_container_by_name(&self.spec.name).await {
            Ok(_) => Ok(true),
            Err(RuntimeError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn create(&self) -> Result<bool, RuntimeError> {
        Ok(self.attempt_create().await? == CreateOutcome::Created)
    }

    async fn ensure(&self) -> Result<bool, RuntimeError> {
        // Every outcome leaves a container with this name in place.
        match self.attempt_create().await? {
            CreateOutcome::AlreadyExists | CreateOutcome::Created | CreateOutcome::Conflict => {
                Ok(true)
            }
        }
    }
}

#[async_trait]
impl<S: ContainerSpec + ?Sized> ContainerSpec for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn image(&self) -> &str {
        (**self).image()
    }

    async fn exists(&self) -> Result<bool, RuntimeError> {
        (**self).exists().await
    }

    async fn create(&self) -> Result<bool, RuntimeError> {
        (**self).create().await
    }

    async fn ensure(&self) -> Result<bool, RuntimeError> {
        (**self).ensure().await
    }
}

#[async_trait]
impl<S: ContainerSpec + ?Sized> ContainerSpec for Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn image(&self) -> &str {
        (**self).image()
    }

    async fn exists(&self) -> Result<bool, RuntimeError> {
        (**self).exists().await
    }

    async fn create(&self) -> Result<bool, RuntimeError> {
        (**self).create().await
    }

    async fn ensure(&self) -> Result<bool, RuntimeError> {
        (**self).ensure().await
    }
}
