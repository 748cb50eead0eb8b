//! Container runtime interface and mock implementation.
//!
//! The runtime interface is the only way specifications touch the outside
//! world:
//! - Looking up containers by name
//! - Creating containers
//! - Checking for and pulling images
//!
//! A mock implementation is provided for testing and development.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::RuntimeError;
use crate::naming::NAME_KEY;
use crate::Params;

/// Handle to a container known to the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHandle {
    /// Runtime-assigned container ID.
    pub id: String,
}

/// Handle to an image known to the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    /// Image reference as requested.
    pub reference: String,
}

/// Container runtime interface.
#[async_trait]
pub trait RuntimeClient: Send + Sync {
    /// Look up a container by name. Absence is `RuntimeError::NotFound`.
    async fn get_container_by_name(&self, name: &str) -> Result<ContainerHandle, RuntimeError>;

    /// Create a container from the full parameter mapping (including `name`).
    ///
    /// A name collision is `RuntimeError::Conflict`.
    async fn create_container(&self, params: &Params) -> Result<ContainerHandle, RuntimeError>;

    /// Look up an image by reference. Absence is `RuntimeError::NotFound`.
    async fn get_image(&self, image: &str) -> Result<ImageHandle, RuntimeError>;

    /// Pull an image into the runtime.
    async fn pull_image(&self, image: &str) -> Result<ImageHandle, RuntimeError>;
}

/// A call observed by [`MockRuntime`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    GetContainer(String),
    CreateContainer(String),
    GetImage(String),
    PullImage(String),
}

#[derive(Debug, Default)]
struct MockState {
    containers: BTreeMap<String, Params>,
    images: BTreeSet<String>,
    calls: Vec<RuntimeCall>,
}

/// In-memory runtime for testing and development.
#[derive(Debug, Default)]
pub struct MockRuntime {
    state: Mutex<MockState>,

    /// Counter for generating container IDs.
    id_counter: AtomicU64,

    /// Report a conflict on create, as if another actor won the race.
    conflict_on_create: bool,

    /// Fail creates with this message.
    create_failure: Option<String>,

    /// Fail pulls with this message.
    pull_failure: Option<String>,
}

impl MockRuntime {
    /// Create a new mock runtime with no containers and no images.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing container.
    pub fn with_container(self, name: &str) -> Self {
        self.lock().containers.insert(name.to_string(), Params::new());
        self
    }

    /// Seed an image that is already present.
    pub fn with_image(self, image: &str) -> Self {
        self.lock().images.insert(image.to_string());
        self
    }

    /// Make every create lose a race to another actor.
    pub fn conflicting(mut self) -> Self {
        self.conflict_on_create = true;
        self
    }

    /// Make every create fail with a generic runtime error.
    pub fn failing_create(mut self, message: &str) -> Self {
        self.create_failure = Some(message.to_string());
        self
    }

    /// Make every pull fail with a generic runtime error.
    pub fn failing_pull(mut self, message: &str) -> Self {
        self.pull_failure = Some(message.to_string());
        self
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.lock().calls.clone()
    }

    /// Number of calls matching a predicate.
    pub fn count(&self, pred: impl Fn(&RuntimeCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn has_container(&self, name: &str) -> bool {
        self.lock().containers.contains_key(name)
    }

    pub fn has_image(&self, image: &str) -> bool {
        self.lock().images.contains(image)
    }

    /// Parameters a container was created with by this runtime.
    pub fn created_params(&self, name: &str) -> Option<Params> {
        self.lock().containers.get(name).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_id(&self) -> String {
        let counter = self.id_counter.fetch_add(1, Ordering::SeqCst);
        format!("mock_{:016x}", counter)
    }
}

#[async_trait]
impl RuntimeClient for MockRuntime {
    async fn get_container_by_name(&self, name: &str) -> Result<ContainerHandle, RuntimeError> {
        let mut state = self.lock();
        state.calls.push(RuntimeCall::GetContainer(name.to_string()));

        if state.containers.contains_key(name) {
            Ok(ContainerHandle {
                id: format!("mock_{name}"),
            })
        } else {
            Err(RuntimeError::NotFound(format!("no such container: {name}")))
        }
    }

    async fn create_container(&self, params: &Params) -> Result<ContainerHandle, RuntimeError> {
        let name = params
            .get(NAME_KEY)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let mut state = self.lock();
        state.calls.push(RuntimeCall::CreateContainer(name.clone()));

        if let Some(message) = &self.create_failure {
            return Err(RuntimeError::api(500, message.clone()));
        }

        if self.conflict_on_create {
            // The other actor's container is now there.
            state.containers.entry(name.clone()).or_default();
            return Err(RuntimeError::Conflict(format!(
                "container name {name} is already in use"
            )));
        }

        if state.containers.contains_key(&name) {
            return Err(RuntimeError::Conflict(format!(
                "container name {name} is already in use"
            )));
        }

        info!(name = %name, "[MOCK] Creating container");
        state.containers.insert(name, params.clone());
        drop(state);

        Ok(ContainerHandle { id: self.next_id() })
    }

    async fn get_image(&self, image: &str) -> Result<ImageHandle, RuntimeError> {
        let mut state = self.lock();
        state.calls.push(RuntimeCall::GetImage(image.to_string()));

        if state.images.contains(image) {
            Ok(ImageHandle {
                reference: image.to_string(),
            })
        } else {
            Err(RuntimeError::NotFound(format!("no such image: {image}")))
        }
    }

    async fn pull_image(&self, image: &str) -> Result<ImageHandle, RuntimeError> {
        let mut state = self.lock();
        state.calls.push(RuntimeCall::PullImage(image.to_string()));

        if let Some(message) = &self.pull_failure {
            return Err(RuntimeError::api(500, message.clone()));
        }

        debug!(image = %image, "[MOCK] Pulling image");
        state.images.insert(image.to_string());

        Ok(ImageHandle {
            reference: image.to_string(),
        })
    }
}
