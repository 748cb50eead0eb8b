//! # tainers-spec
//!
//! Deterministically named container specifications with idempotent
//! create/ensure operations against a container runtime.
//!
//! ## Flow
//!
//! ```text
//! raw params ─▶ build_spec_params ─▶ Specification ─▶ Bare ─▶ ImagePuller
//!               (prefix/suffix,       (requires        (exists,   (pulls the image
//!                digest → name)        name + Image)    create,    before create
//!                                                       ensure)    and ensure)
//! ```
//!
//! [`specify`] runs the whole chain.
//!
//! ## Concurrency
//!
//! Several actors may race to create the same container. The runtime
//! serializes creation by name and reports a conflict to the losers:
//! `ensure` treats that as success, `create` reports it as "not created
//! by me". There is no local locking, retrying, or timeout.

mod error;
mod image_puller;
pub mod naming;
pub mod runtime;
mod specification;

use std::collections::BTreeMap;
use std::sync::Arc;

pub use error::{RuntimeError, ValidationError};
pub use image_puller::ImagePuller;
pub use naming::{build_spec_params, config_digest, DEFAULT_PREFIX};
pub use runtime::{ContainerHandle, ImageHandle, MockRuntime, RuntimeClient};
pub use specification::{Bare, ContainerSpec, CreateOutcome, Specification};

/// Re-export for callers building parameters.
pub use tainers_digest::{ConfigValue, Digest};

/// Top-level container parameters.
pub type Params = BTreeMap<String, ConfigValue>;

/// Build a named, image-pulling specification from raw parameters.
pub fn specify(
    raw: Params,
    runtime: Arc<dyn RuntimeClient>,
) -> Result<ImagePuller<Bare>, ValidationError> {
    let params = build_spec_params(raw);
    let bare = Bare::new(Specification::new(params)?, Arc::clone(&runtime));
    Ok(ImagePuller::new(bare, runtime))
}
