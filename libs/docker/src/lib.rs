//! # tainers-docker
//!
//! [`RuntimeClient`](tainers_spec::RuntimeClient) for the Docker daemon,
//! speaking the Engine API over its Unix socket.
//!
//! | Operation               | Endpoint                                  | Mapped statuses  |
//! |-------------------------|-------------------------------------------|------------------|
//! | `get_container_by_name` | `GET /containers/{name}/json`             | 404 → `NotFound` |
//! | `create_container`      | `POST /containers/create?name=`           | 409 → `Conflict` |
//! | `get_image`             | `GET /images/{ref}/json`                  | 404 → `NotFound` |
//! | `pull_image`            | `POST /images/create?fromImage=&tag=`     |                  |
//!
//! Any other non-2xx status becomes `RuntimeError::Api`; transport and
//! decoding failures become `RuntimeError::Other`.

mod api;
mod reference;
mod runtime;

pub use api::{
    ContainerCreated, ContainerInspect, DockerClient, DockerError, ImageInspect, DEFAULT_SOCKET,
};
pub use reference::{split_image_ref, DEFAULT_TAG};
pub use runtime::create_body;
