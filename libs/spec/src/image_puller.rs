//! Image-pulling decorator.
//!
//! Wraps any [`ContainerSpec`] so that `create` and `ensure` first make
//! sure the image is present, pulling it if the runtime lacks it. `name`
//! and `exists` pass straight through and never touch images.
//!
//! Nothing is cached: every `create`/`ensure` re-checks the image.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::RuntimeError;
use crate::runtime::RuntimeClient;
use crate::specification::ContainerSpec;

/// Decorator that pulls the image before creation operations.
pub struct ImagePuller<S> {
    inner: S,
    runtime: Arc<dyn RuntimeClient>,
}

impl<S: ContainerSpec> ImagePuller<S> {
    pub fn new(inner: S, runtime: Arc<dyn RuntimeClient>) -> Self {
        Self { inner, runtime }
    }

    /// The wrapped specification.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Pull the wrapped specification's image if the runtime lacks it.
    ///
    /// Returns true if a pull happened. Pull failures propagate.
    pub async fn ensure_image_present(&self) -> Result<bool, RuntimeError> {
        let image = self.inner.image();

        match self.runtime.get_image(image).await {
            Ok(_) => {
                debug!(image = %image, "Image present");
                Ok(false)
            }
            Err(RuntimeError::NotFound(_)) => {
                info!(image = %image, "Pulling image");
                self.runtime.pull_image(image).await?;
                info!(image = %image, "Image pulled");
                Ok(true)
            }
            Err(e) => Err(e),
        }
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for ImagePuller<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePuller")
            .field("inner", &self.inner)
            .finish()
    }
}

#[async_trait]
impl<S: ContainerSpec> ContainerSpec for ImagePuller<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn image(&self) -> &str {
        self.inner.image()
    }

    async fn exists(&self) -> Result<bool, RuntimeError> {
        self.inner.exists().await
    }

    async fn create(&self) -> Result<bool, RuntimeError> {
        self.ensure_image_present().await?;
        self.inner.create().await
    }

    async fn ensure(&self) -> Result<bool, RuntimeError> {
        self.ensure_image_present().await?;
        self.inner.ensure().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::runtime::{MockRuntime, RuntimeCall};

    const IMAGE: &str = "image-42-foo";

    /// Wrapped spec that records calls and returns fixed results.
    #[derive(Default)]
    struct Recorder {
        exists_calls: AtomicUsize,
        create_calls: AtomicUsize,
        ensure_calls: AtomicUsize,
    }

    #[async_trait]
    impl ContainerSpec for Recorder {
        fn name(&self) -> &str {
            "recorded-name"
        }

        fn image(&self) -> &str {
            IMAGE
        }

        async fn exists(&self) -> Result<bool, RuntimeError> {
            self.exists_calls.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }

        async fn create(&self) -> Result<bool, RuntimeError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        }

        async fn ensure(&self) -> Result<bool, RuntimeError> {
            self.ensure_calls.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }
    }

    fn pulls(runtime: &MockRuntime) -> usize {
        runtime.count(|c| matches!(c, RuntimeCall::PullImage(_)))
    }

    #[tokio::test]
    async fn test_name_and_exists_pass_through() {
        let runtime = Arc::new(MockRuntime::new());
        let puller = ImagePuller::new(Recorder::default(), runtime.clone());

        assert_eq!(puller.name(), "recorded-name");
        assert!(puller.exists().await.unwrap());
        assert_eq!(puller.inner().exists_calls.load(Ordering::SeqCst), 1);
        assert!(runtime.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_image_is_pulled_before_create() {
        let runtime = Arc::new(MockRuntime::new());
        let puller = ImagePuller::new(Recorder::default(), runtime.clone());

        assert!(!puller.create().await.unwrap());
        assert_eq!(
            runtime.calls(),
            vec![
                RuntimeCall::GetImage(IMAGE.into()),
                RuntimeCall::PullImage(IMAGE.into()),
            ]
        );
        assert_eq!(puller.inner().create_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_image_is_pulled_before_ensure() {
        let runtime = Arc::new(MockRuntime::new());
        let puller = ImagePuller::new(Recorder::default(), runtime.clone());

        assert!(puller.ensure().await.unwrap());
        assert_eq!(pulls(&runtime), 1);
        assert_eq!(puller.inner().ensure_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_present_image_is_not_pulled() {
        let runtime = Arc::new(MockRuntime::new().with_image(IMAGE));
        let puller = ImagePuller::new(Recorder::default(), runtime.clone());

        assert!(!puller.create().await.unwrap());
        assert!(puller.ensure().await.unwrap());
        assert_eq!(pulls(&runtime), 0);
        assert_eq!(puller.inner().create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(puller.inner().ensure_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pull_failure_aborts_before_delegating() {
        let runtime = Arc::new(MockRuntime::new().failing_pull("Pull failed!"));
        let puller = ImagePuller::new(Recorder::default(), runtime.clone());

        let err = puller.create().await.unwrap_err();
        assert!(err.to_string().contains("Pull failed!"));
        let err = puller.ensure().await.unwrap_err();
        assert!(err.to_string().contains("Pull failed!"));

        assert_eq!(puller.inner().create_calls.load(Ordering::SeqCst), 0);
        assert_eq!(puller.inner().ensure_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_image_is_rechecked_every_call() {
        let runtime = Arc::new(MockRuntime::new().with_image(IMAGE));
        let puller = ImagePuller::new(Recorder::default(), runtime.clone());

        puller.ensure().await.unwrap();
        puller.ensure().await.unwrap();
        puller.create().await.unwrap();

        assert_eq!(
            runtime.count(|c| matches!(c, RuntimeCall::GetImage(_))),
            3
        );
    }

    #[tokio::test]
    async fn test_ensure_image_present_reports_pull() {
        let runtime = Arc::new(MockRuntime::new());
        let puller = ImagePuller::new(Recorder::default(), runtime.clone());

        assert!(puller.ensure_image_present().await.unwrap());
        assert!(!puller.ensure_image_present().await.unwrap());
    }
}
