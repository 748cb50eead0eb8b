//! Integration tests for the full specify flow.
//!
//! These tests drive `specify` end to end against `MockRuntime`:
//! 1. Raw parameters are named
//! 2. The specification is validated
//! 3. create/ensure pull the image, then create the container

use std::sync::Arc;

use serde_json::json;
use tainers_spec::runtime::RuntimeCall;
use tainers_spec::{
    config_digest, specify, ConfigValue, ContainerSpec, MockRuntime, Params, ValidationError,
};

fn params(value: serde_json::Value) -> Params {
    match ConfigValue::from(value) {
        ConfigValue::Map(entries) => entries
            .into_iter()
            .map(|(k, v)| (k.as_str().unwrap().to_string(), v))
            .collect(),
        other => panic!("not an object: {other:?}"),
    }
}

fn creates(runtime: &MockRuntime) -> usize {
    runtime.count(|c| matches!(c, RuntimeCall::CreateContainer(_)))
}

#[test]
fn test_image_only_name() {
    let runtime = Arc::new(MockRuntime::new());
    let spec = specify(params(json!({"Image": "nginx:latest"})), runtime).unwrap();

    assert_eq!(
        spec.name(),
        "Tainers-8236372c6bbafeec3f89660b88f120c9862bac3b"
    );
}

#[test]
fn test_key_order_does_not_change_name() {
    let runtime = Arc::new(MockRuntime::new());

    let a: Params = serde_json::from_str(r#"{"Image":"x","Cmd":["a","b"]}"#).unwrap();
    let b: Params = serde_json::from_str(r#"{"Cmd":["a","b"],"Image":"x"}"#).unwrap();

    let a = specify(a, runtime.clone()).unwrap();
    let b = specify(b, runtime).unwrap();
    assert_eq!(a.name(), b.name());
}

#[test]
fn test_prefix_and_suffix_naming() {
    let runtime = Arc::new(MockRuntime::new());
    let config = json!({"Image": "x", "Cmd": ["a", "b"]});
    let digest = config_digest(&params(config.clone()));

    let mut raw = params(config.clone());
    raw.insert("prefix".into(), "Foo".into());
    let spec = specify(raw, runtime.clone()).unwrap();
    assert_eq!(spec.name(), format!("foo-{digest}"));

    let mut raw = params(config);
    raw.insert("prefix".into(), "Foo".into());
    raw.insert("suffix".into(), "Bar".into());
    let spec = specify(raw, runtime).unwrap();
    assert_eq!(spec.name(), format!("foo-{digest}-bar"));
}

#[test]
fn test_validation() {
    let runtime = Arc::new(MockRuntime::new());

    let err = specify(params(json!({"Image": ""})), runtime.clone()).unwrap_err();
    assert_eq!(err, ValidationError::MissingImage);
    assert!(err.to_string().contains("Image is required"));

    let err = specify(params(json!({"Cmd": ["sh"]})), runtime.clone()).unwrap_err();
    assert_eq!(err, ValidationError::MissingImage);

    assert!(specify(params(json!({"Image": "x"})), runtime).is_ok());
}

#[tokio::test]
async fn test_create_then_create_again() {
    let runtime = Arc::new(MockRuntime::new());
    let spec = specify(params(json!({"Image": "alpine:3"})), runtime.clone()).unwrap();

    assert!(!spec.exists().await.unwrap());
    assert!(spec.create().await.unwrap());
    assert!(runtime.has_image("alpine:3"));
    assert!(runtime.has_container(spec.name()));

    assert!(spec.exists().await.unwrap());
    assert!(!spec.create().await.unwrap());
    assert_eq!(creates(&runtime), 1);
}

#[tokio::test]
async fn test_created_params_exclude_affixes() {
    let runtime = Arc::new(MockRuntime::new());
    let raw = params(json!({"Image": "alpine:3", "prefix": "web", "suffix": "blue", "Env": ["A=1"]}));
    let spec = specify(raw, runtime.clone()).unwrap();

    spec.ensure().await.unwrap();

    let created = runtime.created_params(spec.name()).unwrap();
    assert!(!created.contains_key("prefix"));
    assert!(!created.contains_key("suffix"));
    assert_eq!(created["name"].as_str(), Some(spec.name()));
    assert_eq!(created["Env"], ConfigValue::from(vec!["A=1"]));
}

#[tokio::test]
async fn test_existing_container_skips_create() {
    let probe = specify(params(json!({"Image": "alpine:3"})), Arc::new(MockRuntime::new()))
        .unwrap();
    let runtime = Arc::new(
        MockRuntime::new()
            .with_container(probe.name())
            .with_image("alpine:3"),
    );
    let spec = specify(params(json!({"Image": "alpine:3"})), runtime.clone()).unwrap();

    assert!(!spec.create().await.unwrap());
    assert!(spec.ensure().await.unwrap());
    assert_eq!(creates(&runtime), 0);
}

#[tokio::test]
async fn test_lost_race() {
    let runtime = Arc::new(MockRuntime::new().conflicting().with_image("alpine:3"));
    let spec = specify(params(json!({"Image": "alpine:3"})), runtime.clone()).unwrap();
    assert!(!spec.create().await.unwrap());

    let runtime = Arc::new(MockRuntime::new().conflicting().with_image("alpine:3"));
    let spec = specify(params(json!({"Image": "alpine:3"})), runtime.clone()).unwrap();
    assert!(spec.ensure().await.unwrap());
}

#[tokio::test]
async fn test_pull_failure_prevents_create() {
    let runtime = Arc::new(MockRuntime::new().failing_pull("Pull failed!"));
    let spec = specify(params(json!({"Image": "alpine:3"})), runtime.clone()).unwrap();

    assert!(spec.ensure().await.is_err());
    assert!(spec.create().await.is_err());
    assert_eq!(creates(&runtime), 0);
    assert_eq!(
        runtime.count(|c| matches!(c, RuntimeCall::GetContainer(_))),
        0
    );
}

#[tokio::test]
async fn test_name_and_exists_never_touch_images() {
    let runtime = Arc::new(MockRuntime::new());
    let spec = specify(params(json!({"Image": "alpine:3"})), runtime.clone()).unwrap();

    let _ = spec.name();
    assert!(runtime.calls().is_empty());

    spec.exists().await.unwrap();
    assert_eq!(
        runtime.calls(),
        vec![RuntimeCall::GetContainer(spec.name().to_string())]
    );
}

#[tokio::test]
async fn test_call_order_on_ensure() {
    let runtime = Arc::new(MockRuntime::new());
    let spec = specify(params(json!({"Image": "alpine:3"})), runtime.clone()).unwrap();
    let name = spec.name().to_string();

    spec.ensure().await.unwrap();

    assert_eq!(
        runtime.calls(),
        vec![
            RuntimeCall::GetImage("alpine:3".into()),
            RuntimeCall::PullImage("alpine:3".into()),
            RuntimeCall::GetContainer(name.clone()),
            RuntimeCall::CreateContainer(name),
        ]
    );
}
