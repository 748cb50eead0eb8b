//! Deterministic container names.
//!
//! A container's name is `{prefix}-{digest}{-suffix}` where the digest
//! covers every parameter except `name`, `prefix` and `suffix`. Two
//! specifications with the same configuration and affixes therefore
//! always name the same container.

use tainers_digest::{hash, ConfigValue, Digest};

use crate::Params;

/// Prefix used when none (or an empty one) is supplied.
pub const DEFAULT_PREFIX: &str = "Tainers";

/// Parameter holding the container name.
pub const NAME_KEY: &str = "name";

/// Parameter holding the image reference.
pub const IMAGE_KEY: &str = "Image";

/// Naming-only parameter, removed before hashing.
pub const PREFIX_KEY: &str = "prefix";

/// Naming-only parameter, removed before hashing.
pub const SUFFIX_KEY: &str = "suffix";

/// Turn raw parameters into named specification parameters.
///
/// Removes `prefix` and `suffix`, hashes what remains (ignoring any
/// caller-supplied `name`), and stores the derived `name`.
pub fn build_spec_params(raw: Params) -> Params {
    let mut params = raw;

    let prefix = params
        .remove(PREFIX_KEY)
        .and_then(affix_text)
        .filter(|p| !p.is_empty())
        .map(|p| p.to_lowercase())
        .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

    let suffix = params
        .remove(SUFFIX_KEY)
        .and_then(affix_text)
        .filter(|s| !s.is_empty())
        .map(|s| format!("-{}", s.to_lowercase()))
        .unwrap_or_default();

    let digest = config_digest(&params);
    params.insert(
        NAME_KEY.to_string(),
        ConfigValue::String(format!("{prefix}-{digest}{suffix}")),
    );
    params
}

/// Digest of the configuration, excluding naming parameters.
pub fn config_digest(params: &Params) -> Digest {
    let config = ConfigValue::Map(
        params
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), NAME_KEY | PREFIX_KEY | SUFFIX_KEY))
            .map(|(k, v)| (ConfigValue::String(k.clone()), v.clone()))
            .collect(),
    );
    hash(&config)
}

fn affix_text(value: ConfigValue) -> Option<String> {
    match value {
        ConfigValue::Null => None,
        ConfigValue::String(s) => Some(s),
        other => Some(other.to_json_string()),
    }
}
