//! Content digests for container configuration.
//!
//! A configuration is hashed by first rewriting it into a canonical token
//! tree and then digesting the compact JSON encoding of that tree:
//!
//! - **Maps** become `["{", k1, v1, k2, v2, ..., "}"]` with entries sorted
//!   by the JSON text of each canonicalized key.
//! - **Sequences** become `["[", e1, e2, ..., "]"]` in original order.
//! - **Scalars** are emitted unchanged.
//!
//! # Invariants
//!
//! - Map insertion order never affects the digest
//! - Sequence order always affects the digest
//! - Scalars are never coerced (`5` and `"5"` differ)
//!
//! The digest is SHA-1, rendered as 40 lowercase hex characters:
//!
//! ```
//! use tainers_digest::{hash, ConfigValue};
//!
//! let config = ConfigValue::map([("a", "foo"), ("b", "bar")]);
//! assert_eq!(hash(&config).as_str(), "5427f704439548cae1911616e2bec3b7cc2dd11c");
//! ```

mod value;

use serde_json::Value;
use sha1::{Digest as _, Sha1};

pub use value::ConfigValue;

const MAP_OPEN: &str = "{";
const MAP_CLOSE: &str = "}";
const SEQ_OPEN: &str = "[";
const SEQ_CLOSE: &str = "]";

/// A configuration digest for deterministic naming.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest(String);

impl Digest {
    /// Get the hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Compute the digest of a configuration value.
pub fn hash(value: &ConfigValue) -> Digest {
    let encoded = canonical_tokens(value).to_string();
    let mut hasher = Sha1::new();
    hasher.update(encoded.as_bytes());
    Digest(hex::encode(hasher.finalize()))
}

/// Rewrite a value into its canonical token tree.
pub fn canonical_tokens(value: &ConfigValue) -> Value {
    match value {
        ConfigValue::Map(entries) => {
            let mut pairs: Vec<(String, Value, Value)> = entries
                .iter()
                .map(|(k, v)| {
                    let key = canonical_tokens(k);
                    (key.to_string(), key, canonical_tokens(v))
                })
                .collect();
            // Stable: equal keys keep their relative order.
            pairs.sort_by(|a, b| a.0.cmp(&b.0));

            // Repeated keys collapse to the last entry, as in `get` and JSON.
            let mut unique: Vec<(String, Value, Value)> = Vec::with_capacity(pairs.len());
            for pair in pairs {
                match unique.last_mut() {
                    Some(last) if last.0 == pair.0 => *last = pair,
                    _ => unique.push(pair),
                }
            }

            let mut tokens = Vec::with_capacity(unique.len() * 2 + 2);
            tokens.push(Value::from(MAP_OPEN));
            for (_, key, value) in unique {
                tokens.push(key);
                tokens.push(value);
            }
            tokens.push(Value::from(MAP_CLOSE));
            Value::Array(tokens)
        }
        ConfigValue::Sequence(items) => {
            let mut tokens = Vec::with_capacity(items.len() + 2);
            tokens.push(Value::from(SEQ_OPEN));
            tokens.extend(items.iter().map(canonical_tokens));
            tokens.push(Value::from(SEQ_CLOSE));
            Value::Array(tokens)
        }
        ConfigValue::Null => Value::Null,
        ConfigValue::Bool(b) => Value::Bool(*b),
        ConfigValue::Number(n) => Value::Number(n.clone()),
        ConfigValue::String(s) => Value::String(s.clone()),
    }
}
