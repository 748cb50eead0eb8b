//! Reading the specification document.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::Value;
use tainers_spec::naming::{PREFIX_KEY, SUFFIX_KEY};
use tainers_spec::{ConfigValue, Params};

use crate::error::CliError;

/// Where the specification document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Json(String),
    File(PathBuf),
    Stdin,
}

impl Source {
    pub fn from_args(json: Option<String>, file: Option<PathBuf>) -> Self {
        match (json, file) {
            (Some(json), _) => Self::Json(json),
            (None, Some(path)) => Self::File(path),
            (None, None) => Self::Stdin,
        }
    }

    /// Read the raw document text. `stdin` is only consumed for `Source::Stdin`.
    pub fn read(&self, mut stdin: impl Read) -> Result<String> {
        match self {
            Self::Json(json) => Ok(json.clone()),
            Self::File(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read specification from {:?}", path)),
            Self::Stdin => {
                let mut text = String::new();
                stdin
                    .read_to_string(&mut text)
                    .context("Failed to read specification from standard input")?;
                Ok(text)
            }
        }
    }
}

/// Parse a document into top-level parameters.
pub fn parse_params(text: &str) -> Result<Params> {
    let value: Value = serde_json::from_str(text).context("Specification is not valid JSON")?;

    let Value::Object(object) = value else {
        return Err(CliError::NotAnObject(json_kind(&value)).into());
    };

    Ok(object
        .into_iter()
        .map(|(k, v)| (k, ConfigValue::from(v)))
        .collect())
}

/// Replace the document's prefix/suffix with command-line values.
pub fn apply_affix_overrides(params: &mut Params, prefix: Option<String>, suffix: Option<String>) {
    if let Some(prefix) = prefix {
        params.insert(PREFIX_KEY.to_string(), ConfigValue::String(prefix));
    }
    if let Some(suffix) = suffix {
        params.insert(SUFFIX_KEY.to_string(), ConfigValue::String(suffix));
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
