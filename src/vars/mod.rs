//! Variable store: key/value variables loaded from an optional file on disk.
//!
//! The file format is chosen by extension. `.json` and `.yaml`/`.yml` are parsed
//! with serde, everything else (`.hcl`, `.tfvars`, no extension) is parsed as HCL.

use crate::error::GenerateError;
use crate::traits::FileSystem;
use anyhow::Result;
use serde_json::{Map, Value};
use std::path::Path;

/// Supported variables file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarsFormat {
    Hcl,
    Json,
    Yaml,
}

impl VarsFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => VarsFormat::Json,
            Some("yaml") | Some("yml") => VarsFormat::Yaml,
            _ => VarsFormat::Hcl,
        }
    }
}

/// In-memory variable mapping used as the template data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    values: Map<String, Value>,
}

impl Variables {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a variable by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Insert or replace a variable
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The mapping as a JSON object, used as template render data
    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }

    /// Parse a `KEY=VALUE` assignment. Splits on the first `=`.
    pub fn parse_assignment(assignment: &str) -> Result<(String, String), GenerateError> {
        match assignment.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.to_string()))
            }
            _ => Err(GenerateError::InvalidAssignment(assignment.to_string())),
        }
    }

    /// Parse variables from text in the given format
    pub fn parse(content: &str, format: VarsFormat) -> Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::new());
        }

        let value: Value = match format {
            VarsFormat::Hcl => hcl::from_str(content).map_err(|e| e.to_string())?,
            VarsFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string())?,
            VarsFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string())?,
        };

        match value {
            Value::Object(values) => Ok(Self { values }),
            Value::Null => Ok(Self::new()),
            other => Err(format!(
                "expected a mapping at the top level, found {}",
                type_name(&other)
            )),
        }
    }
}

/// Load variables from `path`.
///
/// A missing file yields an empty mapping. A file that exists but cannot be
/// read or parsed is an error.
pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Variables> {
    if !fs.exists(path) {
        return Ok(Variables::new());
    }

    let content = fs.read_to_string(path)?;

    Variables::parse(&content, VarsFormat::from_path(path)).map_err(|message| {
        GenerateError::VarsParse {
            path: path.display().to_string(),
            message,
        }
        .into()
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
