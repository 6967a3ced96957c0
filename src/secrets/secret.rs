//! Secret record handed to the secret-block template.

use super::provider::SecretData;
use crate::error::GenerateError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// A secret prepared for rendering.
///
/// `data` is keyed in sorted order so the rendered block is stable across runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Secret {
    pub name: String,
    pub path: String,
    pub data: BTreeMap<String, String>,
}

impl Secret {
    /// Build a record from raw fields read at `path`.
    ///
    /// Every value is replaced by its `@base64(...)` tagged form. When
    /// `target_path` is given it replaces `path` for naming and display.
    pub fn from_data(
        path: &str,
        target_path: Option<&str>,
        data: SecretData,
    ) -> Result<Self, GenerateError> {
        let mut encoded = BTreeMap::new();

        for (field, value) in data {
            let Value::String(raw) = value else {
                return Err(GenerateError::SecretField {
                    path: path.to_string(),
                    field,
                });
            };
            encoded.insert(field, tag_base64(raw.as_bytes()));
        }

        let display_path = target_path.unwrap_or(path);

        Ok(Self {
            name: name_from_path(display_path).to_string(),
            path: display_path.to_string(),
            data: encoded,
        })
    }
}

/// Last `/`-separated segment of a path
pub fn name_from_path(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Encode bytes as standard base64 wrapped in the `@base64(...)` marker
pub fn tag_base64(bytes: &[u8]) -> String {
    format!("@base64({})", STANDARD.encode(bytes))
}
