//! Lookup resolution for templates.
//!
//! `Lookup` resolves a plain key (environment before variables) and
//! `LookupSecret` reads a secret and formats it as a configuration block.

use crate::error::GenerateError;
use crate::secrets::{Secret, SecretReader};
use crate::template::SecretBlockTemplate;
use crate::traits::{Environment, Output};
use crate::vars::Variables;
use anyhow::Result;
use handlebars::{RenderError, RenderErrorReason};
use serde_json::Value;
use std::sync::Mutex;

/// Lookup functions bound to one render
pub struct Lookups<'a> {
    env: &'a dyn Environment,
    vars: &'a Variables,
    secrets: &'a dyn SecretReader,
    block: &'a SecretBlockTemplate,
    output: &'a dyn Output,
    failure: Mutex<Option<anyhow::Error>>,
}

impl<'a> Lookups<'a> {
    pub fn new(
        env: &'a dyn Environment,
        vars: &'a Variables,
        secrets: &'a dyn SecretReader,
        block: &'a SecretBlockTemplate,
        output: &'a dyn Output,
    ) -> Self {
        Self {
            env,
            vars,
            secrets,
            block,
            output,
            failure: Mutex::new(None),
        }
    }

    /// Resolve `key` from the environment, then from the variables
    pub fn lookup(&self, key: &str) -> Result<Value> {
        if let Some(value) = self.env.var(key) {
            return Ok(Value::String(value));
        }

        if let Some(value) = self.vars.get(key) {
            return Ok(value.clone());
        }

        Err(GenerateError::VariableNotFound(key.to_string()).into())
    }

    /// Read the secret at `path` and render it as a block.
    ///
    /// `target_path` replaces `path` in the rendered block and in the derived
    /// name; the read itself always uses `path`.
    pub fn lookup_secret(&self, path: &str, target_path: Option<&str>) -> Result<String> {
        let data = match self.secrets.read(path) {
            Ok(Some(data)) => data,
            Ok(None) => {
                return Err(GenerateError::SecretRead {
                    path: path.to_string(),
                    reason: "no secret found".to_string(),
                }
                .into());
            }
            Err(e) => {
                return Err(GenerateError::SecretRead {
                    path: path.to_string(),
                    reason: format!("{:#}", e),
                }
                .into());
            }
        };

        let field_count = data.len();
        let secret = Secret::from_data(path, target_path, data)?;
        self.output.dimmed(&format!(
            "  read secret {} ({} fields) as {}",
            path, field_count, secret.path
        ));

        Ok(self.block.render(&secret)?)
    }

    /// Keep the first lookup failure for the caller and hand handlebars a render error
    pub(crate) fn fail(&self, error: anyhow::Error) -> RenderError {
        let message = format!("{:#}", error);
        let mut failure = self.failure.lock().unwrap_or_else(|e| e.into_inner());
        if failure.is_none() {
            *failure = Some(error);
        }
        RenderErrorReason::Other(message).into()
    }

    /// Take the recorded lookup failure, if any
    pub fn take_failure(&self) -> Option<anyhow::Error> {
        self.failure
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }
}
