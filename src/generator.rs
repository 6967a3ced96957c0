//! Generator: loads variables, binds lookups and renders the configuration.

use crate::context::Context;
use crate::error::GenerateError;
use crate::lookup::Lookups;
use crate::secrets::{SecretReader, VaultClient, VaultConfig};
use crate::template::{Delimiters, SecretBlockTemplate, TemplateRenderer};
use crate::vars::{self, Variables};
use anyhow::{Context as _, Result};
use serde_json::Value;
use std::path::Path;

/// Renders one template against loaded variables and a secret reader.
///
/// The template is re-parsed on every [`Generator::generate_config`] call, so
/// the same generator can render repeatedly after [`Generator::set_variable`].
pub struct Generator {
    ctx: Context,
    variables: Variables,
    template: Vec<u8>,
    renderer: TemplateRenderer,
    secrets: Box<dyn SecretReader>,
    block: SecretBlockTemplate,
}

impl Generator {
    /// Load variables from `vars_path` and bind `secrets` for secret lookups
    pub fn new(
        ctx: Context,
        vars_path: &Path,
        template: Vec<u8>,
        secrets: Box<dyn SecretReader>,
    ) -> Result<Self> {
        let variables = vars::load(ctx.fs.as_ref(), vars_path)
            .with_context(|| format!("Failed to load variables from {}", vars_path.display()))?;

        if ctx.fs.exists(vars_path) {
            ctx.output.dimmed(&format!(
                "Loaded {} variables from {}",
                variables.len(),
                vars_path.display()
            ));
        } else {
            ctx.output
                .dimmed(&format!("No variables file at {}", vars_path.display()));
        }

        Ok(Self {
            ctx,
            variables,
            template,
            renderer: TemplateRenderer::default(),
            secrets,
            block: SecretBlockTemplate::new()?,
        })
    }

    /// Like [`Generator::new`], reading secrets from the Vault server in `config`.
    ///
    /// Fails when the client cannot be built. The server is not contacted
    /// until the first secret lookup.
    pub fn with_vault(
        ctx: Context,
        vars_path: &Path,
        template: Vec<u8>,
        config: VaultConfig,
    ) -> Result<Self> {
        let client = VaultClient::new(config).context("Failed to create Vault client")?;
        Self::new(ctx, vars_path, template, Box::new(client))
    }

    /// Use a different delimiter pair for template actions
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.renderer = TemplateRenderer::new(delimiters);
        self
    }

    /// Set or replace a variable before rendering
    pub fn set_variable(&mut self, key: &str, value: impl Into<Value>) {
        self.variables.set(key, value.into());
    }

    #[allow(dead_code)]
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Parse and execute the template, returning the rendered bytes
    pub fn generate_config(&self) -> Result<Vec<u8>> {
        let source = std::str::from_utf8(&self.template).map_err(|e| {
            GenerateError::TemplateParse(format!("template is not valid UTF-8: {}", e))
        })?;

        let lookups = Lookups::new(
            self.ctx.env.as_ref(),
            &self.variables,
            self.secrets.as_ref(),
            &self.block,
            self.ctx.output.as_ref(),
        );

        let rendered = self
            .renderer
            .render(source, &self.variables.to_value(), &lookups)?;

        Ok(rendered.into_bytes())
    }
}
