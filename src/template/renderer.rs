use super::delimiters::{Delimiters, VERBATIM_HELPER};
use super::helpers::{LookupHelper, LookupSecretHelper, VerbatimHelper};
use crate::error::GenerateError;
use crate::lookup::Lookups;
use anyhow::Result;
use handlebars::Handlebars;
use serde_json::Value;

const TEMPLATE_NAME: &str = "config";

/// Renders configuration templates using Handlebars
pub struct TemplateRenderer {
    delimiters: Delimiters,
}

impl TemplateRenderer {
    /// Create a new template renderer
    pub fn new(delimiters: Delimiters) -> Self {
        Self { delimiters }
    }

    /// Parse and execute `source` against `data`.
    ///
    /// The template is parsed on every call. Missing fields, unknown helpers and
    /// failed lookups abort the render; there is no partial output.
    pub fn render(&self, source: &str, data: &Value, lookups: &Lookups) -> Result<String> {
        let translated = self.delimiters.translate(source)?;

        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);

        // Register custom helpers
        handlebars.register_helper("Lookup", Box::new(LookupHelper::new(lookups)));
        handlebars.register_helper("LookupSecret", Box::new(LookupSecretHelper::new(lookups)));
        handlebars.register_helper(
            VERBATIM_HELPER,
            Box::new(VerbatimHelper::new(translated.segments)),
        );

        handlebars
            .register_template_string(TEMPLATE_NAME, &translated.source)
            .map_err(|e| GenerateError::TemplateParse(e.to_string()))?;

        match handlebars.render(TEMPLATE_NAME, data) {
            Ok(rendered) => Ok(rendered),
            Err(e) => match lookups.take_failure() {
                Some(failure) => Err(failure.context("Failed to render template")),
                None => Err(GenerateError::TemplateRender(e.to_string()).into()),
            },
        }
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new(Delimiters::default())
    }
}
