//! Built-in template that formats a secret as a configuration block.

use crate::error::GenerateError;
use crate::secrets::Secret;
use handlebars::Handlebars;

const TEMPLATE_NAME: &str = "secret";

const SECRET_BLOCK_TEMPLATE: &str = "secret \"{{name}}\" {
    path = \"{{path}}\"
    data {
{{#each data}}        {{@key}} = \"{{this}}\"
{{/each}}    }
}
";

/// Renders a [`Secret`] into a `secret "<name>" { ... }` block.
///
/// Independent of the outer template: same input always gives the same bytes.
pub struct SecretBlockTemplate {
    handlebars: Handlebars<'static>,
}

impl SecretBlockTemplate {
    pub fn new() -> Result<Self, GenerateError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars
            .register_template_string(TEMPLATE_NAME, SECRET_BLOCK_TEMPLATE)
            .map_err(|e| GenerateError::TemplateParse(e.to_string()))?;

        Ok(Self { handlebars })
    }

    pub fn render(&self, secret: &Secret) -> Result<String, GenerateError> {
        self.handlebars
            .render(TEMPLATE_NAME, secret)
            .map_err(|e| GenerateError::TemplateRender(format!("secret block: {}", e)))
    }
}
