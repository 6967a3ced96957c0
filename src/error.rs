use std::fmt;

/// Error types for configuration generation
#[derive(Debug)]
pub enum GenerateError {
    /// Variables file exists but could not be parsed
    VarsParse { path: String, message: String },

    /// Key not present in the environment nor in the variables
    VariableNotFound(String),

    /// Secret read failed or returned no data
    SecretRead { path: String, reason: String },

    /// Secret field that cannot be rendered as a string
    SecretField { path: String, field: String },

    /// Template could not be parsed
    TemplateParse(String),

    /// Template failed while executing
    TemplateRender(String),

    /// Delimiter pair is unusable
    InvalidDelimiters(String),

    /// Malformed KEY=VALUE assignment
    InvalidAssignment(String),

    /// Vault client could not be configured
    VaultConfig(String),
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::VarsParse { path, message } => {
                write!(f, "Failed to parse variables file {}: {}", path, message)
            }
            GenerateError::VariableNotFound(key) => {
                write!(f, "Variable {} not found", key)
            }
            GenerateError::SecretRead { path, reason } => {
                write!(f, "Reading from vault path: {}: {}", path, reason)
            }
            GenerateError::SecretField { path, field } => {
                write!(
                    f,
                    "Secret field '{}' at vault path {} is not a string",
                    field, path
                )
            }
            GenerateError::TemplateParse(msg) => {
                write!(f, "Failed to parse template: {}", msg)
            }
            GenerateError::TemplateRender(msg) => {
                write!(f, "Failed to render template: {}", msg)
            }
            GenerateError::InvalidDelimiters(msg) => {
                write!(f, "Invalid template delimiters: {}", msg)
            }
            GenerateError::InvalidAssignment(msg) => {
                write!(f, "Invalid variable assignment '{}': expected KEY=VALUE", msg)
            }
            GenerateError::VaultConfig(msg) => {
                write!(f, "Invalid Vault client configuration: {}", msg)
            }
        }
    }
}

impl std::error::Error for GenerateError {}
