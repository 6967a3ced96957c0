pub mod delimiters;
pub mod helpers;
pub mod renderer;
pub mod secret_block;

pub use delimiters::Delimiters;
pub use renderer::TemplateRenderer;
pub use secret_block::SecretBlockTemplate;
