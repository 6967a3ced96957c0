use crate::traits::{
    Environment, FileSystem, Output, QuietOutput, RealEnvironment, RealFileSystem, TerminalOutput,
};
#[cfg(test)]
use crate::traits::{MockEnvironment, MockFileSystem, MockOutput};
use std::sync::Arc;

/// Application context that holds all dependencies for dependency injection
pub struct Context {
    pub fs: Arc<dyn FileSystem>,
    pub output: Arc<dyn Output>,
    pub env: Arc<dyn Environment>,
}

impl Context {
    /// Create a new context with real implementations (for production use)
    pub fn new(verbose: bool) -> Self {
        let output: Arc<dyn Output> = if verbose {
            Arc::new(TerminalOutput)
        } else {
            Arc::new(QuietOutput)
        };

        Self {
            fs: Arc::new(RealFileSystem),
            output,
            env: Arc::new(RealEnvironment),
        }
    }

    /// Create a new context with mock implementations (for testing)
    #[cfg(test)]
    #[allow(dead_code)]
    pub fn test() -> Self {
        Self {
            fs: Arc::new(MockFileSystem::new()),
            output: Arc::new(MockOutput::new()),
            env: Arc::new(MockEnvironment::new()),
        }
    }

    /// Create a test context with specific mock implementations
    #[cfg(test)]
    pub fn test_with(
        fs: Arc<dyn FileSystem>,
        output: Arc<dyn Output>,
        env: Arc<dyn Environment>,
    ) -> Self {
        Self { fs, output, env }
    }
}

impl Clone for Context {
    fn clone(&self) -> Self {
        Self {
            fs: Arc::clone(&self.fs),
            output: Arc::clone(&self.output),
            env: Arc::clone(&self.env),
        }
    }
}
