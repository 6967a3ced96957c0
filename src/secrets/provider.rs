//! SecretReader trait: the capability the renderer needs from a secret service.

use anyhow::Result;
use serde_json::{Map, Value};

/// Raw fields of a secret as returned by the secret service
pub type SecretData = Map<String, Value>;

/// Trait for secret-service read implementations.
///
/// `Ok(None)` means the path holds no secret. Errors are transport or
/// service failures.
pub trait SecretReader: Send + Sync {
    /// Read the secret stored at `path`
    fn read(&self, path: &str) -> Result<Option<SecretData>>;
}

#[cfg(test)]
pub use mock::MockSecretReader;
