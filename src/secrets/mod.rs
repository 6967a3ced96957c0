//! Secret-service integration.
//!
//! Templates read secrets at render time through the [`SecretReader`] trait.
//! [`VaultClient`] is the HashiCorp Vault implementation.

pub mod provider;
mod secret;
mod vault;

pub use provider::SecretReader;
pub use secret::Secret;
pub use vault::{VaultClient, VaultConfig};

#[cfg(test)]
pub use provider::MockSecretReader;
