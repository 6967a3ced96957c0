use std::collections::HashMap;
use std::sync::RwLock;

/// Trait for process environment access, allowing deterministic fixtures in tests
pub trait Environment: Send + Sync {
    /// Get the value of an environment variable, if set
    fn var(&self, key: &str) -> Option<String>;
}

/// Real environment backed by the process environment
pub struct RealEnvironment;

impl Environment for RealEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        // Non-unicode values are treated as unset
        std::env::var(key).ok()
    }
}

/// Mock environment for testing
#[allow(dead_code)]
pub struct MockEnvironment {
    vars: RwLock<HashMap<String, String>>,
}

#[allow(dead_code)]
impl MockEnvironment {
    /// Create an empty mock environment
    pub fn new() -> Self {
        Self {
            vars: RwLock::new(HashMap::new()),
        }
    }

    /// Builder-style variable assignment
    pub fn with_var(self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    /// Set a variable
    pub fn set(&self, key: &str, value: &str) {
        self.vars
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

impl Default for MockEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for MockEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.read().unwrap().get(key).cloned()
    }
}
