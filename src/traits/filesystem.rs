use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Trait for filesystem operations to enable testing with mocks
pub trait FileSystem: Send + Sync {
    /// Read file contents as raw bytes
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Write contents to file, creating parent directories
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;

    /// Check if path exists
    fn exists(&self, path: &Path) -> bool;
}

/// Real filesystem implementation using std::fs
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).with_context(|| format!("Failed to read file: {:?}", path))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create parent directory: {:?}", parent)
                })?;
            }
        }

        std::fs::write(path, contents).with_context(|| format!("Failed to write file: {:?}", path))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Mock filesystem implementation for testing (in-memory)
#[allow(dead_code)]
pub struct MockFileSystem {
    files: Arc<RwLock<HashMap<PathBuf, Vec<u8>>>>,
}

#[allow(dead_code)]
impl MockFileSystem {
    /// Create new empty mock filesystem
    pub fn new() -> Self {
        Self {
            files: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Seed a file with text contents
    pub fn with_file(self, path: impl Into<PathBuf>, contents: &str) -> Self {
        self.files
            .write()
            .unwrap()
            .insert(path.into(), contents.as_bytes().to_vec());
        self
    }

    /// Get captured file contents for testing assertions
    pub fn get_file_contents(&self, path: &Path) -> Option<String> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Check if file was written
    pub fn has_file(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path)
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .with_context(|| format!("File not found in mock filesystem: {:?}", path))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).with_context(|| format!("File is not valid UTF-8: {:?}", path))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.files
            .write()
            .unwrap()
            .insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path)
    }
}
