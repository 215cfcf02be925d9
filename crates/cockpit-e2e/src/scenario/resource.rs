//! Fixture files referenced by scenarios.

use crate::result::{E2eError, E2eResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Fixture directory shipped with this crate
pub const DEFAULT_RESOURCE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/resources");

/// A directory of named fixture files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDir {
    root: PathBuf,
}

impl Default for ResourceDir {
    fn default() -> Self {
        Self::new(DEFAULT_RESOURCE_DIR)
    }
}

impl ResourceDir {
    /// Use `root` as the fixture directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The fixture directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a resource name resolves to
    #[must_use]
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Read a fixture file byte for byte, whatever its encoding.
    ///
    /// # Errors
    ///
    /// [`E2eError::ResourceNotFound`] if no such file exists, I/O errors
    /// otherwise.
    pub fn read(&self, name: &str) -> E2eResult<Vec<u8>> {
        let path = self.path_of(name);
        if !path.is_file() {
            return Err(E2eError::ResourceNotFound {
                name: name.to_string(),
                path,
            });
        }
        let content = fs::read(&path)?;
        tracing::trace!(resource = name, bytes = content.len(), "resource read");
        Ok(content)
    }
}

/// Read a fixture file from the crate's `resources/` directory
///
/// # Errors
///
/// See [`ResourceDir::read`].
pub fn read_resource(name: &str) -> E2eResult<Vec<u8>> {
    ResourceDir::default().read(name)
}

/// Deployment file entry for a scenario payload.
///
/// UTF-8 content goes in `content` as text; anything else is carried
/// base64-encoded in `contentBase64` so the bytes survive the JSON payload.
#[must_use]
pub fn file_payload(name: &str, content: Vec<u8>) -> Value {
    match String::from_utf8(content) {
        Ok(text) => json!({ "name": name, "content": text }),
        Err(err) => json!({ "name": name, "contentBase64": STANDARD.encode(err.as_bytes()) }),
    }
}
