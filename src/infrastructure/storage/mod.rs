//! Object store backends.

pub mod filesystem;
pub mod memory;
pub mod s3;

pub use filesystem::FilesystemObjectStore;
pub use memory::MemoryObjectStore;
pub use s3::{S3Config, S3ObjectStore};

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::StorageError;
use crate::domain::repositories::ObjectStore;

/// Which backend ingestion writes blobs to.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    S3(S3Config),
    Filesystem(PathBuf),
    Memory,
}

impl StorageConfig {
    pub fn build(self) -> Result<Arc<dyn ObjectStore>, StorageError> {
        Ok(match self {
            Self::S3(config) => Arc::new(S3ObjectStore::new(config)?),
            Self::Filesystem(root) => Arc::new(FilesystemObjectStore::new(root)),
            Self::Memory => Arc::new(MemoryObjectStore::new()),
        })
    }
}

/// Reject keys that could escape a storage root or address nothing.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key is empty".to_string()));
    }
    if key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(format!("{key}: must be a relative path")));
    }
    if key
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(StorageError::InvalidKey(format!(
            "{key}: contains an empty or relative segment"
        )));
    }
    Ok(())
}
