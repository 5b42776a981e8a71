use async_trait::async_trait;
use bytes::Bytes;

use super::{RepositoryError, StorageError};
use crate::domain::pngs::{NewPng, Png, PngSummary};

#[async_trait]
pub trait PngRepository: Send + Sync {
    /// Fails with `RepositoryError::Conflict` when the slug is already taken.
    async fn insert(&self, png: NewPng) -> Result<Png, RepositoryError>;
    async fn get_by_slug(&self, slug: &str) -> Result<Png, RepositoryError>;
    /// Newest first, matching `search` against title or tags when given.
    async fn list(&self, search: Option<&str>, limit: u32)
    -> Result<Vec<PngSummary>, RepositoryError>;
    /// Every record, oldest first.
    async fn list_all(&self) -> Result<Vec<Png>, RepositoryError>;
    /// Increment the download counter and return the updated record.
    async fn record_download(&self, slug: &str) -> Result<Png, RepositoryError>;
}

/// Key/value blob storage with overwrite semantics.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StorageError>;
    async fn get(&self, key: &str) -> Result<Bytes, StorageError>;
    fn backend_name(&self) -> &'static str;
}
