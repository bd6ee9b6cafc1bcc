//! Storage of uploaded files referenced by entries.
//!
//! Files live in an [`ObjectStore`] under `<identifier>/<filename>`. Deleting
//! a file that is already gone reports [`ResourceError::NotFound`] so callers
//! can decide to ignore it.

use std::sync::Arc;

use async_trait::async_trait;
use object_store::{ObjectStore, PutPayload, path::Path};
use stash_core::entities::ResourceRef;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource store error: {0}")]
    Store(String),
}

/// Resource operations the entry store depends on.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn put(&self, resource: &ResourceRef, bytes: Vec<u8>) -> Result<(), ResourceError>;

    async fn delete(&self, resource: &ResourceRef) -> Result<(), ResourceError>;

    /// Public URI of an existing resource.
    async fn public_uri(&self, resource: &ResourceRef) -> Result<String, ResourceError>;
}

/// [`ResourceStore`] backed by any `object_store` implementation.
pub struct ObjectResourceStore {
    store: Arc<dyn ObjectStore>,
    public_base_url: String,
}

impl ObjectResourceStore {
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>, public_base_url: impl Into<String>) -> Self {
        Self {
            store,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn path(resource: &ResourceRef) -> Path {
        Path::from(resource.storage_key())
    }

    fn map_error(resource: &ResourceRef, error: object_store::Error) -> ResourceError {
        match error {
            object_store::Error::NotFound { .. } => ResourceError::NotFound(resource.identifier.clone()),
            other => ResourceError::Store(other.to_string()),
        }
    }
}

#[async_trait]
impl ResourceStore for ObjectResourceStore {
    async fn put(&self, resource: &ResourceRef, bytes: Vec<u8>) -> Result<(), ResourceError> {
        self.store
            .put(&Self::path(resource), PutPayload::from(bytes))
            .await
            .map_err(|e| Self::map_error(resource, e))?;
        Ok(())
    }

    async fn delete(&self, resource: &ResourceRef) -> Result<(), ResourceError> {
        let path = Self::path(resource);
        // Not every backend reports deleting a missing object.
        self.store
            .head(&path)
            .await
            .map_err(|e| Self::map_error(resource, e))?;
        self.store
            .delete(&path)
            .await
            .map_err(|e| Self::map_error(resource, e))
    }

    async fn public_uri(&self, resource: &ResourceRef) -> Result<String, ResourceError> {
        let path = Self::path(resource);
        self.store
            .head(&path)
            .await
            .map_err(|e| Self::map_error(resource, e))?;
        Ok(format!("{}/{}", self.public_base_url, path))
    }
}
