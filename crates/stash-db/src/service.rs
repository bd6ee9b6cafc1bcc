//! Service layer tying the entry database to the resource store.
//!
//! All repo methods are implemented as `impl StashService`.

use std::sync::Arc;

use object_store::local::LocalFileSystem;
use stash_config::StashConfig;

use crate::StashDb;
use crate::error::DatabaseError;
use crate::resources::{ObjectResourceStore, ResourceStore};

/// Entry database plus the store holding files referenced by entries.
pub struct StashService {
    db: StashDb,
    resources: Arc<dyn ResourceStore>,
}

impl StashService {
    /// Open the configured database and resource directory.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or the
    /// resource directory cannot be created.
    pub async fn from_config(config: &StashConfig) -> Result<Self, DatabaseError> {
        if let Some(parent) = std::path::Path::new(&config.database.path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| DatabaseError::Other(anyhow::anyhow!("create {}: {e}", parent.display())))?;
        }
        std::fs::create_dir_all(&config.resources.root).map_err(|e| {
            DatabaseError::Other(anyhow::anyhow!("create {}: {e}", config.resources.root))
        })?;

        let db = StashDb::open_local(&config.database.path).await?;
        let files = LocalFileSystem::new_with_prefix(&config.resources.root)
            .map_err(|e| DatabaseError::Other(e.into()))?;
        let resources = ObjectResourceStore::new(Arc::new(files), config.resources.public_base_url.clone());
        Ok(Self::new(db, Arc::new(resources)))
    }

    #[must_use]
    pub fn new(db: StashDb, resources: Arc<dyn ResourceStore>) -> Self {
        Self { db, resources }
    }

    /// In-memory database with an in-memory resource store (for testing).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn in_memory() -> Result<Self, DatabaseError> {
        let db = StashDb::open_local(":memory:").await?;
        let store = Arc::new(object_store::memory::InMemory::new());
        Ok(Self::new(db, Arc::new(ObjectResourceStore::new(store, "/_Resources/Persistent"))))
    }

    #[must_use]
    pub const fn db(&self) -> &StashDb {
        &self.db
    }

    #[must_use]
    pub fn resources(&self) -> &dyn ResourceStore {
        self.resources.as_ref()
    }
}
