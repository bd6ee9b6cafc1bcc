//! Resource import and public URI lookup for entries.

use std::collections::HashMap;

use stash_core::entities::{Entry, ResourceRef};
use tracing::{debug, warn};

use crate::PREFIX_RESOURCE;
use crate::error::DatabaseError;
use crate::resources::ResourceError;
use crate::service::StashService;

impl StashService {
    /// Store an uploaded file and return the reference to put into an entry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Resource` if the file cannot be written.
    pub async fn import_resource(
        &self,
        filename: &str,
        media_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<ResourceRef, DatabaseError> {
        let identifier = self.db().generate_id(PREFIX_RESOURCE).await?;
        let mut resource = ResourceRef::new(identifier).with_filename(filename);
        resource.media_type = media_type.map(String::from);
        self.resources().put(&resource, bytes).await?;
        debug!(resource = %resource.identifier, filename, "imported resource");
        Ok(resource)
    }

    /// Public URIs of every resource referenced by `entries`, keyed by
    /// identifier. Resources that no longer exist are left out.
    pub async fn resource_uris<'e>(&self, entries: impl IntoIterator<Item = &'e Entry>) -> HashMap<String, String> {
        let mut uris = HashMap::new();
        for entry in entries {
            for resource in entry.resources() {
                if uris.contains_key(&resource.identifier) {
                    continue;
                }
                match self.resources().public_uri(resource).await {
                    Ok(uri) => {
                        uris.insert(resource.identifier.clone(), uri);
                    }
                    Err(ResourceError::NotFound(identifier)) => {
                        debug!(id = %entry.id, resource = %identifier, "resource no longer exists");
                    }
                    Err(error) => {
                        warn!(id = %entry.id, resource = %resource.identifier, %error, "resource lookup failed");
                    }
                }
            }
        }
        uris
    }
}
