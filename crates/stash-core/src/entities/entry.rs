use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Properties, ResourceRef};

/// One stored submission. Created once, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub id: String,
    pub bucket: String,
    pub properties: Properties,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// Every resource reference held by this entry, nested values included.
    #[must_use]
    pub fn resources(&self) -> Vec<&ResourceRef> {
        let mut found = Vec::new();
        for (_, value) in self.properties.iter() {
            value.collect_resources(&mut found);
        }
        found
    }
}
