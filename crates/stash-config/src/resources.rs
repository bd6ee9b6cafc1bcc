//! Storage of uploaded files referenced by entries.

use serde::{Deserialize, Serialize};

fn default_root() -> String {
    ".formstash/resources".to_string()
}

fn default_public_base_url() -> String {
    "/_Resources/Persistent".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResourcesConfig {
    /// Directory holding resource files.
    #[serde(default = "default_root")]
    pub root: String,

    /// Prefix of public resource URIs in listings and exports.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            public_base_url: default_public_base_url(),
        }
    }
}
