//! # stash-config
//!
//! Layered configuration loading for formstash using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`FORMSTASH_*` prefix, `__` as separator)
//! 2. Project-level `.formstash/config.toml`
//! 3. User-level `~/.config/formstash/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `FORMSTASH_DATABASE__PATH` -> `database.path`,
//! `FORMSTASH_CLEANUP__NEWSLETTER__INTERVAL` -> `cleanup.newsletter.interval`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use stash_config::StashConfig;
//!
//! let config = StashConfig::load().expect("config");
//! for (bucket, rule) in &config.cleanup {
//!     println!("{bucket}: keep {}", rule.interval);
//! }
//! ```

mod cleanup;
mod database;
mod error;
mod export;
mod forms;
mod resources;

pub use cleanup::CleanupRule;
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use export::{ExportConfig, FormatConfig};
pub use forms::{
    DimensionConfig, ElementConfig, FormConfig, NodeTypesConfig, PresetConfig, dimension_axes,
    form_source,
};
pub use resources::ResourcesConfig;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StashConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub resources: ResourcesConfig,
    /// Bucket name to retention rule.
    #[serde(default)]
    pub cleanup: BTreeMap<String, CleanupRule>,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub node_types: NodeTypesConfig,
    /// Content dimension axes by name.
    #[serde(default)]
    pub dimensions: BTreeMap<String, DimensionConfig>,
    #[serde(default)]
    pub forms: Vec<FormConfig>,
}

impl StashConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// `.env` files are not read here; the binary loads them first.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source cannot be read or extracted.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with an explicit TOML file layered above the
    /// discovered ones and below the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the file does not exist, or
    /// `ConfigError::Figment` if extraction fails.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::InvalidValue {
                field: "config".into(),
                reason: format!("file '{}' does not exist", path.display()),
            });
        }
        Self::base_figment()
            .merge(Toml::file(path))
            .merge(Self::env())
            .extract()
            .map_err(ConfigError::from)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        Self::base_figment().merge(Self::env())
    }

    fn base_figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(".formstash/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment
    }

    fn env() -> Env {
        Env::prefixed("FORMSTASH_").split("__")
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("formstash").join("config.toml"))
    }
}
