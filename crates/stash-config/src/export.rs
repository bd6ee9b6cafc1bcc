//! Export and listing settings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stash_core::export::{DocumentProperties, ExportFormat, FormatRegistry};

fn default_datetime_format() -> String {
    "Y-m-d H:i:s".to_string()
}

fn default_format() -> String {
    "Csv".to_string()
}

fn default_title() -> String {
    "Database Storage".to_string()
}

fn default_formats() -> BTreeMap<String, FormatConfig> {
    FormatRegistry::standard()
        .iter()
        .map(|format| {
            (
                format.name.clone(),
                FormatConfig {
                    extension: format.extension.clone(),
                    mime_type: format.mime_type.clone(),
                },
            )
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FormatConfig {
    pub extension: String,
    #[serde(alias = "mimeType")]
    pub mime_type: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    /// PHP-style format for dates in listings and exports.
    #[serde(default = "default_datetime_format", alias = "datetimeFormat")]
    pub datetime_format: String,

    /// Format used when none is requested.
    #[serde(default = "default_format")]
    pub default_format: String,

    #[serde(default)]
    pub creator: String,

    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default)]
    pub subject: String,

    /// Format name to extension and mime type.
    #[serde(default = "default_formats")]
    pub formats: BTreeMap<String, FormatConfig>,
}

impl ExportConfig {
    /// The configured formats as a registry.
    #[must_use]
    pub fn registry(&self) -> FormatRegistry {
        FormatRegistry::new(
            self.formats
                .iter()
                .map(|(name, format)| ExportFormat::new(name, &format.extension, &format.mime_type))
                .collect(),
        )
    }

    #[must_use]
    pub fn document_properties(&self) -> DocumentProperties {
        DocumentProperties {
            creator: self.creator.clone(),
            title: self.title.clone(),
            subject: self.subject.clone(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            datetime_format: default_datetime_format(),
            default_format: default_format(),
            creator: String::new(),
            title: default_title(),
            subject: String::new(),
            formats: default_formats(),
        }
    }
}
