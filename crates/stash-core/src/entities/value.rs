//! The tagged union of values a submission can hold.
//!
//! Stored as plain JSON. Scalars map onto their JSON counterparts; resource
//! references are recognised by their exact shape (`{"__resource": ...}`),
//! date descriptors by carrying both `date` and `dateFormat` strings. Any
//! other object becomes a nested [`Properties`] map.

use serde::{Deserialize, Serialize};

use super::Properties;

/// Reference to an uploaded file kept in the resource store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceRef {
    #[serde(rename = "__resource")]
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, rename = "mediaType", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

impl ResourceRef {
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            filename: None,
            media_type: None,
        }
    }

    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Object store key: the identifier, followed by the filename when known.
    #[must_use]
    pub fn storage_key(&self) -> String {
        match &self.filename {
            Some(filename) => format!("{}/{filename}", self.identifier),
            None => self.identifier.clone(),
        }
    }
}

/// A date as submitted by a date picker: the raw value plus the PHP-style
/// format it was entered in and an optional timezone name. Other keys the
/// picker stores alongside (`timezone_type`) are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateDescriptor {
    pub date: String,
    #[serde(rename = "dateFormat")]
    pub date_format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// A single stored value. Variant order matters for deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Resource(ResourceRef),
    Date(DateDescriptor),
    List(Vec<PropertyValue>),
    Map(Properties),
}

impl PropertyValue {
    pub(crate) fn collect_resources<'a>(&'a self, out: &mut Vec<&'a ResourceRef>) {
        match self {
            Self::Resource(resource) => out.push(resource),
            Self::List(items) => {
                for item in items {
                    item.collect_resources(out);
                }
            }
            Self::Map(map) => {
                for item in map.values() {
                    item.collect_resources(out);
                }
            }
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::String(_) | Self::Date(_) => {}
        }
    }

    /// All resource references in this value, depth first.
    #[must_use]
    pub fn resources(&self) -> Vec<&ResourceRef> {
        let mut found = Vec::new();
        self.collect_resources(&mut found);
        found
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}
