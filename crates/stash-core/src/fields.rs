//! Column labels and cell values across schema-drifted entries.
//!
//! Entries of one bucket may have been written by different revisions of a
//! form. Labels are collected over every entry so removed or renamed fields
//! still get a column, and values are looked up under every key a field may
//! have been stored with.

use std::collections::HashSet;

use tracing::debug;

use crate::entities::{Entry, PropertyValue};
use crate::normalize::Normalizer;
use crate::schema::SchemaResolver;

/// Maps entry properties to display labels using a schema resolver.
pub struct FieldResolver<'a> {
    schema: &'a dyn SchemaResolver,
    ignored_in_export: &'a [String],
}

impl<'a> FieldResolver<'a> {
    /// `ignored_in_export` lists element type names that never become columns.
    #[must_use]
    pub fn new(schema: &'a dyn SchemaResolver, ignored_in_export: &'a [String]) -> Self {
        Self {
            schema,
            ignored_in_export,
        }
    }

    /// Ordered, de-duplicated labels over all `entries`, first seen first.
    ///
    /// Keys without a schema entry are used verbatim; keys whose element type
    /// is ignored in export contribute nothing.
    pub fn collect_labels<'e>(&self, entries: impl IntoIterator<Item = &'e Entry>) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut labels = Vec::new();
        for entry in entries {
            for key in entry.properties.keys() {
                let label = match self.schema.resolve(key) {
                    None => {
                        debug!(key, "no schema entry for field; using raw key");
                        key
                    }
                    Some(schema) if self.is_ignored(&schema.type_name) => continue,
                    Some(schema) => schema.display_label.as_str(),
                };
                if seen.insert(label.to_string()) {
                    labels.push(label.to_string());
                }
            }
        }
        labels
    }

    /// Whether fields of `type_name` are left out of exports.
    #[must_use]
    pub fn is_ignored(&self, type_name: &str) -> bool {
        self.ignored_in_export.iter().any(|ignored| ignored == type_name)
    }

    /// Raw value for `label` on `entry`.
    ///
    /// Tries the label as a key, then the resolved element's node identifier,
    /// then its speaking identifier.
    #[must_use]
    pub fn lookup<'e>(&self, entry: &'e Entry, label: &str) -> Option<&'e PropertyValue> {
        if let Some(value) = entry.properties.get(label) {
            return Some(value);
        }
        let schema = self.schema.resolve(label)?;
        entry
            .properties
            .get(&schema.node_identifier)
            .or_else(|| {
                schema
                    .speaking_identifier
                    .as_deref()
                    .and_then(|speaking| entry.properties.get(speaking))
            })
    }

    /// Stringified value for `label` on `entry`, empty if the entry lacks it.
    #[must_use]
    pub fn value_for_label(&self, entry: &Entry, label: &str, normalizer: &Normalizer<'_>) -> String {
        self.lookup(entry, label)
            .map(|value| normalizer.stringify(value, 0))
            .unwrap_or_default()
    }
}
