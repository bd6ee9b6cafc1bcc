//! Best-effort form schema resolution.
//!
//! A stored field may be keyed by the form element's internal node id, its
//! speaking identifier or its display label, depending on when the entry was
//! written. Resolution matches all three, in that order, by linear scan over
//! the elements of the one form owning a bucket. Forms that were removed, are
//! ambiguous or never existed simply resolve to nothing.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::Serialize;
use tracing::debug;

use crate::dimensions::DimensionCombination;

/// Metadata describing one form element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSchemaEntry {
    pub type_name: String,
    pub node_identifier: String,
    pub speaking_identifier: Option<String>,
    pub label: Option<String>,
    pub display_label: String,
}

impl FieldSchemaEntry {
    /// Build an entry; the display label is the label, else the speaking
    /// identifier, else the node identifier. Empty strings count as absent.
    #[must_use]
    pub fn new(
        type_name: impl Into<String>,
        node_identifier: impl Into<String>,
        speaking_identifier: Option<String>,
        label: Option<String>,
    ) -> Self {
        let node_identifier = node_identifier.into();
        let speaking_identifier = speaking_identifier.filter(|s| !s.is_empty());
        let label = label.filter(|s| !s.is_empty());
        let display_label = label
            .clone()
            .or_else(|| speaking_identifier.clone())
            .unwrap_or_else(|| node_identifier.clone());
        Self {
            type_name: type_name.into(),
            node_identifier,
            speaking_identifier,
            label,
            display_label,
        }
    }

    fn matches(&self, key: &str) -> bool {
        self.node_identifier == key
            || self.speaking_identifier.as_deref() == Some(key)
            || self.display_label == key
    }
}

/// Lookup from a field key to its schema entry within one bucket.
pub trait SchemaResolver {
    fn resolve(&self, key: &str) -> Option<&FieldSchemaEntry>;
}

/// Resolver for buckets without any form definition.
pub struct NoSchema;

impl SchemaResolver for NoSchema {
    fn resolve(&self, _key: &str) -> Option<&FieldSchemaEntry> {
        None
    }
}

/// Source of form definitions, e.g. a content tree or static configuration.
pub trait FormSchemaSource {
    /// Element lists of every form owning `bucket` under `combination`.
    fn forms_for(&self, bucket: &str, combination: &DimensionCombination) -> Vec<Vec<FieldSchemaEntry>>;
}

/// Resolver walking dimension combinations until exactly one form owns the
/// bucket. The first resolved mapping is kept for the resolver's lifetime.
pub struct BestEffortSchemaResolver<'a, S: FormSchemaSource + ?Sized> {
    source: &'a S,
    bucket: String,
    combinations: Vec<DimensionCombination>,
    mapping: OnceLock<Option<Vec<FieldSchemaEntry>>>,
}

impl<'a, S: FormSchemaSource + ?Sized> BestEffortSchemaResolver<'a, S> {
    #[must_use]
    pub fn new(source: &'a S, bucket: impl Into<String>, combinations: Vec<DimensionCombination>) -> Self {
        Self {
            source,
            bucket: bucket.into(),
            combinations,
            mapping: OnceLock::new(),
        }
    }

    /// The resolved element list, if any form could be found.
    pub fn elements(&self) -> Option<&[FieldSchemaEntry]> {
        self.mapping.get_or_init(|| self.load()).as_deref()
    }

    fn load(&self) -> Option<Vec<FieldSchemaEntry>> {
        for combination in &self.combinations {
            let mut owners = self.source.forms_for(&self.bucket, combination);
            if owners.len() != 1 {
                debug!(
                    bucket = %self.bucket,
                    owners = owners.len(),
                    "no unique form for dimension combination"
                );
                continue;
            }
            let elements = owners.remove(0);
            if elements.is_empty() {
                debug!(bucket = %self.bucket, "form owning bucket has no elements");
                continue;
            }
            return Some(elements);
        }
        None
    }
}

impl<S: FormSchemaSource + ?Sized> SchemaResolver for BestEffortSchemaResolver<'_, S> {
    fn resolve(&self, key: &str) -> Option<&FieldSchemaEntry> {
        self.elements()?.iter().find(|element| element.matches(key))
    }
}

/// A form definition held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticForm {
    pub bucket: String,
    /// Axis name to preset name. Axes not listed match any preset.
    pub dimensions: BTreeMap<String, String>,
    pub elements: Vec<FieldSchemaEntry>,
}

/// [`FormSchemaSource`] over a fixed list of forms.
#[derive(Debug, Clone, Default)]
pub struct StaticFormSource {
    forms: Vec<StaticForm>,
}

impl StaticFormSource {
    #[must_use]
    pub const fn new(forms: Vec<StaticForm>) -> Self {
        Self { forms }
    }
}

impl FormSchemaSource for StaticFormSource {
    fn forms_for(&self, bucket: &str, combination: &DimensionCombination) -> Vec<Vec<FieldSchemaEntry>> {
        self.forms
            .iter()
            .filter(|form| form.bucket == bucket)
            .filter(|form| {
                form.dimensions.iter().all(|(axis, wanted)| {
                    combination
                        .iter()
                        .find(|(name, _)| name == axis)
                        .is_none_or(|(_, preset)| preset.name == *wanted)
                })
            })
            .map(|form| form.elements.clone())
            .collect()
    }
}
