//! Form definitions used to label exported fields.
//!
//! ```toml
//! [node_types]
//! ignored_in_export = ["Neos.Form.Builder:Section"]
//!
//! [dimensions.language]
//! default = "en"
//! presets.en.values = ["en"]
//! presets.de.values = ["de", "en"]
//!
//! [[forms]]
//! bucket = "contact"
//! dimensions = { language = "de" }
//! elements = [
//!   { node_identifier = "8f0c", speaking_identifier = "email", label = "E-Mail", node_type = "Neos.Form.Builder:SingleLineText" },
//! ]
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stash_core::dimensions::{DimensionAxis, DimensionPreset};
use stash_core::schema::{FieldSchemaEntry, StaticForm, StaticFormSource};

/// Element types left out when storing or exporting.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NodeTypesConfig {
    #[serde(default, alias = "nodeTypesIgnoredInFinisher")]
    pub ignored_in_finisher: Vec<String>,

    #[serde(default, alias = "nodeTypesIgnoredInExport")]
    pub ignored_in_export: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PresetConfig {
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DimensionConfig {
    #[serde(default)]
    pub default: String,

    #[serde(default)]
    pub presets: BTreeMap<String, PresetConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ElementConfig {
    pub node_identifier: String,
    #[serde(default)]
    pub speaking_identifier: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub node_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FormConfig {
    pub bucket: String,
    #[serde(default)]
    pub dimensions: BTreeMap<String, String>,
    #[serde(default)]
    pub elements: Vec<ElementConfig>,
}

/// Axes in name order, ready for combination building.
#[must_use]
pub fn dimension_axes(dimensions: &BTreeMap<String, DimensionConfig>) -> Vec<DimensionAxis> {
    dimensions
        .iter()
        .map(|(name, dimension)| DimensionAxis {
            name: name.clone(),
            default: dimension.default.clone(),
            presets: dimension
                .presets
                .iter()
                .map(|(preset, config)| DimensionPreset {
                    name: preset.clone(),
                    values: config.values.clone(),
                })
                .collect(),
        })
        .collect()
}

/// Static schema source over the configured forms.
#[must_use]
pub fn form_source(forms: &[FormConfig]) -> StaticFormSource {
    StaticFormSource::new(
        forms
            .iter()
            .map(|form| StaticForm {
                bucket: form.bucket.clone(),
                dimensions: form.dimensions.clone(),
                elements: form
                    .elements
                    .iter()
                    .map(|element| {
                        FieldSchemaEntry::new(
                            element.node_type.clone(),
                            element.node_identifier.clone(),
                            element.speaking_identifier.clone(),
                            element.label.clone(),
                        )
                    })
                    .collect(),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use stash_core::dimensions::combinations;
    use stash_core::schema::FormSchemaSource;

    use super::*;

    #[test]
    fn axes_follow_configured_presets() {
        let mut presets = BTreeMap::new();
        presets.insert("de".to_string(), PresetConfig { values: vec!["de".into()] });
        presets.insert("en".to_string(), PresetConfig { values: vec!["en".into()] });
        let dimensions = BTreeMap::from([(
            "language".to_string(),
            DimensionConfig {
                default: "en".into(),
                presets,
            },
        )]);

        let axes = dimension_axes(&dimensions);
        let all = combinations(&axes);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0][0].1.name, "en");
    }

    #[test]
    fn form_source_builds_display_labels() {
        let forms = vec![FormConfig {
            bucket: "contact".into(),
            dimensions: BTreeMap::new(),
            elements: vec![ElementConfig {
                node_identifier: "8f0c".into(),
                speaking_identifier: Some("email".into()),
                label: None,
                node_type: "Text".into(),
            }],
        }];
        let source = form_source(&forms);
        let found = source.forms_for("contact", &Vec::new());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0][0].display_label, "email");
    }
}
