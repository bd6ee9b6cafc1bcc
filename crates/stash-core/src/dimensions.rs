//! Content-dimension combinations.
//!
//! A site can be localized along several axes (language, country, ...). Form
//! definitions are looked up per combination of one preset from every axis,
//! so the lookup needs the full cartesian product, default presets first.

use serde::Serialize;

/// One preset of an axis: the fallback chain of dimension values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionPreset {
    pub name: String,
    pub values: Vec<String>,
}

/// A configured axis with its default preset name and all presets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionAxis {
    pub name: String,
    pub default: String,
    pub presets: Vec<DimensionPreset>,
}

impl DimensionAxis {
    /// Presets with the default preset moved to the front.
    ///
    /// If the default names no preset, the configured order is kept.
    #[must_use]
    pub fn ordered_presets(&self) -> Vec<DimensionPreset> {
        let mut ordered = Vec::with_capacity(self.presets.len());
        if let Some(default) = self.presets.iter().find(|p| p.name == self.default) {
            ordered.push(default.clone());
        }
        ordered.extend(
            self.presets
                .iter()
                .filter(|p| p.name != self.default)
                .cloned(),
        );
        ordered
    }
}

/// One preset chosen per axis, in axis order.
pub type DimensionCombination = Vec<(String, DimensionPreset)>;

/// All combinations of presets across `axes`.
///
/// The first combination uses every axis' default preset; the last axis
/// varies fastest. With no axes there is exactly one, empty, combination.
/// An axis without presets yields no combinations at all.
#[must_use]
pub fn combinations(axes: &[DimensionAxis]) -> Vec<DimensionCombination> {
    let mut result: Vec<DimensionCombination> = vec![Vec::new()];
    for axis in axes {
        let presets = axis.ordered_presets();
        let mut next = Vec::with_capacity(result.len() * presets.len());
        for partial in &result {
            for preset in &presets {
                let mut combination = partial.clone();
                combination.push((axis.name.clone(), preset.clone()));
                next.push(combination);
            }
        }
        result = next;
    }
    result
}
