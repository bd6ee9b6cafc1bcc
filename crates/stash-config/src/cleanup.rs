//! Per-bucket retention rules.
//!
//! ```toml
//! [cleanup.newsletter]
//! interval = "P30D"
//! remove_files = false
//! ```
//!
//! The interval is kept as written; it is parsed when the cleanup for that
//! bucket runs so one malformed rule cannot block the others.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CleanupRule {
    /// ISO 8601 calendar interval, e.g. `P1Y2M3D`.
    #[serde(default, alias = "dateInterval")]
    pub interval: String,

    /// Also delete uploaded files referenced by removed entries.
    #[serde(default, alias = "removeFiles")]
    pub remove_files: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_files() {
        let rule = CleanupRule::default();
        assert!(rule.interval.is_empty());
        assert!(!rule.remove_files);
    }
}
