//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for sandboxed files and env vars.

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;
use stash_config::{StashConfig, dimension_axes};

fn jailed(file: &str) -> Figment {
    Figment::from(Serialized::defaults(StashConfig::default()))
        .merge(Toml::file(file))
        .merge(Env::prefixed("FORMSTASH_").split("__"))
}

#[test]
fn loads_cleanup_rules_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[cleanup.newsletter]
interval = "P30D"
remove_files = true

[cleanup.contact]
dateInterval = "P1Y"
"#,
        )?;

        let config: StashConfig = jailed("config.toml").extract()?;

        assert_eq!(config.cleanup.len(), 2);
        assert_eq!(config.cleanup["newsletter"].interval, "P30D");
        assert!(config.cleanup["newsletter"].remove_files);
        assert_eq!(config.cleanup["contact"].interval, "P1Y");
        assert!(!config.cleanup["contact"].remove_files);
        Ok(())
    });
}

#[test]
fn env_overrides_cleanup_interval() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[cleanup.newsletter]
interval = "P30D"
"#,
        )?;
        jail.set_env("FORMSTASH_CLEANUP__NEWSLETTER__INTERVAL", "P7D");
        jail.set_env("FORMSTASH_DATABASE__PATH", "/tmp/stash.db");

        let config: StashConfig = jailed("config.toml").extract()?;

        assert_eq!(config.cleanup["newsletter"].interval, "P7D");
        assert_eq!(config.database.path, "/tmp/stash.db");
        Ok(())
    });
}

#[test]
fn extra_export_format_keeps_standard_ones() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[export]
datetime_format = "d.m.Y"
creator = "Marketing"

[export.formats.Tsv]
extension = "tsv"
mimeType = "text/tab-separated-values"
"#,
        )?;

        let config: StashConfig = jailed("config.toml").extract()?;
        let registry = config.export.registry();

        assert_eq!(config.export.datetime_format, "d.m.Y");
        assert_eq!(config.export.document_properties().creator, "Marketing");
        assert_eq!(registry.get("tsv").map(|f| f.extension.clone()).ok(), Some("tsv".into()));
        assert!(registry.get("Csv").is_ok());
        Ok(())
    });
}

#[test]
fn loads_forms_and_dimensions() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[node_types]
ignored_in_export = ["Form:Section"]

[dimensions.language]
default = "en"
presets.en.values = ["en"]
presets.de.values = ["de", "en"]

[[forms]]
bucket = "contact"
dimensions = { language = "de" }
elements = [
  { node_identifier = "8f0c", speaking_identifier = "email", label = "E-Mail", node_type = "Form:Text" },
]
"#,
        )?;

        let config: StashConfig = jailed("config.toml").extract()?;

        assert_eq!(config.node_types.ignored_in_export, vec!["Form:Section".to_string()]);
        assert!(config.node_types.ignored_in_finisher.is_empty());
        assert_eq!(config.forms.len(), 1);
        assert_eq!(config.forms[0].elements[0].label.as_deref(), Some("E-Mail"));

        let axes = dimension_axes(&config.dimensions);
        assert_eq!(axes.len(), 1);
        assert_eq!(axes[0].default, "en");
        assert_eq!(axes[0].presets.len(), 2);
        Ok(())
    });
}

#[test]
fn load_from_missing_file_is_invalid() {
    let result = StashConfig::load_from(std::path::Path::new("/definitely/not/here.toml"));
    assert!(matches!(
        result,
        Err(stash_config::ConfigError::InvalidValue { .. })
    ));
}
