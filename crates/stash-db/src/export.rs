//! Listing and export of a bucket as a table.
//!
//! Both views collect column labels over every entry of the bucket, then look
//! each label up per entry. They differ in the empty-cell sentinel (`-` in
//! listings, empty in exports) and in the export's optional `DateTime` column.

use serde::Serialize;
use stash_config::{StashConfig, dimension_axes, form_source};
use stash_core::dimensions::{DimensionCombination, combinations};
use stash_core::entities::Entry;
use stash_core::export::{
    DocumentProperties, ExportDocument, ExportTable, FormatRegistry, TabularSink, render_document,
};
use stash_core::fields::FieldResolver;
use stash_core::normalize::Normalizer;
use stash_core::php_date;
use stash_core::schema::{BestEffortSchemaResolver, FormSchemaSource, StaticFormSource};
use tracing::info;

use crate::error::DatabaseError;
use crate::service::StashService;

/// Label of the creation time column added to exports on request.
pub const DATETIME_LABEL: &str = "DateTime";

/// Sentinel for cells without a value in listings.
pub const EMPTY_CELL: &str = "-";

/// Everything needed to turn stored keys into labelled cells.
pub struct FieldSettings {
    pub schema: Box<dyn FormSchemaSource + Send + Sync>,
    pub combinations: Vec<DimensionCombination>,
    pub ignored_in_finisher: Vec<String>,
    pub ignored_in_export: Vec<String>,
    /// PHP-style output format for dates.
    pub datetime_format: String,
}

impl FieldSettings {
    #[must_use]
    pub fn from_config(config: &StashConfig) -> Self {
        Self {
            schema: Box::new(form_source(&config.forms)),
            combinations: combinations(&dimension_axes(&config.dimensions)),
            ignored_in_finisher: config.node_types.ignored_in_finisher.clone(),
            ignored_in_export: config.node_types.ignored_in_export.clone(),
            datetime_format: config.export.datetime_format.clone(),
        }
    }

    #[must_use]
    pub fn with_source(
        source: impl FormSchemaSource + Send + Sync + 'static,
        combinations: Vec<DimensionCombination>,
        datetime_format: &str,
    ) -> Self {
        Self {
            schema: Box::new(source),
            combinations: if combinations.is_empty() { vec![Vec::new()] } else { combinations },
            ignored_in_finisher: Vec::new(),
            ignored_in_export: Vec::new(),
            datetime_format: datetime_format.to_string(),
        }
    }

    /// Settings where no bucket has a form definition.
    #[must_use]
    pub fn without_schema(datetime_format: &str) -> Self {
        Self::with_source(StaticFormSource::default(), Vec::new(), datetime_format)
    }

    /// A fresh schema resolver for `bucket`.
    #[must_use]
    pub fn resolver(&self, bucket: &str) -> BestEffortSchemaResolver<'_, dyn FormSchemaSource + Send + Sync> {
        BestEffortSchemaResolver::new(self.schema.as_ref(), bucket, self.combinations.clone())
    }
}

/// One entry as shown in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingRow {
    pub id: String,
    pub created_at: String,
    pub values: Vec<String>,
}

/// A bucket's entries under a common set of labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketListing {
    pub bucket: String,
    pub labels: Vec<String>,
    pub rows: Vec<ListingRow>,
}

impl StashService {
    /// All entries of `bucket`, newest first, with labelled values.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the entries cannot be loaded.
    pub async fn show_bucket(&self, bucket: &str, settings: &FieldSettings) -> Result<BucketListing, DatabaseError> {
        let entries = self.list_entries(bucket).await?;
        let uris = self.resource_uris(&entries).await;
        let resolver = settings.resolver(bucket);
        let fields = FieldResolver::new(&resolver, &settings.ignored_in_export);
        let normalizer = Normalizer::new(&uris, &settings.datetime_format);

        let labels = fields.collect_labels(&entries);
        let rows = entries
            .iter()
            .map(|entry| ListingRow {
                id: entry.id.clone(),
                created_at: php_date::format(&entry.created_at, &settings.datetime_format),
                values: labels
                    .iter()
                    .map(|label| {
                        fields
                            .lookup(entry, label)
                            .map_or_else(|| EMPTY_CELL.to_string(), |value| normalizer.stringify(value, 0))
                    })
                    .collect(),
            })
            .collect();

        Ok(BucketListing {
            bucket: bucket.to_string(),
            labels,
            rows,
        })
    }

    /// The export table of `bucket`, optionally with a trailing `DateTime`
    /// column holding each entry's creation time.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the entries cannot be loaded.
    pub async fn export_table(
        &self,
        bucket: &str,
        settings: &FieldSettings,
        include_datetime: bool,
    ) -> Result<ExportTable, DatabaseError> {
        let entries = self.list_entries(bucket).await?;
        Ok(self.build_table(bucket, &entries, settings, include_datetime).await)
    }

    /// Render `bucket` as a downloadable document in `format_name`.
    ///
    /// The format is checked before storage is touched.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Export` for unknown formats or sink failures,
    /// and other `DatabaseError`s if the entries cannot be loaded.
    #[allow(clippy::too_many_arguments)]
    pub async fn export_bucket(
        &self,
        bucket: &str,
        format_name: &str,
        include_datetime: bool,
        settings: &FieldSettings,
        registry: &FormatRegistry,
        sink: &(dyn TabularSink + Sync),
        properties: &DocumentProperties,
    ) -> Result<ExportDocument, DatabaseError> {
        registry.get(format_name)?;
        let table = self.export_table(bucket, settings, include_datetime).await?;
        let document = render_document(bucket, &table, format_name, registry, sink, properties)?;
        info!(
            bucket,
            format = format_name,
            rows = table.rows.len(),
            bytes = document.bytes.len(),
            "exported bucket"
        );
        Ok(document)
    }

    async fn build_table(
        &self,
        bucket: &str,
        entries: &[Entry],
        settings: &FieldSettings,
        include_datetime: bool,
    ) -> ExportTable {
        let uris = self.resource_uris(entries).await;
        let resolver = settings.resolver(bucket);
        let fields = FieldResolver::new(&resolver, &settings.ignored_in_export);
        let normalizer = Normalizer::new(&uris, &settings.datetime_format);

        let mut labels = fields.collect_labels(entries);
        let rows = entries
            .iter()
            .map(|entry| {
                let mut row: Vec<String> = labels
                    .iter()
                    .map(|label| fields.value_for_label(entry, label, &normalizer))
                    .collect();
                if include_datetime {
                    row.push(php_date::format(&entry.created_at, &settings.datetime_format));
                }
                row
            })
            .collect();
        if include_datetime {
            labels.push(DATETIME_LABEL.to_string());
        }
        ExportTable { labels, rows }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use stash_core::entities::{Properties, PropertyValue, ResourceRef};
    use stash_core::export::{BuiltinSink, ExportError};
    use stash_core::schema::{FieldSchemaEntry, StaticForm};

    use super::*;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs.iter().map(|(k, v)| (*k, PropertyValue::from(*v))).collect()
    }

    async fn seeded() -> StashService {
        let svc = StashService::in_memory().await.unwrap();
        svc.insert_entry(
            "contact",
            props(&[("x", "1"), ("y", "2")]),
            Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
        )
        .await
        .unwrap();
        svc.insert_entry(
            "contact",
            props(&[("y", "3"), ("z", "4")]),
            Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap(),
        )
        .await
        .unwrap();
        svc
    }

    #[tokio::test]
    async fn listing_uses_dash_for_missing_values() {
        let svc = seeded().await;
        let listing = svc
            .show_bucket("contact", &FieldSettings::without_schema("Y-m-d H:i"))
            .await
            .unwrap();

        // Newest entry first, so its keys come first.
        assert_eq!(listing.labels, vec!["y", "z", "x"]);
        assert_eq!(listing.rows[0].created_at, "2024-01-02 09:30");
        assert_eq!(listing.rows[0].values, vec!["3", "4", "-"]);
        assert_eq!(listing.rows[1].values, vec!["2", "-", "1"]);
    }

    #[tokio::test]
    async fn listing_keeps_stored_empty_strings() {
        let svc = StashService::in_memory().await.unwrap();
        svc.insert_entry("contact", props(&[("name", "Ada"), ("note", "")]), Utc::now())
            .await
            .unwrap();
        svc.insert_entry("contact", props(&[("name", "Bob")]), Utc::now() - chrono::Duration::hours(1))
            .await
            .unwrap();

        let listing = svc
            .show_bucket("contact", &FieldSettings::without_schema("Y-m-d"))
            .await
            .unwrap();
        assert_eq!(listing.labels, vec!["name", "note"]);
        assert_eq!(listing.rows[0].values, vec!["Ada", ""]);
        assert_eq!(listing.rows[1].values, vec!["Bob", "-"]);
    }

    #[tokio::test]
    async fn export_table_appends_datetime_column() {
        let svc = seeded().await;
        let table = svc
            .export_table("contact", &FieldSettings::without_schema("d.m.Y"), true)
            .await
            .unwrap();

        assert_eq!(table.labels, vec!["y", "z", "x", "DateTime"]);
        assert_eq!(table.rows[0], vec!["3", "4", "", "02.01.2024"]);
        assert_eq!(table.rows[1], vec!["2", "", "1", "01.01.2024"]);
    }

    #[tokio::test]
    async fn export_uses_schema_labels_and_skips_ignored_types() {
        let svc = StashService::in_memory().await.unwrap();
        svc.insert_entry(
            "contact",
            props(&[("n1", "Ada"), ("section", "")]),
            Utc::now(),
        )
        .await
        .unwrap();
        let source = StaticFormSource::new(vec![StaticForm {
            bucket: "contact".into(),
            dimensions: std::collections::BTreeMap::new(),
            elements: vec![
                FieldSchemaEntry::new("Form:Text", "n1", Some("name".into()), Some("Your name".into())),
                FieldSchemaEntry::new("Form:Section", "section", None, None),
            ],
        }]);
        let mut settings = FieldSettings::with_source(source, Vec::new(), "Y-m-d");
        settings.ignored_in_export = vec!["Form:Section".into()];

        let table = svc.export_table("contact", &settings, false).await.unwrap();
        assert_eq!(table.labels, vec!["Your name"]);
        assert_eq!(table.rows, vec![vec!["Ada".to_string()]]);
    }

    #[tokio::test]
    async fn export_resolves_resource_uris() {
        let svc = StashService::in_memory().await.unwrap();
        let stored = svc.import_resource("cv.pdf", None, b"%PDF".to_vec()).await.unwrap();
        let mut values = Properties::new();
        values.insert("cv", PropertyValue::Resource(stored.clone()));
        values.insert("old", PropertyValue::Resource(ResourceRef::new("res-gone")));
        svc.insert_entry("jobs", values, Utc::now()).await.unwrap();

        let table = svc
            .export_table("jobs", &FieldSettings::without_schema("Y-m-d"), false)
            .await
            .unwrap();
        assert_eq!(
            table.rows[0],
            vec![format!("/_Resources/Persistent/{}/cv.pdf", stored.identifier), String::new()]
        );
    }

    #[tokio::test]
    async fn unknown_format_fails_before_loading() {
        let svc = seeded().await;
        let result = svc
            .export_bucket(
                "contact",
                "Pdf",
                false,
                &FieldSettings::without_schema("Y-m-d"),
                &FormatRegistry::standard(),
                &BuiltinSink,
                &DocumentProperties::default(),
            )
            .await;
        assert!(matches!(
            result,
            Err(DatabaseError::Export(ExportError::UnsupportedFormat(name))) if name == "Pdf"
        ));
    }

    #[tokio::test]
    async fn csv_export_document() {
        let svc = seeded().await;
        let document = svc
            .export_bucket(
                "contact",
                "csv",
                false,
                &FieldSettings::without_schema("Y-m-d"),
                &FormatRegistry::standard(),
                &BuiltinSink,
                &DocumentProperties::default(),
            )
            .await
            .unwrap();
        assert_eq!(document.filename, "Database-Storage-contact.csv");
        assert_eq!(String::from_utf8(document.bytes).unwrap(), "y,z,x\n3,4,\n2,,1\n");
    }

    #[tokio::test]
    async fn default_configuration_exports_with_builtin_sink() {
        let svc = seeded().await;
        let config = StashConfig::default();
        let document = svc
            .export_bucket(
                "contact",
                &config.export.default_format,
                true,
                &FieldSettings::from_config(&config),
                &config.export.registry(),
                &BuiltinSink,
                &config.export.document_properties(),
            )
            .await
            .unwrap();
        assert_eq!(document.filename, "Database-Storage-contact.csv");
        assert_eq!(document.content_type, "text/csv");
        assert!(String::from_utf8(document.bytes).unwrap().starts_with("y,z,x,DateTime\n"));
    }
}
