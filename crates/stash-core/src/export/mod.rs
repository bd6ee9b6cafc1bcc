//! Tabular export of a bucket.
//!
//! The registry of formats is injected (see `stash-config`'s `export.formats`)
//! rather than hardcoded, and the actual file writers sit behind the
//! [`TabularSink`] trait.

mod sink;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use sink::{BuiltinSink, TabularSink};

/// Errors from building or rendering an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The requested format is not in the registry.
    #[error("No writer available for type {0}")]
    UnsupportedFormat(String),

    /// The format is registered but the sink cannot produce it.
    #[error("Sink cannot write format {0}")]
    NoWriter(String),

    /// The sink failed while writing.
    #[error("Export write failed: {0}")]
    Write(String),
}

/// File extension and mime type of an export format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFormat {
    pub name: String,
    pub extension: String,
    pub mime_type: String,
}

impl ExportFormat {
    #[must_use]
    pub fn new(name: &str, extension: &str, mime_type: &str) -> Self {
        Self {
            name: name.to_string(),
            extension: extension.to_string(),
            mime_type: mime_type.to_string(),
        }
    }
}

/// The set of formats an export may be requested in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatRegistry {
    formats: Vec<ExportFormat>,
}

impl FormatRegistry {
    #[must_use]
    pub const fn new(formats: Vec<ExportFormat>) -> Self {
        Self { formats }
    }

    /// Spreadsheet, open-document, legacy spreadsheet, CSV and HTML.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            ExportFormat::new("Xls", "xls", "application/vnd.ms-excel"),
            ExportFormat::new(
                "Xlsx",
                "xlsx",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ),
            ExportFormat::new("Ods", "ods", "application/vnd.oasis.opendocument.spreadsheet"),
            ExportFormat::new("Csv", "csv", "text/csv"),
            ExportFormat::new("Html", "html", "text/html"),
        ])
    }

    /// Look up a format by name, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::UnsupportedFormat` if no format has that name.
    pub fn get(&self, name: &str) -> Result<&ExportFormat, ExportError> {
        self.formats
            .iter()
            .find(|format| format.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ExportError::UnsupportedFormat(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExportFormat> {
        self.formats.iter()
    }
}

/// Header row plus value rows, all cells already stringified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportTable {
    pub labels: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Document metadata handed to the sink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentProperties {
    pub creator: String,
    pub title: String,
    pub subject: String,
}

/// A rendered export ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Download filename for `bucket` in `format`.
#[must_use]
pub fn export_filename(bucket: &str, format: &ExportFormat) -> String {
    format!("Database-Storage-{bucket}.{}", format.extension)
}

/// Render `table` for `bucket` in the format named `format_name`.
///
/// # Errors
///
/// Returns `ExportError::UnsupportedFormat` for unknown formats, or whatever
/// the sink reports.
pub fn render_document(
    bucket: &str,
    table: &ExportTable,
    format_name: &str,
    registry: &FormatRegistry,
    sink: &dyn TabularSink,
    properties: &DocumentProperties,
) -> Result<ExportDocument, ExportError> {
    let format = registry.get(format_name)?;
    let bytes = sink.write(format, properties, table)?;
    Ok(ExportDocument {
        filename: export_filename(bucket, format),
        content_type: format.mime_type.clone(),
        bytes,
    })
}
