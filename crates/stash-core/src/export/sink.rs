//! Built-in writers for text-based formats.

use super::{DocumentProperties, ExportError, ExportFormat, ExportTable};

/// Produces the bytes of an export document.
pub trait TabularSink {
    /// # Errors
    ///
    /// Returns `ExportError::NoWriter` if this sink cannot produce `format`.
    fn write(
        &self,
        format: &ExportFormat,
        properties: &DocumentProperties,
        table: &ExportTable,
    ) -> Result<Vec<u8>, ExportError>;
}

/// Writes CSV and HTML; spreadsheet formats need an external sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSink;

impl TabularSink for BuiltinSink {
    fn write(
        &self,
        format: &ExportFormat,
        properties: &DocumentProperties,
        table: &ExportTable,
    ) -> Result<Vec<u8>, ExportError> {
        match format.extension.as_str() {
            "csv" => write_csv(table),
            "html" | "htm" => Ok(write_html(properties, table).into_bytes()),
            _ => Err(ExportError::NoWriter(format.name.clone())),
        }
    }
}

fn write_csv(table: &ExportTable) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    writer
        .write_record(&table.labels)
        .map_err(|e| ExportError::Write(e.to_string()))?;
    for row in &table.rows {
        writer
            .write_record(row)
            .map_err(|e| ExportError::Write(e.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Write(e.to_string()))
}

fn write_html(properties: &DocumentProperties, table: &ExportTable) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    if !properties.creator.is_empty() {
        html.push_str(&format!("<meta name=\"author\" content=\"{}\">\n", escape(&properties.creator)));
    }
    if !properties.subject.is_empty() {
        html.push_str(&format!("<meta name=\"description\" content=\"{}\">\n", escape(&properties.subject)));
    }
    html.push_str(&format!("<title>{}</title>\n", escape(&properties.title)));
    html.push_str("</head>\n<body>\n<table>\n<thead><tr>\n");
    for label in &table.labels {
        html.push_str(&format!("<th>{}</th>\n", escape(label)));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", render_cell(cell)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}

/// Escape a cell and link it when the whole value is an http(s) URI.
fn render_cell(value: &str) -> String {
    let escaped = escape(value).replace("\r\n", "<br>");
    if is_http_uri(value) {
        format!("<a href=\"{escaped}\" target=\"_blank\" rel=\"noopener noreferrer\">{escaped}</a>")
    } else {
        escaped
    }
}

fn is_http_uri(value: &str) -> bool {
    let rest = value
        .strip_prefix("http://")
        .or_else(|| value.strip_prefix("https://"));
    rest.is_some_and(|rest| {
        let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
        !host.is_empty() && !value.chars().any(char::is_whitespace)
    })
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
