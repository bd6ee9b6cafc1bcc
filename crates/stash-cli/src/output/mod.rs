use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_value_table(&serde_json::to_value(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

/// Print `value` as json/raw, or the given rows as a table.
pub fn output_rows<T: Serialize>(
    value: &T,
    headers: &[String],
    rows: &[Vec<String>],
    format: OutputFormat,
) -> anyhow::Result<()> {
    if format == OutputFormat::Table {
        if rows.is_empty() {
            println!("(no rows)");
        } else {
            println!("{}", table::render_table(headers, rows, table::TableOptions::from_env()));
        }
        return Ok(());
    }
    output(value, format)
}

fn render_value_table(value: &Value) -> anyhow::Result<String> {
    let options = table::TableOptions::from_env();
    match value {
        Value::Array(items) => Ok(render_array_table(items, options)),
        Value::Object(map) => {
            let rows = map
                .iter()
                .map(|(key, value)| vec![key.clone(), value_to_cell(value)])
                .collect::<Vec<_>>();
            Ok(table::render_table(&["key", "value"], &rows, options))
        }
        scalar => Ok(value_to_cell(scalar)),
    }
}

/// Objects become rows, one column per key seen in any of them.
fn render_array_table(items: &[Value], options: table::TableOptions) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }
    if !items.iter().all(Value::is_object) {
        let rows = items.iter().map(|item| vec![value_to_cell(item)]).collect::<Vec<_>>();
        return table::render_table(&["value"], &rows, options);
    }

    let mut headers = Vec::<String>::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|header| map.get(header).map_or_else(|| String::from("-"), value_to_cell))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    table::render_table(&headers, &rows, options)
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}
