//! Output formatting for the command line.
//!
//! Renders a [`QueryResult`] as an aligned text table or as a JSON array of
//! row objects.

use std::str::FromStr;

use serde_json::{Map, Value as JsonValue};

use crate::db::QueryResult;
use crate::error::{ReportError, Result};

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Aligned plain-text table.
    #[default]
    Table,
    /// JSON array with one object per row.
    Json,
}

impl FromStr for OutputFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" | "text" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(ReportError::validation(format!(
                "Unknown output format '{other}'. Expected 'table' or 'json'"
            ))),
        }
    }
}

/// Formats a result in the given format.
pub fn format_result(result: &QueryResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(format_table(result)),
        OutputFormat::Json => format_json(result),
    }
}

/// A single text cell is printed verbatim; XML documents rely on this.
fn single_text_cell(result: &QueryResult) -> Option<String> {
    match (result.columns.len(), result.rows.as_slice()) {
        (1, [row]) if result.columns[0].data_type == "text" => {
            row.first().map(|v| v.to_display_string())
        }
        _ => None,
    }
}

fn format_table(result: &QueryResult) -> String {
    if let Some(text) = single_text_cell(result) {
        return if text.ends_with('\n') { text } else { format!("{text}\n") };
    }
    if result.is_empty() {
        return "(no rows)\n".to_string();
    }

    let cells: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| row.iter().map(|v| v.to_display_string()).collect())
        .collect();

    let widths: Vec<usize> = result
        .columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(col.name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let render_line = |values: Vec<&str>| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{v:<w$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&render_line(result.column_names()));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.push('\n');
    for row in &cells {
        out.push_str(&render_line(row.iter().map(String::as_str).collect()));
        out.push('\n');
    }
    out.push_str(&format!(
        "({} row{})\n",
        result.row_count,
        if result.row_count == 1 { "" } else { "s" }
    ));
    out
}

fn format_json(result: &QueryResult) -> Result<String> {
    let rows: Vec<JsonValue> = result
        .rows
        .iter()
        .map(|row| {
            let mut object = Map::new();
            for (col, value) in result.columns.iter().zip(row) {
                let json = serde_json::to_value(value)
                    .map_err(|e| ReportError::internal(format!("Cannot encode value: {e}")))?;
                object.insert(col.name.clone(), json);
            }
            Ok(JsonValue::Object(object))
        })
        .collect::<Result<_>>()?;

    serde_json::to_string_pretty(&rows)
        .map(|s| s + "\n")
        .map_err(|e| ReportError::internal(format!("Cannot encode result: {e}")))
}
