//! Convert any [`QueryResult`] into one markdown string.
//!
//! Pure functions: the same input always renders byte-for-byte the same
//! output, so the agent can relay it verbatim.

use serde_json::Value;

use super::format::{format_cell, ColumnKind, NULL_TOKEN};
use super::types::{QueryResult, TabularResult};

/// Rendered for error results and anything that cannot be recognized.
pub const NO_DATA: &str = "No data available.\n\n";

/// Render a result as markdown.
pub fn normalize(result: &QueryResult) -> String {
    match result {
        QueryResult::Tabular(table) => render_tabular(table),
        QueryResult::AttachmentText { content } | QueryResult::PlainMessage { content } => {
            format!("{content}\n\n")
        }
        QueryResult::Error { .. } => NO_DATA.to_string(),
    }
}

/// Render a loosely-typed answer, falling back to [`NO_DATA`] when the
/// layout is not one of the known shapes.
pub fn normalize_value(value: &Value) -> String {
    match QueryResult::from_value(value) {
        Ok(result) => normalize(&result),
        Err(e) => {
            tracing::debug!(error = %e, "Unrecognized result shape");
            NO_DATA.to_string()
        }
    }
}

fn render_tabular(table: &TabularResult) -> String {
    let mut out = String::new();

    if let Some(description) = table.description.as_deref().filter(|d| !d.is_empty()) {
        out.push_str("## Query Description\n\n");
        out.push_str(description);
        out.push_str("\n\n");
    }

    out.push_str("## Query Results\n\n");
    render_table(table, &mut out);
    out.push('\n');

    if let Some(query) = table.source_query.as_deref().filter(|q| !q.is_empty()) {
        out.push_str("## Generated Code\n\n```sql\n");
        out.push_str(query);
        out.push_str("\n```\n\n");
    }

    out
}

fn render_table(table: &TabularResult, out: &mut String) {
    let kinds: Vec<ColumnKind> = table
        .columns
        .iter()
        .map(|c| ColumnKind::from_type_name(&c.type_name))
        .collect();

    let header: Vec<String> = table.columns.iter().map(|c| escape_cell(&c.name)).collect();
    push_row(out, &header);

    let separator = vec!["---"; table.columns.len()].join("|");
    out.push('|');
    out.push_str(&separator);
    out.push_str("|\n");

    for row in &table.rows {
        // Exactly one cell per column: short rows pad with NULL, extras drop.
        let cells: Vec<String> = kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| match row.get(i) {
                Some(value) => escape_cell(&format_cell(value, *kind)),
                None => NULL_TOKEN.to_string(),
            })
            .collect();
        push_row(out, &cells);
    }
}

fn push_row(out: &mut String, cells: &[String]) {
    out.push_str("| ");
    out.push_str(&cells.join(" | "));
    out.push_str(" |\n");
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}
