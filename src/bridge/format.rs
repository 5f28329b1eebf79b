//! Text rendering of diagnostic events

use super::events::{DiagnosticEvent, DiagnosticKind};
use serde_json::Value;

/// Rows shown by [`render_table`] before truncating
pub const TABLE_ROW_LIMIT: usize = 10;

/// Render one event as a line of text (tables span several lines)
pub fn render_event(event: &DiagnosticEvent) -> String {
    let body = match (event.kind, event.args.first()) {
        (DiagnosticKind::Table, Some(data)) => render_table(data),
        _ => event.message.clone(),
    };

    let mut out = format!("[{}] {}", event.kind.as_str(), body);
    if let Some(source) = &event.source {
        out.push_str(&format!(
            " ({}:{}:{})",
            source,
            event.line.unwrap_or(0),
            event.column.unwrap_or(0)
        ));
    }
    out
}

/// Render `console.table` data
pub fn render_table(data: &Value) -> String {
    // console.table(rows) may arrive wrapped in one more array
    let data = match data {
        Value::Array(items) if items.len() == 1 && items[0].is_array() => &items[0],
        other => other,
    };

    match data {
        Value::Array(rows) if rows.is_empty() => "Empty table".to_string(),
        Value::Array(rows) => match &rows[0] {
            Value::Object(_) => object_rows(rows),
            Value::Array(_) => array_rows(rows),
            _ => data.to_string(),
        },
        Value::Object(map) => {
            let lines: Vec<Vec<String>> = map
                .iter()
                .map(|(key, value)| vec![key.clone(), format_cell(Some(value))])
                .collect();
            layout(None, &lines)
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn object_rows(rows: &[Value]) -> String {
    let mut keys: Vec<&str> = Vec::new();
    for row in rows {
        if let Value::Object(map) = row {
            for key in map.keys() {
                if !keys.contains(&key.as_str()) {
                    keys.push(key);
                }
            }
        }
    }

    let mut header = vec!["(index)".to_string()];
    header.extend(keys.iter().map(|k| k.to_string()));

    let lines: Vec<Vec<String>> = rows
        .iter()
        .take(TABLE_ROW_LIMIT)
        .enumerate()
        .map(|(index, row)| {
            let mut line = vec![index.to_string()];
            line.extend(keys.iter().map(|k| format_cell(row.get(*k))));
            line
        })
        .collect();

    with_overflow(layout(Some(&header), &lines), rows.len())
}

fn array_rows(rows: &[Value]) -> String {
    let width = rows
        .iter()
        .map(|r| r.as_array().map(Vec::len).unwrap_or(0))
        .max()
        .unwrap_or(0);

    let mut header = vec!["(index)".to_string()];
    header.extend((0..width).map(|i| i.to_string()));

    let lines: Vec<Vec<String>> = rows
        .iter()
        .take(TABLE_ROW_LIMIT)
        .enumerate()
        .map(|(index, row)| {
            let mut line = vec![index.to_string()];
            line.extend((0..width).map(|i| format_cell(row.get(i))));
            line
        })
        .collect();

    with_overflow(layout(Some(&header), &lines), rows.len())
}

fn with_overflow(mut table: String, total: usize) -> String {
    if total > TABLE_ROW_LIMIT {
        table.push_str(&format!("\n... and {} more rows", total - TABLE_ROW_LIMIT));
    }
    table
}

/// Format a single cell value
pub fn format_cell(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::Null) => "null".to_string(),
        Some(Value::String(s)) => format!("'{}'", s),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Array(items)) => format!("Array({})", items.len()),
        Some(Value::Object(_)) => "Object".to_string(),
    }
}

fn layout(header: Option<&[String]>, lines: &[Vec<String>]) -> String {
    let columns = header
        .map(<[String]>::len)
        .into_iter()
        .chain(lines.iter().map(Vec::len))
        .max()
        .unwrap_or(0);

    let mut widths = vec![0usize; columns];
    for row in header.into_iter().chain(lines.iter().map(Vec::as_slice)) {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let render_row = |row: &[String]| -> String {
        row.iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::new();
    if let Some(header) = header {
        out.push(render_row(header));
        out.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
    }
    out.extend(lines.iter().map(|l| render_row(l)));
    out.join("\n")
}
