//! Display rows for an inspected field list.

use std::collections::HashSet;
use std::fmt::Write as _;

use chrono::DateTime;
use records::{Field, FieldType, display_string};
use serde_json::Value;

use crate::ExtensionMessage;

const IMAGE_EXTENSIONS: [&str; 5] = [".jpeg", ".jpg", ".gif", ".png", ".svg"];
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One rendered value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Link { href: String, external: bool },
    Image { src: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub title: String,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Row(Row),
    Section { title: String, rows: Vec<Row> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyPanel {
    pub blocks: Vec<Block>,
}

impl PropertyPanel {
    /// Groups become sections of their children. Children whose group is not
    /// in the list are shown as plain rows.
    pub fn from_fields(fields: &[Field]) -> Self {
        let group_ids: HashSet<&str> = fields
            .iter()
            .filter(|f| f.is_group())
            .map(|f| f.id.as_str())
            .collect();

        let blocks = fields
            .iter()
            .filter(|f| match f.group.as_deref() {
                Some(parent) => !group_ids.contains(parent),
                None => true,
            })
            .map(|field| {
                if field.is_group() {
                    Block::Section {
                        title: field.label().to_string(),
                        rows: fields
                            .iter()
                            .filter(|c| c.group.as_deref() == Some(field.id.as_str()))
                            .map(row)
                            .collect(),
                    }
                } else {
                    Block::Row(row(field))
                }
            })
            .collect();

        Self { blocks }
    }

    /// Panel for an inspector reply; `None` for other messages or when no
    /// feature is selected.
    pub fn from_message(message: &ExtensionMessage) -> Option<Self> {
        match message {
            ExtensionMessage::GetInspector(Some(fields))
            | ExtensionMessage::GetProperties(Some(fields)) => Some(Self::from_fields(fields)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            match block {
                Block::Row(r) => write_row(&mut out, r, ""),
                Block::Section { title, rows } => {
                    let _ = writeln!(out, "[{title}]");
                    for r in rows {
                        write_row(&mut out, r, "  ");
                    }
                }
            }
        }
        out
    }
}

fn write_row(out: &mut String, row: &Row, indent: &str) {
    let _ = writeln!(out, "{indent}{}:", row.title);
    for cell in &row.cells {
        let _ = match cell {
            Cell::Text(text) => writeln!(out, "{indent}  {text}"),
            Cell::Link { href, .. } => writeln!(out, "{indent}  <{href}>"),
            Cell::Image { src } => writeln!(out, "{indent}  [image] {src}"),
        };
    }
}

fn row(field: &Field) -> Row {
    let cells = match &field.value {
        Value::Array(values) => values.iter().map(|v| cell(field, v)).collect(),
        value => vec![cell(field, value)],
    };
    Row {
        title: field.label().to_string(),
        cells,
    }
}

fn cell(field: &Field, value: &Value) -> Cell {
    match field.field_type.as_ref() {
        Some(FieldType::Asset) => {
            let href = display_string(value);
            if is_image_url(&href) {
                Cell::Image { src: href }
            } else {
                Cell::Link {
                    href,
                    external: false,
                }
            }
        }
        Some(FieldType::Url) => Cell::Link {
            href: display_string(value),
            external: true,
        },
        Some(FieldType::Bool) => {
            let shown = if truthy(value) { "True" } else { "False" };
            Cell::Text(shown.to_string())
        }
        Some(FieldType::Date) => Cell::Text(format_date(value)),
        _ => Cell::Text(match value {
            Value::Null => String::new(),
            other => display_string(other),
        }),
    }
}

pub fn is_image_url(url: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|ext| url.ends_with(ext))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// RFC 3339 dates in their own offset; anything else verbatim.
fn format_date(value: &Value) -> String {
    let raw = display_string(value);
    match DateTime::parse_from_rfc3339(&raw) {
        Ok(date) => date.format(DATE_FORMAT).to_string(),
        Err(_) => raw,
    }
}
