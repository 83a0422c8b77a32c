//! Output formatting for CLI display.
//!
//! Everything is rendered from [`Record`]s: ordered field/value pairs, as
//! produced by [`Resource::record`](crate::Resource::record) or by
//! [`records_of`] for plain result structs.

use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;
use serde_json::{Map, Value};
use tabled::builder::Builder;

use crate::error::{Result, WeblateError};

/// Output format selected with `--format`.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// `key: value` lines, tables for lists.
    #[default]
    Text,
    Csv,
    Json,
    Html,
}

/// Ordered field/value pairs of one object.
pub type Record = Vec<(String, Value)>;

/// Turn a serializable value into records: an object gives one record, an
/// array of objects one per element.
pub fn records_of<T: Serialize + ?Sized>(value: &T) -> Result<Vec<Record>> {
    fn record(value: Value) -> Result<Record> {
        match value {
            Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(WeblateError::Protocol(format!(
                "cannot display {other} as a record"
            ))),
        }
    }
    match serde_json::to_value(value)? {
        Value::Array(items) => items.into_iter().map(record).collect(),
        other => Ok(vec![record(other)?]),
    }
}

/// Print a single object.
pub fn print_record(out: &mut dyn Write, format: Format, record: &Record) -> Result<()> {
    match format {
        Format::Text => {
            for (key, value) in record {
                writeln!(out, "{key}: {}", format_value(value))?;
            }
        }
        Format::Csv => {
            let mut writer = csv::Writer::from_writer(&mut *out);
            for (key, value) in record {
                let value = format_value(value);
                writer.write_record([key.as_str(), value.as_str()])?;
            }
            writer.flush()?;
        }
        Format::Json => {
            serde_json::to_writer_pretty(&mut *out, &to_object(record))?;
            writeln!(out)?;
        }
        Format::Html => {
            writeln!(out, "<table>")?;
            for (key, value) in record {
                writeln!(out, "  <tr>")?;
                writeln!(
                    out,
                    "    <th>{}</th><td>{}</td>",
                    escape_html(key),
                    escape_html(&format_value(value))
                )?;
                writeln!(out, "  </tr>")?;
            }
            writeln!(out, "</table>")?;
        }
    }
    Ok(())
}

/// Print a list of objects. Columns are the keys of the first record.
///
/// An empty list prints nothing, except `[]` for JSON.
pub fn print_records(out: &mut dyn Write, format: Format, records: &[Record]) -> Result<()> {
    match format {
        Format::Json => {
            let list: Vec<Value> = records.iter().map(to_object).collect();
            serde_json::to_writer_pretty(&mut *out, &list)?;
            writeln!(out)?;
        }
        Format::Text => {
            let Some((header, rows)) = tabulate(records) else {
                return Ok(());
            };
            let mut builder = Builder::default();
            builder.push_record(header.iter().map(|key| key.to_string()));
            for row in rows {
                builder.push_record(row);
            }
            writeln!(out, "{}", builder.build())?;
        }
        Format::Csv => {
            let Some((header, rows)) = tabulate(records) else {
                return Ok(());
            };
            let mut writer = csv::Writer::from_writer(&mut *out);
            writer.write_record(&header)?;
            for row in rows {
                writer.write_record(&row)?;
            }
            writer.flush()?;
        }
        Format::Html => {
            let Some((header, rows)) = tabulate(records) else {
                return Ok(());
            };
            writeln!(out, "<table>")?;
            writeln!(out, "  <thead>")?;
            writeln!(out, "    <tr>")?;
            for key in &header {
                writeln!(out, "      <th>{}</th>", escape_html(key))?;
            }
            writeln!(out, "    </tr>")?;
            writeln!(out, "  </thead>")?;
            writeln!(out, "  <tbody>")?;
            for row in rows {
                writeln!(out, "    <tr>")?;
                for cell in row {
                    writeln!(out, "      <td>{}</td>", escape_html(&cell))?;
                }
                writeln!(out, "    </tr>")?;
            }
            writeln!(out, "  </tbody>")?;
            writeln!(out, "</table>")?;
        }
    }
    Ok(())
}

/// Header and formatted cells; `None` for an empty list.
fn tabulate(records: &[Record]) -> Option<(Vec<&str>, Vec<Vec<String>>)> {
    let first = records.first()?;
    let header: Vec<&str> = first.iter().map(|(key, _)| key.as_str()).collect();
    let rows = records
        .iter()
        .map(|record| {
            header
                .iter()
                .map(|key| {
                    record
                        .iter()
                        .find(|(k, _)| k == key)
                        .map(|(_, v)| format_value(v))
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();
    Some((header, rows))
}

/// Display form of a value: floats with one decimal, null as empty.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .map_or_else(|| n.to_string(), |f| format!("{f:.1}")),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn to_object(record: &Record) -> Value {
    Value::Object(record.iter().cloned().collect::<Map<String, Value>>())
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}
