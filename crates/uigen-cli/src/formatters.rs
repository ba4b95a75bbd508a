//! Output formatters for command reports.
//!
//! Every command produces a serializable report; the global `--format`
//! flag picks how it is printed.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use uigen_core::cli::OutputFormat;

/// Formats `data` for the requested output format.
///
/// # Examples
///
/// ```
/// use uigen_cli::formatters::format_output;
/// use uigen_core::cli::OutputFormat;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Report {
///     files: usize,
/// }
///
/// let output = format_output(&Report { files: 3 }, OutputFormat::Text)?;
/// assert_eq!(output, r#"{"files":3}"#);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn format_output<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(data)?),
        OutputFormat::Text => Ok(serde_json::to_string(data)?),
        OutputFormat::Pretty => {
            let value = serde_json::to_value(data)?;
            let mut out = String::new();
            pretty(&value, 0, &mut out);
            Ok(out.trim_end().to_string())
        }
    }
}

/// Renders a value as an indented `key: value` listing.
fn pretty(value: &Value, indent: usize, out: &mut String) {
    let pad = "  ".repeat(indent);
    match value {
        Value::Object(map) => {
            for (key, item) in map {
                out.push_str(&format!("{pad}{}:", key.bold().blue()));
                if is_nested(item) {
                    out.push('\n');
                    pretty(item, indent + 1, out);
                } else {
                    out.push_str(&format!(" {}\n", scalar(item)));
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                if is_nested(item) {
                    out.push_str(&format!("{pad}-\n"));
                    pretty(item, indent + 1, out);
                } else {
                    out.push_str(&format!("{pad}- {}\n", scalar(item)));
                }
            }
        }
        other => out.push_str(&format!("{pad}{}\n", scalar(other))),
    }
}

fn is_nested(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => "none".dimmed().to_string(),
        Value::Bool(b) => b.to_string().yellow().to_string(),
        Value::Number(n) => n.to_string().cyan().to_string(),
        Value::String(s) => s.green().to_string(),
        Value::Array(_) => "[]".dimmed().to_string(),
        Value::Object(_) => "{}".dimmed().to_string(),
    }
}
