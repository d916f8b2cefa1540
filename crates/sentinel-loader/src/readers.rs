//! Text formats to rows.

use std::io::Read;

use serde_json::{Map, Number, Value};

use crate::error::LoaderError;
use crate::Row;

/// Parse CSV with a header row. Cells are typed: empty → null,
/// integers and floats → numbers, `true`/`false` → booleans, else strings.
///
/// # Errors
///
/// Returns [`LoaderError::Csv`] for malformed input.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Row>, LoaderError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.to_string(), typed_cell(cell)))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

fn typed_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(n) = cell.parse::<i64>() {
        return Value::from(n);
    }
    if let Some(n) = cell.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    match cell {
        "true" | "True" | "TRUE" => Value::Bool(true),
        "false" | "False" | "FALSE" => Value::Bool(false),
        _ => Value::String(cell.to_string()),
    }
}

/// Parse a JSON document: an array of objects, or a single object.
/// Nested objects are flattened into dotted keys.
///
/// # Errors
///
/// Returns [`LoaderError::Json`] for invalid JSON and [`LoaderError::Shape`]
/// for scalars or arrays holding non-objects.
pub fn read_json(text: &str, context: &str) -> Result<Vec<Row>, LoaderError> {
    let value: Value = serde_json::from_str(text).map_err(|source| LoaderError::Json {
        context: context.to_string(),
        source,
    })?;
    rows_from_value(value, context)
}

pub(crate) fn rows_from_value(value: Value, context: &str) -> Result<Vec<Row>, LoaderError> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(obj) => Ok(flatten(obj)),
                other => Err(LoaderError::Shape {
                    context: context.to_string(),
                    reason: format!("element {i} is {}, expected an object", kind_name(&other)),
                }),
            })
            .collect(),
        Value::Object(obj) => Ok(vec![flatten(obj)]),
        other => Err(LoaderError::Shape {
            context: context.to_string(),
            reason: format!("top-level {} is not an array or object", kind_name(&other)),
        }),
    }
}

/// Parse newline-delimited JSON objects. Blank lines are ignored.
///
/// # Errors
///
/// Returns [`LoaderError::Json`] naming the offending line, or
/// [`LoaderError::Shape`] for a line that is not an object.
pub fn read_ndjson(text: &str, context: &str) -> Result<Vec<Row>, LoaderError> {
    let mut rows = Vec::new();
    for (n, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_context = format!("{context} line {}", n + 1);
        match serde_json::from_str(line) {
            Ok(Value::Object(obj)) => rows.push(flatten(obj)),
            Ok(other) => {
                return Err(LoaderError::Shape {
                    context: line_context,
                    reason: format!("{} is not an object", kind_name(&other)),
                })
            }
            Err(source) => {
                return Err(LoaderError::Json {
                    context: line_context,
                    source,
                })
            }
        }
    }
    Ok(rows)
}

/// Flatten nested objects into `parent.child` keys. Arrays are kept as values.
fn flatten(obj: Map<String, Value>) -> Row {
    let mut out = Map::new();
    flatten_into(&mut out, None, obj);
    out
}

fn flatten_into(out: &mut Row, prefix: Option<&str>, obj: Map<String, Value>) {
    for (key, value) in obj {
        let key = match prefix {
            Some(p) => format!("{p}.{key}"),
            None => key,
        };
        match value {
            Value::Object(inner) if !inner.is_empty() => flatten_into(out, Some(&key), inner),
            other => {
                out.insert(key, other);
            }
        }
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
