//! Row → stored record mapping.

use serde_json::Value;

use sentinel_core::{fields, AppConfig};

use crate::Row;

/// Which source columns feed the record's `text` and `antisemitic_flag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMapping {
    pub text_column: String,
    pub flag_column: String,
}

impl Default for RecordMapping {
    fn default() -> Self {
        Self {
            text_column: fields::TEXT.to_string(),
            flag_column: "Antisemitic".to_string(),
        }
    }
}

impl RecordMapping {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            text_column: config.text_column.clone(),
            flag_column: config.flag_column.clone(),
        }
    }

    /// Build the document stored for `row`.
    ///
    /// The text column moves to `text` (scalars are stringified, null drops
    /// it) and the flag column moves to `antisemitic_flag` as 0 or 1. A
    /// missing or unrecognized flag leaves `antisemitic_flag` unset, so the
    /// record never counts as labelled "not antisemitic". Every other column
    /// is kept as-is.
    #[must_use]
    pub fn to_record(&self, mut row: Row) -> Value {
        let text = row.remove(&self.text_column);
        let flag = row.remove(&self.flag_column);

        match text {
            Some(Value::String(s)) => {
                row.insert(fields::TEXT.to_string(), Value::String(s));
            }
            Some(Value::Null) | None => {}
            Some(other @ (Value::Number(_) | Value::Bool(_))) => {
                row.insert(fields::TEXT.to_string(), Value::String(other.to_string()));
            }
            Some(other) => {
                tracing::warn!(column = %self.text_column, value = %other, "non-scalar text column ignored");
            }
        }

        match coerce_flag(flag.as_ref()) {
            Some(flag) => {
                row.insert(fields::ANTISEMITIC_FLAG.to_string(), Value::from(flag));
            }
            None if flag.is_none() => {
                tracing::warn!(
                    column = %self.flag_column,
                    "flag column missing; record left unlabelled"
                );
            }
            None => {
                tracing::warn!(
                    column = %self.flag_column,
                    value = ?flag,
                    "unrecognized flag value; record left unlabelled"
                );
            }
        }
        Value::Object(row)
    }
}

/// 0/1 from numbers, `"0"`/`"1"` strings, and booleans.
fn coerce_flag(value: Option<&Value>) -> Option<u8> {
    match value? {
        Value::Bool(b) => Some(u8::from(*b)),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(1), _) => Some(1),
            (Some(0), _) => Some(0),
            (None, Some(v)) if (v - 1.0).abs() < f64::EPSILON => Some(1),
            (None, Some(v)) if v.abs() < f64::EPSILON => Some(0),
            _ => None,
        },
        Value::String(s) => match s.trim() {
            "1" => Some(1),
            "0" => Some(0),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("row must be an object"),
        }
    }

    #[test]
    fn default_mapping_moves_flag_column() {
        let mapping = RecordMapping::default();
        let record = mapping.to_record(row(json!({ "text": "hi", "Antisemitic": 1, "user": "u" })));
        assert_eq!(
            record,
            json!({ "text": "hi", "antisemitic_flag": 1, "user": "u" })
        );
    }

    #[test]
    fn custom_columns_are_renamed() {
        let mapping = RecordMapping {
            text_column: "content".to_string(),
            flag_column: "label".to_string(),
        };
        let record = mapping.to_record(row(json!({ "content": "hey", "label": "0", "id": 3 })));
        assert_eq!(record, json!({ "text": "hey", "antisemitic_flag": 0, "id": 3 }));
    }

    #[test]
    fn numeric_text_is_stringified_and_null_dropped() {
        let mapping = RecordMapping::default();
        let record = mapping.to_record(row(json!({ "text": 123, "Antisemitic": 0 })));
        assert_eq!(record["text"], json!("123"));

        let record = mapping.to_record(row(json!({ "text": null, "Antisemitic": 0 })));
        assert!(record.get("text").is_none());
    }

    #[test]
    fn flag_coercion() {
        assert_eq!(coerce_flag(Some(&json!(true))), Some(1));
        assert_eq!(coerce_flag(Some(&json!(false))), Some(0));
        assert_eq!(coerce_flag(Some(&json!(1))), Some(1));
        assert_eq!(coerce_flag(Some(&json!(1.0))), Some(1));
        assert_eq!(coerce_flag(Some(&json!(" 1 "))), Some(1));
        assert_eq!(coerce_flag(Some(&json!("0"))), Some(0));
        assert_eq!(coerce_flag(Some(&json!("yes"))), None);
        assert_eq!(coerce_flag(Some(&json!(2))), None);
        assert_eq!(coerce_flag(Some(&Value::Null)), None);
        assert_eq!(coerce_flag(None), None);
    }

    #[test]
    fn missing_flag_column_leaves_record_unlabelled() {
        let mapping = RecordMapping::default();
        let record = mapping.to_record(row(json!({ "text": "hi", "antisemitic": 1 })));
        assert_eq!(record, json!({ "text": "hi", "antisemitic": 1 }));
        assert!(record.get("antisemitic_flag").is_none());
    }

    #[test]
    fn unrecognized_flag_value_is_dropped_not_zeroed() {
        let mapping = RecordMapping::default();
        let record = mapping.to_record(row(json!({ "text": "hi", "Antisemitic": "maybe" })));
        assert_eq!(record, json!({ "text": "hi" }));
    }
}
