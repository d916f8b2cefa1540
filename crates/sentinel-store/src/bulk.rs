//! NDJSON encoding for `_bulk` requests and decoding of their responses.

use serde_json::{json, Value};

use crate::error::StoreError;
use crate::types::{BulkFailure, BulkOutcome, UpdateOp};

/// Encode partial updates as `update` action/`doc` line pairs.
///
/// # Errors
///
/// Returns [`StoreError::Encode`] if a line cannot be serialized.
pub(crate) fn encode_updates(index: &str, ops: &[UpdateOp]) -> Result<String, StoreError> {
    let mut body = String::new();
    for op in ops {
        push_line(
            &mut body,
            &json!({ "update": { "_index": index, "_id": op.id } }),
        )?;
        push_line(&mut body, &json!({ "doc": op.doc }))?;
    }
    Ok(body)
}

/// Encode whole documents as `index` action/source line pairs with
/// store-assigned ids.
///
/// # Errors
///
/// Returns [`StoreError::Encode`] if a line cannot be serialized.
pub(crate) fn encode_inserts(index: &str, docs: &[Value]) -> Result<String, StoreError> {
    let mut body = String::new();
    for doc in docs {
        push_line(&mut body, &json!({ "index": { "_index": index } }))?;
        push_line(&mut body, doc)?;
    }
    Ok(body)
}

fn push_line(body: &mut String, line: &Value) -> Result<(), StoreError> {
    let encoded = serde_json::to_string(line).map_err(|e| StoreError::Encode {
        context: "bulk line".to_string(),
        source: e,
    })?;
    body.push_str(&encoded);
    body.push('\n');
    Ok(())
}

/// Split a `_bulk` response into successful and failed items.
///
/// Each entry of `items` is a single-key object (`update`, `index`, ...)
/// whose value carries `_id`, `status` and, on failure, `error`.
///
/// # Errors
///
/// Returns [`StoreError::Deserialize`] if `items` is missing.
pub(crate) fn parse_bulk_response(body: &Value) -> Result<BulkOutcome, StoreError> {
    let items = body
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| StoreError::Deserialize {
            context: "bulk response".to_string(),
            source: serde::de::Error::missing_field("items"),
        })?;

    let mut outcome = BulkOutcome::default();
    for item in items {
        let Some(result) = item.as_object().and_then(|o| o.values().next()) else {
            continue;
        };
        let status = result
            .get("status")
            .and_then(Value::as_u64)
            .and_then(|s| u16::try_from(s).ok())
            .unwrap_or(0);
        let error = result.get("error");

        if (200..300).contains(&status) && error.is_none() {
            outcome.success += 1;
        } else {
            outcome.failed.push(BulkFailure {
                id: result
                    .get("_id")
                    .and_then(Value::as_str)
                    .map(ToString::to_string),
                status,
                reason: error.map_or_else(|| "unknown error".to_string(), describe_error),
            });
        }
    }
    Ok(outcome)
}

fn describe_error(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        other => {
            let kind = other.get("type").and_then(Value::as_str);
            let reason = other.get("reason").and_then(Value::as_str);
            match (kind, reason) {
                (Some(k), Some(r)) => format!("{k}: {r}"),
                (Some(k), None) => k.to_string(),
                (None, Some(r)) => r.to_string(),
                (None, None) => other.to_string(),
            }
        }
    }
}
