//! JSON encoding for `--json` output.
//!
//! Views are serialized directly from their model types, whose field names
//! are the stable contract for downstream tooling. Errors use a fixed
//! envelope carrying the stable error code.

use crate::errors::{ExError, Result};
use serde::Serialize;
use serde_json::json;

/// Pretty-printed JSON of any view.
///
/// # Errors
///
/// `Serialization` if the value cannot be encoded.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// `{"error": {"code": ..., "message": ...}}`
pub fn error_envelope(err: &ExError) -> String {
    let mut body = json!({
        "code": err.code(),
        "message": err.message(),
    });
    if let Some(op) = err.op() {
        body["op"] = json!(op);
    }
    if let Some(id) = err.entity_id() {
        body["id"] = json!(id);
    }
    if let Some(stage) = err.stage() {
        body["stage"] = json!(stage);
    }
    if let Some(request_id) = err.request_id() {
        body["request_id"] = json!(request_id.as_str());
    }
    json!({ "error": body }).to_string()
}
