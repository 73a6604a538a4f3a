// handlers/mod.rs - two handler tiers
//
// Public (no auth): root, health, attachment download
// Protected (session required): everything else under /api
pub mod protected;
pub mod public;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Deserialize a JSON body into a typed request, reporting shape errors as
/// `INVALID_JSON`.
pub(crate) fn parse_body<T: DeserializeOwned>(payload: Value) -> Result<T, ApiError> {
    serde_json::from_value(payload).map_err(|e| ApiError::invalid_json(format!("Invalid request body: {}", e)))
}

/// Read an id from a JSON body; clients send both `5` and `"5"`.
pub(crate) fn id_field(payload: &Value, key: &str) -> Option<i64> {
    match payload.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
