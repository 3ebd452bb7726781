use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};

/// Builds the success envelope: `{ "success": true, "message": ..., <key>: <payload> }`.
/// The payload key is per-endpoint ("artist", "artworks", "user", ...).
pub fn envelope<T: Serialize>(message: &str, key: &str, payload: T) -> Json<Value> {
    let mut body = Map::new();
    body.insert("success".to_string(), Value::Bool(true));
    body.insert("message".to_string(), Value::String(message.to_string()));
    body.insert(
        key.to_string(),
        serde_json::to_value(payload).unwrap_or(Value::Null),
    );
    Json(Value::Object(body))
}

/// Envelope without a payload key, for operations that only acknowledge.
pub fn message(text: &str) -> Json<Value> {
    Json(serde_json::json!({ "success": true, "message": text }))
}
