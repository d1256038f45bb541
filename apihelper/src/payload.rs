//! Request payload normalization.

use serde::Serialize;
use serde_json::{Map, Value};

/// A request payload: either a serializable value or a ready-made JSON object.
#[derive(Debug, Clone)]
pub enum Payload<P = ()> {
    Structured(P),
    Raw(Map<String, Value>),
}

impl Payload<()> {
    /// Wraps an already-built JSON object.
    pub fn raw(map: Map<String, Value>) -> Self {
        Payload::Raw(map)
    }

    /// A payload with no fields.
    pub fn empty() -> Self {
        Payload::Raw(Map::new())
    }
}

impl<P: Serialize> Payload<P> {
    /// Flattens the payload into a string-keyed JSON object.
    ///
    /// Structured values that fail to serialize, or that serialize to
    /// something other than an object, become an empty object.
    pub fn into_map(self) -> Map<String, Value> {
        match self {
            Payload::Raw(map) => map,
            Payload::Structured(value) => match serde_json::to_value(value) {
                Ok(Value::Object(map)) => map,
                Ok(other) => {
                    tracing::warn!(
                        "Payload serialized to a non-object JSON value ({}), sending empty object",
                        kind(&other)
                    );
                    Map::new()
                }
                Err(e) => {
                    tracing::warn!("Failed to serialize payload, sending empty object: {}", e);
                    Map::new()
                }
            },
        }
    }
}

impl From<Map<String, Value>> for Payload<()> {
    fn from(map: Map<String, Value>) -> Self {
        Payload::Raw(map)
    }
}

/// Extracts the multipart text fields from a payload map.
///
/// Multipart bodies carry strings only. Any non-string value is dropped with
/// a warning and the request goes ahead without it.
pub fn multipart_fields(map: Map<String, Value>) -> Vec<(String, String)> {
    map.into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(text) => Some((key, text)),
            other => {
                tracing::warn!(
                    "Multipart payload values must be strings; payload[{}] is {} and was skipped",
                    key,
                    kind(&other)
                );
                None
            }
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
