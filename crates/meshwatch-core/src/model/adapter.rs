// ── Adapter records ──

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One adapter record, kept exactly as the server sent it.
///
/// The store never interprets adapters; [`field`](Self::field) exists so
/// consumers can pull a display string out without re-parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Adapter(Value);

impl Adapter {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }

    /// Top-level string field, if present.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

impl From<Value> for Adapter {
    fn from(raw: Value) -> Self {
        Self(raw)
    }
}
