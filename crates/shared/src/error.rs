use serde::{Deserialize, Serialize};

/// Error body returned by the game service for rejected requests.
///
/// `detail` is usually a human-readable string; request-validation failures
/// carry a structured list instead, so it is kept as raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub detail: serde_json::Value,
}

impl ApiErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: serde_json::Value::String(detail.into()),
        }
    }

    pub fn message(&self) -> Option<String> {
        match &self.detail {
            serde_json::Value::String(text) => Some(text.clone()),
            serde_json::Value::Array(items) => items
                .iter()
                .find_map(|item| item.get("msg").and_then(|msg| msg.as_str()))
                .map(str::to_string),
            _ => None,
        }
    }
}
