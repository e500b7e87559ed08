use serde::{Deserialize, Serialize};

/// JSON body the order backend attaches to failed mutations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// Extracts a non-blank `message` from a raw response body, if any.
    pub fn from_body(body: &str) -> Option<String> {
        serde_json::from_str::<ApiMessage>(body)
            .ok()?
            .message
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty())
    }
}
