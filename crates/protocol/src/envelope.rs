use std::time::{SystemTime, UNIX_EPOCH};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AnalysisContext, SerializedNode};

/// Body POSTed to the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisRequest {
    pub frames: Vec<SerializedNode>,
    pub context: AnalysisContext,
    /// Milliseconds since the Unix epoch when this body was sent.
    pub timestamp: u64,
}

impl AnalysisRequest {
    #[must_use]
    pub fn new(frames: Vec<SerializedNode>, context: AnalysisContext) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            frames,
            context,
            timestamp,
        }
    }

    /// Same body, stamped with `timestamp`.
    #[must_use]
    pub fn with_timestamp(&self, timestamp: u64) -> Self {
        Self {
            timestamp,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Response body of the analysis service, success or failure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RemoteEnvelope {
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl RemoteEnvelope {
    /// Critique text, if the envelope carries a non-empty `content`.
    /// Non-string content is re-encoded as JSON text.
    #[must_use]
    pub fn content_text(&self) -> Option<String> {
        match self.content.as_ref()? {
            Value::String(text) if text.is_empty() => None,
            Value::String(text) => Some(text.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_text_handles_string_and_structured_content() {
        let env: RemoteEnvelope = serde_json::from_str(r#"{"content":"[]"}"#).unwrap();
        assert_eq!(env.content_text().as_deref(), Some("[]"));

        let env: RemoteEnvelope = serde_json::from_str(r#"{"content":[{"title":"x"}]}"#).unwrap();
        assert_eq!(env.content_text().as_deref(), Some(r#"[{"title":"x"}]"#));

        let env: RemoteEnvelope = serde_json::from_str(r#"{"content":"","error":"boom"}"#).unwrap();
        assert_eq!(env.content_text(), None);
        assert_eq!(env.error.as_deref(), Some("boom"));
    }
}
