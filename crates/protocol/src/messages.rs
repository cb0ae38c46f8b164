use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{AnalysisResult, NodeType, Violation};

/// Commands sent by the UI to the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum InboundCommand {
    #[serde(rename = "get-initial-state")]
    RequestInitialState,
    #[serde(rename = "focus-selected-frames")]
    FocusCurrentSelection,
    #[serde(rename = "analyze-frames", rename_all = "camelCase")]
    RequestAnalysis {
        #[serde(default)]
        context: Option<String>,
        #[serde(default)]
        ignore_repeated_text: bool,
    },
    #[serde(
        rename = "focus-violation-area",
        alias = "focus-violation-area-optimized",
        rename_all = "camelCase"
    )]
    FocusViolationArea {
        #[serde(default)]
        violation_context: Option<Violation>,
    },
    #[serde(rename = "show-notification")]
    ShowNotification {
        message: String,
        /// Milliseconds.
        #[serde(default)]
        timeout: Option<u64>,
    },
    #[serde(rename = "close-plugin")]
    Close,
}

/// Minimal description of a selected frame for the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FrameSummary {
    pub id: String,
    pub name: String,
    pub width: f64,
    pub height: f64,
    #[serde(rename = "type")]
    pub node_type: NodeType,
}

/// Notifications emitted by the pipeline towards the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum OutboundMessage {
    SelectionChanged { frames: Vec<FrameSummary> },
    AnalysisStarted,
    AnalysisComplete { result: AnalysisResult },
    /// `error` is always a user-facing sentence.
    AnalysisError { error: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_analysis_request_with_defaults() {
        let cmd: InboundCommand = serde_json::from_value(json!({"type": "analyze-frames"})).unwrap();
        assert_eq!(
            cmd,
            InboundCommand::RequestAnalysis {
                context: None,
                ignore_repeated_text: false
            }
        );

        let cmd: InboundCommand = serde_json::from_value(json!({
            "type": "analyze-frames",
            "context": "checkout flow",
            "ignoreRepeatedText": true
        }))
        .unwrap();
        assert_eq!(
            cmd,
            InboundCommand::RequestAnalysis {
                context: Some("checkout flow".to_string()),
                ignore_repeated_text: true
            }
        );
    }

    #[test]
    fn focus_violation_accepts_optimized_alias() {
        let cmd: InboundCommand = serde_json::from_value(json!({
            "type": "focus-violation-area-optimized",
            "violationContext": {"title": "Missing label"}
        }))
        .unwrap();
        assert_eq!(
            cmd,
            InboundCommand::FocusViolationArea {
                violation_context: Some(Violation::titled("Missing label"))
            }
        );
    }

    #[test]
    fn outbound_messages_use_kebab_case_tags() {
        let msg = OutboundMessage::AnalysisError {
            error: "Network error.".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "analysis-error", "error": "Network error."})
        );
        assert_eq!(
            serde_json::to_value(OutboundMessage::AnalysisStarted).unwrap(),
            json!({"type": "analysis-started"})
        );
    }
}
