use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const FREE_TEXT_TITLE: &str = "AI Analysis";
const FREE_TEXT_SEVERITY: &str = "info";

/// A finding returned by the critique model. Every field is free text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Violation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    /// Fields the pipeline does not interpret, passed through to the UI.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Violation {
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    fn free_text(text: &str) -> Self {
        Self {
            title: Some(FREE_TEXT_TITLE.to_string()),
            description: Some(text.to_string()),
            severity: Some(FREE_TEXT_SEVERITY.to_string()),
            ..Default::default()
        }
    }

    /// Lenient conversion: scalar values of known fields are stringified,
    /// anything else lands in `extra`. Non-objects are rejected.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut violation = Self::default();
        for (key, field) in object {
            let slot = match key.as_str() {
                "title" => &mut violation.title,
                "description" => &mut violation.description,
                "location" => &mut violation.location,
                "recommendation" => &mut violation.recommendation,
                "severity" => &mut violation.severity,
                _ => {
                    violation.extra.insert(key.clone(), field.clone());
                    continue;
                }
            };
            match field {
                Value::String(text) => *slot = Some(text.clone()),
                Value::Number(_) | Value::Bool(_) => *slot = Some(field.to_string()),
                Value::Null => {}
                _ => {
                    violation.extra.insert(key.clone(), field.clone());
                }
            }
        }
        Some(violation)
    }
}

/// Result of interpreting the model's `content` string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedCritique {
    pub summary: Option<String>,
    pub violations: Vec<Violation>,
}

/// Interpret critique content. Never fails: content that is not structured
/// data becomes a single informational violation.
#[must_use]
pub fn parse_critique(content: &str) -> ParsedCritique {
    let body = strip_code_fence(content);
    if body.is_empty() || body == "[]" {
        return ParsedCritique::default();
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => ParsedCritique {
            summary: None,
            violations: items.iter().filter_map(Violation::from_value).collect(),
        },
        Ok(Value::Object(object)) => {
            let summary = object
                .get("summary")
                .and_then(Value::as_str)
                .map(str::to_string);
            let violations = object
                .get("improvements")
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(Violation::from_value).collect())
                .unwrap_or_default();
            ParsedCritique {
                summary,
                violations,
            }
        }
        Ok(_) => ParsedCritique {
            summary: None,
            violations: vec![Violation::free_text(body)],
        },
        Err(err) => {
            log::debug!("critique content is not JSON ({err}); wrapping as free text");
            ParsedCritique {
                summary: None,
                violations: vec![Violation::free_text(body)],
            }
        }
    }
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(rest) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening fence line.
    match rest.split_once('\n') {
        Some((_, body)) => body.trim(),
        None => rest.trim(),
    }
}

/// Payload of the `analysis-complete` notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    pub improvements: Vec<Violation>,
    pub raw_feedback: String,
}

impl AnalysisResult {
    #[must_use]
    pub fn from_critique(raw: &str) -> Self {
        let parsed = parse_critique(raw);
        let summary = parsed.summary.unwrap_or_else(|| {
            if parsed.violations.is_empty() {
                "No major issues found".to_string()
            } else {
                format!("Found {} UX issues", parsed.violations.len())
            }
        });
        Self {
            summary,
            improvements: parsed.violations,
            raw_feedback: raw.to_string(),
        }
    }
}
