use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Coarse design classification derived from visible text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DesignType {
    Authentication,
    Onboarding,
    Dashboard,
    Form,
    Interface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

/// Non-authoritative summary sent alongside the serialized frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisContext {
    pub design_type: DesignType,
    pub complexity: Complexity,
    pub has_interactive_elements: bool,
    pub user_context: String,
    pub text_sample: String,
    #[serde(default)]
    pub ignore_repeated_text: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_keys() {
        let ctx = AnalysisContext {
            design_type: DesignType::Authentication,
            complexity: Complexity::Medium,
            has_interactive_elements: true,
            user_context: "mobile".to_string(),
            text_sample: "Sign in".to_string(),
            ignore_repeated_text: false,
        };
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["designType"], "authentication");
        assert_eq!(json["complexity"], "medium");
        assert_eq!(json["hasInteractiveElements"], true);
        assert_eq!(json["textSample"], "Sign in");
    }
}
