use critique_protocol::{AnalysisContext, Complexity, DesignType, SerializedNode};
use critique_serializer::TraversalBudget;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

static INTERACTIVE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:button|btn|click|link|nav|menu|input|field)\b")
        .expect("valid interactive-name regex")
});

/// Evaluated in order; the first hit wins.
static DESIGN_TYPE_RULES: Lazy<Vec<(DesignType, Regex)>> = Lazy::new(|| {
    [
        (DesignType::Authentication, r"(?i)\b(?:sign in|log in|password|email)\b"),
        (DesignType::Onboarding, r"(?i)\b(?:welcome|get started|tutorial)\b"),
        (DesignType::Dashboard, r"(?i)\b(?:dashboard|analytics|metrics|overview)\b"),
        (DesignType::Form, r"(?i)\b(?:submit|required|input|form)\b"),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).expect("valid design-type regex")))
    .collect()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub max_frames: usize,
    pub max_nodes: usize,
    pub max_fanout: usize,
    /// Characters of text collected for classification
    pub text_collect_chars: usize,
    /// Characters of that text surfaced in the context
    pub text_sample_chars: usize,
    pub high_complexity_nodes: usize,
    pub medium_complexity_nodes: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_frames: 10,
            max_nodes: 200,
            max_fanout: 10,
            text_collect_chars: 2_000,
            text_sample_chars: 500,
            high_complexity_nodes: 100,
            medium_complexity_nodes: 50,
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_nodes == 0 || self.max_fanout == 0 {
            return Err(SearchError::invalid_config(
                "analyzer.max_nodes and analyzer.max_fanout must be > 0",
            ));
        }
        if self.text_sample_chars > self.text_collect_chars {
            return Err(SearchError::invalid_config(format!(
                "analyzer.text_sample_chars ({}) cannot exceed analyzer.text_collect_chars ({})",
                self.text_sample_chars, self.text_collect_chars
            )));
        }
        if self.medium_complexity_nodes > self.high_complexity_nodes {
            return Err(SearchError::invalid_config(format!(
                "analyzer.medium_complexity_nodes ({}) cannot exceed analyzer.high_complexity_nodes ({})",
                self.medium_complexity_nodes, self.high_complexity_nodes
            )));
        }
        Ok(())
    }
}

/// First matching design category for `text`, `Interface` when none match.
#[must_use]
pub fn classify_design_type(text: &str) -> DesignType {
    DESIGN_TYPE_RULES
        .iter()
        .find(|(_, regex)| regex.is_match(text))
        .map_or(DesignType::Interface, |(kind, _)| *kind)
}

/// Derives a coarse summary of a serialized payload
#[derive(Debug, Clone, Default)]
pub struct ContextAnalyzer {
    config: AnalyzerConfig,
}

#[derive(Default)]
struct TextSample {
    text: String,
    chars: usize,
}

impl TextSample {
    fn push(&mut self, block: &str, cap: usize, dedupe: bool) {
        if self.chars >= cap || block.is_empty() {
            return;
        }
        // Substring check only: a block can still repeat as part of a longer one.
        if dedupe && self.text.contains(block) {
            return;
        }
        for ch in block.chars().chain(std::iter::once(' ')) {
            if self.chars >= cap {
                break;
            }
            self.text.push(ch);
            self.chars += 1;
        }
    }
}

impl ContextAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn analyze(
        &self,
        frames: &[SerializedNode],
        user_context: Option<&str>,
        dedupe_text: bool,
    ) -> AnalysisContext {
        let mut budget =
            TraversalBudget::new(usize::MAX, self.config.max_fanout, self.config.max_nodes);
        let mut sample = TextSample::default();
        let mut visited = 0usize;
        let mut interactive = false;

        'frames: for frame in frames.iter().take(self.config.max_frames) {
            let mut stack = vec![frame];
            while let Some(node) = stack.pop() {
                if !node.visible {
                    continue;
                }
                if !budget.try_take_node() {
                    break 'frames;
                }
                visited += 1;

                if node.node_type.is_text() {
                    if let Some(text) = node.text.as_deref() {
                        sample.push(text, self.config.text_collect_chars, dedupe_text);
                    }
                }
                if !interactive && INTERACTIVE_NAME.is_match(&node.name) {
                    interactive = true;
                }

                let limit = budget.fanout(node.children.len());
                stack.extend(node.children[..limit].iter().rev());
            }
        }
        log::debug!(
            "context analysis visited {visited} nodes (budget exhausted: {}), {} text chars",
            budget.is_exhausted(),
            sample.chars
        );

        AnalysisContext {
            design_type: classify_design_type(&sample.text),
            complexity: self.complexity(visited),
            has_interactive_elements: interactive,
            user_context: user_context.unwrap_or_default().to_string(),
            text_sample: sample
                .text
                .chars()
                .take(self.config.text_sample_chars)
                .collect(),
            ignore_repeated_text: dedupe_text,
        }
    }

    fn complexity(&self, visited: usize) -> Complexity {
        if visited > self.config.high_complexity_nodes {
            Complexity::High
        } else if visited > self.config.medium_complexity_nodes {
            Complexity::Medium
        } else {
            Complexity::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use critique_protocol::NodeType;
    use pretty_assertions::assert_eq;

    #[test]
    fn patterns_compile() {
        Lazy::force(&INTERACTIVE_NAME);
        assert_eq!(DESIGN_TYPE_RULES.len(), 4);
    }

    fn node(id: &str, name: &str, node_type: NodeType) -> SerializedNode {
        SerializedNode {
            id: id.to_string(),
            name: name.to_string(),
            node_type,
            visible: true,
            width: 100,
            height: 40,
            text: None,
            font_size: None,
            layout: None,
            fills: None,
            strokes: None,
            children: Vec::new(),
        }
    }

    fn text(id: &str, content: &str) -> SerializedNode {
        let mut n = node(id, "Text", NodeType::Text);
        n.text = Some(content.to_string());
        n
    }

    fn frame(children: Vec<SerializedNode>) -> SerializedNode {
        let mut f = node("frame", "Screen", NodeType::Frame);
        f.children = children;
        f
    }

    #[test]
    fn classify_follows_rule_order() {
        assert_eq!(
            classify_design_type("Sign in with your password"),
            DesignType::Authentication
        );
        // Authentication outranks form even though "submit" appears first.
        assert_eq!(
            classify_design_type("Submit your email"),
            DesignType::Authentication
        );
        assert_eq!(classify_design_type("Welcome aboard"), DesignType::Onboarding);
        assert_eq!(
            classify_design_type("Weekly analytics overview"),
            DesignType::Dashboard
        );
        assert_eq!(classify_design_type("Required fields"), DesignType::Form);
        assert_eq!(classify_design_type("Cart"), DesignType::Interface);
    }

    #[test]
    fn classify_requires_whole_words() {
        assert_eq!(classify_design_type("formidable"), DesignType::Interface);
        assert_eq!(classify_design_type("emailing"), DesignType::Interface);
    }

    #[test]
    fn sign_in_and_password_classify_as_authentication() {
        let payload = vec![frame(vec![text("1", "Sign in"), text("2", "Password")])];
        let ctx = ContextAnalyzer::default().analyze(&payload, None, false);
        assert_eq!(ctx.design_type, DesignType::Authentication);
        assert_eq!(ctx.text_sample, "Sign in Password ");
        assert_eq!(ctx.complexity, Complexity::Low);
    }

    #[test]
    fn interactive_names_match_whole_words_case_insensitively() {
        let analyzer = ContextAnalyzer::default();
        let ctx = analyzer.analyze(&[frame(vec![node("1", "Primary BTN", NodeType::Instance)])], None, false);
        assert!(ctx.has_interactive_elements);

        let ctx = analyzer.analyze(&[frame(vec![node("1", "Buttonless", NodeType::Instance)])], None, false);
        assert!(!ctx.has_interactive_elements);
    }

    #[test]
    fn invisible_nodes_are_skipped() {
        let mut hidden = text("1", "Dashboard");
        hidden.visible = false;
        let ctx = ContextAnalyzer::default().analyze(&[frame(vec![hidden])], None, false);
        assert_eq!(ctx.design_type, DesignType::Interface);
        assert_eq!(ctx.text_sample, "");
    }

    #[test]
    fn dedupe_skips_blocks_already_in_sample() {
        let payload = vec![frame(vec![
            text("1", "Buy now"),
            text("2", "Buy now"),
            text("3", "Buy"),
            text("4", "Later"),
        ])];
        let analyzer = ContextAnalyzer::default();
        let deduped = analyzer.analyze(&payload, Some("shop"), true);
        assert_eq!(deduped.text_sample, "Buy now Later ");
        assert!(deduped.ignore_repeated_text);
        assert_eq!(deduped.user_context, "shop");

        let raw = analyzer.analyze(&payload, None, false);
        assert_eq!(raw.text_sample, "Buy now Buy now Buy Later ");
    }

    #[test]
    fn node_budget_bounds_visits_and_complexity() {
        let children: Vec<_> = (0..10)
            .map(|i| {
                let mut group = node(&format!("g{i}"), "Group", NodeType::Group);
                group.children = (0..10).map(|j| node(&format!("g{i}-{j}"), "Cell", NodeType::Rectangle)).collect();
                group
            })
            .collect();
        let payload = vec![frame(children)];

        let ctx = ContextAnalyzer::default().analyze(&payload, None, false);
        // 1 frame + 10 groups + 100 cells = 111 visits.
        assert_eq!(ctx.complexity, Complexity::High);

        let tight = ContextAnalyzer::new(AnalyzerConfig {
            max_nodes: 60,
            ..Default::default()
        });
        assert_eq!(tight.analyze(&payload, None, false).complexity, Complexity::Medium);
    }

    #[test]
    fn text_sample_is_capped() {
        let long = "a".repeat(3_000);
        let ctx = ContextAnalyzer::default().analyze(&[frame(vec![text("1", &long)])], None, false);
        assert_eq!(ctx.text_sample.chars().count(), 500);
    }

    #[test]
    fn config_validation() {
        assert!(AnalyzerConfig::default().validate().is_ok());
        let bad = AnalyzerConfig {
            text_sample_chars: 5_000,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
