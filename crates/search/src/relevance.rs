use critique_protocol::{SerializedNode, Violation};
use critique_serializer::{DesignNode, TraversalBudget};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};
use crate::keywords::{ExtractionMode, KeywordExtractor};

/// Read-only view of a tree the scorer can walk.
///
/// Implemented for host-side [`DesignNode`]s and for already-serialized
/// [`SerializedNode`] payloads.
pub trait TreeNode: Sized {
    fn node_id(&self) -> &str;
    fn display_name(&self) -> &str;
    /// Own text, text-kind nodes only
    fn text_content(&self) -> Option<&str>;
    fn is_visible(&self) -> bool;
    fn child_nodes(&self) -> &[Self];
}

impl TreeNode for DesignNode {
    fn node_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn text_content(&self) -> Option<&str> {
        self.characters()
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn child_nodes(&self) -> &[Self] {
        self.children().unwrap_or_default()
    }
}

impl TreeNode for SerializedNode {
    fn node_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn text_content(&self) -> Option<&str> {
        if self.node_type.is_text() {
            self.text.as_deref()
        } else {
            None
        }
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn child_nodes(&self) -> &[Self] {
        &self.children
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Walk everything, keep the highest score; earlier node wins ties
    #[default]
    BestOfAll,
    /// Stop at the first node with any positive score
    FirstMatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub mode: ExtractionMode,
    pub compact_keyword_cap: usize,
    pub max_depth: usize,
    pub max_fanout: usize,
    pub strategy: MatchStrategy,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::Full,
            compact_keyword_cap: 3,
            max_depth: 6,
            max_fanout: 10,
            strategy: MatchStrategy::BestOfAll,
        }
    }
}

impl MatcherConfig {
    /// Latency-oriented preset: compact keywords, shallow walk, first hit wins.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            mode: ExtractionMode::Compact,
            compact_keyword_cap: 3,
            max_depth: 4,
            max_fanout: 8,
            strategy: MatchStrategy::FirstMatch,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_fanout == 0 {
            return Err(SearchError::invalid_config("matcher.max_fanout must be > 0"));
        }
        if self.mode == ExtractionMode::Compact && self.compact_keyword_cap == 0 {
            return Err(SearchError::invalid_config(
                "matcher.compact_keyword_cap must be > 0 in compact mode",
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn extractor(&self) -> KeywordExtractor {
        KeywordExtractor::new(self.mode, self.compact_keyword_cap)
    }
}

/// A node with a positive score and its position in walk order.
#[derive(Debug)]
pub struct MatchCandidate<'a, N> {
    pub node: &'a N,
    pub score: u64,
    pub order: usize,
}

// Manual impls: derive would require `N: Clone`/`N: Copy`.
impl<N> Clone for MatchCandidate<'_, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N> Copy for MatchCandidate<'_, N> {}

/// Re-associates a critique report with the tree node it most plausibly
/// describes.
///
/// Every keyword contributes the weight of the single best tier it hits:
///
/// | tier | condition | weight |
/// |---|---|---|
/// | exact | name equals keyword | `b^3` |
/// | name | name contains keyword | `b^2` |
/// | text | own text contains keyword | `b` |
/// | reciprocal | keyword (> 3 chars) contains name | `1` |
///
/// with `b = keywords + 1`, so one hit in a higher tier outweighs every
/// keyword hitting the tier below it. Comparisons are case-insensitive.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    config: MatcherConfig,
    extractor: KeywordExtractor,
}

impl Default for RelevanceScorer {
    fn default() -> Self {
        Self::new(MatcherConfig::default())
    }
}

const RECIPROCAL_MIN_CHARS: usize = 4;

impl RelevanceScorer {
    pub fn new(config: MatcherConfig) -> Self {
        let extractor = config.extractor();
        Self { config, extractor }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn keywords(&self, report: &Violation) -> Vec<String> {
        self.extractor.extract(report)
    }

    /// Tiered score of one node against lower-cased `keywords`.
    pub fn score_node<N: TreeNode>(&self, node: &N, keywords: &[String]) -> u64 {
        let base = keywords.len() as u64 + 1;
        let exact = base.saturating_pow(3);
        let contains = base.saturating_pow(2);

        let name = node.display_name().to_lowercase();
        let text = node.text_content().map(str::to_lowercase);

        keywords.iter().fold(0u64, |score, keyword| {
            let weight = if keyword.is_empty() {
                0
            } else if name == *keyword {
                exact
            } else if name.contains(keyword.as_str()) {
                contains
            } else if text.as_deref().is_some_and(|t| t.contains(keyword.as_str())) {
                base
            } else if !name.is_empty()
                && keyword.chars().count() >= RECIPROCAL_MIN_CHARS
                && keyword.contains(name.as_str())
            {
                1
            } else {
                0
            };
            score.saturating_add(weight)
        })
    }

    /// Every positive-scoring node under `roots`, best first. Ties keep walk
    /// order.
    pub fn candidates<'a, N: TreeNode>(
        &self,
        roots: &'a [N],
        keywords: &[String],
    ) -> Vec<MatchCandidate<'a, N>> {
        let mut found = Vec::new();
        self.walk(roots, keywords, |candidate| {
            found.push(candidate);
            true
        });
        found.sort_by(|a, b| b.score.cmp(&a.score).then(a.order.cmp(&b.order)));
        found
    }

    /// Best candidate under the configured strategy.
    pub fn best_match<'a, N: TreeNode>(
        &self,
        roots: &'a [N],
        keywords: &[String],
    ) -> Option<MatchCandidate<'a, N>> {
        if keywords.is_empty() {
            return None;
        }
        let mut best: Option<MatchCandidate<'a, N>> = None;
        let first_only = self.config.strategy == MatchStrategy::FirstMatch;
        self.walk(roots, keywords, |candidate| {
            if best.map_or(true, |current| candidate.score > current.score) {
                best = Some(candidate);
            }
            !first_only
        });
        best
    }

    /// Node the report refers to, if any. The caller decides the fallback.
    pub fn locate<'a, N: TreeNode>(&self, roots: &'a [N], report: &Violation) -> Option<&'a N> {
        let keywords = self.keywords(report);
        let found = self.best_match(roots, &keywords);
        match &found {
            Some(candidate) => log::debug!(
                "report matched node {} ('{}') with score {} using {:?}",
                candidate.node.node_id(),
                candidate.node.display_name(),
                candidate.score,
                keywords
            ),
            None => log::debug!("no node matched keywords {keywords:?}"),
        }
        found.map(|candidate| candidate.node)
    }

    /// Pre-order walk over visible nodes within the depth and fan-out caps.
    /// `visit` returns `false` to stop early.
    fn walk<'a, N, F>(&self, roots: &'a [N], keywords: &[String], mut visit: F)
    where
        N: TreeNode,
        F: FnMut(MatchCandidate<'a, N>) -> bool,
    {
        let budget = TraversalBudget::without_node_limit(self.config.max_depth, self.config.max_fanout);
        let mut order = 0usize;
        for root in roots {
            let mut stack = vec![(root, 0usize)];
            while let Some((node, depth)) = stack.pop() {
                if !node.is_visible() {
                    continue;
                }
                let score = self.score_node(node, keywords);
                if score > 0 && !visit(MatchCandidate { node, score, order }) {
                    return;
                }
                order += 1;

                if budget.admits_depth(depth + 1) {
                    let children = node.child_nodes();
                    let limit = budget.fanout(children.len());
                    stack.extend(children[..limit].iter().rev().map(|child| (child, depth + 1)));
                }
            }
        }
    }
}
