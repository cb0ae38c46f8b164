mod context_analyzer;
mod error;
mod keywords;
mod relevance;

pub use context_analyzer::{classify_design_type, AnalyzerConfig, ContextAnalyzer};
pub use error::{Result, SearchError};
pub use keywords::{ExtractionMode, KeywordExtractor};
pub use relevance::{MatchCandidate, MatchStrategy, MatcherConfig, RelevanceScorer, TreeNode};
