use critique_protocol::Violation;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static QUOTED_SHORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]{2,20})""#).expect("valid quoted regex"));
static QUOTED_ANY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]+)""#).expect("valid quoted regex"));
static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+(?:\.\d+)?\b").expect("valid number regex"));
static UI_TERM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:button|input|field|card|menu|nav|form|link|icon|text|label|number|title|header|footer)\b",
    )
    .expect("valid vocabulary regex")
});
static PATH_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[>\-+()\s]+").expect("valid path separator regex"));

const MIN_PATH_TOKEN_CHARS: usize = 3;

/// How aggressively keywords are gathered from a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Quotes of 2-20 chars, keyword list capped
    Compact,
    /// Quotes of any length, no cap
    #[default]
    Full,
}

/// Turns a critique report into lower-cased, de-duplicated search keywords.
///
/// Fields are read in order title, description, location, recommendation; within a
/// field, quoted phrases come first, then numbers, then UI vocabulary, then
/// (location only) path segments. Earlier keywords survive compact truncation.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    mode: ExtractionMode,
    compact_limit: usize,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(ExtractionMode::Full, 3)
    }
}

impl KeywordExtractor {
    pub fn new(mode: ExtractionMode, compact_limit: usize) -> Self {
        Self {
            mode,
            compact_limit,
        }
    }

    pub fn mode(&self) -> ExtractionMode {
        self.mode
    }

    pub fn extract(&self, report: &Violation) -> Vec<String> {
        let mut keywords = Vec::new();
        let fields = [
            (report.title.as_deref(), false),
            (report.description.as_deref(), false),
            (report.location.as_deref(), true),
            (report.recommendation.as_deref(), false),
        ];
        for (field, is_path) in fields {
            let Some(text) = field.filter(|text| !text.trim().is_empty()) else {
                continue;
            };
            self.extract_field(text, is_path, &mut keywords);
        }

        if self.mode == ExtractionMode::Compact {
            keywords.truncate(self.compact_limit);
        }
        keywords
    }

    fn extract_field(&self, text: &str, is_path: bool, out: &mut Vec<String>) {
        let quoted = match self.mode {
            ExtractionMode::Compact => &*QUOTED_SHORT,
            ExtractionMode::Full => &*QUOTED_ANY,
        };
        for capture in quoted.captures_iter(text) {
            if let Some(inner) = capture.get(1) {
                push_unique(out, inner.as_str());
            }
        }
        for number in NUMBER.find_iter(text) {
            push_unique(out, number.as_str());
        }
        for term in UI_TERM.find_iter(text) {
            push_unique(out, term.as_str());
        }
        if is_path {
            for segment in PATH_SEPARATOR.split(text) {
                if segment.chars().count() >= MIN_PATH_TOKEN_CHARS {
                    push_unique(out, segment);
                }
            }
        }
    }
}

fn push_unique(out: &mut Vec<String>, keyword: &str) {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() || out.contains(&keyword) {
        return;
    }
    out.push(keyword);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn report(title: &str) -> Violation {
        Violation::titled(title)
    }

    #[test]
    fn patterns_compile() {
        for regex in [&QUOTED_SHORT, &QUOTED_ANY, &NUMBER, &UI_TERM, &PATH_SEPARATOR] {
            Lazy::force(regex);
        }
    }

    #[test]
    fn quoted_phrase_then_vocabulary() {
        let keywords = KeywordExtractor::default().extract(&report(r#"Missing label on "Submit Button""#));
        assert_eq!(keywords, vec!["submit button", "label", "button"]);
    }

    #[test]
    fn numbers_are_kept() {
        let keywords = KeywordExtractor::default().extract(&report("Contrast ratio 2.5 below 4.5"));
        assert_eq!(keywords, vec!["2.5", "4.5"]);
    }

    #[test]
    fn location_path_is_split_into_segments() {
        let violation = Violation {
            location: Some("Checkout > Payment Card (Header) - CTA".to_string()),
            ..Default::default()
        };
        let keywords = KeywordExtractor::default().extract(&violation);
        assert_eq!(keywords, vec!["card", "header", "checkout", "payment", "cta"]);
    }

    #[test]
    fn path_splitting_applies_to_location_only() {
        let violation = Violation {
            description: Some("Checkout > Payment".to_string()),
            ..Default::default()
        };
        assert!(KeywordExtractor::default().extract(&violation).is_empty());
    }

    #[test]
    fn compact_mode_bounds_quotes_and_count() {
        let violation = Violation {
            title: Some(r#""A very long quoted phrase indeed""#.to_string()),
            description: Some(r#""Nav bar" button icon link menu"#.to_string()),
            ..Default::default()
        };
        let compact = KeywordExtractor::new(ExtractionMode::Compact, 3).extract(&violation);
        assert_eq!(compact, vec!["nav bar", "nav", "button"]);

        let full = KeywordExtractor::default().extract(&violation);
        assert_eq!(
            full,
            vec![
                "a very long quoted phrase indeed",
                "nav bar",
                "nav",
                "button",
                "icon",
                "link",
                "menu"
            ]
        );
    }

    #[test]
    fn empty_fields_yield_nothing() {
        let violation = Violation {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(KeywordExtractor::default().extract(&violation).is_empty());
        assert!(KeywordExtractor::default().extract(&Violation::default()).is_empty());
    }

    #[test]
    fn duplicates_collapse_case_insensitively() {
        let keywords = KeywordExtractor::default().extract(&report(r#""Button" button BUTTON"#));
        assert_eq!(keywords, vec!["button"]);
    }
}
