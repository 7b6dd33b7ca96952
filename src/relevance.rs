// src/relevance.rs
//! Keyword relevance gate for sources that are not AI-scoped upstream.

use crate::keywords::KeywordTable;
use std::sync::Arc;

/// Deterministic, pure keyword classifier. Coarse by design: substring
/// matching over a fixed term list, no NLP. The false-positive/negative
/// trade-off is accepted; tune the table, not this code.
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    table: Arc<KeywordTable>,
}

impl RelevanceFilter {
    pub fn new(table: Arc<KeywordTable>) -> Self {
        Self { table }
    }

    /// True when headline + summary mention any known AI term.
    pub fn is_relevant(&self, headline: &str, summary: Option<&str>) -> bool {
        // The trailing space when summary is absent keeps the "ai " / " ai"
        // word-boundary terms matching at the end of a headline.
        let content = format!("{} {}", headline, summary.unwrap_or_default()).to_lowercase();
        self.table
            .relevance
            .iter()
            .any(|k| content.contains(k.as_str()))
    }

    pub fn table(&self) -> &KeywordTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> RelevanceFilter {
        RelevanceFilter::new(Arc::new(KeywordTable::embedded()))
    }

    #[test]
    fn neural_network_headline_is_relevant() {
        assert!(filter().is_relevant("New neural network beats benchmark", None));
    }

    #[test]
    fn bakery_story_is_not_relevant() {
        assert!(!filter().is_relevant("Local bakery wins award", Some("best bread in town")));
    }

    #[test]
    fn summary_alone_can_make_a_story_relevant() {
        assert!(filter().is_relevant(
            "Quarterly results announced",
            Some("The company credits its ChatGPT integration")
        ));
    }

    #[test]
    fn trailing_ai_token_matches_via_padding() {
        assert!(filter().is_relevant("Chess grandmaster beaten by AI", None));
    }

    #[test]
    fn classification_is_deterministic() {
        let f = filter();
        let verdicts: Vec<bool> = (0..3)
            .map(|_| f.is_relevant("robotics startup raises round", None))
            .collect();
        assert_eq!(verdicts, vec![true, true, true]);
    }
}
