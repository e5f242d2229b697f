//! Entity-relationship detector
//!
//! Scores prose for tables, attributes and cardinality wording.

use regex::Regex;
use tracing::trace;

use crate::core::{Detector, DiagramKind, KeywordScorer};

const KEYWORDS: &[&str] = &[
    "entity", "relationship", "has many", "belongs to", "one to many", "many to many",
    "one to one", "attributes", "fields", "table", "schema", "foreign key", "primary key",
    "column", "record",
];

const RELATION: &str = r"(has\s+many|belongs\s+to|has\s+one)";

const PATTERNS: &[&str] = &[
    RELATION,
    r"(one|many)\s+to\s+(one|many)",
    r"entity\s+\w+\s+has",
    r"(table|entity)\s+\w+",
    r"attributes?\s*[:=]",
];

#[derive(Debug, Clone)]
pub struct ErDetector {
    scorer: KeywordScorer,
    relation: Option<Regex>,
}

impl ErDetector {
    pub fn new() -> Self {
        Self {
            scorer: KeywordScorer::new(KEYWORDS, 0.2, PATTERNS, 0.3),
            relation: Regex::new(RELATION).ok(),
        }
    }
}

impl Default for ErDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for ErDetector {
    fn confidence(&self, input: &str) -> f64 {
        let text = input.to_lowercase();
        let mut score = self.scorer.score(&text);
        let relations = self
            .relation
            .as_ref()
            .map_or(0, |re| re.find_iter(&text).count());
        if relations >= 2 {
            score += 0.4;
        }
        trace!(score, relations, "ER score");
        score.min(1.0)
    }

    fn diagram_type(&self) -> DiagramKind {
        DiagramKind::Er
    }

    fn reasoning(&self) -> &'static str {
        "Detected entities with attributes and relationships"
    }

    fn patterns(&self) -> Vec<&'static str> {
        KEYWORDS.to_vec()
    }
}
