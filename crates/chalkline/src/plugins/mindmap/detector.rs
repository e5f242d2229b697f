//! Mind map detector
//!
//! Scores prose for a central concept broken into branches.

use regex::Regex;
use tracing::trace;

use crate::core::{Detector, DiagramKind, KeywordScorer};

const KEYWORDS: &[&str] = &[
    "aspects of", "categories", "branches", "related to", "subtopics", "brainstorm", "ideas",
    "concepts", "topics", "main topic", "central", "branching", "hierarchy", "breakdown",
    "subdivisions", "mind map", "mindmap", "overview of", "types of", "kinds of", "areas of",
    "components of", "parts of", "elements of",
];

/// "Topic (sub1, sub2)"
const NESTED_GROUP: &str = r"\w+\s*\([^)]+,\s*[^)]+\)";

const PATTERNS: &[&str] = &[
    r"aspects?\s+of\s+",
    r"main\s+(topic|concept|idea)",
    r"central\s+(concept|idea|theme)",
    r"branches?\s+(into|to|of)",
    r"subdivided\s+into",
    r"related\s+(concepts|ideas|topics)",
    r"has\s+branches",
    r"types?\s+of\s+",
    NESTED_GROUP,
];

#[derive(Debug, Clone)]
pub struct MindMapDetector {
    scorer: KeywordScorer,
    nested: Option<Regex>,
}

impl MindMapDetector {
    pub fn new() -> Self {
        Self {
            scorer: KeywordScorer::new(KEYWORDS, 0.2, PATTERNS, 0.3),
            nested: Regex::new(NESTED_GROUP).ok(),
        }
    }
}

impl Default for MindMapDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for MindMapDetector {
    fn confidence(&self, input: &str) -> f64 {
        let text = input.to_lowercase();
        let mut score = self.scorer.score(&text);
        let groups = self.nested.as_ref().map_or(0, |re| re.find_iter(&text).count());
        if groups >= 2 {
            score += 0.4;
        }
        trace!(score, groups, "Mind map score");
        score.min(1.0)
    }

    fn diagram_type(&self) -> DiagramKind {
        DiagramKind::MindMap
    }

    fn reasoning(&self) -> &'static str {
        "Detected central concept with branches or categories"
    }

    fn patterns(&self) -> Vec<&'static str> {
        KEYWORDS.to_vec()
    }
}
