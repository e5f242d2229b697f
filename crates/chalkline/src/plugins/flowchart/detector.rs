//! Flowchart detector implementation
//!
//! Scores prose for steps, decisions and branching.

use regex::Regex;
use tracing::trace;

use crate::core::{Detector, DiagramKind, KeywordScorer};

const KEYWORDS: &[&str] = &[
    "if ", "then", "else", "step", "process", "decision", "start", "end", "flow", "when",
    "next", "begin", "check", "validate", "verify", "approve", "reject", "submit", "retry",
    "loop", "repeat",
];

const PATTERNS: &[&str] = &[
    r"\bif\b.*\bthen\b",
    r"\bif\s+(yes|no|valid|invalid)\b",
    r"step\s*\d",
    r"\d\.\s+\w+",
    r"(first|second|third|finally|lastly)",
    r"(yes|no)\s*[,:]",
    r"if\s+(yes|no|true|false|valid|invalid)",
];

/// "if X, do Y" phrasing
const CONDITIONAL_ACTION: &str = r"if\s+\w+.*,\s*(do|show|go|redirect|return)";

/// Flowchart detector implementation
#[derive(Debug, Clone)]
pub struct FlowchartDetector {
    scorer: KeywordScorer,
    conditional: Option<Regex>,
}

impl FlowchartDetector {
    pub fn new() -> Self {
        Self {
            scorer: KeywordScorer::new(KEYWORDS, 0.15, PATTERNS, 0.25),
            conditional: Regex::new(CONDITIONAL_ACTION).ok(),
        }
    }
}

impl Default for FlowchartDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for FlowchartDetector {
    fn confidence(&self, input: &str) -> f64 {
        let text = input.to_lowercase();
        let mut score = self.scorer.score(&text);
        if self.conditional.as_ref().is_some_and(|re| re.is_match(&text)) {
            score += 0.4;
        }
        trace!(score, "Flowchart score");
        score.min(1.0)
    }

    fn diagram_type(&self) -> DiagramKind {
        DiagramKind::Flowchart
    }

    fn reasoning(&self) -> &'static str {
        "Detected steps, decisions, or process flow"
    }

    fn patterns(&self) -> Vec<&'static str> {
        KEYWORDS.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_prose_scores_high() {
        let detector = FlowchartDetector::new();
        let text = "User submits the form. If valid, show the dashboard, else retry";
        assert!(detector.detect(text));
        assert_eq!(detector.confidence(text), 1.0);
    }

    #[test]
    fn test_unrelated_text_scores_low() {
        let detector = FlowchartDetector::new();
        assert!(!detector.detect("a quiet afternoon"));
        assert_eq!(detector.confidence(""), 0.0);
    }

    #[test]
    fn test_case_insensitive() {
        let detector = FlowchartDetector::new();
        assert_eq!(
            detector.confidence("STEP 1 VALIDATE"),
            detector.confidence("step 1 validate")
        );
    }
}
