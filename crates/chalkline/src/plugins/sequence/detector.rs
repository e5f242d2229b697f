//! Sequence diagram detector
//!
//! Scores prose for messages passed between actors.

use regex::Regex;
use tracing::trace;

use crate::core::{Detector, DiagramKind, KeywordScorer};

const KEYWORDS: &[&str] = &[
    "sends", "receives", "request", "response", "calls", "returns", "message", "actor", "reply",
    "acknowledge", "notify", "publish", "subscribe", "emit", "trigger", "callback", "webhook",
];

const PATTERNS: &[&str] = &[
    r"\w+\s+sends?\s+\w+\s+to\s+\w+",
    r"\w+\s+(calls?|requests?)\s+\w+",
    r"\w+\s+returns?\s+\w+",
    r"\w+\s+responds?\s+(with|to)\s+",
    r"(request|response)\s+(from|to)\s+",
];

/// "X to Y" hops
const HOP: &str = r"\b\w+\s+to\s+\w+\b";

/// Detector for message-passing prose
#[derive(Debug, Clone)]
pub struct SequenceDetector {
    scorer: KeywordScorer,
    hop: Option<Regex>,
}

impl SequenceDetector {
    pub fn new() -> Self {
        Self {
            scorer: KeywordScorer::new(KEYWORDS, 0.15, PATTERNS, 0.3),
            hop: Regex::new(HOP).ok(),
        }
    }
}

impl Default for SequenceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for SequenceDetector {
    fn confidence(&self, input: &str) -> f64 {
        let text = input.to_lowercase();
        let mut score = self.scorer.score(&text);
        let hops = self.hop.as_ref().map_or(0, |re| re.find_iter(&text).count());
        if hops >= 3 {
            score += 0.3;
        }
        trace!(score, hops, "Sequence score");
        score.min(1.0)
    }

    fn diagram_type(&self) -> DiagramKind {
        DiagramKind::Sequence
    }

    fn reasoning(&self) -> &'static str {
        "Detected message passing between actors/services"
    }

    fn patterns(&self) -> Vec<&'static str> {
        KEYWORDS.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_message_passing() {
        let detector = SequenceDetector::new();
        let text = "Client sends request to server, server returns token";
        assert!(detector.detect(text));
        assert!(detector.confidence(text) >= 0.9);
    }

    #[test]
    fn test_hops_add_signal() {
        let detector = SequenceDetector::new();
        let hops = "a to b, b to c, c to d";
        assert!((detector.confidence(hops) - 0.3).abs() < 1e-9);
        assert_eq!(detector.confidence("a to b"), 0.0);
    }

    #[test]
    fn test_rejects_unrelated_text() {
        let detector = SequenceDetector::new();
        assert!(!detector.detect("blue sky over green hills"));
    }
}
