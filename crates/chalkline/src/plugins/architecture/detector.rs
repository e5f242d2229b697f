//! Architecture detector
//!
//! Scores prose for services, tiers and wiring between them.

use tracing::trace;

use crate::core::{Detector, DiagramKind, KeywordScorer};

const KEYWORDS: &[&str] = &[
    "service", "database", "api", "frontend", "backend", "server", "client", "layer",
    "component", "system", "microservice", "gateway", "queue", "cache", "load balancer", "proxy",
    "container", "cluster", "rest", "grpc", "graphql", "webhook", "endpoint",
];

const PATTERNS: &[&str] = &[
    r"(front.?end|back.?end)",
    r"(micro.?service|web.?server)",
    r"(api|db|cdn|dns|ssl|http|tcp)\b",
    r"(connects?\s+to|communicates?\s+with|talks?\s+to)",
    r"(layer|tier)\s*\d",
];

#[derive(Debug, Clone)]
pub struct ArchitectureDetector {
    scorer: KeywordScorer,
}

impl ArchitectureDetector {
    pub fn new() -> Self {
        Self {
            scorer: KeywordScorer::new(KEYWORDS, 0.15, PATTERNS, 0.25),
        }
    }
}

impl Default for ArchitectureDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for ArchitectureDetector {
    fn confidence(&self, input: &str) -> f64 {
        let text = input.to_lowercase();
        let score = self.scorer.score(&text);
        trace!(score, "Architecture score");
        score.min(1.0)
    }

    fn diagram_type(&self) -> DiagramKind {
        DiagramKind::Architecture
    }

    fn reasoning(&self) -> &'static str {
        "Detected system components, services, or layers"
    }

    fn patterns(&self) -> Vec<&'static str> {
        KEYWORDS.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_stack() {
        let detector = ArchitectureDetector::new();
        let text = "The frontend talks to the backend API, which connects to the database";
        assert_eq!(detector.confidence(text), 1.0);
    }

    #[test]
    fn test_single_keyword() {
        let detector = ArchitectureDetector::new();
        assert!((detector.confidence("a small cluster") - 0.15).abs() < 1e-9);
    }
}
