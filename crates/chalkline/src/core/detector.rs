//! Core detector trait for diagram type classification
//!
//! Each plugin scores free text on its own keywords and patterns; the
//! router picks the best score.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::DiagramKind;

/// Scores below this never select a specific diagram type
pub const DETECTION_THRESHOLD: f64 = 0.2;

/// Core trait for diagram type detectors
///
/// # Example
/// ```
/// use chalkline::core::Detector;
/// use chalkline::plugins::flowchart::FlowchartDetector;
///
/// let detector = FlowchartDetector::new();
/// assert!(detector.detect("Submit the form, then validate it. If valid, show the dashboard"));
/// ```
pub trait Detector: Send + Sync {
    /// Returns true if the text scores at or above the detection threshold
    fn detect(&self, input: &str) -> bool {
        self.confidence(input) >= DETECTION_THRESHOLD
    }

    /// Get the confidence level of the detection (0.0 to 1.0)
    fn confidence(&self, input: &str) -> f64;

    /// Get the diagram type this detector recognizes
    fn diagram_type(&self) -> DiagramKind;

    /// Why this type would be chosen
    fn reasoning(&self) -> &'static str;

    /// Get key phrases that this detector looks for
    fn patterns(&self) -> Vec<&'static str>;
}

/// Outcome of classifying a piece of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub diagram_type: DiagramKind,
    /// Rounded to two decimals
    pub confidence: f64,
    pub reasoning: String,
}

impl Classification {
    pub fn new(diagram_type: DiagramKind, confidence: f64, reasoning: impl Into<String>) -> Self {
        Self {
            diagram_type,
            confidence: round2(confidence.clamp(0.0, 1.0)),
            reasoning: reasoning.into(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Weighted keyword and regex scoring shared by the detectors
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    keywords: &'static [&'static str],
    keyword_weight: f64,
    patterns: Vec<Regex>,
    pattern_weight: f64,
}

impl KeywordScorer {
    /// Compile the patterns; a pattern that fails to compile is skipped
    pub fn new(
        keywords: &'static [&'static str],
        keyword_weight: f64,
        patterns: &[&str],
        pattern_weight: f64,
    ) -> Self {
        let mut compiled = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let Ok(re) = Regex::new(pattern) else {
                tracing::warn!(pattern, "Skipping detector pattern that does not compile");
                continue;
            };
            compiled.push(re);
        }
        Self {
            keywords,
            keyword_weight,
            patterns: compiled,
            pattern_weight,
        }
    }

    /// Sum of keyword hits and pattern matches on lowercased text, unclamped
    pub fn score(&self, text: &str) -> f64 {
        let keyword_hits = self.keywords.iter().filter(|k| text.contains(*k)).count();
        let pattern_hits = self.patterns.iter().filter(|re| re.is_match(text)).count();
        keyword_hits as f64 * self.keyword_weight + pattern_hits as f64 * self.pattern_weight
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        self.keywords
    }
}
