//! Timeline detector
//!
//! Scores prose for dates and chronological wording.

use regex::Regex;
use tracing::trace;

use crate::core::{Detector, DiagramKind, KeywordScorer};

const KEYWORDS: &[&str] = &[
    "timeline", "history", "evolution", "milestone", "era", "chronolog", "founded", "launched",
    "released", "established",
];

const PATTERNS: &[&str] = &[
    r"\b\d{4}\b",
    r"\b(january|february|march|april|may|june|july|august|september|october|november|december)\b",
    r"\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)\s+\d",
    r"(before|after)\s+\d{4}",
    r"\d{4}\s*[-–:]\s*\w+",
];

const YEAR: &str = r"\b(19|20)\d{2}\b";

#[derive(Debug, Clone)]
pub struct TimelineDetector {
    scorer: KeywordScorer,
    year: Option<Regex>,
}

impl TimelineDetector {
    pub fn new() -> Self {
        Self {
            scorer: KeywordScorer::new(KEYWORDS, 0.2, PATTERNS, 0.25),
            year: Regex::new(YEAR).ok(),
        }
    }
}

impl Default for TimelineDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for TimelineDetector {
    fn confidence(&self, input: &str) -> f64 {
        let text = input.to_lowercase();
        let mut score = self.scorer.score(&text);
        let years = self.year.as_ref().map_or(0, |re| re.find_iter(&text).count());
        if years >= 3 {
            score += 0.4;
        } else if years >= 2 {
            score += 0.2;
        }
        trace!(score, years, "Timeline score");
        score.min(1.0)
    }

    fn diagram_type(&self) -> DiagramKind {
        DiagramKind::Timeline
    }

    fn reasoning(&self) -> &'static str {
        "Detected chronological events or dates"
    }

    fn patterns(&self) -> Vec<&'static str> {
        KEYWORDS.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_years_are_strong_signal() {
        let detector = TimelineDetector::new();
        assert_eq!(detector.confidence("2008: founded, 2009: launched, 2010: acquired"), 1.0);
    }

    #[test]
    fn test_two_years_smaller_bonus() {
        let detector = TimelineDetector::new();
        // Year pattern plus the two-year bonus
        assert!((detector.confidence("from 1999 until 2004") - 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_no_dates() {
        let detector = TimelineDetector::new();
        assert_eq!(detector.confidence("cats and dogs"), 0.0);
    }
}
