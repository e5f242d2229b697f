//! Diagram type router
//!
//! Runs every detector over the text and picks the best-scoring diagram
//! type. Weak matches fall back to a freeform diagram.

use std::sync::LazyLock;
use tracing::{debug, info, span, trace, Level};

use crate::core::{Classification, Detector, DiagramKind, DETECTION_THRESHOLD};
use crate::plugins::architecture::ArchitectureDetector;
use crate::plugins::er::ErDetector;
use crate::plugins::flowchart::FlowchartDetector;
use crate::plugins::mindmap::MindMapDetector;
use crate::plugins::sequence::SequenceDetector;
use crate::plugins::timeline::TimelineDetector;

/// Built-in detectors, compiled once
static DEFAULT_ROUTER: LazyLock<Router> = LazyLock::new(Router::new);

/// Confidence reported for the freeform fallback
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

pub const FALLBACK_REASONING: &str = "No strong pattern detected, defaulting to simple diagram";

/// Classifier over the registered detectors
///
/// Detectors are consulted in registration order and the first one wins a
/// tie.
///
/// # Example
/// ```
/// use chalkline::prelude::*;
///
/// let router = Router::new();
/// let result = router.classify("User logs in, then the system checks credentials. If valid, show the dashboard");
/// assert_eq!(result.diagram_type, DiagramKind::Flowchart);
/// ```
pub struct Router {
    detectors: Vec<Box<dyn Detector>>,
}

impl Router {
    /// Router with every built-in detector in priority order
    pub fn new() -> Self {
        Self {
            detectors: vec![
                Box::new(FlowchartDetector::new()),
                Box::new(ArchitectureDetector::new()),
                Box::new(SequenceDetector::new()),
                Box::new(MindMapDetector::new()),
                Box::new(TimelineDetector::new()),
                Box::new(ErDetector::new()),
            ],
        }
    }

    /// Router without detectors; everything classifies as freeform
    pub fn empty() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    pub fn register_detector(&mut self, detector: Box<dyn Detector>) {
        self.detectors.push(detector);
    }

    /// Diagram types known to the registered detectors, in priority order
    pub fn detectors(&self) -> Vec<DiagramKind> {
        self.detectors.iter().map(|d| d.diagram_type()).collect()
    }

    /// Every detector's score, in priority order
    pub fn scores(&self, text: &str) -> Vec<(DiagramKind, f64)> {
        self.detectors
            .iter()
            .map(|d| (d.diagram_type(), d.confidence(text)))
            .collect()
    }

    pub fn classify(&self, text: &str) -> Classification {
        let classify_span = span!(Level::INFO, "classify", input_len = text.len());
        let _enter = classify_span.enter();

        let mut best: Option<(&dyn Detector, f64)> = None;
        for detector in &self.detectors {
            let score = detector.confidence(text);
            trace!(detector = %detector.diagram_type(), score, "Scored text");
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((detector.as_ref(), score));
            }
        }

        match best {
            Some((detector, score)) if score >= DETECTION_THRESHOLD => {
                info!(diagram_type = %detector.diagram_type(), score, "Classified text");
                Classification::new(detector.diagram_type(), score, detector.reasoning())
            }
            _ => {
                debug!("No detector reached the threshold");
                Classification::new(DiagramKind::Freeform, FALLBACK_CONFIDENCE, FALLBACK_REASONING)
            }
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify with the built-in detectors
pub fn classify(text: &str) -> Classification {
    DEFAULT_ROUTER.classify(text)
}
