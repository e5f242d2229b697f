//! Core error types for diagram construction
//!
//! Every failure the builders, layout algorithms and the serializer can
//! report. Structural failures abort a build before anything is written.

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, DiagramError>;

/// Core error types for diagram construction
#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("Invalid geometry for '{element}': {reason}")]
    InvalidGeometry { element: String, reason: String },

    #[error("Dangling reference: {kind} '{id}' is not declared ({context})")]
    DanglingReference {
        kind: &'static str,
        id: String,
        context: String,
    },

    #[error("Precedence violation: {kind} '{id}' must be declared first ({context})")]
    PrecedenceViolation {
        kind: &'static str,
        id: String,
        context: String,
    },

    #[error("Duplicate element id '{id}'")]
    DuplicateId { id: String },

    /// Recovered locally by the layout; surfaced only through logging
    #[error("Degenerate layout: {reason}")]
    DegenerateLayout { reason: String },

    #[error("Style error: {message}")]
    Style { message: String },

    #[error("Serialization error: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Delivery error: {message}")]
    Delivery { message: String },

    #[error("Unknown diagram type: {diagram_type}")]
    UnknownDiagramType { diagram_type: String },
}

impl DiagramError {
    /// Create a new invalid geometry error
    pub fn invalid_geometry(element: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            element: element.into(),
            reason: reason.into(),
        }
    }

    /// Create a new dangling reference error
    pub fn dangling(kind: &'static str, id: impl Into<String>, context: impl Into<String>) -> Self {
        Self::DanglingReference {
            kind,
            id: id.into(),
            context: context.into(),
        }
    }

    /// Create a new precedence violation error
    pub fn precedence(
        kind: &'static str,
        id: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self::PrecedenceViolation {
            kind,
            id: id.into(),
            context: context.into(),
        }
    }

    /// Create a new degenerate layout error
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateLayout {
            reason: reason.into(),
        }
    }

    /// Create a new style error
    pub fn style(message: impl Into<String>) -> Self {
        Self::Style {
            message: message.into(),
        }
    }

    /// Create a new render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Create a new delivery error
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }

    /// Returns true for failures that must abort a build before writing
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            DiagramError::InvalidGeometry { .. }
                | DiagramError::DanglingReference { .. }
                | DiagramError::PrecedenceViolation { .. }
                | DiagramError::DuplicateId { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_id_is_structural() {
        let error = DiagramError::DuplicateId { id: "box-1".into() };
        assert_eq!(error.to_string(), "Duplicate element id 'box-1'");
        assert!(error.is_structural());
    }

    #[test]
    fn test_invalid_geometry() {
        let error = DiagramError::invalid_geometry("box-1", "width must be positive");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Invalid geometry"));
        assert!(error_msg.contains("box-1"));
        assert!(error_msg.contains("width must be positive"));
        assert!(error.is_structural());
    }

    #[test]
    fn test_dangling_reference() {
        let error = DiagramError::dangling("participant", "carol", "message #2");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Dangling reference"));
        assert!(error_msg.contains("participant 'carol'"));
        assert!(error_msg.contains("message #2"));
    }

    #[test]
    fn test_precedence_violation() {
        let error = DiagramError::precedence("entity", "order", "relationship 'has'");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Precedence violation"));
        assert!(error_msg.contains("entity 'order'"));
    }

    #[test]
    fn test_degenerate_is_not_structural() {
        let error = DiagramError::degenerate("no source node");
        assert!(format!("{}", error).contains("Degenerate layout"));
        assert!(!error.is_structural());
    }

    #[test]
    fn test_io_error_conversion() {
        use std::io;
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: DiagramError = io_err.into();
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("IO error"));
        assert!(error_msg.contains("File not found"));
    }
}
