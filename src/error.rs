//! Error types for the key detection engine
//!
//! "No tonal signal" is not an error: analysis entry points return `Ok(None)`
//! for silent or empty clips so callers can tell "found nothing" apart from
//! "could not try".

use thiserror::Error;

/// Errors that can occur during key analysis
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Invalid input parameters (bad configuration, zero sample rate, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A pitch-class vector did not have exactly 12 bins
    #[error("Shape mismatch: expected {expected} pitch-class bins, got {actual}")]
    ShapeMismatch {
        /// Required length
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },

    /// Required decode or transform capability is not available
    #[error("Unsupported capability: {0}")]
    Unsupported(String),

    /// Audio source could not be fetched
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Audio payload could not be decoded
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Analysis was cancelled by the caller before it completed
    #[error("Analysis cancelled")]
    Cancelled,
}

impl AnalysisError {
    /// True for failures to acquire the audio at all (fetch or decode).
    ///
    /// Consumers render these as "analysis failed", distinct from an
    /// undetermined key.
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(
            self,
            AnalysisError::Fetch(_) | AnalysisError::Decoding(_) | AnalysisError::Unsupported(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = AnalysisError::ShapeMismatch {
            expected: 12,
            actual: 10,
        };
        assert_eq!(
            err.to_string(),
            "Shape mismatch: expected 12 pitch-class bins, got 10"
        );
        assert_eq!(AnalysisError::Cancelled.to_string(), "Analysis cancelled");
        assert!(AnalysisError::Fetch("404".into()).to_string().contains("404"));
    }

    #[test]
    fn test_acquisition_failure_classification() {
        assert!(AnalysisError::Fetch("x".into()).is_acquisition_failure());
        assert!(AnalysisError::Decoding("x".into()).is_acquisition_failure());
        assert!(AnalysisError::Unsupported("x".into()).is_acquisition_failure());
        assert!(!AnalysisError::Cancelled.is_acquisition_failure());
        assert!(!AnalysisError::InvalidInput("x".into()).is_acquisition_failure());
    }
}
