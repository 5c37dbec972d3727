//! Short-time spectrum capability
//!
//! The key engine only needs one thing from a transform facility: a dB
//! magnitude spectrum of a fixed-length window. That contract lives in
//! [`SpectrumAnalyzer`]; [`SpectrumBackend`] creates one analyzer per
//! analysis run so each run owns its own transform state.

pub mod analyzer;

pub use analyzer::{FftSpectrumAnalyzer, FftSpectrumBackend};

use crate::error::AnalysisError;

/// Produces dB magnitude spectra for fixed-size windows
pub trait SpectrumAnalyzer: Send {
    /// Transform length in samples
    fn window_size(&self) -> usize;

    /// Write `window_size / 2` dB magnitudes for `window` into `out`
    ///
    /// Bins with zero magnitude are `f32::NEG_INFINITY`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `window.len() != window_size()` or
    /// `out.len() != window_size() / 2`.
    fn magnitude_db(&mut self, window: &[f32], out: &mut [f32]) -> Result<(), AnalysisError>;
}

/// Factory for per-run spectrum analyzers
pub trait SpectrumBackend: Send + Sync {
    /// Create an analyzer for `window_size`-sample windows
    ///
    /// # Errors
    ///
    /// `Unsupported` when the backend cannot transform windows of this size.
    fn create(&self, window_size: usize) -> Result<Box<dyn SpectrumAnalyzer>, AnalysisError>;
}
