//! Chroma extraction modules
//!
//! Build a pitch-class distribution (12 semitones) from audio:
//! - Fixed-size histogram type
//! - Per-frame chroma extraction from dB spectra
//! - Temporal smoothing across frames
//! - Normalization

pub mod extractor;
pub mod histogram;
pub mod normalization;
pub mod smoothing;

pub use extractor::{frame_schedule, pitch_class_for_frequency, FrameSampler, SpectralFilter};
pub use histogram::{PitchClassHistogram, PITCH_CLASSES, PITCH_CLASS_NAMES};
pub use normalization::normalize_histogram;
pub use smoothing::PitchClassAccumulator;
