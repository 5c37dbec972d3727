//! # Tonality DSP
//!
//! Musical key estimation for short audio previews: given a clip, estimate
//! its tonic and mode together with a confidence and ranked alternatives.
//!
//! ## Features
//!
//! - **Spectral sampling**: Blackman-windowed FFT frames spread evenly across the clip
//! - **Pitch-class accumulation**: 12-bin chroma histogram with exponential temporal smoothing
//! - **Key matching**: Pearson correlation against Krumhansl-Kessler profiles for all 24 keys
//! - **Async facade**: fetch, decode and pace a clip with cancellation and result caching
//!
//! ## Quick Start
//!
//! ```no_run
//! use tonality_dsp::{detect_key, AnalysisConfig};
//!
//! // Load audio samples (mono, f32, normalized)
//! let samples: Vec<f32> = vec![]; // Your audio data
//! let sample_rate = 44100;
//!
//! match detect_key(&samples, sample_rate, &AnalysisConfig::default())? {
//!     Some(estimate) => println!(
//!         "Key: {} (confidence: {:.2})",
//!         estimate.result.key.name(),
//!         estimate.result.confidence
//!     ),
//!     None => println!("No tonal content"),
//! }
//! # Ok::<(), tonality_dsp::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! The analysis pipeline follows this flow:
//!
//! ```text
//! Source → Decode → Mono/Truncate → Spectral Frames → Pitch-Class Histogram → Key Ranking
//! ```
//!
//! [`KeyEstimator`] drives the whole chain asynchronously; [`detect_key`]
//! runs the last three stages over samples already in memory.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod cache;
pub mod config;
pub mod error;
pub mod estimator;
pub mod features;
pub mod io;
pub mod preprocessing;

// Re-export main types
pub use analysis::metadata::AnalysisMetadata;
pub use analysis::result::{
    AnalysisFlag, Key, KeyCandidate, KeyDetectionResult, KeyEstimate, Mode,
};
pub use analysis::session::AnalysisSession;
pub use config::{AnalysisConfig, FramePacing};
pub use error::AnalysisError;
pub use estimator::{AnalysisHandle, KeyEstimator};
pub use features::chroma::PitchClassHistogram;

/// Main analysis function
///
/// Estimates the key of mono samples already in memory. Frames are processed
/// back to back; `config.pacing` does not apply here.
///
/// # Arguments
///
/// * `samples` - Mono audio samples, normalized to [-1.0, 1.0]
/// * `sample_rate` - Sample rate in Hz (typically 44100 or 48000)
/// * `config` - Analysis configuration parameters
///
/// # Returns
///
/// `Some(KeyEstimate)` with the best key, ranked candidates and metadata, or
/// `None` when the clip carries no tonal signal (silence, empty input).
///
/// # Errors
///
/// `InvalidInput` for an invalid configuration or sample rate, `Unsupported`
/// when the FFT size cannot be handled.
///
/// # Example
///
/// ```
/// use tonality_dsp::{detect_key, AnalysisConfig};
///
/// let samples = vec![0.0f32; 44100 * 2]; // 2 seconds of silence
/// let config = AnalysisConfig { seconds_to_analyze: 2.0, frames: 8, ..Default::default() };
/// assert!(detect_key(&samples, 44100, &config)?.is_none());
/// # Ok::<(), tonality_dsp::AnalysisError>(())
/// ```
pub fn detect_key(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Result<Option<KeyEstimate>, AnalysisError> {
    log::debug!(
        "Starting key detection: {} samples at {} Hz",
        samples.len(),
        sample_rate
    );

    config.validate()?;
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput("Invalid sample rate".to_string()));
    }

    let clip = preprocessing::clip::truncate_to_duration(samples, sample_rate, config.seconds_to_analyze);
    let mut session = AnalysisSession::new(
        clip.to_vec(),
        sample_rate,
        config,
        &features::spectrum::FftSpectrumBackend,
    )?;
    while session.process_next_frame()? {}
    Ok(session.finish())
}
