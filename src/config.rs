//! Configuration parameters for key analysis

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::preprocessing::channel_mixer::ChannelMixMode;

/// How frames are scheduled in wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FramePacing {
    /// Process frames back to back against the decoded buffer
    #[default]
    Immediate,
    /// Wait `seconds_to_analyze / frames` between frames, tracking the clip
    /// as it would play
    RealTime,
}

/// Analysis configuration parameters
///
/// Deserializes from the camelCase option names used by front ends, e.g.
/// `{"secondsToAnalyze": 18, "fftSize": 4096, "frames": 96}`. Missing fields
/// take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisConfig {
    /// Clip duration analyzed, in seconds (default: 18.0)
    /// Also sets the frame cadence: frames are spread evenly over this span.
    pub seconds_to_analyze: f32,

    /// Spectral transform length, must be a power of two (default: 4096)
    pub fft_size: usize,

    /// Number of spectral frames sampled across the clip (default: 96)
    pub frames: usize,

    /// Exponential smoothing factor for the pitch-class accumulator (default: 0.85)
    /// Higher values favour long-run accumulated energy.
    pub smoothing_alpha: f32,

    /// Noise floor in dB; quieter spectral bins are ignored (default: -85.0)
    pub min_db: f32,

    /// Lowest frequency mapped to a pitch class, in Hz (default: 50.0)
    pub min_frequency_hz: f32,

    /// Highest frequency mapped to a pitch class, in Hz (default: 2000.0)
    pub max_frequency_hz: f32,

    /// Number of ranked candidates returned alongside the best key (default: 5)
    pub top_n: usize,

    /// Frame scheduling policy (default: Immediate)
    pub pacing: FramePacing,

    /// How multi-channel audio is reduced to mono (default: FirstChannel)
    pub channel_mix: ChannelMixMode,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            seconds_to_analyze: 18.0,
            fft_size: 4096,
            frames: 96,
            smoothing_alpha: 0.85,
            min_db: -85.0,
            min_frequency_hz: 50.0,
            max_frequency_hz: 2000.0,
            top_n: 5,
            pacing: FramePacing::Immediate,
            channel_mix: ChannelMixMode::FirstChannel,
        }
    }
}

impl AnalysisConfig {
    /// Check parameter ranges
    ///
    /// # Errors
    ///
    /// `InvalidInput` for out-of-range values. A transform length that is not a
    /// power of two is reported as `Unsupported`, since it is the transform
    /// facility that cannot honour it.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(self.seconds_to_analyze.is_finite() && self.seconds_to_analyze > 0.0) {
            return Err(AnalysisError::InvalidInput(format!(
                "secondsToAnalyze must be > 0, got {}",
                self.seconds_to_analyze
            )));
        }
        if self.frames == 0 {
            return Err(AnalysisError::InvalidInput(
                "frames must be > 0".to_string(),
            ));
        }
        if self.fft_size < 2 || !self.fft_size.is_power_of_two() {
            return Err(AnalysisError::Unsupported(format!(
                "fftSize must be a power of two >= 2, got {}",
                self.fft_size
            )));
        }
        if !(0.0..1.0).contains(&self.smoothing_alpha) {
            return Err(AnalysisError::InvalidInput(format!(
                "smoothing alpha must be in [0, 1), got {}",
                self.smoothing_alpha
            )));
        }
        if !self.min_db.is_finite() {
            return Err(AnalysisError::InvalidInput(format!(
                "noise floor must be finite, got {} dB",
                self.min_db
            )));
        }
        if !(self.min_frequency_hz > 0.0 && self.max_frequency_hz > self.min_frequency_hz) {
            return Err(AnalysisError::InvalidInput(format!(
                "Invalid frequency window: min={} Hz, max={} Hz",
                self.min_frequency_hz, self.max_frequency_hz
            )));
        }
        Ok(())
    }

    /// Delay between frames under real-time pacing
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.seconds_to_analyze as f64 / self.frames.max(1) as f64)
    }
}
