//! Decoded PCM buffers

use crate::error::AnalysisError;
use crate::preprocessing::channel_mixer::{to_mono, ChannelMixMode};

/// Interleaved PCM audio as produced by an [`AudioDecoder`](super::decoder::AudioDecoder)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedAudio {
    /// Interleaved samples in [-1.0, 1.0] (L, R, L, R, ... for stereo)
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Channel count
    pub channels: usize,
}

impl DecodedAudio {
    /// Wrap interleaved samples
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: usize) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Number of sample frames (one sample per channel each)
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels
        }
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f32 / self.sample_rate as f32
    }

    /// De-interleave one channel
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `idx` is not a valid channel.
    pub fn channel(&self, idx: usize) -> Result<Vec<f32>, AnalysisError> {
        if idx >= self.channels {
            return Err(AnalysisError::InvalidInput(format!(
                "Channel {} out of range for {}-channel audio",
                idx, self.channels
            )));
        }
        Ok(self
            .samples
            .chunks_exact(self.channels)
            .map(|frame| frame[idx])
            .collect())
    }

    /// Reduce to mono, consuming the buffer
    pub fn into_mono(self, mode: ChannelMixMode) -> Result<Vec<f32>, AnalysisError> {
        if self.channels == 1 {
            return Ok(self.samples);
        }
        to_mono(&self.samples, self.channels, mode)
    }

    /// Drop everything after `seconds`
    pub fn truncate_seconds(&mut self, seconds: f32) {
        let frames = crate::preprocessing::clip::samples_for_duration(seconds, self.sample_rate);
        let limit = frames.saturating_mul(self.channels);
        if self.samples.len() > limit {
            self.samples.truncate(limit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo() -> DecodedAudio {
        DecodedAudio::new(vec![0.1, -0.1, 0.2, -0.2, 0.3, -0.3, 0.4, -0.4], 4, 2)
    }

    #[test]
    fn test_frames_and_duration() {
        let audio = stereo();
        assert_eq!(audio.frames(), 4);
        assert!((audio.duration_seconds() - 1.0).abs() < 1e-6);
        assert_eq!(DecodedAudio::default().duration_seconds(), 0.0);
    }

    #[test]
    fn test_channel() {
        let audio = stereo();
        assert_eq!(audio.channel(0).unwrap(), vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(audio.channel(1).unwrap(), vec![-0.1, -0.2, -0.3, -0.4]);
        assert!(audio.channel(2).is_err());
    }

    #[test]
    fn test_into_mono_first_channel() {
        let mono = stereo().into_mono(ChannelMixMode::FirstChannel).unwrap();
        assert_eq!(mono, vec![0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_truncate_seconds() {
        let mut audio = stereo();
        audio.truncate_seconds(0.5);
        assert_eq!(audio.frames(), 2);
        assert_eq!(audio.samples, vec![0.1, -0.1, 0.2, -0.2]);
    }
}
