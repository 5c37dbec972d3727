//! Channel mixing utilities (multi-channel to mono conversion)

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Channel mixing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChannelMixMode {
    /// Keep channel 0 only
    #[default]
    FirstChannel,
    /// Simple average of all channels
    Average,
}

/// Reduce interleaved multi-channel samples to mono
///
/// # Arguments
///
/// * `interleaved` - Interleaved samples (L, R, L, R, ... for stereo)
/// * `channels` - Channel count (must be > 0)
/// * `mode` - Mixing mode
///
/// # Returns
///
/// Mono samples, one per frame. A trailing partial frame is dropped.
pub fn to_mono(
    interleaved: &[f32],
    channels: usize,
    mode: ChannelMixMode,
) -> Result<Vec<f32>, AnalysisError> {
    if channels == 0 {
        return Err(AnalysisError::InvalidInput(
            "Channel count must be > 0".to_string(),
        ));
    }

    if channels == 1 {
        return Ok(interleaved.to_vec());
    }

    log::debug!(
        "Mixing {} interleaved samples ({} channels) to mono using {:?}",
        interleaved.len(),
        channels,
        mode
    );

    let mono = match mode {
        ChannelMixMode::FirstChannel => interleaved
            .chunks_exact(channels)
            .map(|frame| frame[0])
            .collect(),
        ChannelMixMode::Average => interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect(),
    };

    Ok(mono)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_passthrough() {
        let samples = vec![0.1, 0.2, 0.3];
        let mono = to_mono(&samples, 1, ChannelMixMode::FirstChannel).unwrap();
        assert_eq!(mono, samples);
    }

    #[test]
    fn test_first_channel() {
        let stereo = vec![1.0, -1.0, 0.5, -0.5, 0.25, -0.25];
        let mono = to_mono(&stereo, 2, ChannelMixMode::FirstChannel).unwrap();
        assert_eq!(mono, vec![1.0, 0.5, 0.25]);
    }

    #[test]
    fn test_average() {
        let stereo = vec![1.0, 0.0, 0.5, 0.5];
        let mono = to_mono(&stereo, 2, ChannelMixMode::Average).unwrap();
        assert_eq!(mono, vec![0.5, 0.5]);
    }

    #[test]
    fn test_partial_frame_dropped() {
        let samples = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let mono = to_mono(&samples, 2, ChannelMixMode::FirstChannel).unwrap();
        assert_eq!(mono, vec![1.0, 3.0]);
    }

    #[test]
    fn test_zero_channels_rejected() {
        assert!(to_mono(&[0.0], 0, ChannelMixMode::Average).is_err());
    }
}
