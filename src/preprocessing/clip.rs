//! Clip truncation

/// Number of samples covering `seconds` at `sample_rate`
pub fn samples_for_duration(seconds: f32, sample_rate: u32) -> usize {
    (seconds.max(0.0) as f64 * sample_rate as f64).round() as usize
}

/// Truncate mono samples to at most `seconds` of audio
///
/// Shorter clips are returned whole.
pub fn truncate_to_duration(samples: &[f32], sample_rate: u32, seconds: f32) -> &[f32] {
    let limit = samples_for_duration(seconds, sample_rate);
    if samples.len() > limit {
        log::debug!(
            "Truncating clip from {} to {} samples ({:.2} s)",
            samples.len(),
            limit,
            seconds
        );
        &samples[..limit]
    } else {
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncates_long_clip() {
        let samples = vec![0.0f32; 44100 * 30];
        let clip = truncate_to_duration(&samples, 44100, 18.0);
        assert_eq!(clip.len(), 44100 * 18);
    }

    #[test]
    fn test_keeps_short_clip() {
        let samples = vec![0.0f32; 1000];
        let clip = truncate_to_duration(&samples, 44100, 18.0);
        assert_eq!(clip.len(), 1000);
    }

    #[test]
    fn test_samples_for_fractional_duration() {
        assert_eq!(samples_for_duration(0.5, 48000), 24000);
        assert_eq!(samples_for_duration(-1.0, 48000), 0);
    }
}
