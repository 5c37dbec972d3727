//! Temporal pitch-class smoothing
//!
//! Raw frame vectors are summed into a running total, and the total is
//! tracked by an exponential moving average:
//!
//! ```text
//! raw_total[i] += frame[i]
//! smoothed[i]   = alpha * smoothed[i] + (1 - alpha) * raw_total[i]
//! ```
//!
//! The result follows long-run accumulated energy while damping any single
//! loud frame. Smoothing is order sensitive: frames must arrive in time order.

use super::histogram::{PitchClassHistogram, PITCH_CLASSES};

/// Default smoothing factor
pub const DEFAULT_SMOOTHING_ALPHA: f32 = 0.85;

/// Running pitch-class histogram with exponential smoothing
#[derive(Debug, Clone)]
pub struct PitchClassAccumulator {
    raw_total: [f32; PITCH_CLASSES],
    smoothed: [f32; PITCH_CLASSES],
    alpha: f32,
    frames_seen: usize,
}

impl PitchClassAccumulator {
    /// Create an empty accumulator
    ///
    /// `alpha` is clamped to [0, 1].
    pub fn new(alpha: f32) -> Self {
        Self {
            raw_total: [0.0; PITCH_CLASSES],
            smoothed: [0.0; PITCH_CLASSES],
            alpha: alpha.clamp(0.0, 1.0),
            frames_seen: 0,
        }
    }

    /// Add the next frame's raw pitch-class energies
    pub fn push(&mut self, frame: &[f32; PITCH_CLASSES]) {
        let alpha = self.alpha;
        for i in 0..PITCH_CLASSES {
            self.raw_total[i] += frame[i];
            self.smoothed[i] = alpha * self.smoothed[i] + (1.0 - alpha) * self.raw_total[i];
        }
        self.frames_seen += 1;
    }

    /// Frames accumulated so far
    pub fn frames_seen(&self) -> usize {
        self.frames_seen
    }

    /// Unsmoothed sum of all frames
    pub fn raw_total(&self) -> PitchClassHistogram {
        PitchClassHistogram::new(self.raw_total)
    }

    /// Current smoothed histogram
    pub fn smoothed(&self) -> PitchClassHistogram {
        PitchClassHistogram::new(self.smoothed)
    }

    /// Consume the accumulator, yielding the final smoothed histogram
    pub fn finish(self) -> PitchClassHistogram {
        log::debug!(
            "Pitch-class accumulator finished after {} frames",
            self.frames_seen
        );
        PitchClassHistogram::new(self.smoothed)
    }
}

impl Default for PitchClassAccumulator {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING_ALPHA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(pc: usize) -> [f32; PITCH_CLASSES] {
        let mut frame = [0.0; PITCH_CLASSES];
        frame[pc] = 1.0;
        frame
    }

    #[test]
    fn test_single_frame() {
        let mut acc = PitchClassAccumulator::new(0.85);
        acc.push(&unit(9));
        let s = acc.smoothed();
        assert!((s[9] - 0.15).abs() < 1e-6);
        assert_eq!(acc.raw_total()[9], 1.0);
        assert_eq!(acc.frames_seen(), 1);
    }

    #[test]
    fn test_recurrence() {
        let mut acc = PitchClassAccumulator::new(0.5);
        acc.push(&unit(0)); // raw 1, smoothed 0.5
        acc.push(&unit(0)); // raw 2, smoothed 0.25 + 1.0
        assert!((acc.smoothed()[0] - 1.25).abs() < 1e-6);
    }

    #[test]
    fn test_transient_is_damped() {
        // One loud frame of D, followed by steady C
        let mut acc = PitchClassAccumulator::default();
        let mut loud = [0.0; PITCH_CLASSES];
        loud[2] = 5.0;
        acc.push(&loud);
        for _ in 0..40 {
            acc.push(&unit(0));
        }
        let s = acc.finish();
        assert!(s[0] > s[2], "steady C should outweigh a single loud D");
    }

    #[test]
    fn test_order_sensitive() {
        let mut a = PitchClassAccumulator::default();
        a.push(&unit(0));
        a.push(&unit(7));
        let mut b = PitchClassAccumulator::default();
        b.push(&unit(7));
        b.push(&unit(0));
        assert_ne!(a.smoothed(), b.smoothed());
    }

    #[test]
    fn test_zero_frames_stay_silent() {
        let mut acc = PitchClassAccumulator::default();
        for _ in 0..10 {
            acc.push(&[0.0; PITCH_CLASSES]);
        }
        assert!(acc.finish().is_silent());
    }
}
