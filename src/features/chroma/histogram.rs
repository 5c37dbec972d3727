//! Fixed-size pitch-class histogram

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Number of pitch classes in twelve-tone equal temperament
pub const PITCH_CLASSES: usize = 12;

/// Pitch-class names, index 0 = C, sharp spelling
pub const PITCH_CLASS_NAMES: [&str; PITCH_CLASSES] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Accumulated energy per pitch class
///
/// Index 0 is C and each following index is one semitone higher. The length
/// is fixed by the type; use [`PitchClassHistogram::from_slice`] to build one
/// from unchecked data.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PitchClassHistogram([f32; PITCH_CLASSES]);

impl PitchClassHistogram {
    /// Wrap 12 bins
    pub const fn new(bins: [f32; PITCH_CLASSES]) -> Self {
        Self(bins)
    }

    /// The all-zero histogram ("no tonal energy observed")
    pub const fn zeros() -> Self {
        Self([0.0; PITCH_CLASSES])
    }

    /// Build from a slice, which must hold exactly 12 values
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` for any other length. Input is never padded or truncated.
    /// `InvalidInput` when a bin is NaN or infinite.
    pub fn from_slice(values: &[f32]) -> Result<Self, AnalysisError> {
        let bins: [f32; PITCH_CLASSES] =
            values
                .try_into()
                .map_err(|_| AnalysisError::ShapeMismatch {
                    expected: PITCH_CLASSES,
                    actual: values.len(),
                })?;
        if let Some(i) = bins.iter().position(|v| !v.is_finite()) {
            return Err(AnalysisError::InvalidInput(format!(
                "Pitch-class bin {} is not finite ({})",
                i, bins[i]
            )));
        }
        Ok(Self(bins))
    }

    /// Bin values
    pub fn bins(&self) -> &[f32; PITCH_CLASSES] {
        &self.0
    }

    /// Sum of all bins
    pub fn sum(&self) -> f32 {
        self.0.iter().sum()
    }

    /// Largest bin value
    pub fn max_bin(&self) -> f32 {
        self.0.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Index of the largest bin (lowest index on ties)
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, &v) in self.0.iter().enumerate() {
            if v > self.0[best] {
                best = i;
            }
        }
        best
    }

    /// True when no bin carries positive energy
    pub fn is_silent(&self) -> bool {
        self.max_bin() <= 0.0
    }

    /// Bins scaled to sum to 1, or `None` without signal
    ///
    /// See [`normalize_histogram`](super::normalization::normalize_histogram).
    pub fn normalized(&self) -> Option<Self> {
        super::normalization::normalize_histogram(self)
    }

    /// Cyclic shift: `rotated(n)[(i + n) % 12] == self[i]`
    pub fn rotated(&self, n: usize) -> Self {
        let mut out = [0.0; PITCH_CLASSES];
        for (i, &v) in self.0.iter().enumerate() {
            out[(i + n) % PITCH_CLASSES] = v;
        }
        Self(out)
    }
}

impl From<[f32; PITCH_CLASSES]> for PitchClassHistogram {
    fn from(bins: [f32; PITCH_CLASSES]) -> Self {
        Self(bins)
    }
}

impl TryFrom<&[f32]> for PitchClassHistogram {
    type Error = AnalysisError;

    fn try_from(values: &[f32]) -> Result<Self, Self::Error> {
        Self::from_slice(values)
    }
}

impl std::ops::Index<usize> for PitchClassHistogram {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.0[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_shape() {
        assert!(PitchClassHistogram::from_slice(&[0.0; 12]).is_ok());
        assert_eq!(
            PitchClassHistogram::from_slice(&[0.0; 10]),
            Err(AnalysisError::ShapeMismatch {
                expected: 12,
                actual: 10
            })
        );
        assert!(PitchClassHistogram::from_slice(&[0.0; 13]).is_err());
    }

    #[test]
    fn test_from_slice_rejects_non_finite() {
        let mut bins = [0.1f32; 12];
        bins[5] = f32::NAN;
        assert!(matches!(
            PitchClassHistogram::from_slice(&bins),
            Err(AnalysisError::InvalidInput(_))
        ));
        bins[5] = f32::INFINITY;
        assert!(matches!(
            PitchClassHistogram::try_from(&bins[..]),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rotation() {
        let mut bins = [0.0; 12];
        bins[0] = 1.0;
        bins[4] = 2.0;
        let h = PitchClassHistogram::new(bins);
        let r = h.rotated(3);
        assert_eq!(r[3], 1.0);
        assert_eq!(r[7], 2.0);
        assert_eq!(h.rotated(12), h);
        // Rotating by -n (i.e. 12 - n) undoes rotation by n
        assert_eq!(r.rotated(9), h);
    }

    #[test]
    fn test_silence_and_argmax() {
        assert!(PitchClassHistogram::zeros().is_silent());
        let h = PitchClassHistogram::new([0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 3.0, 0.0, 1.0]);
        assert!(!h.is_silent());
        assert_eq!(h.argmax(), 2);
        assert_eq!(h.sum(), 7.0);
        assert_eq!(h.max_bin(), 3.0);
    }
}
