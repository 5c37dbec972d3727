//! Krumhansl-Kessler key profiles
//!
//! Probe-tone ratings for a major and a minor key with the tonic at index 0.
//! Other tonics are tested by rotating the profile.
//!
//! # Reference
//!
//! Krumhansl, C. L., & Kessler, E. J. (1982). Tracing the Dynamic Changes in Perceived
//! Tonal Organization in a Spatial Representation of Musical Keys. *Psychological Review*,
//! 89(4), 334-368.

use crate::analysis::result::Mode;
use crate::features::chroma::PITCH_CLASSES;

/// Expected pitch-class salience for one mode, tonic at index 0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyProfile {
    weights: [f32; PITCH_CLASSES],
}

impl KeyProfile {
    /// Major key profile
    pub const MAJOR: KeyProfile = KeyProfile {
        weights: [
            6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
        ],
    };

    /// Minor key profile
    pub const MINOR: KeyProfile = KeyProfile {
        weights: [
            6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
        ],
    };

    /// Profile for a mode
    pub const fn for_mode(mode: Mode) -> KeyProfile {
        match mode {
            Mode::Major => Self::MAJOR,
            Mode::Minor => Self::MINOR,
        }
    }

    /// Weights with the tonic at index 0
    pub fn weights(&self) -> &[f32; PITCH_CLASSES] {
        &self.weights
    }

    /// Profile shifted so its tonic sits at pitch class `tonic`
    ///
    /// `rotated(n)[(i + n) % 12] == weights[i]`
    pub fn rotated(&self, tonic: usize) -> [f32; PITCH_CLASSES] {
        let mut out = [0.0; PITCH_CLASSES];
        for (i, &w) in self.weights.iter().enumerate() {
            out[(i + tonic) % PITCH_CLASSES] = w;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tonic_is_strongest() {
        for profile in [KeyProfile::MAJOR, KeyProfile::MINOR] {
            let w = profile.weights();
            assert!(w.iter().all(|&v| v <= w[0]));
        }
    }

    #[test]
    fn test_rotation_moves_tonic() {
        let d_major = KeyProfile::MAJOR.rotated(2);
        assert_eq!(d_major[2], 6.35);
        // Dominant of D is A
        assert_eq!(d_major[9], 5.19);
        assert_eq!(KeyProfile::MINOR.rotated(0), *KeyProfile::MINOR.weights());
        assert_eq!(KeyProfile::MINOR.rotated(12), *KeyProfile::MINOR.weights());
    }

    #[test]
    fn test_for_mode() {
        assert_eq!(KeyProfile::for_mode(Mode::Major), KeyProfile::MAJOR);
        assert_eq!(KeyProfile::for_mode(Mode::Minor), KeyProfile::MINOR);
    }
}
