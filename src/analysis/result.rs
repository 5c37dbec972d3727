//! Analysis result types

use serde::{Deserialize, Serialize};

use super::metadata::AnalysisMetadata;
use crate::features::chroma::{PitchClassHistogram, PITCH_CLASS_NAMES};

/// Camelot wheel number per tonic for major keys (0 = C ... 11 = B)
const CAMELOT_MAJOR: [u32; 12] = [8, 3, 10, 5, 12, 7, 2, 9, 4, 11, 6, 1];

/// Camelot wheel number per tonic for minor keys
const CAMELOT_MINOR: [u32; 12] = [5, 12, 7, 2, 9, 4, 11, 6, 1, 8, 3, 10];

/// Tonal mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Major mode
    Major,
    /// Minor mode
    Minor,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Major => write!(f, "major"),
            Mode::Minor => write!(f, "minor"),
        }
    }
}

/// Musical key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Major key (0 = C, 1 = C#, ..., 11 = B)
    Major(u32),
    /// Minor key (0 = C, 1 = C#, ..., 11 = B)
    Minor(u32),
}

impl Key {
    /// Build a key from a tonic pitch class and mode (tonic taken modulo 12)
    pub fn new(tonic: u32, mode: Mode) -> Self {
        match mode {
            Mode::Major => Key::Major(tonic % 12),
            Mode::Minor => Key::Minor(tonic % 12),
        }
    }

    /// Tonic pitch class (0 = C)
    pub fn tonic(&self) -> u32 {
        match self {
            Key::Major(i) | Key::Minor(i) => *i % 12,
        }
    }

    /// Tonic name in sharp spelling ("C", "C#", ..., "B")
    pub fn tonic_name(&self) -> &'static str {
        PITCH_CLASS_NAMES[self.tonic() as usize]
    }

    /// Mode of this key
    pub fn mode(&self) -> Mode {
        match self {
            Key::Major(_) => Mode::Major,
            Key::Minor(_) => Mode::Minor,
        }
    }

    /// Key name in musical notation (e.g., "C", "Am", "F#", "D#m")
    ///
    /// # Example
    ///
    /// ```
    /// use tonality_dsp::Key;
    ///
    /// assert_eq!(Key::Major(0).name(), "C");
    /// assert_eq!(Key::Minor(9).name(), "Am");
    /// ```
    pub fn name(&self) -> String {
        match self.mode() {
            Mode::Major => self.tonic_name().to_string(),
            Mode::Minor => format!("{}m", self.tonic_name()),
        }
    }

    /// Relative key sharing the same key signature (C major <-> A minor)
    pub fn relative(&self) -> Key {
        match self {
            Key::Major(i) => Key::Minor((*i + 9) % 12),
            Key::Minor(i) => Key::Major((*i + 3) % 12),
        }
    }

    /// Camelot wheel code used by DJ software ("8B" = C major, "8A" = A minor)
    ///
    /// Minor keys carry the "A" suffix, major keys "B". Adjacent numbers are a
    /// fifth apart; relative keys share a number.
    ///
    /// # Example
    ///
    /// ```
    /// use tonality_dsp::Key;
    ///
    /// assert_eq!(Key::Major(0).camelot(), "8B");
    /// assert_eq!(Key::Minor(9).camelot(), "8A");
    /// ```
    pub fn camelot(&self) -> String {
        let tonic = self.tonic() as usize;
        match self.mode() {
            Mode::Major => format!("{}B", CAMELOT_MAJOR[tonic]),
            Mode::Minor => format!("{}A", CAMELOT_MINOR[tonic]),
        }
    }

    /// Parse a Camelot wheel code ("1A".."12B")
    ///
    /// Returns `None` for anything else.
    pub fn from_camelot(code: &str) -> Option<Self> {
        if code.len() < 2 || !code.is_ascii() {
            return None;
        }
        let (num_str, suffix) = code.split_at(code.len() - 1);
        let num: u32 = num_str.parse().ok()?;
        if !(1..=12).contains(&num) {
            return None;
        }

        let table = match suffix {
            "A" | "a" => &CAMELOT_MINOR,
            "B" | "b" => &CAMELOT_MAJOR,
            _ => return None,
        };
        let tonic = table.iter().position(|&n| n == num)? as u32;
        Some(match suffix {
            "A" | "a" => Key::Minor(tonic),
            _ => Key::Major(tonic),
        })
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.tonic_name(), self.mode())
    }
}

/// One (tonic, mode) hypothesis and its profile correlation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyCandidate {
    /// Key hypothesis
    pub key: Key,
    /// Pearson correlation against the rotated key profile, in [-1, 1]
    pub score: f32,
}

impl KeyCandidate {
    /// Tonic name of the candidate
    pub fn tonic(&self) -> &'static str {
        self.key.tonic_name()
    }

    /// Mode of the candidate
    pub fn mode(&self) -> Mode {
        self.key.mode()
    }
}

/// Best key for one histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyDetectionResult {
    /// Detected key
    pub key: Key,

    /// Confidence (0.0-1.0), an affine remapping of the winning correlation
    pub confidence: f32,

    /// Normalized 12-bin histogram the key was derived from
    pub profile: PitchClassHistogram,
}

impl KeyDetectionResult {
    /// Tonic name
    pub fn tonic(&self) -> &'static str {
        self.key.tonic_name()
    }

    /// Mode
    pub fn mode(&self) -> Mode {
        self.key.mode()
    }
}

/// Analysis flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisFlag {
    /// Best correlation is low (atonal, noisy, or very sparse material)
    WeakTonality,
    /// Runner-up is the relative key with a near-identical score
    RelativeKeyAmbiguity,
    /// Decoded clip covered less than half of the analysis duration
    ShortClip,
}

/// Complete key estimate for one clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEstimate {
    /// Best key with confidence and the histogram used
    pub result: KeyDetectionResult,

    /// Top-ranked candidates, best first (includes the winner)
    pub candidates: Vec<KeyCandidate>,

    /// Gap between the two best scores (0.0-1.0)
    ///
    /// Low values mean the winner barely beat an alternative, most often
    /// its relative key.
    pub clarity: f32,

    /// Analysis flags
    pub flags: Vec<AnalysisFlag>,

    /// Analysis metadata
    pub metadata: AnalysisMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_name() {
        assert_eq!(Key::Major(0).name(), "C");
        assert_eq!(Key::Major(6).name(), "F#");
        assert_eq!(Key::Minor(9).name(), "Am");
        assert_eq!(Key::Minor(1).name(), "C#m");
        assert_eq!(Key::Minor(11).to_string(), "B minor");
    }

    #[test]
    fn test_new_and_accessors() {
        let key = Key::new(14, Mode::Minor);
        assert_eq!(key, Key::Minor(2));
        assert_eq!(key.tonic(), 2);
        assert_eq!(key.tonic_name(), "D");
        assert_eq!(key.mode(), Mode::Minor);
    }

    #[test]
    fn test_relative_keys() {
        assert_eq!(Key::Major(0).relative(), Key::Minor(9));
        assert_eq!(Key::Minor(9).relative(), Key::Major(0));
        assert_eq!(Key::Major(7).relative(), Key::Minor(4)); // G -> Em
        for i in 0..12 {
            assert_eq!(Key::Major(i).relative().relative(), Key::Major(i));
        }
    }

    #[test]
    fn test_camelot() {
        assert_eq!(Key::Major(0).camelot(), "8B");
        assert_eq!(Key::Major(7).camelot(), "9B"); // G
        assert_eq!(Key::Minor(9).camelot(), "8A"); // Am
        assert_eq!(Key::Minor(4).camelot(), "9A"); // Em
        assert_eq!(Key::Minor(8).camelot(), "1A"); // G#m

        // Relative keys share a number
        for i in 0..12 {
            let major = Key::Major(i).camelot();
            let minor = Key::Major(i).relative().camelot();
            assert_eq!(major[..major.len() - 1], minor[..minor.len() - 1]);
        }
    }

    #[test]
    fn test_from_camelot() {
        assert_eq!(Key::from_camelot("8B"), Some(Key::Major(0)));
        assert_eq!(Key::from_camelot("8A"), Some(Key::Minor(9)));
        assert_eq!(Key::from_camelot("12a"), Some(Key::Minor(1)));
        assert_eq!(Key::from_camelot("0A"), None);
        assert_eq!(Key::from_camelot("13B"), None);
        assert_eq!(Key::from_camelot("8C"), None);
        assert_eq!(Key::from_camelot(""), None);

        for i in 0..12 {
            for key in [Key::Major(i), Key::Minor(i)] {
                assert_eq!(Key::from_camelot(&key.camelot()), Some(key));
            }
        }
    }

    #[test]
    fn test_candidate_accessors() {
        let candidate = KeyCandidate {
            key: Key::Minor(9),
            score: 0.7,
        };
        assert_eq!(candidate.tonic(), "A");
        assert_eq!(candidate.mode(), Mode::Minor);
    }
}
