//! Confidence scoring module
//!
//! Turns raw correlation scores into a calibrated confidence and raises
//! flags for results that deserve a second look.
//!
//! # Confidence
//!
//! The winning Pearson correlation `r` lies in [-1, 1] and is remapped
//! affinely to `(r + 1) / 2`, clamped to [0, 1]. The mapping is monotonic,
//! so a better correlation never yields a lower confidence.
//!
//! # Flags
//!
//! - **WeakTonality**: best score below 0.3
//! - **RelativeKeyAmbiguity**: the runner-up is the relative key of the
//!   winner and trails by no more than 0.05
//! - **ShortClip**: the clip covered less than half the analysis duration
//!
//! # Example
//!
//! ```
//! use tonality_dsp::analysis::confidence::score_to_confidence;
//!
//! assert_eq!(score_to_confidence(1.0), 1.0);
//! assert_eq!(score_to_confidence(0.0), 0.5);
//! assert_eq!(score_to_confidence(-1.0), 0.0);
//! ```

use super::result::{AnalysisFlag, KeyCandidate};

/// Best scores below this are flagged as weak tonality
pub const WEAK_TONALITY_THRESHOLD: f32 = 0.3;

/// Maximum score gap for a relative-key runner-up to count as ambiguous
pub const RELATIVE_KEY_MARGIN: f32 = 0.05;

/// Fraction of the analysis duration below which a clip counts as short
pub const SHORT_CLIP_RATIO: f32 = 0.5;

/// Map a correlation score to a confidence in [0, 1]
pub fn score_to_confidence(score: f32) -> f32 {
    ((score + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Collect flags for a ranked candidate list
///
/// # Arguments
///
/// * `ranked` - Candidates sorted best first (as from `rank_candidates`)
/// * `clip_seconds` - Duration of audio actually analyzed
/// * `target_seconds` - Configured analysis duration
///
/// # Returns
///
/// Flags in a fixed order: WeakTonality, RelativeKeyAmbiguity, ShortClip.
/// Empty input yields only the clip-length flag, if any.
pub fn assess_flags(
    ranked: &[KeyCandidate],
    clip_seconds: f32,
    target_seconds: f32,
) -> Vec<AnalysisFlag> {
    let mut flags = Vec::new();

    if let Some(best) = ranked.first() {
        if best.score < WEAK_TONALITY_THRESHOLD {
            flags.push(AnalysisFlag::WeakTonality);
        }

        if let Some(second) = ranked.get(1) {
            if second.key == best.key.relative() && best.score - second.score <= RELATIVE_KEY_MARGIN
            {
                flags.push(AnalysisFlag::RelativeKeyAmbiguity);
            }
        }
    }

    if clip_seconds < target_seconds * SHORT_CLIP_RATIO {
        flags.push(AnalysisFlag::ShortClip);
    }

    if !flags.is_empty() {
        log::debug!("Analysis flags: {:?}", flags);
    }
    flags
}
