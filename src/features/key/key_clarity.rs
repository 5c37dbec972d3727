//! Key clarity scoring
//!
//! Estimates how decisively the winning key stands out from the runner-up.

use crate::analysis::result::KeyCandidate;

/// Compute key clarity from ranked candidates
///
/// # Arguments
///
/// * `ranked` - Candidates sorted best first (as from `rank_candidates`)
///
/// # Returns
///
/// Clarity (0.0-1.0): the score gap between the best and second-best
/// candidate. 0.0 for fewer than two candidates.
pub fn compute_key_clarity(ranked: &[KeyCandidate]) -> f32 {
    match ranked {
        [best, second, ..] => (best.score - second.score).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::result::Key;

    fn candidate(key: Key, score: f32) -> KeyCandidate {
        KeyCandidate { key, score }
    }

    #[test]
    fn test_clarity_gap() {
        let ranked = [
            candidate(Key::Major(0), 0.9),
            candidate(Key::Minor(9), 0.6),
            candidate(Key::Major(7), 0.5),
        ];
        assert!((compute_key_clarity(&ranked) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_clarity_degenerate() {
        assert_eq!(compute_key_clarity(&[]), 0.0);
        assert_eq!(compute_key_clarity(&[candidate(Key::Major(0), 0.9)]), 0.0);
    }
}
