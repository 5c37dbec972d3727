//! Key detection by profile correlation
//!
//! Correlates a pitch-class histogram against the major and minor key
//! profiles rotated to each of the 12 tonics, giving 24 hypotheses.
//!
//! # Algorithm
//!
//! For every tonic `t` in 0..12 and mode in {major, minor}:
//! 1. Rotate the mode's profile so its tonic sits at pitch class `t`
//! 2. Score = Pearson correlation of the mean-centered histogram and the
//!    mean-centered rotated profile (0 when either has zero variance)
//!
//! Enumeration order is tonic ascending, major before minor. Both the ranking
//! and the single best match break exact ties by that order, so they always
//! agree on the winner.
//!
//! # Example
//!
//! ```
//! use tonality_dsp::features::chroma::PitchClassHistogram;
//! use tonality_dsp::features::key::{best_match, rank_candidates};
//! use tonality_dsp::{Key, Mode};
//!
//! // C, E and G carry the energy
//! let histogram = PitchClassHistogram::new([10., 0., 0., 0., 6., 0., 0., 7., 0., 0., 0., 0.]);
//! let best = best_match(&histogram).expect("tonal input");
//! assert_eq!(best.key, Key::Major(0));
//! assert!(best.confidence > 0.5);
//!
//! let ranked = rank_candidates(&histogram);
//! assert_eq!(ranked.len(), 24);
//! assert_eq!(ranked[0].key, best.key);
//! assert_eq!(ranked[0].mode(), Mode::Major);
//! ```

use std::cmp::Ordering;

use super::templates::KeyProfile;
use crate::analysis::confidence::score_to_confidence;
use crate::analysis::result::{Key, KeyCandidate, KeyDetectionResult, Mode};
use crate::features::chroma::{PitchClassHistogram, PITCH_CLASSES};

/// Centered norms below this count as zero variance
const EPSILON: f64 = 1e-12;

/// Modes in enumeration order
const MODES: [Mode; 2] = [Mode::Major, Mode::Minor];

/// Pearson correlation of two 12-bin vectors
///
/// Returns 0.0 when either vector has zero variance.
fn pearson(x: &[f32; PITCH_CLASSES], y: &[f32; PITCH_CLASSES]) -> f32 {
    let n = PITCH_CLASSES as f64;
    let x_mean = x.iter().map(|&v| v as f64).sum::<f64>() / n;
    let y_mean = y.iter().map(|&v| v as f64).sum::<f64>() / n;

    let mut cov = 0.0f64;
    let mut x_sq = 0.0f64;
    let mut y_sq = 0.0f64;
    for (&xi, &yi) in x.iter().zip(y) {
        let xd = xi as f64 - x_mean;
        let yd = yi as f64 - y_mean;
        cov += xd * yd;
        x_sq += xd * xd;
        y_sq += yd * yd;
    }

    let x_norm = x_sq.sqrt();
    let y_norm = y_sq.sqrt();
    if x_norm < EPSILON || y_norm < EPSILON {
        return 0.0;
    }
    (cov / (x_norm * y_norm)).clamp(-1.0, 1.0) as f32
}

/// Correlation of `histogram` with `profile` rotated to `tonic`
pub fn correlate(histogram: &PitchClassHistogram, profile: &KeyProfile, tonic: usize) -> f32 {
    pearson(histogram.bins(), &profile.rotated(tonic))
}

/// Score all 24 keys in enumeration order
///
/// Unlike [`rank_candidates`] this does not check for signal; a silent
/// histogram scores 0.0 everywhere.
pub fn score_all(histogram: &PitchClassHistogram) -> Vec<KeyCandidate> {
    let mut scores = Vec::with_capacity(2 * PITCH_CLASSES);
    for tonic in 0..PITCH_CLASSES {
        for mode in MODES {
            let score = correlate(histogram, &KeyProfile::for_mode(mode), tonic);
            scores.push(KeyCandidate {
                key: Key::new(tonic as u32, mode),
                score,
            });
        }
    }
    scores
}

/// Rank all 24 keys, best first
///
/// The histogram is used as given; callers normalize first.
///
/// # Returns
///
/// Empty when no bin is positive. Otherwise 24 candidates sorted by
/// descending score; exact ties keep enumeration order.
pub fn rank_candidates(histogram: &PitchClassHistogram) -> Vec<KeyCandidate> {
    if histogram.is_silent() {
        log::debug!("Histogram has no positive bin, no candidates");
        return Vec::new();
    }

    let mut ranked = score_all(histogram);
    // sort_by is stable, so ties stay in enumeration order
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// Best single key with its confidence
///
/// # Returns
///
/// `None` when no bin is positive. Otherwise the first candidate in
/// enumeration order with the maximum score, identical to
/// `rank_candidates(histogram)[0]`.
pub fn best_match(histogram: &PitchClassHistogram) -> Option<KeyDetectionResult> {
    if histogram.is_silent() {
        return None;
    }

    let mut best: Option<KeyCandidate> = None;
    for candidate in score_all(histogram) {
        match best {
            Some(current) if candidate.score.total_cmp(&current.score) != Ordering::Greater => {}
            _ => best = Some(candidate),
        }
    }
    let best = best?;

    let confidence = score_to_confidence(best.score);
    log::debug!(
        "Best key: {} (score: {:.4}, confidence: {:.4})",
        best.key.name(),
        best.score,
        confidence
    );

    Some(KeyDetectionResult {
        key: best.key,
        confidence,
        profile: *histogram,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::chroma::normalize_histogram;

    fn histogram(bins: [f32; 12]) -> PitchClassHistogram {
        normalize_histogram(&PitchClassHistogram::new(bins)).unwrap()
    }

    /// A handful of tonal and not-so-tonal shapes
    fn fixtures() -> Vec<PitchClassHistogram> {
        vec![
            histogram([10., 0., 0., 0., 6., 0., 0., 7., 0., 0., 0., 0.]),
            histogram([1., 0., 1., 0., 1., 1., 0., 1., 0., 1., 0., 1.]),
            histogram([2., 0., 1., 0., 0., 1., 0., 1., 0., 2., 0., 0.]),
            histogram([0., 0., 0., 0., 0., 0., 0., 0., 0., 1., 0., 0.]),
            histogram([0.3, 0.1, 0.7, 0.2, 0.9, 0.4, 0.05, 0.6, 0.8, 0.1, 0.5, 0.2]),
            histogram([1., 1., 1., 1., 1., 1., 1., 1., 1., 1., 1., 2.]),
        ]
    }

    #[test]
    fn test_zero_histogram_has_no_result() {
        let zeros = PitchClassHistogram::zeros();
        assert!(best_match(&zeros).is_none());
        assert!(rank_candidates(&zeros).is_empty());
    }

    #[test]
    fn test_c_major_triad() {
        let h = PitchClassHistogram::new([10., 0., 0., 0., 6., 0., 0., 7., 0., 0., 0., 0.]);
        let best = best_match(&h).unwrap();
        assert_eq!(best.tonic(), "C");
        assert_eq!(best.mode(), Mode::Major);
        assert!(best.confidence > 0.5, "confidence {}", best.confidence);
    }

    #[test]
    fn test_c_major_scale_runner_up_is_relative_minor() {
        let h = histogram([1., 0., 1., 0., 1., 1., 0., 1., 0., 1., 0., 1.]);
        let ranked = rank_candidates(&h);
        assert_eq!(ranked[0].key, Key::Major(0));
        assert_eq!(ranked[1].key, Key::Minor(9));
    }

    #[test]
    fn test_a_minor_shape() {
        let h = histogram([2., 0., 1., 0., 0., 1., 0., 1., 0., 2., 0., 0.]);
        assert_eq!(best_match(&h).unwrap().key, Key::Minor(9));
    }

    #[test]
    fn test_best_match_is_maximum_of_all_scores() {
        for h in fixtures() {
            let best = best_match(&h).unwrap();
            let mut max_score = f32::NEG_INFINITY;
            for tonic in 0..12 {
                for profile in [KeyProfile::MAJOR, KeyProfile::MINOR] {
                    max_score = max_score.max(correlate(&h, &profile, tonic));
                }
            }
            let best_score = correlate(&h, &KeyProfile::for_mode(best.mode()), best.key.tonic() as usize);
            assert_eq!(best_score, max_score);
        }
    }

    #[test]
    fn test_ranking_head_agrees_with_best_match() {
        for h in fixtures() {
            let ranked = rank_candidates(&h);
            let best = best_match(&h).unwrap();
            assert_eq!(ranked.len(), 24);
            assert_eq!(ranked[0].key, best.key);
            assert!(ranked.iter().all(|c| c.score <= ranked[0].score));
            assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
        }
    }

    #[test]
    fn test_ranking_head_agrees_with_best_match_on_non_finite_bins() {
        for bad in [f32::NAN, f32::INFINITY] {
            let mut bins = [0.0; 12];
            bins[0] = 1.0;
            bins[4] = 0.6;
            bins[7] = 0.7;
            bins[2] = bad;
            let h = PitchClassHistogram::new(bins);
            let ranked = rank_candidates(&h);
            let best = best_match(&h).unwrap();
            assert_eq!(ranked[0].key, best.key);
        }
    }

    #[test]
    fn test_rotation_equivalence() {
        for h in fixtures() {
            for n in 0..12 {
                let rotated_profile = correlate(&h, &KeyProfile::MAJOR, n);
                let rotated_histogram = correlate(&h.rotated((12 - n) % 12), &KeyProfile::MAJOR, 0);
                assert!(
                    (rotated_profile - rotated_histogram).abs() < 1e-6,
                    "n={}: {} vs {}",
                    n,
                    rotated_profile,
                    rotated_histogram
                );
            }
        }
    }

    #[test]
    fn test_idempotent() {
        for h in fixtures() {
            let a = rank_candidates(&h);
            let b = rank_candidates(&h);
            assert_eq!(a.len(), b.len());
            for (x, y) in a.iter().zip(&b) {
                assert_eq!(x.key, y.key);
                assert_eq!(x.score.to_bits(), y.score.to_bits());
            }
            assert_eq!(best_match(&h), best_match(&h));
        }
    }

    #[test]
    fn test_ties_follow_enumeration_order() {
        // Flat histogram: zero variance, every score is 0
        let flat = histogram([1.0; 12]);
        let ranked = rank_candidates(&flat);
        assert!(ranked.iter().all(|c| c.score == 0.0));
        assert_eq!(ranked, score_all(&flat));
        assert_eq!(ranked[0].key, Key::Major(0));
        assert_eq!(ranked[1].key, Key::Minor(0));
        assert_eq!(ranked[2].key, Key::Major(1));
        assert_eq!(best_match(&flat).unwrap().key, Key::Major(0));
        assert_eq!(best_match(&flat).unwrap().confidence, 0.5);
    }

    #[test]
    fn test_confidence_bounded_and_monotonic() {
        let mut pairs: Vec<(f32, f32)> = fixtures()
            .iter()
            .map(|h| (rank_candidates(h)[0].score, best_match(h).unwrap().confidence))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (score, confidence) in &pairs {
            assert!((0.0..=1.0).contains(confidence));
            assert!((confidence - (score + 1.0) / 2.0).abs() < 1e-6);
        }
        assert!(pairs.windows(2).all(|w| w[0].1 <= w[1].1));
    }

    #[test]
    fn test_pearson_limits() {
        let profile = *KeyProfile::MAJOR.weights();
        assert!((pearson(&profile, &profile) - 1.0).abs() < 1e-6);
        let negated = profile.map(|v| -v);
        assert!((pearson(&profile, &negated) + 1.0).abs() < 1e-6);
        assert_eq!(pearson(&[0.5; 12], &profile), 0.0);
    }

    #[test]
    fn test_score_all_enumeration() {
        let scores = score_all(&PitchClassHistogram::zeros());
        assert_eq!(scores.len(), 24);
        assert_eq!(scores[0].key, Key::Major(0));
        assert_eq!(scores[1].key, Key::Minor(0));
        assert_eq!(scores[23].key, Key::Minor(11));
    }
}
