//! Histogram normalization

use super::histogram::PitchClassHistogram;

/// Scale a histogram so its bins sum to 1
///
/// # Returns
///
/// `None` when the bin sum is <= 0 (no signal); downstream matching must
/// then report "no result" instead of guessing a key.
pub fn normalize_histogram(histogram: &PitchClassHistogram) -> Option<PitchClassHistogram> {
    let total = histogram.sum();
    if total <= 0.0 || !total.is_finite() {
        log::debug!("Histogram sum {} carries no signal", total);
        return None;
    }

    let mut bins = *histogram.bins();
    for bin in bins.iter_mut() {
        *bin /= total;
    }
    Some(PitchClassHistogram::new(bins))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sums_to_one() {
        let h = PitchClassHistogram::new([10.0, 0.0, 0.0, 0.0, 6.0, 0.0, 0.0, 4.0, 0.0, 0.0, 0.0, 0.0]);
        let n = normalize_histogram(&h).unwrap();
        assert!((n.sum() - 1.0).abs() < 1e-6);
        assert!((n[0] - 0.5).abs() < 1e-6);
        assert!((n[4] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_zero_histogram_has_no_signal() {
        assert!(normalize_histogram(&PitchClassHistogram::zeros()).is_none());
    }
}
