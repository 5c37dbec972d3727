//! Chroma frame extraction
//!
//! Converts one short-time dB spectrum into raw per-pitch-class energy.
//!
//! Algorithm, per spectral bin (bin 0 / DC is skipped):
//! 1. Drop bins quieter than the noise floor (`min_db`)
//! 2. `freq = bin * sample_rate / window_size`; drop bins outside the tonal
//!    window (`min_frequency_hz..=max_frequency_hz`)
//! 3. Linear magnitude `10^(dB / 20)`
//! 4. `midi = 69 + 12 * log2(freq / 440)`, rounded, reduced modulo 12
//! 5. Add the linear magnitude to that pitch class
//!
//! # Example
//!
//! ```
//! use tonality_dsp::features::chroma::extractor::{FrameSampler, SpectralFilter};
//! use tonality_dsp::features::spectrum::{FftSpectrumBackend, SpectrumBackend};
//!
//! let sample_rate = 44100;
//! let samples: Vec<f32> = (0..8192)
//!     .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / sample_rate as f32).sin())
//!     .collect();
//!
//! let mut analyzer = FftSpectrumBackend.create(4096)?;
//! let mut sampler = FrameSampler::new(sample_rate, 4096, SpectralFilter::default())?;
//! let frame = sampler.sample_at(&samples, 8192, analyzer.as_mut())?;
//! assert!(frame[9] > frame[0]); // A dominates
//! # Ok::<(), tonality_dsp::AnalysisError>(())
//! ```

use super::histogram::PITCH_CLASSES;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::spectrum::SpectrumAnalyzer;

/// Reference tuning: A4 in Hz
const A4_HZ: f32 = 440.0;

/// MIDI note number of A4
const A4_MIDI: f32 = 69.0;

/// Which spectral bins count towards the pitch-class histogram
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralFilter {
    /// Noise floor in dB (default: -85.0)
    pub min_db: f32,
    /// Lowest accepted frequency in Hz (default: 50.0)
    pub min_frequency_hz: f32,
    /// Highest accepted frequency in Hz (default: 2000.0)
    pub max_frequency_hz: f32,
}

impl Default for SpectralFilter {
    fn default() -> Self {
        Self {
            min_db: -85.0,
            min_frequency_hz: 50.0,
            max_frequency_hz: 2000.0,
        }
    }
}

impl From<&AnalysisConfig> for SpectralFilter {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            min_db: config.min_db,
            min_frequency_hz: config.min_frequency_hz,
            max_frequency_hz: config.max_frequency_hz,
        }
    }
}

/// Map a frequency to its nearest equal-tempered pitch class (0 = C)
pub fn pitch_class_for_frequency(freq: f32) -> usize {
    let midi = A4_MIDI + 12.0 * (freq / A4_HZ).log2();
    (midi.round() as i64).rem_euclid(PITCH_CLASSES as i64) as usize
}

/// Window end positions (exclusive sample index) for `frames` evenly spaced
/// instants across `seconds` of audio
///
/// Frame `k` ends at `(k + 1) * seconds / frames`, so the last frame ends at
/// the end of the analysis span. Positions never decrease.
pub fn frame_schedule(seconds: f32, frames: usize, sample_rate: u32) -> Vec<usize> {
    let step = seconds as f64 * sample_rate as f64 / frames.max(1) as f64;
    (1..=frames)
        .map(|k| (k as f64 * step).round() as usize)
        .collect()
}

/// Turns spectra of one clip into raw per-frame pitch-class vectors
#[derive(Debug, Clone)]
pub struct FrameSampler {
    window_size: usize,
    min_db: f32,
    /// Pitch class per spectral bin, `None` where the bin is excluded
    bin_pitch_classes: Vec<Option<usize>>,
    window: Vec<f32>,
    spectrum: Vec<f32>,
}

impl FrameSampler {
    /// Precompute the bin-to-pitch-class map for a sample rate and window size
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `sample_rate` or `window_size` is zero.
    pub fn new(
        sample_rate: u32,
        window_size: usize,
        filter: SpectralFilter,
    ) -> Result<Self, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidInput(
                "Sample rate must be > 0".to_string(),
            ));
        }
        if window_size == 0 {
            return Err(AnalysisError::InvalidInput(
                "Window size must be > 0".to_string(),
            ));
        }

        let bins = window_size / 2;
        let bin_hz = sample_rate as f32 / window_size as f32;
        let bin_pitch_classes: Vec<Option<usize>> = (0..bins)
            .map(|bin| {
                let freq = bin as f32 * bin_hz;
                if bin == 0 || freq < filter.min_frequency_hz || freq > filter.max_frequency_hz {
                    None
                } else {
                    Some(pitch_class_for_frequency(freq))
                }
            })
            .collect();

        log::debug!(
            "Frame sampler: {} Hz, window {}, {} of {} bins in {:.0}-{:.0} Hz",
            sample_rate,
            window_size,
            bin_pitch_classes.iter().filter(|pc| pc.is_some()).count(),
            bins,
            filter.min_frequency_hz,
            filter.max_frequency_hz
        );

        Ok(Self {
            window_size,
            min_db: filter.min_db,
            bin_pitch_classes,
            window: vec![0.0; window_size],
            spectrum: vec![0.0; bins],
        })
    }

    /// Transform length this sampler was built for
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Raw pitch-class energies of one dB spectrum of `window_size / 2` bins
    ///
    /// Extra bins beyond the precomputed map are ignored.
    pub fn pitch_classes_from_spectrum(&self, spectrum_db: &[f32]) -> [f32; PITCH_CLASSES] {
        let mut frame = [0.0f32; PITCH_CLASSES];
        for (&db, pc) in spectrum_db.iter().zip(&self.bin_pitch_classes) {
            let Some(pc) = *pc else {
                continue;
            };
            // NaN and -inf both fail this test
            if !(db >= self.min_db) {
                continue;
            }
            frame[pc] += 10.0f32.powf(db / 20.0);
        }
        frame
    }

    /// Analyze the `window_size` samples ending at `end` (exclusive)
    ///
    /// Portions of the window before the start or past the end of `samples`
    /// are zero. `samples` is only read.
    pub fn sample_at(
        &mut self,
        samples: &[f32],
        end: usize,
        analyzer: &mut dyn SpectrumAnalyzer,
    ) -> Result<[f32; PITCH_CLASSES], AnalysisError> {
        if analyzer.window_size() != self.window_size {
            return Err(AnalysisError::InvalidInput(format!(
                "Analyzer window {} does not match sampler window {}",
                analyzer.window_size(),
                self.window_size
            )));
        }

        self.window.fill(0.0);
        let start = end as i64 - self.window_size as i64;
        for (offset, slot) in self.window.iter_mut().enumerate() {
            let idx = start + offset as i64;
            if idx >= 0 && (idx as usize) < samples.len() {
                *slot = samples[idx as usize];
            }
        }

        analyzer.magnitude_db(&self.window, &mut self.spectrum)?;
        Ok(self.pitch_classes_from_spectrum(&self.spectrum))
    }
}
