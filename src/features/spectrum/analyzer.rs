//! FFT-backed spectrum analyzer
//!
//! Mirrors a browser-style analyser node: Blackman window, forward FFT,
//! magnitude scaled by `1 / N`, converted to dB.
//!
//! # Example
//!
//! ```
//! use tonality_dsp::features::spectrum::{FftSpectrumBackend, SpectrumBackend};
//!
//! let mut analyzer = FftSpectrumBackend.create(1024)?;
//! let window = vec![0.0f32; 1024];
//! let mut spectrum = vec![0.0f32; 512];
//! analyzer.magnitude_db(&window, &mut spectrum)?;
//! assert!(spectrum.iter().all(|db| *db == f32::NEG_INFINITY));
//! # Ok::<(), tonality_dsp::AnalysisError>(())
//! ```

use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use super::{SpectrumAnalyzer, SpectrumBackend};
use crate::error::AnalysisError;

/// Blackman window coefficients
const BLACKMAN_A0: f32 = 0.42;
const BLACKMAN_A1: f32 = 0.5;
const BLACKMAN_A2: f32 = 0.08;

/// Default backend: rustfft forward transforms
#[derive(Debug, Clone, Copy, Default)]
pub struct FftSpectrumBackend;

impl SpectrumBackend for FftSpectrumBackend {
    fn create(&self, window_size: usize) -> Result<Box<dyn SpectrumAnalyzer>, AnalysisError> {
        Ok(Box::new(FftSpectrumAnalyzer::new(window_size)?))
    }
}

/// Spectrum analyzer holding a planned FFT, its window, and scratch buffers
pub struct FftSpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl FftSpectrumAnalyzer {
    /// Plan a forward FFT of `window_size` points
    ///
    /// # Errors
    ///
    /// `Unsupported` unless `window_size` is a power of two >= 2.
    pub fn new(window_size: usize) -> Result<Self, AnalysisError> {
        if window_size < 2 || !window_size.is_power_of_two() {
            return Err(AnalysisError::Unsupported(format!(
                "FFT size must be a power of two >= 2, got {}",
                window_size
            )));
        }

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(window_size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        let n = window_size as f32;
        let window = (0..window_size)
            .map(|i| {
                let t = 2.0 * std::f32::consts::PI * i as f32 / n;
                BLACKMAN_A0 - BLACKMAN_A1 * t.cos() + BLACKMAN_A2 * (2.0 * t).cos()
            })
            .collect();

        log::debug!("Planned {}-point FFT spectrum analyzer", window_size);

        Ok(Self {
            fft,
            window,
            buffer: vec![Complex::new(0.0, 0.0); window_size],
            scratch,
        })
    }
}

impl SpectrumAnalyzer for FftSpectrumAnalyzer {
    fn window_size(&self) -> usize {
        self.window.len()
    }

    fn magnitude_db(&mut self, window: &[f32], out: &mut [f32]) -> Result<(), AnalysisError> {
        let n = self.window.len();
        if window.len() != n {
            return Err(AnalysisError::InvalidInput(format!(
                "Window has {} samples, analyzer expects {}",
                window.len(),
                n
            )));
        }
        if out.len() != n / 2 {
            return Err(AnalysisError::InvalidInput(format!(
                "Spectrum buffer has {} bins, expected {}",
                out.len(),
                n / 2
            )));
        }

        for ((slot, &sample), &w) in self.buffer.iter_mut().zip(window).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        let scale = 1.0 / n as f32;
        for (db, bin) in out.iter_mut().zip(&self.buffer) {
            let magnitude = bin.norm() * scale;
            *db = if magnitude > 0.0 {
                20.0 * magnitude.log10()
            } else {
                f32::NEG_INFINITY
            };
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        assert!(matches!(
            FftSpectrumAnalyzer::new(1000),
            Err(AnalysisError::Unsupported(_))
        ));
        assert!(FftSpectrumAnalyzer::new(0).is_err());
        assert!(FftSpectrumBackend.create(4096).is_ok());
    }

    #[test]
    fn test_silence_is_negative_infinity() {
        let mut analyzer = FftSpectrumAnalyzer::new(256).unwrap();
        let mut out = vec![0.0f32; 128];
        analyzer.magnitude_db(&[0.0; 256], &mut out).unwrap();
        assert!(out.iter().all(|&db| db == f32::NEG_INFINITY));
    }

    #[test]
    fn test_peak_at_tone_frequency() {
        let sample_rate = 44100.0;
        let size = 4096;
        let mut analyzer = FftSpectrumAnalyzer::new(size).unwrap();
        let mut out = vec![0.0f32; size / 2];
        analyzer
            .magnitude_db(&sine(440.0, sample_rate, size), &mut out)
            .unwrap();

        let peak_bin = out
            .iter()
            .enumerate()
            .skip(1)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        let peak_freq = peak_bin as f32 * sample_rate / size as f32;
        assert!(
            (peak_freq - 440.0).abs() < sample_rate / size as f32,
            "Peak at {:.1} Hz, expected ~440 Hz",
            peak_freq
        );

        // Unit sine through a Blackman window: |X| / N ~= 0.21, about -13.5 dB
        assert!(
            out[peak_bin] > -20.0 && out[peak_bin] < -10.0,
            "Peak level {:.1} dB out of range",
            out[peak_bin]
        );
    }

    #[test]
    fn test_wrong_buffer_sizes() {
        let mut analyzer = FftSpectrumAnalyzer::new(256).unwrap();
        let mut out = vec![0.0f32; 128];
        assert!(analyzer.magnitude_db(&[0.0; 128], &mut out).is_err());
        let mut short_out = vec![0.0f32; 64];
        assert!(analyzer.magnitude_db(&[0.0; 256], &mut short_out).is_err());
    }
}
