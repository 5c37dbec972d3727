//! Single-clip key analysis run
//!
//! An [`AnalysisSession`] owns everything one analysis needs: the prepared
//! mono clip, a spectrum analyzer, a frame sampler, the pitch-class
//! accumulator and the frame schedule. Frames are processed one at a time in
//! time order, so a driver can pace them (or stop early) as it likes.
//!
//! # Example
//!
//! ```
//! use tonality_dsp::analysis::session::AnalysisSession;
//! use tonality_dsp::features::spectrum::FftSpectrumBackend;
//! use tonality_dsp::AnalysisConfig;
//!
//! let sample_rate = 44100;
//! let samples: Vec<f32> = (0..sample_rate * 2)
//!     .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / sample_rate as f32).sin())
//!     .collect();
//!
//! let config = AnalysisConfig {
//!     seconds_to_analyze: 2.0,
//!     frames: 8,
//!     ..Default::default()
//! };
//! let mut session = AnalysisSession::new(samples, sample_rate as u32, &config, &FftSpectrumBackend)?;
//! while session.process_next_frame()? {}
//!
//! let estimate = session.finish().expect("tonal input");
//! assert_eq!(estimate.result.tonic(), "A");
//! # Ok::<(), tonality_dsp::AnalysisError>(())
//! ```

use std::time::Instant;

use super::confidence::assess_flags;
use super::metadata::AnalysisMetadata;
use super::result::{KeyCandidate, KeyEstimate};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::chroma::{frame_schedule, FrameSampler, PitchClassAccumulator, SpectralFilter};
use crate::features::key::{best_match, compute_key_clarity, rank_candidates};
use crate::features::spectrum::{SpectrumAnalyzer, SpectrumBackend};
use crate::preprocessing::clip::samples_for_duration;

/// One in-progress key analysis over a prepared mono clip
pub struct AnalysisSession {
    samples: Vec<f32>,
    sample_rate: u32,
    fft_size: usize,
    seconds_to_analyze: f32,
    top_n: usize,
    analyzer: Box<dyn SpectrumAnalyzer>,
    sampler: FrameSampler,
    accumulator: PitchClassAccumulator,
    schedule: Vec<usize>,
    cursor: usize,
    started: Instant,
}

impl AnalysisSession {
    /// Prepare a run over mono `samples`
    ///
    /// Samples beyond `config.seconds_to_analyze` are dropped. Shorter clips
    /// are accepted; frames past their end see silence.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an invalid config or zero sample rate, `Unsupported`
    /// when the backend cannot provide an analyzer of `config.fft_size`.
    pub fn new(
        mut samples: Vec<f32>,
        sample_rate: u32,
        config: &AnalysisConfig,
        backend: &dyn SpectrumBackend,
    ) -> Result<Self, AnalysisError> {
        config.validate()?;
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidInput(
                "Invalid sample rate".to_string(),
            ));
        }

        let limit = samples_for_duration(config.seconds_to_analyze, sample_rate);
        if samples.len() > limit {
            samples.truncate(limit);
        } else if samples.len() < limit {
            log::warn!(
                "Clip is {:.2} s, shorter than the {:.2} s analysis span",
                samples.len() as f32 / sample_rate as f32,
                config.seconds_to_analyze
            );
        }

        if config.frames > limit {
            log::warn!(
                "{} frames requested over {} samples; some windows repeat",
                config.frames,
                limit
            );
        }

        let analyzer = backend.create(config.fft_size)?;
        let sampler = FrameSampler::new(sample_rate, config.fft_size, SpectralFilter::from(config))?;
        let schedule = frame_schedule(config.seconds_to_analyze, config.frames, sample_rate);

        log::debug!(
            "Analysis session: {} samples at {} Hz, {} frames of {} samples",
            samples.len(),
            sample_rate,
            schedule.len(),
            config.fft_size
        );

        Ok(Self {
            samples,
            sample_rate,
            fft_size: config.fft_size,
            seconds_to_analyze: config.seconds_to_analyze,
            top_n: config.top_n,
            analyzer,
            sampler,
            accumulator: PitchClassAccumulator::new(config.smoothing_alpha),
            schedule,
            cursor: 0,
            started: Instant::now(),
        })
    }

    /// Total frames this session will process
    pub fn frames_total(&self) -> usize {
        self.schedule.len()
    }

    /// Frames processed so far
    pub fn frames_processed(&self) -> usize {
        self.cursor
    }

    /// True once every scheduled frame has been processed
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.schedule.len()
    }

    /// Duration of the (truncated) clip in seconds
    pub fn clip_seconds(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Sample and accumulate the next frame
    ///
    /// # Returns
    ///
    /// `Ok(true)` if a frame was processed, `Ok(false)` once all frames are
    /// done.
    pub fn process_next_frame(&mut self) -> Result<bool, AnalysisError> {
        let Some(&end) = self.schedule.get(self.cursor) else {
            return Ok(false);
        };

        let frame = self
            .sampler
            .sample_at(&self.samples, end, self.analyzer.as_mut())?;
        self.accumulator.push(&frame);
        self.cursor += 1;

        log::trace!(
            "Frame {}/{} ending at sample {}",
            self.cursor,
            self.schedule.len(),
            end
        );
        Ok(true)
    }

    /// Rank the histogram accumulated so far
    ///
    /// Empty while no tonal energy has been seen.
    pub fn snapshot(&self) -> Vec<KeyCandidate> {
        match self.accumulator.smoothed().normalized() {
            Some(histogram) => rank_candidates(&histogram),
            None => Vec::new(),
        }
    }

    /// Finish the run and build the estimate
    ///
    /// Consumes the session, releasing its analyzer and clip buffer.
    ///
    /// # Returns
    ///
    /// `None` when the accumulated histogram carries no signal.
    pub fn finish(self) -> Option<KeyEstimate> {
        let frames_analyzed = self.cursor;
        let clip_seconds = self.clip_seconds();
        let histogram = self.accumulator.finish().normalized()?;

        let result = best_match(&histogram)?;
        let ranked = rank_candidates(&histogram);
        let clarity = compute_key_clarity(&ranked);
        let flags = assess_flags(&ranked, clip_seconds, self.seconds_to_analyze);
        let candidates: Vec<KeyCandidate> = ranked.into_iter().take(self.top_n).collect();

        let processing_time_ms = self.started.elapsed().as_secs_f32() * 1000.0;
        log::debug!(
            "Key analysis complete: {} (confidence {:.3}, clarity {:.3}) from {} frames in {:.1} ms",
            result.key.name(),
            result.confidence,
            clarity,
            frames_analyzed,
            processing_time_ms
        );

        Some(KeyEstimate {
            result,
            candidates,
            clarity,
            flags,
            metadata: AnalysisMetadata {
                duration_seconds: clip_seconds,
                sample_rate: self.sample_rate,
                frames_analyzed,
                fft_size: self.fft_size,
                processing_time_ms,
                ..Default::default()
            },
        })
    }
}

impl std::fmt::Debug for AnalysisSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisSession")
            .field("samples", &self.samples.len())
            .field("sample_rate", &self.sample_rate)
            .field("fft_size", &self.fft_size)
            .field("frames", &self.schedule.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}
