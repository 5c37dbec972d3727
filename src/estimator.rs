//! Asynchronous key estimation facade
//!
//! [`KeyEstimator`] ties the collaborators together for one clip at a time:
//! cache lookup, fetch, decode (on the blocking pool), mono mixdown, paced
//! frame processing and the final ranking. Runs are cancellable through a
//! [`CancellationToken`]; a cancelled run writes nothing to the cache and
//! releases its session before returning.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tonality_dsp::cache::InMemoryCache;
//! use tonality_dsp::io::{FileSource, SymphoniaDecoder};
//! use tonality_dsp::{AnalysisConfig, KeyEstimator};
//!
//! # async fn run() -> Result<(), tonality_dsp::AnalysisError> {
//! let estimator = Arc::new(
//!     KeyEstimator::new(
//!         AnalysisConfig::default(),
//!         Arc::new(FileSource::with_root("previews")),
//!         Arc::new(SymphoniaDecoder),
//!     )?
//!     .with_cache(Arc::new(InMemoryCache::new())),
//! );
//!
//! let handle = estimator.spawn("track-42.mp3");
//! match handle.join().await? {
//!     Some(estimate) => println!("{} ({:.2})", estimate.result.key.name(), estimate.result.confidence),
//!     None => println!("No tonal content"),
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::analysis::result::KeyEstimate;
use crate::analysis::session::AnalysisSession;
use crate::cache::{CacheKey, ResultCache};
use crate::config::{AnalysisConfig, FramePacing};
use crate::error::AnalysisError;
use crate::features::spectrum::{FftSpectrumBackend, SpectrumBackend};
use crate::io::decoder::AudioDecoder;
use crate::io::source::AudioSource;

/// Estimates the key of clips fetched from an [`AudioSource`]
pub struct KeyEstimator {
    config: AnalysisConfig,
    source: Arc<dyn AudioSource>,
    decoder: Arc<dyn AudioDecoder>,
    backend: Arc<dyn SpectrumBackend>,
    cache: Option<Arc<dyn ResultCache>>,
}

impl KeyEstimator {
    /// Build an estimator with the rustfft spectrum backend and no cache
    ///
    /// # Errors
    ///
    /// Whatever [`AnalysisConfig::validate`] rejects.
    pub fn new(
        config: AnalysisConfig,
        source: Arc<dyn AudioSource>,
        decoder: Arc<dyn AudioDecoder>,
    ) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self {
            config,
            source,
            decoder,
            backend: Arc::new(FftSpectrumBackend),
            cache: None,
        })
    }

    /// Replace the spectrum backend
    pub fn with_backend(mut self, backend: Arc<dyn SpectrumBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Attach a result cache
    pub fn with_cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Estimate the key of one clip
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the clip carries no tonal signal.
    ///
    /// # Errors
    ///
    /// - `Fetch` / `Decoding` / `Unsupported` when the audio cannot be acquired
    /// - `Cancelled` when `cancel` fires first
    ///
    /// Failures are returned as-is; nothing is retried.
    pub async fn estimate(
        &self,
        source_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<KeyEstimate>, AnalysisError> {
        if cancel.is_cancelled() {
            return Err(cancelled(source_id, "cache lookup"));
        }

        let cache_key = CacheKey::new(source_id, self.config.seconds_to_analyze);
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&cache_key) {
                log::debug!("Cache hit for {}", source_id);
                return Ok(hit);
            }
        }

        let audio = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(source_id, "fetch")),
            fetched = self.source.fetch(source_id) => fetched?,
        };

        if cancel.is_cancelled() {
            return Err(cancelled(source_id, "decode"));
        }

        let decoder = Arc::clone(&self.decoder);
        let max_seconds = self.config.seconds_to_analyze;
        let decode = tokio::task::spawn_blocking(move || {
            decoder.decode(audio.bytes, audio.extension_hint.as_deref(), Some(max_seconds))
        });
        // A decode still running on cancellation finishes on the blocking
        // pool and its output is dropped there.
        let decoded = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(source_id, "decode")),
            joined = decode => joined
                .map_err(|e| AnalysisError::Decoding(format!("Decoder task failed: {}", e)))??,
        };

        if cancel.is_cancelled() {
            return Err(cancelled(source_id, "frame processing"));
        }

        let sample_rate = decoded.sample_rate;
        let mono = decoded.into_mono(self.config.channel_mix)?;
        let mut session =
            AnalysisSession::new(mono, sample_rate, &self.config, self.backend.as_ref())?;

        let interval = self.config.frame_interval();
        while !session.is_finished() {
            match self.config.pacing {
                FramePacing::RealTime => {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {}
                        _ = tokio::time::sleep(interval) => {}
                    }
                }
                FramePacing::Immediate => tokio::task::yield_now().await,
            }
            if cancel.is_cancelled() {
                return Err(cancelled(source_id, "frame processing"));
            }
            session.process_next_frame()?;
        }

        let estimate = session.finish();
        if let Some(cache) = &self.cache {
            cache.insert(cache_key, estimate.clone());
        }

        match &estimate {
            Some(e) => log::debug!(
                "{}: {} (confidence {:.3})",
                source_id,
                e.result.key.name(),
                e.result.confidence
            ),
            None => log::debug!("{}: no tonal signal", source_id),
        }
        Ok(estimate)
    }

    /// Run [`estimate`](Self::estimate) on a new task
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self: Arc<Self>, source_id: impl Into<String>) -> AnalysisHandle {
        let source_id = source_id.into();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(async move { self.estimate(&source_id, &token).await });
        AnalysisHandle { cancel, task }
    }
}

fn cancelled(source_id: &str, stage: &str) -> AnalysisError {
    log::debug!("Analysis of {} cancelled before {}", source_id, stage);
    AnalysisError::Cancelled
}

impl std::fmt::Debug for KeyEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyEstimator")
            .field("config", &self.config)
            .field("cached", &self.cache.is_some())
            .finish()
    }
}

/// Handle to a spawned analysis run
#[derive(Debug)]
pub struct AnalysisHandle {
    cancel: CancellationToken,
    task: JoinHandle<Result<Option<KeyEstimate>, AnalysisError>>,
}

impl AnalysisHandle {
    /// Ask the run to stop; it resolves to `Err(Cancelled)` unless already done
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token driving this run, for tying it to a wider shutdown
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// True once the run has completed (successfully or not)
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the outcome
    ///
    /// A panic inside the run is resumed on the caller.
    pub async fn join(self) -> Result<Option<KeyEstimate>, AnalysisError> {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(AnalysisError::Cancelled),
        }
    }
}
