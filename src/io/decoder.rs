//! Audio decoding using Symphonia
//!
//! [`AudioDecoder`] is the decode capability the estimator depends on;
//! [`SymphoniaDecoder`] implements it with Symphonia's default format probe
//! and codec registry (WAV, FLAC, Ogg Vorbis, MP3/AAC where enabled, ...).

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::sample_buffer::DecodedAudio;
use crate::error::AnalysisError;

/// Turns an encoded audio payload into interleaved PCM
///
/// Decoding is CPU-bound and synchronous; async callers run it on a blocking
/// pool.
pub trait AudioDecoder: Send + Sync {
    /// Decode `bytes`
    ///
    /// # Arguments
    ///
    /// * `bytes` - Encoded payload (container + codec)
    /// * `hint` - File extension or MIME subtype to guide probing, if known
    /// * `max_seconds` - Stop once this much audio is decoded (`None` = all)
    ///
    /// # Errors
    ///
    /// `Decoding` when the payload is not recognisable audio or is broken,
    /// `Unsupported` when the container is readable but no codec handles it.
    fn decode(
        &self,
        bytes: Vec<u8>,
        hint: Option<&str>,
        max_seconds: Option<f32>,
    ) -> Result<DecodedAudio, AnalysisError>;
}

/// Symphonia-backed decoder
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaDecoder;

fn map_symphonia_error(context: &str, err: SymphoniaError) -> AnalysisError {
    match err {
        SymphoniaError::Unsupported(what) => {
            AnalysisError::Unsupported(format!("{}: {}", context, what))
        }
        other => AnalysisError::Decoding(format!("{}: {}", context, other)),
    }
}

impl AudioDecoder for SymphoniaDecoder {
    fn decode(
        &self,
        bytes: Vec<u8>,
        hint: Option<&str>,
        max_seconds: Option<f32>,
    ) -> Result<DecodedAudio, AnalysisError> {
        log::debug!(
            "Decoding {} bytes (hint: {})",
            bytes.len(),
            hint.unwrap_or("none")
        );

        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

        let mut probe_hint = Hint::new();
        if let Some(ext) = hint {
            probe_hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &probe_hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| AnalysisError::Decoding(format!("Failed to probe audio format: {}", e)))?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AnalysisError::Unsupported("No supported audio tracks found".to_string()))?;
        let track_id = track.id;

        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| AnalysisError::Decoding("Unknown sample rate".to_string()))?;
        let mut channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(0);

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| map_symphonia_error("Failed to create decoder", e))?;

        let max_frames = max_seconds
            .map(|s| crate::preprocessing::clip::samples_for_duration(s, sample_rate));

        let mut samples: Vec<f32> = Vec::new();
        let mut decoded_packets = 0usize;
        let mut skipped_packets = 0usize;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(map_symphonia_error("Error reading packet", e)),
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(msg)) => {
                    // Corrupted packet, keep going
                    log::warn!("Skipping undecodable packet: {}", msg);
                    skipped_packets += 1;
                    continue;
                }
                Err(e) => return Err(map_symphonia_error("Decode error", e)),
            };

            let spec = *decoded.spec();
            channels = spec.channels.count();
            let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            buffer.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buffer.samples());
            decoded_packets += 1;

            if let Some(limit) = max_frames {
                if channels > 0 && samples.len() / channels >= limit {
                    break;
                }
            }
        }

        if decoded_packets == 0 && skipped_packets > 0 {
            return Err(AnalysisError::Decoding(format!(
                "All {} packets failed to decode",
                skipped_packets
            )));
        }
        if channels == 0 {
            return Err(AnalysisError::Decoding(
                "Unknown channel layout".to_string(),
            ));
        }

        let mut audio = DecodedAudio::new(samples, sample_rate, channels);
        if let Some(seconds) = max_seconds {
            audio.truncate_seconds(seconds);
        }

        log::debug!(
            "Decoded {:.2} s at {} Hz, {} channel(s)",
            audio.duration_seconds(),
            sample_rate,
            channels
        );
        Ok(audio)
    }
}
