//! Audio preprocessing modules
//!
//! Utilities for preparing decoded audio for spectral analysis:
//! - Channel mixing (multi-channel to mono)
//! - Clip truncation to the analysis duration

pub mod channel_mixer;
pub mod clip;
