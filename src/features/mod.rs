//! Feature extraction modules
//!
//! - Short-time spectra (transform capability)
//! - Chroma extraction and accumulation
//! - Key detection

pub mod chroma;
pub mod key;
pub mod spectrum;
