//! Audio I/O modules
//!
//! Audio acquisition, decoding using Symphonia, and decoded sample buffers.

pub mod decoder;
pub mod sample_buffer;
pub mod source;

pub use decoder::{AudioDecoder, SymphoniaDecoder};
pub use sample_buffer::DecodedAudio;
#[cfg(feature = "http")]
pub use source::HttpSource;
pub use source::{AudioSource, FileSource, SourceAudio};
