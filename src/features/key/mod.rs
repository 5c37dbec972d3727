//! Key detection modules
//!
//! Detect musical key using:
//! - Krumhansl-Kessler key profiles (24 keys)
//! - Pearson correlation against every rotation
//! - Key clarity scoring

pub mod detector;
pub mod key_clarity;
pub mod templates;

pub use detector::{best_match, correlate, rank_candidates, score_all};
pub use key_clarity::compute_key_clarity;
pub use templates::KeyProfile;
