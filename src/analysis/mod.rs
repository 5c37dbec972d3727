//! Analysis and result aggregation modules
//!
//! Turns accumulated pitch-class energy into the final estimate:
//! - Confidence calibration and flags
//! - Result types
//! - Metadata
//! - Per-clip analysis sessions

pub mod confidence;
pub mod metadata;
pub mod result;
pub mod session;
