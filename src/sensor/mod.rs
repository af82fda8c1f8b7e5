//! Ultrasonic sensing pipeline
//!
//! Split into the pulse timing driver (one raw sample per call), the batch
//! statistics (median with quorum, trailing smoothing window) and the level
//! normalization (range validation, rescale to a fill percentage).
pub mod driver;
pub mod level;
pub mod sampling;
