//! Task implementations
pub mod level_measure;
pub mod orchestrate;
