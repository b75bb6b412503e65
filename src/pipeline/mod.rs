//! # Conversion Pipeline
//!
//! Orchestrates the end-to-end conversion: extract frames, trace each one
//! into beam deltas, record them in the vector table, and serialize the
//! result, with the progress monitor reporting throughput alongside.

pub mod engine;

pub use engine::{ConversionEngine, ConversionSummary};
