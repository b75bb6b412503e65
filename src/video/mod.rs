//! # Video Frame Extraction
//!
//! Decomposes the input video into numbered bitmap frames using the external
//! `ffmpeg` binary, one extraction pass per conversion. The extracted frames
//! land in a process-scoped temp directory that is removed once the run
//! finishes (or kept, when configured, for debugging a trace).

pub mod extractor;

pub use extractor::{FrameExtractor, FrameSet};
