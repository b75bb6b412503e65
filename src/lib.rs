//! # ivray
//!
//! Trace videos into `IVRY` vector tables for oscilloscope and laser
//! vector-scan playback.
//!
//! The converter decomposes a video into frames, reduces every frame to a
//! list of 2-D beam displacements, and stores the per-frame lists in a
//! compact binary table. A downstream renderer turns the table into the XY
//! signal that steers the beam; this crate only produces the table.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ivray::{
//!     config::Config,
//!     pipeline::ConversionEngine,
//!     tracer::TracerRegistry,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let registry = TracerRegistry::new();
//! let tracer = registry.get_tracer("edge").unwrap();
//!
//! let mut engine = ConversionEngine::new(config, tracer);
//! engine.convert("input.mp4", "output.ivry").await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - [`table`] - The per-frame vector container and its binary file format
//! - [`tracer`] - Frame-to-delta-list tracers and their registry
//! - [`video`] - ffmpeg-backed frame extraction
//! - [`progress`] - Periodic throughput reporting for the frame loop
//! - [`pipeline`] - The conversion engine tying the steps together
//! - [`config`] - Configuration management
//!
//! ## Creating Custom Tracers
//!
//! You can plug in your own frame reduction by implementing the
//! [`VectorProducer`](tracer::VectorProducer) trait:
//!
//! ```rust
//! use ivray::tracer::{TraceConfig, TracedPath, VectorProducer};
//! use image::GrayImage;
//!
//! struct CenterDot {
//!     position: (i32, i32),
//! }
//!
//! impl VectorProducer for CenterDot {
//!     fn name(&self) -> &str {
//!         "center_dot"
//!     }
//!
//!     fn description(&self) -> &str {
//!         "Parks the beam in the middle of every frame"
//!     }
//!
//!     fn trace(&mut self, image: &GrayImage, _config: &TraceConfig) -> TracedPath {
//!         let center = (image.width() as i32 / 2, image.height() as i32 / 2);
//!         let mut path = TracedPath::new();
//!         path.push(center.0 - self.position.0, center.1 - self.position.1);
//!         self.position = center;
//!         path
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod table;
pub mod tracer;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    error::{IvrayError, Result},
    pipeline::ConversionEngine,
    table::VectorTable,
    tracer::{TracerRegistry, VectorProducer}, // Export producer trait
};
