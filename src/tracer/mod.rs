//! # Frame Tracers
//!
//! This module provides the tracer system that reduces a grayscale video
//! frame to the list of beam displacements recorded in the vector table.
//! Tracers are looked up by name through the [`TracerRegistry`] and drive
//! the shape of the final vector-scan image.
//!
//! ## Available Tracers
//!
//! - **edge**: outlines of lit regions; filled shapes reduce to their borders
//! - **scan**: every lit pixel in serpentine scan order
//!
//! Tracers are stateful: the beam position carries over from frame to frame,
//! so each frame's deltas continue one unbroken path across the whole video.
//!
//! ## Usage
//!
//! ```rust
//! use ivray::tracer::{TracerRegistry, TraceConfig};
//! use image::GrayImage;
//!
//! let registry = TracerRegistry::new();
//! let mut tracer = registry.get_tracer("edge").unwrap();
//!
//! let frame = GrayImage::new(64, 48);
//! let path = tracer.trace(&frame, &TraceConfig::default());
//! assert!(path.is_empty()); // nothing lit in a black frame
//! ```

pub mod registry;
pub mod traits;

mod edge;
mod scan;

pub use edge::EdgeTracer;
pub use registry::TracerRegistry;
pub use scan::ScanTracer;
pub use traits::{TraceConfig, TracedPath, VectorProducer};
