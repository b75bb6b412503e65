use image::GrayImage;
use serde::{Deserialize, Serialize};

/// Core trait that all frame tracers must implement
pub trait VectorProducer: Send {
    /// Returns the unique name of this tracer
    fn name(&self) -> &str;

    /// Returns a human-readable description of this tracer
    fn description(&self) -> &str;

    /// Reduce one grayscale frame to a list of beam displacements
    ///
    /// # Arguments
    ///
    /// * `image` - The decoded frame, already converted to 8-bit luma
    /// * `config` - Shared tracing parameters
    ///
    /// # Returns
    ///
    /// The deltas for this frame, relative to the beam position left behind
    /// by the previous frame. Implementations keep the beam position as
    /// internal state so consecutive frames chain into one continuous path.
    fn trace(&mut self, image: &GrayImage, config: &TraceConfig) -> TracedPath;

    /// Park the beam back at the origin
    ///
    /// Called once before a conversion begins so a reused tracer does not
    /// start mid-screen.
    fn reset(&mut self) {}
}

/// Shared configuration for tracers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceConfig {
    /// Luma value (0-255) at or above which a pixel counts as lit
    pub threshold: u8,

    /// Hard cap on vectors emitted per frame; 0 means no cap
    pub max_vectors: u32,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            threshold: 128,
            max_vectors: 0,
        }
    }
}

/// The delta list produced for one frame, kept as parallel `dx`/`dy` arrays
/// shaped for [`VectorTable::record_frame`](crate::table::VectorTable::record_frame).
///
/// Deltas are full-width `i32`; narrowing to the format's 16-bit pairs
/// happens when the frame is recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TracedPath {
    dx: Vec<i32>,
    dy: Vec<i32>,
}

impl TracedPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            dx: Vec::with_capacity(capacity),
            dy: Vec::with_capacity(capacity),
        }
    }

    /// Append one displacement to the path.
    pub fn push(&mut self, dx: i32, dy: i32) {
        self.dx.push(dx);
        self.dy.push(dy);
    }

    pub fn len(&self) -> usize {
        self.dx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dx.is_empty()
    }

    pub fn dx(&self) -> &[i32] {
        &self.dx
    }

    pub fn dy(&self) -> &[i32] {
        &self.dy
    }
}

/// Walk every pixel in serpentine order (left-to-right on even rows,
/// right-to-left on odd rows), emitting one delta for each pixel `lit`
/// accepts and advancing the beam to it. A `max_vectors` of 0 means no cap.
pub(crate) fn serpentine_trace(
    width: u32,
    height: u32,
    position: &mut (i32, i32),
    max_vectors: u32,
    lit: impl Fn(u32, u32) -> bool,
) -> TracedPath {
    let mut path = TracedPath::new();

    for y in 0..height {
        for step in 0..width {
            let x = if y % 2 == 1 { width - 1 - step } else { step };
            if !lit(x, y) {
                continue;
            }
            if max_vectors != 0 && path.len() as u32 >= max_vectors {
                return path;
            }

            let (px, py) = *position;
            path.push(x as i32 - px, y as i32 - py);
            *position = (x as i32, y as i32);
        }
    }

    path
}
