use image::GrayImage;

use super::traits::{serpentine_trace, TraceConfig, TracedPath, VectorProducer};

/// Raster tracer: emits every lit pixel in serpentine scan order.
///
/// Produces dense, filled renderings at the cost of many more vectors per
/// frame than [`EdgeTracer`](super::EdgeTracer); pair it with a
/// `max_vectors` cap for busy footage.
pub struct ScanTracer {
    position: (i32, i32),
}

impl ScanTracer {
    pub fn new() -> Self {
        Self { position: (0, 0) }
    }
}

impl Default for ScanTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorProducer for ScanTracer {
    fn name(&self) -> &str {
        "scan"
    }

    fn description(&self) -> &str {
        "Every lit pixel in serpentine scan order (filled rendering)"
    }

    fn trace(&mut self, image: &GrayImage, config: &TraceConfig) -> TracedPath {
        let (width, height) = image.dimensions();
        let lit = |x: u32, y: u32| image.get_pixel(x, y).0[0] >= config.threshold;

        serpentine_trace(width, height, &mut self.position, config.max_vectors, lit)
    }

    fn reset(&mut self) {
        self.position = (0, 0);
    }
}
