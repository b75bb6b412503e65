use image::GrayImage;

use super::traits::{serpentine_trace, TraceConfig, TracedPath, VectorProducer};

/// Boundary tracer: emits only lit pixels with at least one unlit
/// 4-neighbor, so filled regions reduce to their outlines. Pixels on the
/// image border always count as boundary.
///
/// This is the default tracer; it emits far fewer vectors per frame than a
/// full scan of the same image.
pub struct EdgeTracer {
    position: (i32, i32),
}

impl EdgeTracer {
    pub fn new() -> Self {
        Self { position: (0, 0) }
    }
}

impl Default for EdgeTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorProducer for EdgeTracer {
    fn name(&self) -> &str {
        "edge"
    }

    fn description(&self) -> &str {
        "Outlines of lit regions (boundary pixels of the thresholded frame)"
    }

    fn trace(&mut self, image: &GrayImage, config: &TraceConfig) -> TracedPath {
        let (width, height) = image.dimensions();
        let lit = |x: u32, y: u32| image.get_pixel(x, y).0[0] >= config.threshold;
        let boundary = |x: u32, y: u32| {
            if !lit(x, y) {
                return false;
            }
            x == 0
                || y == 0
                || x + 1 == width
                || y + 1 == height
                || !lit(x - 1, y)
                || !lit(x + 1, y)
                || !lit(x, y - 1)
                || !lit(x, y + 1)
        };

        serpentine_trace(
            width,
            height,
            &mut self.position,
            config.max_vectors,
            boundary,
        )
    }

    fn reset(&mut self) {
        self.position = (0, 0);
    }
}
