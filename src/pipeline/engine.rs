use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    config::Config,
    error::{IvrayError, Result, VideoError},
    progress::{MonitorConfig, ProgressCounter, ProgressMonitor},
    table::VectorTable,
    tracer::VectorProducer,
    video::{FrameExtractor, FrameSet},
};

/// Main conversion engine that orchestrates the video to vector table pipeline
///
/// The engine follows a clear pipeline:
/// 1. Frame Extraction - decompose the input video into bitmap frames
/// 2. Table Setup - size the vector table to the extracted frame count
/// 3. Tracing Loop - trace frames in index order, recording each delta list,
///    while the progress monitor reports throughput every few seconds
/// 4. Output - final status line, table serialization, workspace cleanup
pub struct ConversionEngine {
    config: Config,
    tracer: Box<dyn VectorProducer>,
}

/// What a finished conversion produced
#[derive(Debug, Clone)]
pub struct ConversionSummary {
    pub frames: u32,
    pub vectors: u64,
    pub output_path: String,
    pub output_bytes: u64,
}

impl ConversionEngine {
    /// Create a new conversion engine with the given configuration and tracer
    pub fn new(config: Config, tracer: Box<dyn VectorProducer>) -> Self {
        Self { config, tracer }
    }

    /// Main conversion method - runs the entire pipeline
    ///
    /// # Arguments
    ///
    /// * `input` - Path to the source video (anything ffmpeg can open)
    /// * `output` - Path for the vector table file
    pub async fn convert<P: AsRef<Path>>(
        &mut self,
        input: P,
        output: P,
    ) -> Result<ConversionSummary> {
        let input = input.as_ref();
        let output = output.as_ref();

        info!("🎞️  Starting ivray conversion");
        info!("   Input: {:?}", input);
        info!("   Output: {:?}", output);
        info!("   Tracer: {}", self.tracer.name());

        // Pipeline Step 1: Frame Extraction
        let mut frames = self.extract_frames(input).await?;

        // Pipeline Step 2: Table Setup
        let mut table = self.build_table(&frames)?;

        // Pipeline Step 3: Tracing Loop, monitored
        let counter = Arc::new(ProgressCounter::new());
        let monitor = self.arm_monitor(&frames, Arc::clone(&counter))?;
        self.trace_frames(&frames, &mut table, &counter)?;

        // One explicit final firing after the loop, so the status line ends
        // on the true frame count regardless of where the cadence landed.
        let final_report = monitor.finish().await?;
        info!("   ✅ Tracing complete: {}", final_report);

        // Pipeline Step 4: Output
        let summary = self.write_output(&table, output)?;

        if self.config.extraction.keep_frames {
            if let Some(dir) = frames.keep() {
                info!("Keeping extracted frames in {}", dir.display());
            }
        } else {
            frames.cleanup();
        }

        info!("🎉 Conversion complete! Output saved to: {:?}", output);
        Ok(summary)
    }

    // ==========================================
    // PIPELINE STEP 1: FRAME EXTRACTION
    // ==========================================

    /// Extract numbered bitmap frames from the input video
    async fn extract_frames(&self, input: &Path) -> Result<FrameSet> {
        info!("📹 Step 1: Extracting frames...");

        let extractor = FrameExtractor::new(&self.config.extraction);
        let frames = extractor.extract(input).await?;

        info!(
            "   ✅ {} frames extracted at {} fps",
            frames.len(),
            self.config.extraction.frame_rate
        );
        Ok(frames)
    }

    // ==========================================
    // PIPELINE STEP 2: TABLE SETUP
    // ==========================================

    /// Size the vector table to the extracted frame count and stamp the
    /// configured playback scalars into it
    fn build_table(&self, frames: &FrameSet) -> Result<VectorTable> {
        info!("🗂️  Step 2: Preparing vector table...");

        let frame_count = u32::try_from(frames.len()).map_err(|_| {
            IvrayError::generic(format!(
                "{} frames exceed the table's index range",
                frames.len()
            ))
        })?;

        let mut table = VectorTable::new(frame_count)?;
        table.brightness = self.config.render.brightness;
        table.speed = self.config.render.speed;

        info!(
            "   ✅ Table sized for {} frames (brightness {:.2}, speed {:.2})",
            frame_count, table.brightness, table.speed
        );
        Ok(table)
    }

    /// Arm the progress monitor with a per-frame byte estimate fixed from
    /// the first frame's dimensions
    fn arm_monitor(
        &self,
        frames: &FrameSet,
        counter: Arc<ProgressCounter>,
    ) -> Result<ProgressMonitor> {
        let (width, height) = frames.dimensions()?;
        let config = MonitorConfig {
            frame_bytes: frame_payload_estimate(width, height),
            ..MonitorConfig::default()
        };

        debug!(
            "Monitor armed: {}x{} frames, {} byte estimate",
            width, height, config.frame_bytes
        );
        Ok(ProgressMonitor::spawn(counter, config))
    }

    // ==========================================
    // PIPELINE STEP 3: TRACING LOOP
    // ==========================================

    /// Decode, trace and record every frame in index order, advancing the
    /// shared counter once per completed frame
    fn trace_frames(
        &mut self,
        frames: &FrameSet,
        table: &mut VectorTable,
        counter: &ProgressCounter,
    ) -> Result<()> {
        info!(
            "🖊️  Step 3: Tracing {} frames with '{}'...",
            frames.len(),
            self.tracer.name()
        );

        self.tracer.reset();

        for (index, path) in frames.paths().iter().enumerate() {
            let image = image::open(path)
                .map_err(|source| VideoError::DecodeFailed {
                    path: path.display().to_string(),
                    source,
                })?
                .to_luma8();

            let traced = self.tracer.trace(&image, &self.config.trace);
            debug!("frame {}: {} vectors", index, traced.len());

            table.record_frame(index as u32, traced.dx(), traced.dy())?;
            counter.advance();
        }

        Ok(())
    }

    // ==========================================
    // PIPELINE STEP 4: OUTPUT
    // ==========================================

    /// Serialize the table and report what landed on disk
    fn write_output(&self, table: &VectorTable, output: &Path) -> Result<ConversionSummary> {
        info!("💾 Step 4: Writing vector table...");

        table.save(output)?;
        let output_bytes = std::fs::metadata(output)?.len();

        let summary = ConversionSummary {
            frames: table.frame_count(),
            vectors: table.total_vectors(),
            output_path: output.display().to_string(),
            output_bytes,
        };

        info!("   ✅ Output written:");
        info!("      File saved: {}", summary.output_path);
        info!("      Frames: {}", summary.frames);
        info!("      Vectors: {}", summary.vectors);
        info!(
            "      File size: {:.1} KB",
            summary.output_bytes as f64 / 1024.0
        );

        Ok(summary)
    }
}

/// Rough raw size of one extracted frame in bytes (24-bit bitmap pixels,
/// times a 4x working-copy factor). Feeds the reported bitrate only.
pub(crate) fn frame_payload_estimate(width: u32, height: u32) -> u64 {
    3 * width as u64 * height as u64 * 4
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracer::ScanTracer;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    fn write_frame(dir: &Path, index: u32, lit: &[(u32, u32)]) {
        let mut image = RgbImage::new(8, 8);
        for &(x, y) in lit {
            image.put_pixel(x, y, Rgb([255, 255, 255]));
        }
        image.save(dir.join(format!("v-{:05}.bmp", index))).unwrap();
    }

    #[test]
    fn test_frame_payload_estimate() {
        assert_eq!(frame_payload_estimate(320, 240), 3 * 320 * 240 * 4);
    }

    #[test]
    fn test_trace_frames_records_in_index_order() {
        let dir = tempdir().unwrap();
        write_frame(dir.path(), 1, &[(1, 1), (2, 1)]);
        write_frame(dir.path(), 2, &[(4, 4)]);
        write_frame(dir.path(), 3, &[]);

        let frames = FrameSet::from_dir(dir.path()).unwrap();
        let mut table = VectorTable::new(3).unwrap();
        let counter = ProgressCounter::new();

        let mut engine = ConversionEngine::new(Config::default(), Box::new(ScanTracer::new()));
        engine.trace_frames(&frames, &mut table, &counter).unwrap();

        assert_eq!(counter.position(), 3);
        assert_eq!(table.frame(0).unwrap().vector_count(), 2);
        assert_eq!(table.frame(1).unwrap().vector_count(), 1);
        assert_eq!(table.frame(2).unwrap().vector_count(), 0);
        assert_eq!(table.total_vectors(), 3);
    }

    #[test]
    fn test_build_table_applies_render_scalars() {
        let dir = tempdir().unwrap();
        write_frame(dir.path(), 1, &[]);
        let frames = FrameSet::from_dir(dir.path()).unwrap();

        let mut config = Config::default();
        config.render.brightness = 0.5;
        config.render.speed = 2.0;

        let engine = ConversionEngine::new(config, Box::new(ScanTracer::new()));
        let table = engine.build_table(&frames).unwrap();

        assert_eq!(table.frame_count(), 1);
        assert_eq!(table.brightness, 0.5);
        assert_eq!(table.speed, 2.0);
    }

    #[test]
    fn test_write_output_reports_file_size() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.ivry");

        let mut table = VectorTable::new(1).unwrap();
        table.record_frame(0, &[1], &[2]).unwrap();

        let engine = ConversionEngine::new(Config::default(), Box::new(ScanTracer::new()));
        let summary = engine.write_output(&table, &out).unwrap();

        assert_eq!(summary.frames, 1);
        assert_eq!(summary.vectors, 1);
        assert_eq!(summary.output_bytes, 24); // 16 header + 4 count + 4 pair
        assert!(out.exists());
    }

    #[tokio::test]
    async fn test_monitored_trace_reports_final_count() {
        let dir = tempdir().unwrap();
        for i in 1..=4 {
            write_frame(dir.path(), i, &[(i % 8, 2)]);
        }

        let frames = FrameSet::from_dir(dir.path()).unwrap();
        let mut table = VectorTable::new(4).unwrap();
        let counter = Arc::new(ProgressCounter::new());

        let mut engine = ConversionEngine::new(Config::default(), Box::new(ScanTracer::new()));
        let monitor = engine.arm_monitor(&frames, Arc::clone(&counter)).unwrap();
        engine.trace_frames(&frames, &mut table, &counter).unwrap();

        let report = monitor.finish().await.unwrap();
        assert_eq!(report.frame_index, 4);
        assert_eq!(table.total_vectors(), 4);
    }
}
