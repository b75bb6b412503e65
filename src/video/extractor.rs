use std::fs::create_dir_all;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tokio::task;
use tracing::{debug, info, warn};

use crate::config::ExtractionConfig;
use crate::error::{Result, VideoError};

/// Extracts numbered bitmap frames from a video using external FFmpeg commands
pub struct FrameExtractor {
    frame_rate: u32,
}

impl FrameExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            frame_rate: config.frame_rate,
        }
    }

    pub fn check_ffmpeg_available() -> bool {
        Command::new("ffmpeg")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Run one ffmpeg pass over `input`, sampling at the configured frame
    /// rate and writing `v-00001.bmp`, `v-00002.bmp`, ... into a fresh
    /// process-scoped temp directory.
    pub async fn extract<P: AsRef<Path>>(&self, input: P) -> Result<FrameSet> {
        let input = input.as_ref();

        if !Self::check_ffmpeg_available() {
            return Err(VideoError::FfmpegMissing {
                reason: "ffmpeg was not found on PATH".to_string(),
            }
            .into());
        }

        let workdir = std::env::temp_dir().join(format!("ivray_frames_{}", std::process::id()));
        create_dir_all(&workdir)?;

        let pattern = workdir.join("v-%05d.bmp");
        let mut cmd = Command::new("ffmpeg");
        cmd.args(&[
            "-i",
            &input.display().to_string(),
            "-vf",
            &format!("fps={}", self.frame_rate),
            "-y",
            &pattern.display().to_string(),
        ]);

        debug!("Running frame extraction: {:?}", cmd);

        let output = task::spawn_blocking(move || cmd.output())
            .await
            .map_err(|e| VideoError::ExtractionFailed {
                path: input.display().to_string(),
                reason: format!("Failed to spawn ffmpeg process: {}", e),
            })?
            .map_err(|e| VideoError::ExtractionFailed {
                path: input.display().to_string(),
                reason: format!("ffmpeg execution failed: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            remove_workspace(&workdir);
            return Err(VideoError::ExtractionFailed {
                path: input.display().to_string(),
                reason: format!("ffmpeg failed: {}", stderr.trim()),
            }
            .into());
        }

        let paths = match collect_frame_paths(&workdir) {
            Ok(paths) => paths,
            Err(e) => {
                remove_workspace(&workdir);
                return Err(e);
            }
        };
        if paths.is_empty() {
            remove_workspace(&workdir);
            return Err(VideoError::NoFrames {
                path: input.display().to_string(),
            }
            .into());
        }

        info!(
            "Extracted {} frames into {}",
            paths.len(),
            workdir.display()
        );

        Ok(FrameSet {
            workdir: Some(workdir),
            paths,
        })
    }
}

/// The ordered bitmap frames produced by one extraction pass.
///
/// A set built by [`FrameExtractor::extract`] owns its temp directory and
/// removes it on [`cleanup`](Self::cleanup) or drop; a set built over an
/// existing directory with [`from_dir`](Self::from_dir) never deletes
/// anything.
pub struct FrameSet {
    workdir: Option<PathBuf>,
    paths: Vec<PathBuf>,
}

impl FrameSet {
    /// Build a frame set over bitmaps that are already on disk.
    ///
    /// Picks up numbered `v-<index>.bmp` files in `dir`, in frame-number
    /// order. The caller keeps ownership of the directory.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let paths = collect_frame_paths(dir.as_ref())?;
        Ok(Self {
            workdir: None,
            paths,
        })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Frame file paths in playback order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Pixel dimensions of the first frame, read from its header only.
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        let first = self.paths.first().ok_or_else(|| VideoError::NoFrames {
            path: "frame set".to_string(),
        })?;

        let dims =
            image::image_dimensions(first).map_err(|source| VideoError::DecodeFailed {
                path: first.display().to_string(),
                source,
            })?;
        Ok(dims)
    }

    /// Release the temp directory without deleting it, for inspection after
    /// the run. Returns the directory, or None if this set never owned one.
    pub fn keep(&mut self) -> Option<PathBuf> {
        self.workdir.take()
    }

    /// Remove the owned temp directory and everything in it.
    ///
    /// A failed removal is logged, not returned: leftover frames never fail
    /// a conversion that already produced its output.
    pub fn cleanup(&mut self) {
        if let Some(workdir) = self.workdir.take() {
            remove_workspace(&workdir);
        }
    }
}

impl Drop for FrameSet {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn remove_workspace(workdir: &Path) {
    if let Err(e) = std::fs::remove_dir_all(workdir) {
        warn!(
            "Failed to remove frame workspace {}: {}",
            workdir.display(),
            e
        );
    }
}

fn collect_frame_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if let Some(index) = frame_index(&name) {
            paths.push((index, entry.path()));
        }
    }

    // Numeric order, not name order: the %05d pattern spills to six digits
    // past frame 99999, where names stop sorting like frame numbers.
    paths.sort_by_key(|&(index, _)| index);
    Ok(paths.into_iter().map(|(_, path)| path).collect())
}

/// Frame number of a `v-<digits>.bmp` file name, or None for any other name.
fn frame_index(name: &str) -> Option<u64> {
    name.strip_prefix("v-")?
        .strip_suffix(".bmp")?
        .parse()
        .ok()
}
