use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    tracer::TraceConfig,
};

/// Main configuration for an ivray conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Frame extraction settings
    pub extraction: ExtractionConfig,

    /// Tracing settings shared by all tracers
    pub trace: TraceConfig,

    /// Playback scalars written into the table header
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extraction: ExtractionConfig::default(),
            trace: TraceConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.extraction.validate()?;
        self.render.validate()?;
        Ok(())
    }
}

/// Frame extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Frames sampled per second of video
    pub frame_rate: u32,

    /// Keep the extracted bitmaps on disk after the run
    pub keep_frames: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            frame_rate: 24,
            keep_frames: false,
        }
    }
}

impl ExtractionConfig {
    fn validate(&self) -> Result<()> {
        if self.frame_rate == 0 {
            return Err(ConfigError::InvalidValue {
                key: "extraction.frame_rate".to_string(),
                value: self.frame_rate.to_string()
            }.into());
        }

        Ok(())
    }
}

/// Playback scalars carried verbatim into the table header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Beam brightness scale for the downstream renderer
    pub brightness: f32,

    /// Playback speed scale for the downstream renderer
    pub speed: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            speed: 1.0,
        }
    }
}

impl RenderConfig {
    fn validate(&self) -> Result<()> {
        if !self.brightness.is_finite() || self.brightness <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "render.brightness".to_string(),
                value: self.brightness.to_string()
            }.into());
        }

        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "render.speed".to_string(),
                value: self.speed.to_string()
            }.into());
        }

        Ok(())
    }
}
