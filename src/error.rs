use thiserror::Error;

/// Main error type for the ivray library
#[derive(Error, Debug)]
pub enum IvrayError {
    #[error("Vector table error: {0}")]
    Table(#[from] TableError),

    #[error("Vector table file error: {0}")]
    Format(#[from] FormatError),

    #[error("Video processing error: {0}")]
    Video(#[from] VideoError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Errors raised by the in-memory vector table
#[derive(Error, Debug)]
pub enum TableError {
    #[error("frame index {index} out of range for a table of {frame_count} frames")]
    FrameIndexOutOfRange { index: u32, frame_count: u32 },

    #[error("delta arrays disagree in length: {dx_len} dx values, {dy_len} dy values")]
    MismatchedDeltas { dx_len: usize, dy_len: usize },

    #[error("frame holds {count} vectors, more than the format can record (max {max})", max = u32::MAX)]
    TooManyVectors { count: usize },

    #[error("vector buffer allocation failed: {0}")]
    Allocation(#[from] std::collections::TryReserveError),
}

/// Errors raised while writing or reading the binary table format
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },

    #[error("not a vector table: magic bytes {found:02x?} do not spell \"IVRY\"")]
    InvalidMagic { found: [u8; 4] },

    #[error("vector table file ends early while reading {context}")]
    UnexpectedEof { context: String },

    #[error("vector table allocation failed: {0}")]
    Allocation(#[from] std::collections::TryReserveError),
}

/// Errors raised by the frame extraction step
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("ffmpeg not available: {reason}")]
    FfmpegMissing { reason: String },

    #[error("frame extraction failed for {path}: {reason}")]
    ExtractionFailed { path: String, reason: String },

    #[error("no frames extracted from {path}")]
    NoFrames { path: String },

    #[error("failed to decode frame {path}: {source}")]
    DecodeFailed {
        path: String,
        source: image::ImageError,
    },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using IvrayError
pub type Result<T> = std::result::Result<T, IvrayError>;

impl IvrayError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Check if this error is recoverable (can be retried)
    pub fn is_recoverable(&self) -> bool {
        match self {
            // IO errors might be temporary
            Self::Io(_) => true,
            Self::Format(FormatError::Io { .. }) => true,
            // An ffmpeg run might succeed on retry
            Self::Video(VideoError::ExtractionFailed { .. }) => true,
            // Most other errors are permanent
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Video(VideoError::FfmpegMissing { .. }) => {
                "ffmpeg was not found on PATH. Please install FFmpeg to extract video frames."
                    .to_string()
            }
            Self::Format(FormatError::InvalidMagic { .. }) => {
                "The file is not an IVRY vector table (wrong magic bytes).".to_string()
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
