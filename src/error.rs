use thiserror::Error;

/// Main error type for the Flowline library
#[derive(Error, Debug)]
pub enum FlowlineError {
    #[error("Art state error: {0}")]
    State(#[from] StateError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Video processing error: {0}")]
    Video(#[from] VideoError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Errors about art state snapshots and the registry holding them
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Snapshot not found: {id}")]
    NotFound { id: u64 },

    #[error("Snapshot field '{field}' has {actual} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Line {line} branches from line {target}, which is not drawn before it")]
    InvalidBranch { line: usize, target: usize },

    #[error("Malformed snapshot: {reason}")]
    Malformed { reason: String },
}

/// Rasterization errors
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Image encoding failed: {reason}")]
    EncodeFailed { reason: String },

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Video-specific errors
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Video encoding failed: {reason}")]
    EncodingFailed { reason: String },

    #[error("Failed to write frame {frame}: {reason}")]
    FrameWriteFailed { frame: usize, reason: String },

    #[error("Video generation cancelled after {frames_written} frames")]
    Cancelled { frames_written: usize },

    #[error("Invalid video parameters: {details}")]
    InvalidParameters { details: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Required dependency not available: {name}")]
    MissingDependency { name: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using FlowlineError
pub type Result<T> = std::result::Result<T, FlowlineError>;

impl FlowlineError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Check if this error is recoverable (the caller can fix the request and retry)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::State(StateError::NotFound { .. }) => true,
            Self::Video(VideoError::Cancelled { .. }) => true,
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::State(StateError::NotFound { id }) => {
                format!("No artwork with id {} has been generated in this session.", id)
            }
            Self::Config(ConfigError::MissingDependency { name }) => {
                format!("Video generation needs '{}' on PATH. Please install it and try again.", name)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, value: impl ToString) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}
