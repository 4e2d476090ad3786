use thiserror::Error;
use std::io;
use std::path::PathBuf;

/// Custom error types for fruit_count
#[derive(Error, Debug)]
pub enum FruitCountError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to decode image {path}: {reason}")]
    Decode {
        path: PathBuf,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration from {path}: {source}")]
    ConfigParse {
        source: toml::de::Error,
        path: PathBuf,
    },

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV output error: {0}")]
    CsvOutput(#[from] csv::Error),

    #[error("Invalid input path: {0}")]
    InvalidPath(PathBuf),
}

impl FruitCountError {
    /// Shorthand for a decode failure on an image that has no backing file
    pub fn decode<S: Into<String>>(path: impl Into<PathBuf>, reason: S) -> Self {
        FruitCountError::Decode {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True for failures that only concern a single image
    pub fn is_per_image(&self) -> bool {
        matches!(self, FruitCountError::Decode { .. })
    }
}

/// Type alias for Result with our custom error type
pub type Result<T> = std::result::Result<T, FruitCountError>;
