use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort plate processing.
///
/// "No plate in the image" is not an error: it is reported as
/// [`crate::PlateReading::NotFound`].
#[derive(Error, Debug)]
pub enum PlateError {
    /// The source image could not be opened or decoded.
    #[error("failed to decode image {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The text-recognition engine could not be loaded or could not run.
    #[error("recognition engine: {message}")]
    RecognitionEngine { message: String },

    /// Invalid or unreadable configuration.
    #[error("configuration: {message}")]
    Config { message: String },

    /// Saving a debug image failed.
    #[error("failed to write debug output {path}")]
    DebugOutput {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl PlateError {
    pub fn engine(message: impl Into<String>) -> Self {
        Self::RecognitionEngine {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlateError>;
