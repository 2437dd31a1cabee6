pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod submission;

pub use config::AppConfig;
pub use detection::{DetectionParams, PlateDetector, load_image};
pub use detection::ocr::{OcrsRecognizer, RecognizerConfig, TextRecognizer, sanitize};
pub use error::PlateError;
pub use models::{Contour, PlateReading, Quad};
pub use pipeline::{
    Pipeline, PipelineData, PipelineStep, PipelineContext,
    BoundingBox, MetadataValue, DebugConfig
};
pub use submission::{RecordClient, RecordKind, SubmissionConfig, SubmissionOutcome};
