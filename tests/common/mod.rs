#![allow(dead_code, unused_imports)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from platescan for tests
pub use platescan::{
    BoundingBox, DetectionParams, PlateDetector, PlateError, PlateReading, RecordClient, RecordKind,
    SubmissionConfig, SubmissionOutcome,
};
