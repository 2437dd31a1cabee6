use image::{DynamicImage, GrayImage};
pub use ocrs::{OcrEngine, ImageSource};  // Re-export for use in other modules
use ocrs::OcrEngineParams;
use rten::Model;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;
use crate::error::{PlateError, Result};

/// Environment variable overriding the model directory
pub const MODEL_DIR_ENV: &str = "PLATESCAN_MODEL_DIR";

/// Where the recognition engine finds its model data.
///
/// `recognition_model` selects the character model for the plate's script.
/// An empty `model_dir` means "not configured"; see
/// [`crate::AppConfig::resolve_model_dir`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    pub model_dir: PathBuf,
    pub detection_model: String,
    pub recognition_model: String,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::new(),
            detection_model: "text-detection.rten".to_string(),
            recognition_model: "text-recognition.rten".to_string(),
        }
    }
}

impl RecognizerConfig {
    pub fn detection_model_path(&self) -> PathBuf {
        self.model_dir.join(&self.detection_model)
    }

    pub fn recognition_model_path(&self) -> PathBuf {
        self.model_dir.join(&self.recognition_model)
    }
}

/// Optical character recognition over a single binarized text block.
pub trait TextRecognizer: Send + Sync {
    /// Raw engine output, before sanitization
    fn recognize(&self, image: &GrayImage) -> Result<String>;
}

/// Keep only letters and digits, in their original order
pub fn sanitize(raw: &str) -> String {
    raw.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Recognize and sanitize in one call
pub fn read_text(recognizer: &dyn TextRecognizer, image: &GrayImage) -> Result<String> {
    let raw = recognizer.recognize(image)?;
    let text = sanitize(&raw);
    debug!(raw = %raw.escape_debug(), text = %text, "recognized plate text");
    Ok(text)
}

/// [`TextRecognizer`] backed by the ocrs engine
pub struct OcrsRecognizer {
    engine: OcrEngine,
}

impl OcrsRecognizer {
    /// Load detection and recognition models from the configured directory
    pub fn new(config: &RecognizerConfig) -> Result<Self> {
        let detection_model_path = config.detection_model_path();
        let recognition_model_path = config.recognition_model_path();

        if !detection_model_path.exists() || !recognition_model_path.exists() {
            return Err(PlateError::engine(format!(
                "OCR models not found. Please run: ocrs-cli --help (or download models manually)\n\
                 Expected locations:\n  - {}\n  - {}",
                detection_model_path.display(),
                recognition_model_path.display()
            )));
        }

        let detection_model = Model::load_file(&detection_model_path)
            .map_err(|e| PlateError::engine(format!("failed to load {}: {}", detection_model_path.display(), e)))?;
        let recognition_model = Model::load_file(&recognition_model_path)
            .map_err(|e| PlateError::engine(format!("failed to load {}: {}", recognition_model_path.display(), e)))?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|e| PlateError::engine(e.to_string()))?;

        Ok(Self { engine })
    }
}

impl TextRecognizer for OcrsRecognizer {
    fn recognize(&self, image: &GrayImage) -> Result<String> {
        // The engine takes RGB input
        let img = DynamicImage::ImageLuma8(image.clone()).to_rgb8();

        let img_source = ImageSource::from_bytes(img.as_raw(), img.dimensions())
            .map_err(|e| PlateError::engine(format!("invalid image for OCR: {:?}", e)))?;
        let ocr_input = self.engine.prepare_input(img_source)
            .map_err(|e| PlateError::engine(e.to_string()))?;

        // A plate is a single text block: line breaks the engine emits are
        // dropped together with the other non-alphanumerics by `sanitize`
        self.engine
            .get_text(&ocr_input)
            .map_err(|e| PlateError::engine(e.to_string()))
    }
}
