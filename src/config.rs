use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use crate::detection::DetectionParams;
use crate::detection::ocr::RecognizerConfig;
use crate::error::{PlateError, Result};
use crate::submission::SubmissionConfig;

/// Application settings, read from a TOML file.
///
/// Every section is optional and falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub detection: DetectionParams,
    pub recognizer: RecognizerConfig,
    pub submission: SubmissionConfig,
}

impl AppConfig {
    /// Load configuration from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| PlateError::config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml(&content)
            .map_err(|e| PlateError::config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)
            .map_err(|e| PlateError::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Settle the OCR model directory.
    ///
    /// An explicit directory (command line, then `$PLATESCAN_MODEL_DIR`) wins
    /// over the file; with neither, the ocrs cache under `home` is used.
    pub fn resolve_model_dir(&mut self, explicit: Option<PathBuf>, home: Option<PathBuf>) {
        if let Some(dir) = explicit {
            self.recognizer.model_dir = dir;
        } else if self.recognizer.model_dir.as_os_str().is_empty() {
            self.recognizer.model_dir = home.unwrap_or_default().join(".cache").join("ocrs");
        }
    }

    pub fn validate(&self) -> Result<()> {
        let d = &self.detection;
        if d.max_candidates == 0 {
            return Err(PlateError::config("detection.max_candidates must be at least 1"));
        }
        if !(d.approx_fraction > 0.0) {
            return Err(PlateError::config("detection.approx_fraction must be positive"));
        }
        if !(d.upscale_factor > 0.0) {
            return Err(PlateError::config("detection.upscale_factor must be positive"));
        }
        if d.canny_low > d.canny_high {
            return Err(PlateError::config("detection.canny_low must not exceed canny_high"));
        }
        if !(d.bilateral_sigma_color > 0.0 && d.bilateral_sigma_space > 0.0) {
            return Err(PlateError::config("bilateral sigmas must be positive"));
        }
        Ok(())
    }
}
