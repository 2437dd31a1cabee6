pub mod preprocessing;
pub mod contours;
pub mod polygon;
pub mod quads;
pub mod extract;
pub mod normalize;
pub mod ocr;
pub mod steps;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use crate::error::PlateError;
use crate::models::{PlateReading, Quad};
use crate::pipeline::Pipeline;
use ocr::TextRecognizer;
use steps::*;

/// Tunable parameters of the detection pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionParams {
    pub bilateral_diameter: i32,
    pub bilateral_sigma_color: f32,
    pub bilateral_sigma_space: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// How many of the largest contours are examined
    pub max_candidates: usize,
    /// Approximation tolerance as a fraction of contour perimeter
    pub approx_fraction: f64,
    pub upscale_factor: f32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            bilateral_diameter: 11,
            bilateral_sigma_color: 17.0,
            bilateral_sigma_space: 17.0,
            canny_low: 30.0,
            canny_high: 200.0,
            max_candidates: 10,
            approx_fraction: 0.02,
            upscale_factor: 1.2,
        }
    }
}

/// Main detection pipeline orchestrator
pub struct PlateDetector {
    pub params: DetectionParams,
    recognizer: Option<Arc<dyn TextRecognizer>>,
}

impl PlateDetector {
    /// Detector without a recognizer: can locate and extract, not read
    pub fn new(params: DetectionParams) -> Self {
        Self { params, recognizer: None }
    }

    pub fn with_recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Steps that turn a color image into a normalized plate image
    pub fn normalization_pipeline(&self) -> Pipeline {
        let p = &self.params;
        Pipeline::new()
            .add_step(Arc::new(GrayscaleStep))
            .add_step(Arc::new(BilateralFilterStep {
                diameter: p.bilateral_diameter,
                sigma_color: p.bilateral_sigma_color,
                sigma_space: p.bilateral_sigma_space,
            }))
            .add_step(Arc::new(EdgeDetectionStep {
                low_threshold: p.canny_low,
                high_threshold: p.canny_high,
            }))
            .add_step(Arc::new(PlateLocatorStep {
                max_candidates: p.max_candidates,
                perimeter_fraction: p.approx_fraction,
            }))
            .add_step(Arc::new(PlateCropStep))
            .add_step(Arc::new(UpscaleStep { factor: p.upscale_factor }))
            .add_step(Arc::new(OtsuThresholdStep))
    }

    /// The full pipeline, ending in OCR when a recognizer is configured
    pub fn pipeline(&self) -> Pipeline {
        let pipeline = self.normalization_pipeline();
        match &self.recognizer {
            Some(recognizer) => pipeline.add_step(Arc::new(OcrStep::new(recognizer.clone()))),
            None => pipeline,
        }
    }

    /// Candidate Locator on its own: the accepted quadrilateral, if any
    pub fn locate(&self, img: &DynamicImage) -> Option<Quad> {
        let p = &self.params;
        let gray = preprocessing::to_grayscale(img);
        let smoothed = preprocessing::bilateral_filter(&gray, p.bilateral_diameter, p.bilateral_sigma_color, p.bilateral_sigma_space);
        let edges = preprocessing::detect_edges(&smoothed, p.canny_low, p.canny_high);
        let ranked = contours::largest_by_area(contours::find_contours(&edges), p.max_candidates);
        quads::select_plate_quad(&ranked, p.max_candidates, p.approx_fraction)
    }

    /// Run the full pipeline on a decoded image.
    ///
    /// Fails only on true errors (recognition engine, debug output, a
    /// missing recognizer); an image without a plate is `Ok(NotFound)`.
    pub fn read(&self, img: DynamicImage) -> anyhow::Result<PlateReading> {
        if self.recognizer.is_none() {
            return Err(PlateError::engine("no text recognizer configured").into());
        }
        self.read_with(&self.pipeline(), img)
    }

    /// Run a pipeline built from this detector (e.g. one with debug output).
    ///
    /// The pipeline must end in recognition: a located plate that was
    /// never cropped or read is an error, not an empty reading.
    pub fn read_with(&self, pipeline: &Pipeline, img: DynamicImage) -> anyhow::Result<PlateReading> {
        let results = pipeline.run(img)?;

        let Some(item) = results.into_iter().next() else {
            info!("no plate detected");
            return Ok(PlateReading::NotFound);
        };

        let (Some(region), Some(text)) = (item.bbox, item.get_string("plate_text")) else {
            return Err(PlateError::engine("pipeline ended before recognition").into());
        };
        debug!(
            contours = item.get_int("contours"),
            quad_area = item.get_float("quad_area"),
            "located plate"
        );
        info!(text = %text, x = region.x, y = region.y, "plate read");

        Ok(PlateReading::Found { text: text.to_string(), region })
    }

    /// Decode an image file and read it
    pub fn read_file(&self, path: &Path) -> anyhow::Result<PlateReading> {
        let img = load_image(path)?;
        self.read(img)
    }
}

impl Default for PlateDetector {
    fn default() -> Self {
        Self::new(DetectionParams::default())
    }
}

/// Open and decode an image; failure aborts before any stage runs
pub fn load_image(path: &Path) -> Result<DynamicImage, PlateError> {
    let decode_err = |source: image::ImageError| PlateError::Decode {
        path: path.to_path_buf(),
        source,
    };
    image::ImageReader::open(path)
        .map_err(|e| decode_err(image::ImageError::IoError(e)))?
        .with_guessed_format()
        .map_err(|e| decode_err(image::ImageError::IoError(e)))?
        .decode()
        .map_err(decode_err)
}
