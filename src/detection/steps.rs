use crate::pipeline::{PipelineData, PipelineStep, PipelineContext, MetadataValue};
use crate::detection::{preprocessing, contours, quads, extract, normalize, ocr};
use crate::detection::ocr::TextRecognizer;
use anyhow::Result;
use image::DynamicImage;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Convert image to grayscale
pub struct GrayscaleStep;

impl PipelineStep for GrayscaleStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        Ok(data
            .into_iter()
            .map(|item| {
                let gray = preprocessing::to_grayscale(&item.image);
                item.with_image(DynamicImage::ImageLuma8(gray))
            })
            .collect())
    }

    fn name(&self) -> &str {
        "Grayscale Conversion"
    }
}

/// Edge-preserving smoothing ahead of edge detection
pub struct BilateralFilterStep {
    pub diameter: i32,
    pub sigma_color: f32,
    pub sigma_space: f32,
}

impl PipelineStep for BilateralFilterStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        Ok(data
            .into_iter()
            .map(|item| {
                let gray = item.image.to_luma8();
                let smoothed = preprocessing::bilateral_filter(&gray, self.diameter, self.sigma_color, self.sigma_space);
                item.with_image(DynamicImage::ImageLuma8(smoothed))
            })
            .collect())
    }

    fn name(&self) -> &str {
        "Bilateral Filter"
    }
}

/// Detect edges using Canny
pub struct EdgeDetectionStep {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl PipelineStep for EdgeDetectionStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        Ok(data
            .into_iter()
            .map(|item| {
                let gray = item.image.to_luma8();
                let edges = preprocessing::detect_edges(&gray, self.low_threshold, self.high_threshold);
                item.with_image(DynamicImage::ImageLuma8(edges))
            })
            .collect())
    }

    fn name(&self) -> &str {
        "Edge Detection"
    }
}

/// Find the plate quadrilateral on the edge map.
/// Emits the item with its quad set, or nothing when no candidate qualifies.
pub struct PlateLocatorStep {
    pub max_candidates: usize,
    pub perimeter_fraction: f64,
}

impl PipelineStep for PlateLocatorStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();

        for item in data {
            let edges = item.image.to_luma8();
            let all_contours = contours::find_contours(&edges);
            let total = all_contours.len();
            let ranked = contours::largest_by_area(all_contours, self.max_candidates);
            debug!(total, ranked = ranked.len(), "contours found");

            match quads::select_plate_quad(&ranked, self.max_candidates, self.perimeter_fraction) {
                Some(quad) => {
                    let mut located = item.clone();
                    located.quad = Some(quad);
                    located.metadata.insert("contours".to_string(), MetadataValue::Int(total as i32));
                    located.metadata.insert("quad_area".to_string(), MetadataValue::Float(quad.area() as f32));
                    result.push(located);
                }
                None => info!(contours = total, "no quadrilateral candidate"),
            }
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "Plate Locator"
    }
}

/// Mask the quadrilateral and crop the grayscale source to its bounds
pub struct PlateCropStep;

impl PipelineStep for PlateCropStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();

        for item in data {
            let Some(quad) = item.quad else {
                warn!("crop requested for an item without a located plate");
                continue;
            };

            let gray = preprocessing::to_grayscale(&item.original);
            match extract::extract_plate_region(&gray, &quad) {
                Some((crop, bbox)) => {
                    debug!(x = bbox.x, y = bbox.y, width = bbox.width, height = bbox.height, "plate region");
                    let mut new_item = item.with_image(DynamicImage::ImageLuma8(crop));
                    new_item.bbox = Some(bbox);
                    result.push(new_item);
                }
                None => warn!(vertices = ?quad.vertices(), "quadrilateral rasterized to an empty mask"),
            }
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "Plate Crop"
    }
}

/// Scale images by a fixed factor with bicubic interpolation
pub struct UpscaleStep {
    pub factor: f32,
}

impl PipelineStep for UpscaleStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        Ok(data
            .into_iter()
            .map(|item| {
                let scaled = normalize::upscale(&item.image.to_luma8(), self.factor);
                item.with_image(DynamicImage::ImageLuma8(scaled))
            })
            .collect())
    }

    fn name(&self) -> &str {
        "Upscale"
    }
}

/// Binarize with an automatically selected (Otsu) threshold
pub struct OtsuThresholdStep;

impl PipelineStep for OtsuThresholdStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        Ok(data
            .into_iter()
            .map(|item| {
                let binary = normalize::binarize_otsu(&item.image.to_luma8());
                item.with_image(DynamicImage::ImageLuma8(binary))
            })
            .collect())
    }

    fn name(&self) -> &str {
        "Otsu Threshold"
    }
}

/// Run OCR on the normalized plate and store the sanitized text.
/// Items are kept even when the text comes out empty.
pub struct OcrStep {
    recognizer: Arc<dyn TextRecognizer>,
}

impl OcrStep {
    pub fn new(recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self { recognizer }
    }
}

impl PipelineStep for OcrStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();

        for item in data {
            let text = ocr::read_text(self.recognizer.as_ref(), &item.image.to_luma8())?;
            result.push(item.with_metadata("plate_text", MetadataValue::String(text)));
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "OCR Recognition"
    }
}
