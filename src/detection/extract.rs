use image::{GrayImage, Luma};
use imageproc::drawing::draw_polygon_mut;
use crate::models::Quad;
use crate::pipeline::BoundingBox;

const MASK_FILL: u8 = 255;

/// Rasterize the quadrilateral into a mask the size of the source image
pub fn quad_mask(quad: &Quad, width: u32, height: u32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    draw_polygon_mut(&mut mask, quad.vertices(), Luma([MASK_FILL]));
    mask
}

/// Inclusive bounds of all filled mask pixels, or `None` for an empty mask
pub fn mask_bounds(mask: &GrayImage) -> Option<BoundingBox> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;

    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel[0] != MASK_FILL {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((min_x, min_y, max_x, max_y)) => (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y)),
        });
    }

    bounds.map(|(min_x, min_y, max_x, max_y)| BoundingBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

/// Crop the grayscale source to the box enclosing the masked quadrilateral
pub fn extract_plate_region(gray: &GrayImage, quad: &Quad) -> Option<(GrayImage, BoundingBox)> {
    let (width, height) = gray.dimensions();
    let mask = quad_mask(quad, width, height);
    let bbox = mask_bounds(&mask)?;

    let crop = image::imageops::crop_imm(gray, bbox.x, bbox.y, bbox.width, bbox.height).to_image();
    Some((crop, bbox))
}
