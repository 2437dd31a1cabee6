use image::imageops::FilterType;
use image::{GrayImage, Luma};
use imageproc::contrast::otsu_level;

/// Scale both axes by `factor` with bicubic interpolation
pub fn upscale(img: &GrayImage, factor: f32) -> GrayImage {
    let (width, height) = img.dimensions();
    let scaled_w = ((width as f32 * factor).round() as u32).max(1);
    let scaled_h = ((height as f32 * factor).round() as u32).max(1);

    image::imageops::resize(img, scaled_w, scaled_h, FilterType::CatmullRom)
}

/// Binarize with the threshold chosen by Otsu's method.
/// Pixels strictly above the level become white, the rest black.
pub fn binarize_otsu(img: &GrayImage) -> GrayImage {
    let level = otsu_level(img);
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        if img.get_pixel(x, y)[0] > level {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Upscale then binarize: the full normalization applied to a plate crop
pub fn normalize_plate(crop: &GrayImage, factor: f32) -> GrayImage {
    binarize_otsu(&upscale(crop, factor))
}
