use image::{DynamicImage, GrayImage, Luma};
use imageproc::edges::canny;

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Edge-preserving smoothing.
///
/// `diameter` is the pixel neighbourhood (a disc of radius `diameter / 2`;
/// a non-positive value derives the radius from `sigma_space`). Borders are
/// mirrored without repeating the edge pixel.
pub fn bilateral_filter(img: &GrayImage, diameter: i32, sigma_color: f32, sigma_space: f32) -> GrayImage {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return img.clone();
    }

    let radius = if diameter <= 0 {
        (sigma_space * 1.5).round().max(1.0) as i32
    } else {
        (diameter / 2).max(1)
    };

    let space_coeff = -0.5 / (sigma_space * sigma_space);
    let color_coeff = -0.5 / (sigma_color * sigma_color);

    // Disc of offsets with their spatial weights
    let mut window: Vec<(i32, i32, f32)> = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let r2 = (dx * dx + dy * dy) as f32;
            if r2.sqrt() > radius as f32 {
                continue;
            }
            window.push((dx, dy, (r2 * space_coeff).exp()));
        }
    }

    let color_weight: Vec<f32> = (0..256)
        .map(|d| ((d * d) as f32 * color_coeff).exp())
        .collect();

    GrayImage::from_fn(width, height, |x, y| {
        let center = img.get_pixel(x, y)[0];
        let mut sum = 0.0f32;
        let mut weight_sum = 0.0f32;

        for &(dx, dy, space_w) in &window {
            let nx = reflect_101(x as i32 + dx, width);
            let ny = reflect_101(y as i32 + dy, height);
            let value = img.get_pixel(nx, ny)[0];
            let w = space_w * color_weight[center.abs_diff(value) as usize];
            sum += value as f32 * w;
            weight_sum += w;
        }

        Luma([(sum / weight_sum).round().clamp(0.0, 255.0) as u8])
    })
}

/// Detect edges using Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}

/// Mirror an out-of-range coordinate back into `0..len`: `-1 -> 1`, `len -> len - 2`
fn reflect_101(i: i32, len: u32) -> u32 {
    let len = len as i32;
    if len == 1 {
        return 0;
    }
    let mut i = i;
    while i < 0 || i >= len {
        i = if i < 0 { -i } else { 2 * len - 2 - i };
    }
    i as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflection_mirrors_around_edges() {
        assert_eq!(reflect_101(-1, 10), 1);
        assert_eq!(reflect_101(-3, 10), 3);
        assert_eq!(reflect_101(10, 10), 8);
        assert_eq!(reflect_101(4, 10), 4);
        assert_eq!(reflect_101(-7, 3), 1);
        assert_eq!(reflect_101(5, 1), 0);
    }

    #[test]
    fn bilateral_keeps_uniform_image() {
        let img = GrayImage::from_pixel(20, 12, Luma([137u8]));
        let out = bilateral_filter(&img, 11, 17.0, 17.0);
        assert!(out.pixels().all(|p| p[0] == 137));
    }

    #[test]
    fn bilateral_preserves_hard_edge() {
        let img = GrayImage::from_fn(30, 10, |x, _| if x < 15 { Luma([20u8]) } else { Luma([230u8]) });
        let out = bilateral_filter(&img, 11, 17.0, 17.0);
        // A 210-level jump is far outside sigma_color, so neither side bleeds
        for y in 0..10 {
            assert_eq!(out.get_pixel(14, y)[0], 20);
            assert_eq!(out.get_pixel(15, y)[0], 230);
        }
    }

    #[test]
    fn bilateral_smooths_small_noise() {
        let mut img = GrayImage::from_pixel(21, 21, Luma([100u8]));
        img.put_pixel(10, 10, Luma([110u8]));
        let out = bilateral_filter(&img, 11, 17.0, 17.0);
        assert!(out.get_pixel(10, 10)[0] < 110);
        assert!(out.get_pixel(10, 10)[0] >= 100);
    }

    #[test]
    fn blank_image_has_no_edges() {
        let img = GrayImage::from_pixel(40, 30, Luma([200u8]));
        let edges = detect_edges(&img, 30.0, 200.0);
        assert!(edges.pixels().all(|p| p[0] == 0));
    }
}
