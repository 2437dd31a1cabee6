use image::GrayImage;
use imageproc::point::Point;
use crate::models::Contour;

/// Trace every border of the edge map (outer borders and holes, full hierarchy)
/// and compress straight runs down to their end points.
pub fn find_contours(edges: &GrayImage) -> Vec<Contour> {
    imageproc::contours::find_contours::<i32>(edges)
        .into_iter()
        .map(|c| Contour::new(compress_chain(&c.points)))
        .filter(|c| !c.is_empty())
        .collect()
}

/// Keep the `limit` largest contours by enclosed area.
///
/// The sort is stable, so contours of equal area keep their tracing order.
pub fn largest_by_area(contours: Vec<Contour>, limit: usize) -> Vec<Contour> {
    let mut keyed: Vec<(f64, Contour)> = contours.into_iter().map(|c| (c.area(), c)).collect();
    keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
    keyed.into_iter().take(limit).map(|(_, c)| c).collect()
}

/// Drop every point whose incoming and outgoing steps point the same way.
/// The input is a closed chain of 8-connected border pixels.
pub fn compress_chain(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let n = points.len();
    if n <= 2 {
        return points.to_vec();
    }

    let kept: Vec<Point<i32>> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            (cur.x - prev.x, cur.y - prev.y) != (next.x - cur.x, next.y - cur.y)
        })
        .map(|i| points[i])
        .collect();

    if kept.is_empty() {
        // Every step identical can only happen for a repeated single pixel
        vec![points[0]]
    } else {
        kept
    }
}
