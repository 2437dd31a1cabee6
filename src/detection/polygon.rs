//! Planar geometry on integer point sequences: area, perimeter,
//! Douglas-Peucker simplification of closed curves and convexity.

use imageproc::point::Point;

/// Absolute shoelace area of a closed polygon
pub fn area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice: i64 = 0;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        twice += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    (twice as f64 / 2.0).abs()
}

/// Length of the closed curve, including the closing segment
pub fn arc_length(points: &[Point<i32>]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    points
        .iter()
        .enumerate()
        .map(|(i, p)| distance(*p, points[(i + 1) % points.len()]))
        .sum()
}

/// Simplifies a closed curve with the Douglas-Peucker algorithm.
///
/// The curve is split at an approximately farthest pair of points so the
/// result does not depend on where tracing started. Vertices are returned in
/// the curve's own order, without repeating the first point.
pub fn approximate_closed(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let n = points.len();
    if n <= 2 {
        return points.to_vec();
    }

    let (a, b) = farthest_pair(points);
    if a == b {
        return vec![points[a]];
    }

    // Rotate so the first split point sits at index 0 and close the ring
    let mut ring: Vec<Point<i32>> = points[a..].iter().chain(&points[..a]).copied().collect();
    ring.push(ring[0]);
    let split = (b + n - a) % n;

    let mut keep = vec![false; ring.len()];
    keep[0] = true;
    keep[split] = true;

    simplify_span(&ring, 0, split, epsilon, &mut keep);
    simplify_span(&ring, split, n, epsilon, &mut keep);

    ring[..n]
        .iter()
        .zip(&keep[..n])
        .filter(|(_, k)| **k)
        .map(|(p, _)| *p)
        .collect()
}

/// True when every turn has the same strict orientation and the boundary
/// winds exactly once. Collinear or repeated vertices make a polygon non-convex.
pub fn is_convex(points: &[Point<i32>]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }

    let mut orientation = 0i64;
    let mut turning = 0.0f64;
    for i in 0..n {
        let p0 = points[i];
        let p1 = points[(i + 1) % n];
        let p2 = points[(i + 2) % n];
        let (ux, uy) = ((p1.x - p0.x) as i64, (p1.y - p0.y) as i64);
        let (vx, vy) = ((p2.x - p1.x) as i64, (p2.y - p1.y) as i64);
        let cross = ux * vy - uy * vx;
        if cross == 0 {
            return false;
        }
        if orientation == 0 {
            orientation = cross.signum();
        } else if cross.signum() != orientation {
            return false;
        }
        let dot = ux * vx + uy * vy;
        turning += (cross as f64).atan2(dot as f64);
    }

    (turning.abs() - std::f64::consts::TAU).abs() < 1e-6
}

fn distance(p: Point<i32>, q: Point<i32>) -> f64 {
    let dx = (q.x - p.x) as f64;
    let dy = (q.y - p.y) as f64;
    (dx * dx + dy * dy).sqrt()
}

fn farthest_from(points: &[Point<i32>], from: usize) -> usize {
    let origin = points[from];
    let mut best = from;
    let mut best_dist = 0i64;
    for (i, p) in points.iter().enumerate() {
        let dx = (p.x - origin.x) as i64;
        let dy = (p.y - origin.y) as i64;
        let d = dx * dx + dy * dy;
        if d > best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Three rounds of "jump to the farthest point" starting at index 0
fn farthest_pair(points: &[Point<i32>]) -> (usize, usize) {
    let mut start = 0;
    let mut pair = (0, 0);
    for _ in 0..3 {
        let far = farthest_from(points, start);
        if far == start {
            break;
        }
        pair = (start, far);
        start = far;
    }
    // Keep the pair in ring order
    if pair.0 > pair.1 {
        (pair.1, pair.0)
    } else {
        pair
    }
}

/// Iterative Douglas-Peucker over `ring[start..=end]`, marking kept indices.
fn simplify_span(ring: &[Point<i32>], start: usize, end: usize, epsilon: f64, keep: &mut [bool]) {
    let mut stack = vec![(start, end)];

    while let Some((s, e)) = stack.pop() {
        if e - s <= 1 {
            continue;
        }

        let mut max_dist = 0.0;
        let mut max_index = s;
        for i in (s + 1)..e {
            let d = point_to_line_distance(ring[i], ring[s], ring[e]);
            if d > max_dist {
                max_dist = d;
                max_index = i;
            }
        }

        if max_dist > epsilon {
            keep[max_index] = true;
            stack.push((s, max_index));
            stack.push((max_index, e));
        }
    }
}

fn point_to_line_distance(point: Point<i32>, line_start: Point<i32>, line_end: Point<i32>) -> f64 {
    let dx = (line_end.x - line_start.x) as f64;
    let dy = (line_end.y - line_start.y) as f64;
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return distance(point, line_start);
    }
    let px = (point.x - line_start.x) as f64;
    let py = (point.y - line_start.y) as f64;
    (dx * py - dy * px).abs() / len
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(i32, i32)]) -> Vec<Point<i32>> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    /// Every integer point on the boundary of an axis-aligned rectangle, clockwise
    fn rectangle_boundary(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<Point<i32>> {
        let mut out = Vec::new();
        for x in x0..x1 {
            out.push(Point::new(x, y0));
        }
        for y in y0..y1 {
            out.push(Point::new(x1, y));
        }
        for x in (x0 + 1..=x1).rev() {
            out.push(Point::new(x, y1));
        }
        for y in (y0 + 1..=y1).rev() {
            out.push(Point::new(x0, y));
        }
        out
    }

    #[test]
    fn area_and_perimeter_of_rectangle() {
        let rect = pts(&[(0, 0), (30, 0), (30, 10), (0, 10)]);
        assert_eq!(area(&rect), 300.0);
        assert_eq!(arc_length(&rect), 80.0);
    }

    #[test]
    fn area_ignores_orientation() {
        let cw = pts(&[(0, 0), (0, 10), (10, 10), (10, 0)]);
        let ccw = pts(&[(0, 0), (10, 0), (10, 10), (0, 10)]);
        assert_eq!(area(&cw), area(&ccw));
    }

    #[test]
    fn degenerate_inputs_have_no_area() {
        assert_eq!(area(&pts(&[(1, 1), (5, 5)])), 0.0);
        assert_eq!(arc_length(&pts(&[(1, 1)])), 0.0);
    }

    #[test]
    fn dense_rectangle_collapses_to_four_corners() {
        let boundary = rectangle_boundary(10, 20, 110, 50);
        let eps = 0.02 * arc_length(&boundary);
        let approx = approximate_closed(&boundary, eps);

        assert_eq!(approx.len(), 4);
        for corner in [(10, 20), (110, 20), (110, 50), (10, 50)] {
            assert!(approx.contains(&Point::new(corner.0, corner.1)), "missing {:?}", corner);
        }
    }

    #[test]
    fn approximation_keeps_a_notch_above_tolerance() {
        // Rectangle with a deep square bite taken out of the top edge
        let shape = pts(&[
            (0, 0), (40, 0), (40, 30), (60, 30), (60, 0), (100, 0),
            (100, 60), (0, 60),
        ]);
        let approx = approximate_closed(&shape, 2.0);
        assert_eq!(approx.len(), 8);
        assert!(!is_convex(&approx));
    }

    #[test]
    fn approximation_is_deterministic() {
        let boundary = rectangle_boundary(3, 4, 57, 29);
        let a = approximate_closed(&boundary, 3.0);
        let b = approximate_closed(&boundary, 3.0);
        assert_eq!(a, b);
    }

    #[test]
    fn single_repeated_point_collapses() {
        let same = pts(&[(5, 5), (5, 5), (5, 5)]);
        assert_eq!(approximate_closed(&same, 1.0), pts(&[(5, 5)]));
    }

    #[test]
    fn convexity_checks() {
        assert!(is_convex(&pts(&[(0, 0), (10, 0), (12, 8), (1, 9)])));
        assert!(is_convex(&pts(&[(0, 0), (0, 10), (10, 10), (10, 0)])));
        // Bow-tie
        assert!(!is_convex(&pts(&[(0, 0), (10, 10), (10, 0), (0, 10)])));
        // Collinear vertex
        assert!(!is_convex(&pts(&[(0, 0), (5, 0), (10, 0), (10, 10), (0, 10)])));
        // Repeated vertex
        assert!(!is_convex(&pts(&[(0, 0), (10, 0), (10, 0), (0, 10)])));
    }

    #[test]
    fn pentagram_is_not_convex() {
        let star = pts(&[(50, 0), (79, 90), (2, 35), (98, 35), (21, 90)]);
        assert!(!is_convex(&star));
    }
}
