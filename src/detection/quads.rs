use tracing::debug;
use crate::models::{Contour, Quad};

/// Pick the plate candidate among contours already ranked by area.
///
/// Each of the first `max_candidates` contours is approximated with a
/// tolerance of `perimeter_fraction` times its perimeter; the first
/// approximation with exactly four vertices that is convex wins. There is no
/// relaxation to other vertex counts and no further scoring.
pub fn select_plate_quad(
    ranked: &[Contour],
    max_candidates: usize,
    perimeter_fraction: f64,
) -> Option<Quad> {
    for (rank, contour) in ranked.iter().take(max_candidates).enumerate() {
        let approx = contour.approximate(perimeter_fraction);

        match Quad::from_approximation(&approx) {
            Some(quad) => {
                debug!(rank, area = contour.area(), vertices = ?quad.vertices(), "accepted quadrilateral");
                return Some(quad);
            }
            None => {
                debug!(rank, area = contour.area(), vertices = approx.len(), "rejected candidate");
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::point::Point;

    fn contour(coords: &[(i32, i32)]) -> Contour {
        Contour::new(coords.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    #[test]
    fn first_quad_in_rank_order_wins() {
        let pentagon = contour(&[(0, 0), (100, 0), (120, 50), (50, 90), (-20, 50)]);
        let big_rect = contour(&[(0, 0), (80, 0), (80, 40), (0, 40)]);
        let small_rect = contour(&[(0, 0), (20, 0), (20, 10), (0, 10)]);

        let quad = select_plate_quad(&[pentagon, big_rect, small_rect], 10, 0.02).unwrap();
        assert_eq!(quad.area(), 3200.0);
    }

    #[test]
    fn candidates_beyond_the_limit_are_ignored() {
        let triangle = contour(&[(0, 0), (50, 0), (25, 40)]);
        let rect = contour(&[(0, 0), (20, 0), (20, 10), (0, 10)]);
        let ranked = vec![triangle.clone(), triangle, rect];

        assert!(select_plate_quad(&ranked, 2, 0.02).is_none());
        assert!(select_plate_quad(&ranked, 3, 0.02).is_some());
    }

    #[test]
    fn non_convex_quads_are_skipped() {
        let dart = contour(&[(0, 0), (40, 0), (20, 8), (20, 40)]);
        assert!(select_plate_quad(&[dart], 10, 0.02).is_none());
    }

    #[test]
    fn empty_input_is_not_found() {
        assert!(select_plate_quad(&[], 10, 0.02).is_none());
    }
}
