use imageproc::point::Point;
use crate::detection::polygon;
use crate::pipeline::BoundingBox;

/// Closed boundary traced on an edge map, chain-compressed.
#[derive(Debug, Clone)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Enclosed area of the closed point sequence
    pub fn area(&self) -> f64 {
        polygon::area(&self.points)
    }

    /// Closed arc length
    pub fn perimeter(&self) -> f64 {
        polygon::arc_length(&self.points)
    }

    /// Douglas-Peucker approximation with a tolerance proportional to the perimeter
    pub fn approximate(&self, perimeter_fraction: f64) -> Vec<Point<i32>> {
        polygon::approximate_closed(&self.points, perimeter_fraction * self.perimeter())
    }
}

/// A strictly convex four-vertex polygon: the only shape accepted as a plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quad {
    vertices: [Point<i32>; 4],
}

impl Quad {
    /// Accepts an approximation only when it has exactly 4 vertices and is convex.
    pub fn from_approximation(points: &[Point<i32>]) -> Option<Self> {
        if points.len() != 4 || !polygon::is_convex(points) {
            return None;
        }
        Some(Self {
            vertices: [points[0], points[1], points[2], points[3]],
        })
    }

    pub fn vertices(&self) -> &[Point<i32>; 4] {
        &self.vertices
    }

    pub fn area(&self) -> f64 {
        polygon::area(&self.vertices)
    }
}

/// Outcome of reading one image.
#[derive(Debug, Clone, PartialEq)]
pub enum PlateReading {
    /// No quadrilateral candidate met the shape criteria.
    NotFound,
    /// A plate region was extracted; `text` may be empty when recognition
    /// produced no alphanumeric characters.
    Found { text: String, region: BoundingBox },
}

impl PlateReading {
    pub fn is_found(&self) -> bool {
        matches!(self, PlateReading::Found { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            PlateReading::Found { text, .. } => Some(text.as_str()),
            PlateReading::NotFound => None,
        }
    }

    pub fn region(&self) -> Option<&BoundingBox> {
        match self {
            PlateReading::Found { region, .. } => Some(region),
            PlateReading::NotFound => None,
        }
    }
}
