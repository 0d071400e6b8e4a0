/// Geometry primitives for billboards and point clouds
use nalgebra::{Point3, Vector3};

/// Corner offsets `(s_right, s_up)` of a billboard, in corner order
pub const CORNER_OFFSETS: [(f32, f32); 4] = [(-1.0, -1.0), (-1.0, 1.0), (1.0, -1.0), (1.0, 1.0)];

/// Corner indices forming a closed loop: top-right, top-left, bottom-left, bottom-right
pub const OUTLINE_ORDER: [usize; 4] = [3, 1, 0, 2];

/// Four corners of a camera-facing square.
///
/// Corners are stored in [`CORNER_OFFSETS`] order, which is not a
/// consistent winding; use [`Quad::outline`] to walk the edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub corners: [Point3<f32>; 4],
}

impl Quad {
    pub fn new(corners: [Point3<f32>; 4]) -> Self {
        Self { corners }
    }

    /// Build the quad centered at `center` spanned by half-extent vectors
    pub fn from_basis(center: &Point3<f32>, right: &Vector3<f32>, up: &Vector3<f32>) -> Self {
        Self {
            corners: CORNER_OFFSETS.map(|(sr, su)| center + right * sr + up * su),
        }
    }

    /// Corners re-sorted into a closed polygon loop
    pub fn outline(&self) -> [Point3<f32>; 4] {
        OUTLINE_ORDER.map(|i| self.corners[i])
    }

    pub fn centroid(&self) -> Point3<f32> {
        let sum = self
            .corners
            .iter()
            .fold(Vector3::zeros(), |acc, corner| acc + corner.coords);
        Point3::from(sum / 4.0)
    }

    /// Edge lengths of the outline
    pub fn side_lengths(&self) -> Vec<f32> {
        side_lengths(&self.outline())
    }
}

/// Edge lengths of a closed polygon, the last edge returning to the first vertex
pub fn side_lengths(vertices: &[Point3<f32>]) -> Vec<f32> {
    if vertices.len() < 2 {
        return Vec::new();
    }
    vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(a, b)| (b - a).norm())
        .collect()
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    /// Smallest box containing every point, `None` for an empty slice
    pub fn from_points(points: &[Point3<f32>]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = Self {
            min: *first,
            max: *first,
        };
        for point in &points[1..] {
            bbox.min = bbox.min.inf(point);
            bbox.max = bbox.max.sup(point);
        }
        Some(bbox)
    }

    /// Grow the box by `margin` on every side
    pub fn expanded(&self, margin: f32) -> Self {
        let offset = Vector3::repeat(margin);
        Self {
            min: self.min - offset,
            max: self.max + offset,
        }
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }
}
