/// Camera-facing quads for glow dots.
///
/// The quad basis is built from a fixed auxiliary vector rather than the world
/// up axis. With the default `(0, 1, 1)` the basis stays well defined for a
/// camera looking straight down the world y or z axis; it degenerates only
/// when the view direction is parallel to `(0, 1, 1)` itself. The choice of
/// auxiliary vector sets the in-plane rotation of the quad.
use nalgebra::{Point3, Vector3};

use crate::error::{non_degenerate, GeometryError, GeometryResult};
use crate::geometry::Quad;

/// Auxiliary vector crossed with the view direction to find "right"
pub const DEFAULT_REFERENCE_UP: Vector3<f32> = Vector3::new(0.0, 1.0, 1.0);

/// Orthogonal frame of a billboard. `right` and `up` have length `radius`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BillboardBasis {
    /// Unit vector from the billboard center towards the camera
    pub to_cam: Vector3<f32>,
    pub right: Vector3<f32>,
    pub up: Vector3<f32>,
}

fn normalized(v: Vector3<f32>, what: &'static str) -> GeometryResult<Vector3<f32>> {
    let norm = non_degenerate(v.norm(), what)?;
    Ok(v / norm)
}

fn validate_radius(radius: f32) -> GeometryResult<f32> {
    if radius.is_finite() && radius > 0.0 {
        Ok(radius)
    } else {
        Err(GeometryError::InvalidRadius(radius))
    }
}

pub fn billboard_basis(
    point: &Point3<f32>,
    radius: f32,
    camera_position: &Point3<f32>,
) -> GeometryResult<BillboardBasis> {
    billboard_basis_with_up(point, radius, camera_position, &DEFAULT_REFERENCE_UP)
}

pub fn billboard_basis_with_up(
    point: &Point3<f32>,
    radius: f32,
    camera_position: &Point3<f32>,
    reference_up: &Vector3<f32>,
) -> GeometryResult<BillboardBasis> {
    let radius = validate_radius(radius)?;

    let to_cam = normalized(camera_position - point, "camera position coincides with billboard center")?;
    let right = normalized(reference_up.cross(&to_cam), "view direction parallel to reference up")?;
    // Unit vectors only, the radius may be far below the degeneracy threshold
    let up = normalized(to_cam.cross(&right), "billboard up vector")?;

    Ok(BillboardBasis {
        to_cam,
        right: right * radius,
        up: up * radius,
    })
}

/// Corners of the square of half-width `radius` centered at `point`, facing
/// `camera_position`, in `(-1,-1), (-1,1), (1,-1), (1,1)` order.
pub fn billboard_corners(
    point: &Point3<f32>,
    radius: f32,
    camera_position: &Point3<f32>,
) -> GeometryResult<Quad> {
    billboard_corners_with_up(point, radius, camera_position, &DEFAULT_REFERENCE_UP)
}

pub fn billboard_corners_with_up(
    point: &Point3<f32>,
    radius: f32,
    camera_position: &Point3<f32>,
    reference_up: &Vector3<f32>,
) -> GeometryResult<Quad> {
    let basis = billboard_basis_with_up(point, radius, camera_position, reference_up)?;
    Ok(Quad::from_basis(point, &basis.right, &basis.up))
}
