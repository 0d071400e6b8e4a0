/// Clip space and normalized device coordinate projection.
///
/// Matrix convention: column vectors with matrices applied on the left,
/// `camera = view * world`. A view matrix stored row-major (for example a
/// flattened GPU uniform) must be transposed before it is passed here.
use nalgebra::{Matrix4, Point3, Vector3, Vector4};
use serde::{Deserialize, Serialize};

use crate::error::{non_degenerate, GeometryResult};
use crate::geometry::Quad;
use crate::transform::{FRAME_HEIGHT, FRAME_WIDTH};

/// Factor applied to the rescaled depth after `w` has been taken from it
pub const DEPTH_SCALE: f32 = -0.1;

/// Homogeneous clip-space position `(x, y, z, w)`
pub type ClipPosition = Vector4<f32>;

/// Normalized device coordinates, `[-1, 1]` per axis for on-screen points
pub type Ndc = Vector3<f32>;

/// Per-axis factors taking camera-space coordinates into pre-perspective space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RescaleFactors(pub Vector3<f32>);

impl RescaleFactors {
    pub fn new(sx: f32, sy: f32, sz: f32) -> Self {
        Self(Vector3::new(sx, sy, sz))
    }

    pub fn unit() -> Self {
        Self(Vector3::repeat(1.0))
    }

    /// `(2 / frame_width, 2 / frame_height, scale / focal_distance)`
    pub fn from_frame(frame_width: f32, frame_height: f32, scale: f32, focal_distance: f32) -> Self {
        Self::new(2.0 / frame_width, 2.0 / frame_height, scale / focal_distance)
    }
}

impl Default for RescaleFactors {
    fn default() -> Self {
        Self::unit()
    }
}

/// Transform a world-space point into clip space.
///
/// `is_fixed_in_frame` blends between the view-transformed point (0) and the
/// untransformed point (1). It is a continuous weight and is not clamped.
/// The returned `w` is `1 - z` of the rescaled point; `z` itself is then
/// multiplied by [`DEPTH_SCALE`].
pub fn project_to_clip(
    point: &Point3<f32>,
    view_matrix: &Matrix4<f32>,
    rescale_factors: &RescaleFactors,
    is_fixed_in_frame: f32,
) -> ClipPosition {
    let homogeneous = point.to_homogeneous();
    let transformed = view_matrix * homogeneous;
    let mut clip = transformed.lerp(&homogeneous, is_fixed_in_frame);

    clip.x *= rescale_factors.0.x;
    clip.y *= rescale_factors.0.y;
    clip.z *= rescale_factors.0.z;

    clip.w = 1.0 - clip.z;
    clip.z *= DEPTH_SCALE;
    clip
}

/// Perspective divide. Fails when `w` is zero, near zero or not finite.
pub fn to_ndc(clip: &ClipPosition) -> GeometryResult<Ndc> {
    let w = non_degenerate(clip.w, "perspective divisor w")?;
    Ok(clip.xyz() / w)
}

/// Map NDC x/y onto the fixed frame in world units; depth is dropped.
pub fn ndc_to_frame(ndc: &Ndc) -> Point3<f32> {
    Point3::new(ndc.x * FRAME_WIDTH / 2.0, ndc.y * FRAME_HEIGHT / 2.0, 0.0)
}

/// Read-only camera snapshot for one rendered frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub view: Matrix4<f32>,
    pub rescale_factors: RescaleFactors,
    pub camera_position: Point3<f32>,
}

impl CameraState {
    pub fn new(view: Matrix4<f32>, rescale_factors: RescaleFactors, camera_position: Point3<f32>) -> Self {
        Self {
            view,
            rescale_factors,
            camera_position,
        }
    }

    pub fn clip(&self, point: &Point3<f32>, is_fixed_in_frame: f32) -> ClipPosition {
        project_to_clip(point, &self.view, &self.rescale_factors, is_fixed_in_frame)
    }

    pub fn project_point(&self, point: &Point3<f32>, is_fixed_in_frame: f32) -> GeometryResult<Ndc> {
        to_ndc(&self.clip(point, is_fixed_in_frame))
    }

    /// Project a point all the way to frame coordinates
    pub fn project_to_frame(&self, point: &Point3<f32>, is_fixed_in_frame: f32) -> GeometryResult<Point3<f32>> {
        self.project_point(point, is_fixed_in_frame)
            .map(|ndc| ndc_to_frame(&ndc))
    }

    /// Project a billboard, returning frame coordinates in outline order
    pub fn project_quad(&self, quad: &Quad, is_fixed_in_frame: f32) -> GeometryResult<[Point3<f32>; 4]> {
        let outline = quad.outline();
        let mut projected = [Point3::origin(); 4];
        for (slot, corner) in projected.iter_mut().zip(outline.iter()) {
            *slot = self.project_to_frame(corner, is_fixed_in_frame)?;
        }
        Ok(projected)
    }

    /// Dump the snapshot to the debug log
    pub fn describe(&self) {
        log::debug!("view_matrix: {}", self.view);
        log::debug!("camera_position: {:?}", self.camera_position);
        log::debug!("FRAME_WIDTH: {FRAME_WIDTH} FRAME_HEIGHT: {FRAME_HEIGHT}");
        log::debug!("frame_rescale_factors: {:?}", self.rescale_factors.0.as_slice());
    }
}
