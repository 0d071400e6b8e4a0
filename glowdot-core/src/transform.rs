/// Camera frame orientation and the per-frame camera snapshot derived from it
use nalgebra::{Matrix4, Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::projection::{CameraState, RescaleFactors};

/// Height of the visible frame in world units at the default zoom
pub const FRAME_HEIGHT: f32 = 8.0;
pub const ASPECT_RATIO: f32 = 16.0 / 9.0;
/// Width of the visible frame in world units at the default zoom
pub const FRAME_WIDTH: f32 = FRAME_HEIGHT * ASPECT_RATIO;
/// Default vertical field of view (45 degrees)
pub const DEFAULT_FOVY: f32 = std::f32::consts::FRAC_PI_4;

/// Euler angles of the camera frame (in radians), applied as extrinsic z-x-z
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EulerAngles {
    pub theta: f32,
    pub phi: f32,
    pub gamma: f32,
}

impl EulerAngles {
    pub fn new(theta: f32, phi: f32, gamma: f32) -> Self {
        Self { theta, phi, gamma }
    }

    pub fn zero() -> Self {
        Self {
            theta: 0.0,
            phi: 0.0,
            gamma: 0.0,
        }
    }

    /// Rotate by delta amounts (in radians). `phi` stays within `[0, PI]`.
    pub fn increment(&mut self, dtheta: f32, dphi: f32, dgamma: f32) {
        self.theta += dtheta;
        self.phi = (self.phi + dphi).clamp(0.0, std::f32::consts::PI);
        self.gamma += dgamma;
    }

    /// Frame rotation `Rz(gamma) * Rx(phi) * Rz(theta)`
    pub fn rotation(&self) -> Rotation3<f32> {
        let rz_theta = Rotation3::from_axis_angle(&Vector3::z_axis(), self.theta);
        let rx_phi = Rotation3::from_axis_angle(&Vector3::x_axis(), self.phi);
        let rz_gamma = Rotation3::from_axis_angle(&Vector3::z_axis(), self.gamma);
        rz_gamma * rx_phi * rz_theta
    }
}

impl Default for EulerAngles {
    fn default() -> Self {
        Self::zero()
    }
}

/// Where the camera looks and how far it is zoomed.
///
/// The camera sits `focal_distance` away from `center` along the frame's
/// rotated z axis, looking back at `center`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraFrame {
    pub center: Point3<f32>,
    pub euler: EulerAngles,
    /// Visible height in world units
    pub height: f32,
    /// Vertical field of view in radians
    pub fovy: f32,
}

impl CameraFrame {
    pub fn new() -> Self {
        Self {
            center: Point3::origin(),
            euler: EulerAngles::zero(),
            height: FRAME_HEIGHT,
            fovy: DEFAULT_FOVY,
        }
    }

    pub fn width(&self) -> f32 {
        self.height * ASPECT_RATIO
    }

    /// Zoom relative to the default frame height
    pub fn scale(&self) -> f32 {
        self.height / FRAME_HEIGHT
    }

    pub fn focal_distance(&self) -> f32 {
        self.height / (2.0 * (self.fovy / 2.0).tan())
    }

    pub fn rotation(&self) -> Rotation3<f32> {
        self.euler.rotation()
    }

    /// World to camera space: inverse rotation after moving `center` to the
    /// origin, then divided by the zoom scale.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        let shift = Matrix4::new_translation(&-self.center.coords);
        let rotation = self.rotation().inverse().to_homogeneous();
        let view = rotation * shift;

        let scale = self.scale();
        if scale > 0.0 {
            Matrix4::new_scaling(1.0 / scale) * view
        } else {
            view
        }
    }

    /// World position implied by the frame's center, rotation and focal distance
    pub fn camera_position(&self) -> Point3<f32> {
        self.center + self.rotation() * Vector3::z() * self.focal_distance()
    }

    pub fn rescale_factors(&self) -> RescaleFactors {
        RescaleFactors::from_frame(FRAME_WIDTH, FRAME_HEIGHT, self.scale(), self.focal_distance())
    }

    /// Immutable camera state for projecting points with this frame
    pub fn snapshot(&self) -> CameraState {
        CameraState::new(self.view_matrix(), self.rescale_factors(), self.camera_position())
    }

    pub fn increment_theta(&mut self, dtheta: f32) {
        self.euler.increment(dtheta, 0.0, 0.0);
    }

    pub fn increment_phi(&mut self, dphi: f32) {
        self.euler.increment(0.0, dphi, 0.0);
    }

    pub fn increment_gamma(&mut self, dgamma: f32) {
        self.euler.increment(0.0, 0.0, dgamma);
    }

    pub fn set_euler_angles(&mut self, euler: EulerAngles) {
        self.euler = euler;
    }

    pub fn set_height(&mut self, height: f32) {
        self.height = height;
    }

    pub fn shift(&mut self, offset: &Vector3<f32>) {
        self.center += *offset;
    }

    pub fn move_to(&mut self, center: Point3<f32>) {
        self.center = center;
    }

    pub fn to_default_state(&mut self) {
        *self = Self::new();
    }
}

impl Default for CameraFrame {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_euler_increment() {
        let mut euler = EulerAngles::zero();
        euler.increment(0.1, 0.2, 0.3);
        assert!((euler.theta - 0.1).abs() < 1e-6);
        assert!((euler.phi - 0.2).abs() < 1e-6);
        assert!((euler.gamma - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_phi_is_clamped() {
        let mut euler = EulerAngles::zero();
        euler.increment(0.0, -1.0, 0.0);
        assert_eq!(euler.phi, 0.0);
        euler.increment(0.0, 10.0, 0.0);
        assert_eq!(euler.phi, PI);
    }

    #[test]
    fn test_identity_rotation() {
        let rotation = EulerAngles::zero().rotation();
        assert!((rotation.to_homogeneous() - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_default_frame() {
        let frame = CameraFrame::default();
        assert_relative_eq!(frame.scale(), 1.0);
        assert_relative_eq!(frame.width(), FRAME_WIDTH);
        assert_relative_eq!(frame.view_matrix(), Matrix4::identity(), epsilon = 1e-6);

        let focal = frame.focal_distance();
        assert_relative_eq!(focal, 4.0 / (PI / 8.0).tan(), epsilon = 1e-4);
        assert_relative_eq!(frame.camera_position(), Point3::new(0.0, 0.0, focal), epsilon = 1e-5);
    }

    #[test]
    fn test_camera_sits_on_view_axis() {
        let mut frame = CameraFrame::new();
        frame.move_to(Point3::new(1.0, -2.0, 0.5));
        frame.set_euler_angles(EulerAngles::new(0.4, 1.1, -0.3));
        frame.set_height(12.0);

        // In camera space the camera is straight down +z at focal / scale
        let camera = frame.view_matrix() * frame.camera_position().to_homogeneous();
        let expected = frame.focal_distance() / frame.scale();
        assert_relative_eq!(camera.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(camera.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(camera.z, expected, epsilon = 1e-4);
        assert_relative_eq!(camera.w, 1.0);
    }

    #[test]
    fn test_zoom_scales_view() {
        let mut frame = CameraFrame::new();
        frame.set_height(2.0 * FRAME_HEIGHT);
        let view = frame.view_matrix();
        let p = view * Point3::new(4.0, 2.0, 0.0).to_homogeneous();
        assert_relative_eq!(p.x, 2.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_theta_quarter_turn() {
        let mut frame = CameraFrame::new();
        frame.increment_theta(FRAC_PI_2);
        // Rotating the frame by +90 degrees about z turns world +x into camera -y
        let p = frame.view_matrix() * Point3::new(1.0, 0.0, 0.0).to_homogeneous();
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_shift_and_reset() {
        let mut frame = CameraFrame::new();
        frame.shift(&Vector3::new(-3.0, 1.0, 0.0));
        frame.increment_gamma(0.5);
        assert_eq!(frame.center, Point3::new(-3.0, 1.0, 0.0));

        frame.to_default_state();
        assert_eq!(frame, CameraFrame::default());
    }
}
