/// Glowdot Core Library - Camera projection and glow-dot billboards
///
/// This library provides the stateless core: world to clip space to NDC
/// projection with fixed-in-frame blending, camera-facing quads for point
/// sprites, and the camera frame and dot cloud types that feed them.

pub mod billboard;
pub mod dot_cloud;
pub mod error;
pub mod geometry;
pub mod projection;
pub mod transform;

// Re-export commonly used types
pub use billboard::{billboard_basis, billboard_corners, billboard_corners_with_up, BillboardBasis};
pub use dot_cloud::{BlinkType, DotCloud, DotStyle, Rgba};
pub use error::{GeometryError, GeometryResult};
pub use geometry::{BoundingBox, Quad};
pub use projection::{ndc_to_frame, project_to_clip, to_ndc, CameraState, ClipPosition, Ndc, RescaleFactors};
pub use transform::{CameraFrame, EulerAngles, FRAME_HEIGHT, FRAME_WIDTH};
