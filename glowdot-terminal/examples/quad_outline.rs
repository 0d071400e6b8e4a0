/// Example: project a glow dot's billboard and compare its on-screen size
///
/// A square of side 2 in world space no longer measures 2 once it has gone
/// through the perspective divide; this prints the projected outline and its
/// side lengths for a few camera frames.
///
/// Usage: cargo run --example quad_outline

use glowdot_core::geometry::side_lengths;
use glowdot_core::{CameraFrame, DotCloud, EulerAngles, GeometryError};
use nalgebra::{Point3, Vector3};

fn report(label: &str, dot: &DotCloud, frame: &CameraFrame) -> Result<(), GeometryError> {
    let camera = frame.snapshot();
    let quads = dot.quads(&camera.camera_position)?;
    let outline = camera.project_quad(&quads[0], 0.0)?;

    println!("{label}");
    for (name, corner) in ["top right", "top left", "bottom left", "bottom right"].iter().zip(outline.iter()) {
        println!("  {name:>12}: ({:7.4}, {:7.4})", corner.x, corner.y);
    }
    println!("  top edge: {:.4}", (outline[1] - outline[0]).norm());
    println!("  sides:    {:?}", side_lengths(&outline));
    Ok(())
}

fn main() -> Result<(), GeometryError> {
    env_logger::init();

    let mut dot = DotCloud::glow_dot(Point3::new(0.0, 2.5, 0.0));
    dot.set_radius(1.0);

    let mut frame = CameraFrame::new();
    report("default frame", &dot, &frame)?;

    frame.set_euler_angles(EulerAngles::new(0.0, 0.0, 30f32.to_radians()));
    report("gamma = 30 degrees", &dot, &frame)?;

    frame.shift(&Vector3::new(-1.0, 2.0, 0.0));
    report("shifted up and left", &dot, &frame)?;

    frame.set_height(12.0);
    report("zoomed out to height 12", &dot, &frame)?;

    frame.snapshot().describe();
    Ok(())
}
