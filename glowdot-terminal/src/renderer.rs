/// ASCII rasterizer for glow-dot billboards
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use glowdot_core::dot_cloud::GREY_C;
use glowdot_core::error::{GeometryError, DEGENERATE_EPSILON};
use glowdot_core::geometry::CORNER_OFFSETS;
use glowdot_core::{to_ndc, BlinkType, CameraState, DotCloud, DotStyle, GeometryResult, Ndc, Quad, Rgba};
use nalgebra::{Rotation3, Unit, Vector3};
use std::f32::consts::TAU;
use std::io::Write;

/// Character luminosity ramp for glow intensity (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Triangles covering a billboard, as indices into its corners
const QUAD_TRIANGLES: [[usize; 3]; 2] = [[0, 1, 3], [0, 3, 2]];

/// Angular speed of the blink wave, radians per second
const BLINK_RATE: f32 = 3.0;

/// Rainbow cycles per second of a dynamic color
const DYNAMIC_COLOR_RATE: f32 = 0.25;

/// Phase offset between consecutive dots (golden angle) so they blink out of step
const DOT_PHASE_STEP: f32 = 2.399_963;

const LUMA_WEIGHTS: Vector3<f32> = Vector3::new(0.299, 0.587, 0.114);

/// A projected billboard corner: screen position, depth and quad-local coordinates
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    depth: f32,
    u: f32,
    v: f32,
}

/// Per-dot appearance after blink and dynamic color are applied
#[derive(Debug, Clone, Copy, PartialEq)]
struct DotShade {
    rgb: Vector3<f32>,
    brightness: f32,
}

/// Dots drawn and skipped during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub drawn: usize,
    pub skipped: usize,
}

/// ASCII renderer that converts dot clouds to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
        }
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    pub fn char_at(&self, x: usize, y: usize) -> char {
        self.char_buffer[y * self.width + x]
    }

    pub fn color_at(&self, x: usize, y: usize) -> Color {
        self.color_buffer[y * self.width + x]
    }

    /// Map NDC to character cells, y pointing down
    pub fn ndc_to_screen(&self, ndc: &Ndc) -> (f32, f32) {
        let screen_x = (ndc.x + 1.0) * 0.5 * self.width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * self.height as f32;
        (screen_x, screen_y)
    }

    /// Draw every dot of `cloud`. `time` is in seconds and drives blinking and
    /// dynamic colors.
    pub fn render_cloud(
        &mut self,
        cloud: &DotCloud,
        camera: &CameraState,
        is_fixed_in_frame: f32,
        time: f32,
    ) -> RenderStats {
        let mut stats = RenderStats::default();
        for (index, quad) in cloud.billboards(&camera.camera_position) {
            let color = cloud.colors().get(index).copied().unwrap_or(GREY_C);
            let shade = shade_dot(&color, &cloud.style, time, index as f32 * DOT_PHASE_STEP);
            let result =
                quad.and_then(|quad| self.render_dot(&quad, &cloud.style, shade, camera, is_fixed_in_frame));
            match result {
                Ok(()) => stats.drawn += 1,
                Err(err) => {
                    log::trace!("skipping dot {index}: {err}");
                    stats.skipped += 1;
                }
            }
        }
        stats
    }

    fn render_dot(
        &mut self,
        quad: &Quad,
        style: &DotStyle,
        shade: DotShade,
        camera: &CameraState,
        is_fixed_in_frame: f32,
    ) -> GeometryResult<()> {
        // Project corners to screen space
        let mut vertices = [ScreenVertex { x: 0.0, y: 0.0, depth: 0.0, u: 0.0, v: 0.0 }; 4];
        for ((vertex, corner), (u, v)) in vertices.iter_mut().zip(quad.corners.iter()).zip(CORNER_OFFSETS) {
            let clip = camera.clip(corner, is_fixed_in_frame);
            // Behind the camera the divide would mirror the dot
            if clip.w < DEGENERATE_EPSILON {
                return Err(GeometryError::DegenerateGeometry { what: "billboard corner behind camera" });
            }
            let ndc = to_ndc(&clip)?;
            let (x, y) = self.ndc_to_screen(&ndc);
            *vertex = ScreenVertex { x, y, depth: ndc.z, u, v };
        }

        // Anti-aliasing width is given in cells, the shape works in quad units
        let side = |a: usize, b: usize| (vertices[a].x - vertices[b].x).hypot(vertices[a].y - vertices[b].y);
        let radius_cells = 0.5 * side(0, 2).max(side(0, 1));
        let edge_width = style.anti_alias_width().max(0.0) / radius_cells.max(f32::EPSILON);

        for triangle in QUAD_TRIANGLES {
            self.rasterize_triangle(triangle.map(|i| vertices[i]), style, shade, edge_width);
        }
        Ok(())
    }

    fn rasterize_triangle(&mut self, vertices: [ScreenVertex; 3], style: &DotStyle, shade: DotShade, edge_width: f32) {
        let [v0, v1, v2] = vertices;

        // Bounding box
        let min_x = v0.x.min(v1.x).min(v2.x).floor() as i32;
        let max_x = v0.x.max(v1.x).max(v2.x).ceil() as i32;
        let min_y = v0.y.min(v1.y).min(v2.y).floor() as i32;
        let max_y = v0.y.max(v1.y).max(v2.y).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) = barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), (px, py)) else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let u = w0 * v0.u + w1 * v1.u + w2 * v2.u;
                let v = w0 * v0.v + w1 * v1.v + w2 * v2.v;
                let Some(intensity) = dot_intensity(u, v, style, edge_width) else {
                    continue;
                };
                let intensity = intensity * shade.brightness;

                let depth = w0 * v0.depth + w1 * v1.depth + w2 * v2.depth;
                let idx = y as usize * self.width + x as usize;
                if depth < self.depth_buffer[idx] {
                    self.depth_buffer[idx] = depth;
                    self.char_buffer[idx] = luminosity_char(intensity);
                    self.color_buffer[idx] = cell_color(&shade.rgb, intensity);
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                writer.queue(SetForegroundColor(self.color_at(x, y)))?;
                writer.queue(Print(self.char_at(x, y)))?;
            }
            writer.queue(Print('\n'))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Brightness of a dot at quad-local `(u, v)` in `[-1, 1]`, `None` outside its shape.
///
/// The shape goes from a circle (`quad_factor` 0) to the full square (1);
/// a positive glow factor fades the dot towards its edge. The outermost
/// `edge_width` (in quad units) ramps down to zero.
fn dot_intensity(u: f32, v: f32, style: &DotStyle, edge_width: f32) -> Option<f32> {
    let round = (u * u + v * v).sqrt();
    let square = u.abs().max(v.abs());
    let quad_factor = style.quad_factor();
    let distance = round * (1.0 - quad_factor) + square * quad_factor;
    if distance > 1.0 {
        return None;
    }

    let glow = style.glow_factor().max(0.0);
    let falloff = glow / (1.0 + glow);
    let mut intensity = 1.0 - falloff * distance;
    if edge_width > 0.0 {
        intensity *= ((1.0 - distance) / edge_width).clamp(0.0, 1.0);
    }
    (intensity > 0.0).then_some(intensity)
}

/// Smooth rainbow, one period per unit of `t`
fn rainbow(t: f32) -> Vector3<f32> {
    Vector3::new(0.0, 1.0 / 3.0, 2.0 / 3.0).map(|offset| 0.5 + 0.5 * (TAU * (t + offset)).cos())
}

/// Apply dynamic color then blinking to a dot's base color at `time` seconds
fn shade_dot(color: &Rgba, style: &DotStyle, time: f32, phase: f32) -> DotShade {
    let mut rgb = color.xyz();
    if style.dynamic_color() > 0.0 {
        let target = rainbow(time * DYNAMIC_COLOR_RATE + phase / TAU);
        rgb = rgb.lerp(&target, style.dynamic_color());
    }

    let wave = 0.5 * (1.0 + (time * BLINK_RATE + phase).sin());
    let amount = style.blink_factor() * wave;
    let mut brightness = 1.0;
    match style.blink_type() {
        BlinkType::Brightness => brightness = 1.0 - amount,
        BlinkType::Value => rgb *= 1.0 - amount,
        BlinkType::Saturation => {
            let luma = rgb.dot(&LUMA_WEIGHTS);
            rgb = rgb.lerp(&Vector3::repeat(luma), amount);
        }
        BlinkType::Hue => {
            let grey_axis = Unit::new_normalize(Vector3::new(1.0, 1.0, 1.0));
            rgb = Rotation3::from_axis_angle(&grey_axis, amount * TAU) * rgb;
        }
    }

    DotShade {
        rgb: rgb.map(|c| c.clamp(0.0, 1.0)),
        brightness,
    }
}

/// Terminal color of a cell lit at `intensity` by a dot of color `rgb`
fn cell_color(rgb: &Vector3<f32>, intensity: f32) -> Color {
    let channel = |c: f32| (c * intensity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::Rgb {
        r: channel(rgb.x),
        g: channel(rgb.y),
        b: channel(rgb.z),
    }
}

fn luminosity_char(intensity: f32) -> char {
    let char_index = (intensity.clamp(0.0, 1.0) * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
    LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)]
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glowdot_core::CameraFrame;
    use nalgebra::{Point3, Vector3, Vector4};

    const WIDTH: usize = 80;
    const HEIGHT: usize = 40;

    fn lit_cells(renderer: &AsciiRenderer) -> usize {
        renderer.char_buffer.iter().filter(|c| **c != ' ').count()
    }

    #[test]
    fn test_ndc_to_screen() {
        let renderer = AsciiRenderer::new(WIDTH, HEIGHT);
        assert_eq!(renderer.ndc_to_screen(&Vector3::new(-1.0, 1.0, 0.0)), (0.0, 0.0));
        assert_eq!(renderer.ndc_to_screen(&Vector3::new(0.0, 0.0, 0.0)), (40.0, 20.0));
        assert_eq!(renderer.ndc_to_screen(&Vector3::new(1.0, -1.0, 0.0)), (80.0, 40.0));
    }

    #[test]
    fn test_single_dot_lights_center() {
        let mut renderer = AsciiRenderer::new(WIDTH, HEIGHT);
        let camera = CameraFrame::default().snapshot();
        let dot = DotCloud::new(vec![Point3::origin()], 1.0);

        let stats = renderer.render_cloud(&dot, &camera, 0.0, 0.0);
        assert_eq!(stats, RenderStats { drawn: 1, skipped: 0 });
        // Solid dot without glow renders at full intensity
        assert_eq!(renderer.char_at(WIDTH / 2, HEIGHT / 2), '@');
        assert_eq!(renderer.char_at(0, 0), ' ');

        renderer.clear();
        assert_eq!(lit_cells(&renderer), 0);
    }

    #[test]
    fn test_square_dot_covers_more_cells_than_circle() {
        let camera = CameraFrame::default().snapshot();
        let mut round = DotCloud::new(vec![Point3::origin()], 1.0);
        let mut square = round.clone();
        round.style.set_quad_factor(0.0);
        square.style.set_quad_factor(1.0);

        let mut renderer = AsciiRenderer::new(WIDTH, HEIGHT);
        renderer.render_cloud(&round, &camera, 0.0, 0.0);
        let round_cells = lit_cells(&renderer);

        renderer.clear();
        renderer.render_cloud(&square, &camera, 0.0, 0.0);
        assert!(lit_cells(&renderer) > round_cells);
    }

    #[test]
    fn test_dots_behind_camera_are_skipped() {
        let mut renderer = AsciiRenderer::new(WIDTH, HEIGHT);
        let camera = CameraFrame::default().snapshot();
        let behind = camera.camera_position + Vector3::new(0.0, 0.0, 5.0);
        let cloud = DotCloud::new(vec![Point3::origin(), behind, camera.camera_position], 0.5);

        let stats = renderer.render_cloud(&cloud, &camera, 0.0, 0.0);
        assert_eq!(stats, RenderStats { drawn: 1, skipped: 2 });
    }

    #[test]
    fn test_glow_fades_towards_edge() {
        let style = DotStyle::glow();
        let center = dot_intensity(0.0, 0.0, &style, 0.0).unwrap();
        let edge = dot_intensity(0.0, 0.95, &style, 0.0).unwrap();
        assert!(center > edge);
        assert!(dot_intensity(0.9, 0.9, &style, 0.0).is_none());
        assert_eq!(luminosity_char(center), '@');
    }

    #[test]
    fn test_anti_alias_softens_edge() {
        let style = DotStyle::new();
        assert_relative_eq!(dot_intensity(0.0, 0.95, &style, 0.0).unwrap(), 1.0);
        assert_relative_eq!(dot_intensity(0.0, 0.95, &style, 0.5).unwrap(), 0.1, epsilon = 1e-5);
        assert_relative_eq!(dot_intensity(0.0, 0.2, &style, 0.5).unwrap(), 1.0);
        assert!(dot_intensity(0.0, 1.0, &style, 0.5).is_none());
    }

    #[test]
    fn test_dot_is_drawn_in_its_color() {
        let mut renderer = AsciiRenderer::new(WIDTH, HEIGHT);
        let camera = CameraFrame::default().snapshot();
        let mut dot = DotCloud::new(vec![Point3::origin()], 1.0);
        dot.set_color(Vector4::new(1.0, 0.0, 0.0, 1.0));

        renderer.render_cloud(&dot, &camera, 0.0, 0.0);
        assert_eq!(renderer.color_at(WIDTH / 2, HEIGHT / 2), Color::Rgb { r: 255, g: 0, b: 0 });
        assert_eq!(renderer.color_at(0, 0), Color::Reset);

        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("\x1b[38;2;255;0;0m"));
    }

    #[test]
    fn test_blink_dims_brightness_over_time() {
        let mut style = DotStyle::new();
        let color = Vector4::new(1.0, 1.0, 0.0, 1.0);
        assert_relative_eq!(shade_dot(&color, &style, 1.0, 0.0).brightness, 1.0);

        style.set_blink_factor(1.0);
        let peak = std::f32::consts::FRAC_PI_2 / BLINK_RATE;
        let trough = 3.0 * std::f32::consts::FRAC_PI_2 / BLINK_RATE;
        assert_relative_eq!(shade_dot(&color, &style, peak, 0.0).brightness, 0.0, epsilon = 1e-5);
        assert_relative_eq!(shade_dot(&color, &style, trough, 0.0).brightness, 1.0, epsilon = 1e-5);
        assert_relative_eq!(shade_dot(&color, &style, peak, 0.0).rgb, color.xyz());
    }

    #[test]
    fn test_blink_types_change_color() {
        let red = Vector4::new(1.0, 0.0, 0.0, 1.0);
        let peak = std::f32::consts::FRAC_PI_2 / BLINK_RATE;
        let mut style = DotStyle::new();

        style.set_blink_factor(0.5);
        style.set_blink_type(BlinkType::Value);
        let shade = shade_dot(&red, &style, peak, 0.0);
        assert_relative_eq!(shade.rgb, Vector3::new(0.5, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(shade.brightness, 1.0);

        style.set_blink_factor(1.0);
        style.set_blink_type(BlinkType::Saturation);
        let rgb = shade_dot(&red, &style, peak, 0.0).rgb;
        assert_relative_eq!(rgb, Vector3::repeat(0.299), epsilon = 1e-5);

        // A third of a turn about the grey axis maps red to green
        style.set_blink_factor(1.0 / 3.0);
        style.set_blink_type(BlinkType::Hue);
        let rgb = shade_dot(&red, &style, peak, 0.0).rgb;
        assert_relative_eq!(rgb, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_dynamic_color_cycles() {
        let grey = GREY_C;
        let mut style = DotStyle::new();
        assert_relative_eq!(shade_dot(&grey, &style, 2.0, 0.0).rgb, grey.xyz());

        style.set_dynamic_color(1.0);
        let start = shade_dot(&grey, &style, 0.0, 0.0).rgb;
        let later = shade_dot(&grey, &style, 0.5 / DYNAMIC_COLOR_RATE, 0.0).rgb;
        assert_relative_eq!(start, Vector3::new(1.0, 0.25, 0.25), epsilon = 1e-5);
        assert_relative_eq!(later, Vector3::new(0.0, 0.75, 0.75), epsilon = 1e-5);
    }
}
