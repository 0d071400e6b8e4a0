/// Point clouds rendered as glow dots
use std::str::FromStr;

use std::ops::{Add, Mul};

use nalgebra::{Point3, Vector3, Vector4};
use serde::{Deserialize, Serialize};

use crate::billboard::billboard_corners;
use crate::error::GeometryResult;
use crate::geometry::{BoundingBox, Quad};

pub const DEFAULT_DOT_RADIUS: f32 = 0.05;
pub const DEFAULT_GLOW_DOT_RADIUS: f32 = 0.2;
pub const DEFAULT_GRID_HEIGHT: f32 = 6.0;
pub const DEFAULT_BUFF_RATIO: f32 = 0.5;

/// Linear RGBA color, each channel in `[0, 1]`
pub type Rgba = Vector4<f32>;

pub const GREY_C: Rgba = Vector4::new(0.533, 0.533, 0.533, 1.0);
pub const YELLOW: Rgba = Vector4::new(1.0, 1.0, 0.0, 1.0);

/// Color channel a blinking dot oscillates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlinkType {
    #[default]
    Brightness,
    Hue,
    Saturation,
    Value,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown blink type `{0}`, expected brightness, hue, saturation or value")]
pub struct UnknownBlinkType(pub String);

impl FromStr for BlinkType {
    type Err = UnknownBlinkType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "brightness" => Ok(BlinkType::Brightness),
            "hue" => Ok(BlinkType::Hue),
            "saturation" => Ok(BlinkType::Saturation),
            "value" => Ok(BlinkType::Value),
            other => Err(UnknownBlinkType(other.to_string())),
        }
    }
}

/// Appearance parameters shared by every dot of a cloud
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotStyle {
    glow_factor: f32,
    anti_alias_width: f32,
    quad_factor: f32,
    dynamic_color: f32,
    blink_factor: f32,
    blink_type: BlinkType,
}

impl DotStyle {
    pub fn new() -> Self {
        Self {
            glow_factor: 0.0,
            anti_alias_width: 2.0,
            quad_factor: 0.0,
            dynamic_color: 0.0,
            blink_factor: 0.0,
            blink_type: BlinkType::Brightness,
        }
    }

    /// Glowing round dots
    pub fn glow() -> Self {
        Self {
            glow_factor: 2.0,
            ..Self::new()
        }
    }

    pub fn glow_factor(&self) -> f32 {
        self.glow_factor
    }

    pub fn set_glow_factor(&mut self, glow_factor: f32) {
        self.glow_factor = glow_factor;
    }

    pub fn anti_alias_width(&self) -> f32 {
        self.anti_alias_width
    }

    pub fn set_anti_alias_width(&mut self, anti_alias_width: f32) {
        self.anti_alias_width = anti_alias_width;
    }

    /// 0 draws a circle, 1 a square
    pub fn quad_factor(&self) -> f32 {
        self.quad_factor
    }

    pub fn set_quad_factor(&mut self, quad_factor: f32) {
        self.quad_factor = quad_factor.clamp(0.0, 1.0);
    }

    pub fn dynamic_color(&self) -> f32 {
        self.dynamic_color
    }

    pub fn set_dynamic_color(&mut self, dynamic_color: f32) {
        self.dynamic_color = dynamic_color.clamp(0.0, 1.0);
    }

    pub fn blink_factor(&self) -> f32 {
        self.blink_factor
    }

    pub fn set_blink_factor(&mut self, blink_factor: f32) {
        self.blink_factor = blink_factor.clamp(0.0, 1.0);
    }

    pub fn blink_type(&self) -> BlinkType {
        self.blink_type
    }

    pub fn set_blink_type(&mut self, blink_type: BlinkType) {
        self.blink_type = blink_type;
    }
}

impl Default for DotStyle {
    fn default() -> Self {
        Self::new()
    }
}

/// Resample `values` to `len` entries by linear interpolation
fn resize_with_interpolation<T>(values: &[T], len: usize) -> Vec<T>
where
    T: Copy + Add<Output = T> + Mul<f32, Output = T>,
{
    if values.len() == len {
        return values.to_vec();
    }
    if values.is_empty() || len == 0 {
        return Vec::new();
    }
    if len == 1 || values.len() == 1 {
        return vec![values[0]; len];
    }

    let last = (values.len() - 1) as f32;
    (0..len)
        .map(|i| {
            let t = i as f32 * last / (len - 1) as f32;
            let lo = t.floor() as usize;
            let hi = (lo + 1).min(values.len() - 1);
            let alpha = t - lo as f32;
            values[lo] * (1.0 - alpha) + values[hi] * alpha
        })
        .collect()
}

/// Points with per-point radii and colors sharing one style
#[derive(Debug, Clone, PartialEq)]
pub struct DotCloud {
    points: Vec<Point3<f32>>,
    radii: Vec<f32>,
    colors: Vec<Rgba>,
    pub style: DotStyle,
}

impl DotCloud {
    pub fn new(points: Vec<Point3<f32>>, radius: f32) -> Self {
        let radii = vec![radius; points.len()];
        let colors = vec![GREY_C; points.len()];
        Self {
            points,
            radii,
            colors,
            style: DotStyle::new(),
        }
    }

    /// A single glowing dot
    pub fn glow_dot(center: Point3<f32>) -> Self {
        let mut dot = Self::new(vec![center], DEFAULT_GLOW_DOT_RADIUS).with_style(DotStyle::glow());
        dot.set_color(YELLOW);
        dot
    }

    pub fn with_style(mut self, style: DotStyle) -> Self {
        self.style = style;
        self
    }

    pub fn points(&self) -> &[Point3<f32>] {
        &self.points
    }

    pub fn radii(&self) -> &[f32] {
        &self.radii
    }

    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.colors.iter_mut().for_each(|c| *c = color);
    }

    /// Assign colors, resampled to the number of points. Two or more colors
    /// give a gradient across the cloud.
    pub fn set_colors(&mut self, colors: &[Rgba]) {
        if colors.is_empty() && !self.points.is_empty() {
            log::warn!("ignoring empty colors for a cloud of {} points", self.points.len());
            return;
        }
        self.colors = resize_with_interpolation(colors, self.points.len());
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Largest radius, 0 for an empty cloud
    pub fn radius(&self) -> f32 {
        self.radii.iter().copied().fold(0.0, f32::max)
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radii.iter_mut().for_each(|r| *r = radius);
    }

    /// Assign radii, resampled to the number of points
    pub fn set_radii(&mut self, radii: &[f32]) {
        if radii.is_empty() && !self.points.is_empty() {
            log::warn!("ignoring empty radii for a cloud of {} points", self.points.len());
            return;
        }
        self.radii = resize_with_interpolation(radii, self.points.len());
    }

    pub fn scale_radii(&mut self, factor: f32) {
        self.radii.iter_mut().for_each(|r| *r *= factor);
    }

    /// Bounds of the points grown by the largest radius
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.points).map(|bbox| bbox.expanded(self.radius()))
    }

    /// Scale positions and radii about `about`
    pub fn scale(&mut self, factor: f32, about: &Point3<f32>) {
        for point in &mut self.points {
            *point = about + (*point - about) * factor;
        }
        self.scale_radii(factor);
    }

    pub fn shift(&mut self, offset: &Vector3<f32>) {
        for point in &mut self.points {
            *point += *offset;
        }
    }

    /// Move the bounding box center to the origin
    pub fn center(&mut self) {
        if let Some(bbox) = self.bounding_box() {
            let offset = -bbox.center().coords;
            self.shift(&offset);
        }
    }

    /// Replace the points by a centered `rows x cols x layers` grid.
    ///
    /// Neighbours are spaced `2 * radius * (1 + buff_ratio)` apart; the cloud
    /// is then scaled, radii included, to `height` when one is given.
    pub fn to_grid(&mut self, rows: usize, cols: usize, layers: usize, buff_ratio: f32, height: Option<f32>) {
        let radius = self.radius();
        let spacing = 2.0 * radius * (1.0 + buff_ratio);

        let count = rows * cols * layers;
        self.points = (0..count)
            .map(|i| {
                let col = (i % cols) as f32;
                let row = ((i / cols) % rows) as f32;
                let layer = (i / (rows * cols)) as f32;
                Point3::new(col * spacing, row * spacing, layer * spacing)
            })
            .collect();
        self.radii = vec![radius; count];
        self.colors = if self.colors.is_empty() {
            vec![GREY_C; count]
        } else {
            resize_with_interpolation(&self.colors, count)
        };

        if let (Some(height), Some(bbox)) = (height, self.bounding_box()) {
            let current = bbox.size().y;
            if current > 0.0 {
                self.scale(height / current, &bbox.center());
            }
        }
        self.center();
        log::debug!(
            "laid out {count} dots on a {rows}x{cols}x{layers} grid, radius {}",
            self.radius()
        );
    }

    /// Billboard of every dot, paired with the dot index
    pub fn billboards<'a>(
        &'a self,
        camera_position: &'a Point3<f32>,
    ) -> impl Iterator<Item = (usize, GeometryResult<Quad>)> + 'a {
        self.points
            .iter()
            .zip(self.radii.iter())
            .enumerate()
            .map(move |(i, (point, radius))| (i, billboard_corners(point, *radius, camera_position)))
    }

    /// Billboards of all dots, failing on the first degenerate one
    pub fn quads(&self, camera_position: &Point3<f32>) -> GeometryResult<Vec<Quad>> {
        self.billboards(camera_position).map(|(_, quad)| quad).collect()
    }
}

impl Default for DotCloud {
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_DOT_RADIUS)
    }
}
