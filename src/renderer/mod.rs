//! Canvas 2D rendering
//!
//! Scenes are turned into a flat display list of `DrawCmd`s in scene units
//! (1200x600, y down). The list is pure data so it can be built and checked
//! natively; the canvas executor only exists on wasm.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod scene;
pub mod shapes;

use glam::Vec2;

use crate::consts::{VIEW_H, VIEW_W};
use crate::sim::CubicSegment;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;
pub use scene::{meteor_frame, night_frame};

/// Linear RGBA in [0, 1]
pub type Color = [f32; 4];

pub mod palette {
    use super::Color;

    pub const SKY: Color = [0.04, 0.05, 0.12, 1.0];
    pub const DAY_SKY: Color = [0.36, 0.55, 0.78, 1.0];
    pub const HILL_BACK: Color = [0.10, 0.16, 0.22, 1.0];
    pub const HILL_MIDDLE: Color = [0.08, 0.20, 0.18, 1.0];
    pub const HILL_FRONT: Color = [0.06, 0.24, 0.14, 1.0];
    pub const RIDGE: Color = [1.0, 1.0, 1.0, 0.25];
    pub const GRASS: Color = [0.35, 0.65, 0.35, 0.9];
    pub const TEXT: Color = [0.93, 0.94, 0.97, 1.0];
    pub const FIGURE: Color = [0.95, 0.95, 0.98, 1.0];
    pub const METEOR: Color = [1.0, 0.55, 0.25, 1.0];
    pub const FIREFLY: Color = [1.0, 0.92, 0.45, 1.0];
    pub const WIND: Color = [0.85, 0.90, 1.0, 0.5];
    pub const STAR: Color = [1.0, 1.0, 1.0, 0.8];
    pub const PANEL: Color = [0.0, 0.0, 0.0, 0.6];
}

/// Same colour with alpha scaled by `k`
pub fn fade(color: Color, k: f32) -> Color {
    [color[0], color[1], color[2], color[3] * k.clamp(0.0, 1.0)]
}

/// CSS `rgba()` string for a colour
pub fn css(color: Color) -> String {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "rgba({},{},{},{:.3})",
        channel(color[0]),
        channel(color[1]),
        channel(color[2]),
        color[3].clamp(0.0, 1.0)
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

impl Stroke {
    pub fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }
}

/// One display-list entry, in scene units
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear(Color),
    Rect {
        min: Vec2,
        size: Vec2,
        fill: Color,
    },
    Circle {
        center: Vec2,
        radius: f32,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    Line {
        from: Vec2,
        to: Vec2,
        stroke: Stroke,
    },
    /// Bezier path; a fill closes it down to the bottom of the scene
    Path {
        segments: Vec<CubicSegment>,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    /// Centred text
    Text {
        pos: Vec2,
        text: String,
        size: f32,
        color: Color,
    },
    /// Restrict drawing to a rectangle until the matching `EndClip`
    Clip { min: Vec2, size: Vec2 },
    EndClip,
}

/// Fits the scene into a canvas: scale to cover, centred horizontally,
/// anchored to the bottom edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: f32,
    pub offset: Vec2,
}

impl Viewport {
    pub fn fit(width: f32, height: f32) -> Self {
        let scale = (width / VIEW_W).max(height / VIEW_H);
        Self {
            scale,
            offset: Vec2::new((width - VIEW_W * scale) / 2.0, height - VIEW_H * scale),
        }
    }

    pub fn to_canvas(&self, p: Vec2) -> Vec2 {
        p * self.scale + self.offset
    }

    /// Inverse of `to_canvas`, for pointer input
    pub fn to_scene(&self, p: Vec2) -> Vec2 {
        (p - self.offset) / self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_colour() {
        assert_eq!(css([1.0, 0.0, 0.5, 0.25]), "rgba(255,0,128,0.250)");
        assert_eq!(css([2.0, -1.0, 0.0, 3.0]), "rgba(255,0,0,1.000)");
    }

    #[test]
    fn test_viewport_covers_and_anchors_bottom() {
        // Taller than 2:1, so height decides and the sides are cropped
        let vp = Viewport::fit(800.0, 800.0);
        assert!((vp.scale - 800.0 / 600.0).abs() < 1e-6);
        assert!(vp.offset.x < 0.0);
        assert!(vp.offset.y.abs() < 1e-3);

        // Wider than 2:1, so width decides and the top is cropped
        let vp = Viewport::fit(2400.0, 600.0);
        assert_eq!(vp.scale, 2.0);
        assert_eq!(vp.offset.x, 0.0);
        assert_eq!(vp.to_canvas(Vec2::new(0.0, VIEW_H)).y, 600.0);

        let p = Vec2::new(321.0, 123.0);
        assert!((vp.to_scene(vp.to_canvas(p)) - p).length() < 1e-4);
    }

    #[test]
    fn test_fade() {
        assert_eq!(fade([1.0, 1.0, 1.0, 0.8], 0.5), [1.0, 1.0, 1.0, 0.4]);
        assert_eq!(fade(palette::TEXT, 2.0)[3], 1.0);
    }
}
