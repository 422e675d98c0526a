//! Canvas 2D executor for display lists

use std::f64::consts::TAU;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{DrawCmd, Stroke, Viewport, css};
use crate::consts::VIEW_H;

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    viewport: Viewport,
    pub size: (u32, u32),
}

impl CanvasRenderer {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let size = (canvas.width(), canvas.height());
        log::info!("Canvas renderer ready: {}x{}", size.0, size.1);
        Ok(Self {
            viewport: Viewport::fit(size.0 as f32, size.1 as f32),
            canvas,
            ctx,
            size,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.size = (width, height);
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            self.viewport = Viewport::fit(width as f32, height as f32);
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn apply_stroke(&self, stroke: &Stroke) {
        self.ctx.set_stroke_style_str(&css(stroke.color));
        self.ctx.set_line_width(stroke.width as f64);
        self.ctx.stroke();
    }

    pub fn render(&self, cmds: &[DrawCmd]) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        let vp = self.viewport;
        ctx.set_line_cap("round");
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");

        for cmd in cmds {
            match cmd {
                DrawCmd::Clear(color) => {
                    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
                    ctx.set_fill_style_str(&css(*color));
                    ctx.fill_rect(0.0, 0.0, self.size.0 as f64, self.size.1 as f64);
                    let s = vp.scale as f64;
                    ctx.set_transform(s, 0.0, 0.0, s, vp.offset.x as f64, vp.offset.y as f64)?;
                }
                DrawCmd::Rect { min, size, fill } => {
                    ctx.set_fill_style_str(&css(*fill));
                    ctx.fill_rect(min.x as f64, min.y as f64, size.x as f64, size.y as f64);
                }
                DrawCmd::Circle { center, radius, fill, stroke } => {
                    ctx.begin_path();
                    ctx.arc(center.x as f64, center.y as f64, *radius as f64, 0.0, TAU)?;
                    if let Some(fill) = fill {
                        ctx.set_fill_style_str(&css(*fill));
                        ctx.fill();
                    }
                    if let Some(stroke) = stroke {
                        self.apply_stroke(stroke);
                    }
                }
                DrawCmd::Line { from, to, stroke } => {
                    ctx.begin_path();
                    ctx.move_to(from.x as f64, from.y as f64);
                    ctx.line_to(to.x as f64, to.y as f64);
                    self.apply_stroke(stroke);
                }
                DrawCmd::Path { segments, fill, stroke } => {
                    let (Some(first), Some(last)) = (segments.first(), segments.last()) else {
                        continue;
                    };
                    ctx.begin_path();
                    ctx.move_to(first.p0.x as f64, first.p0.y as f64);
                    for seg in segments {
                        ctx.bezier_curve_to(
                            seg.p1.x as f64,
                            seg.p1.y as f64,
                            seg.p2.x as f64,
                            seg.p2.y as f64,
                            seg.p3.x as f64,
                            seg.p3.y as f64,
                        );
                    }
                    if let Some(fill) = fill {
                        ctx.line_to(last.p3.x as f64, VIEW_H as f64);
                        ctx.line_to(first.p0.x as f64, VIEW_H as f64);
                        ctx.close_path();
                        ctx.set_fill_style_str(&css(*fill));
                        ctx.fill();
                    }
                    if let Some(stroke) = stroke {
                        self.apply_stroke(stroke);
                    }
                }
                DrawCmd::Text { pos, text, size, color } => {
                    ctx.set_font(&format!("{size}px system-ui, sans-serif"));
                    ctx.set_fill_style_str(&css(*color));
                    ctx.fill_text(text, pos.x as f64, pos.y as f64)?;
                }
                DrawCmd::Clip { min, size } => {
                    ctx.save();
                    ctx.begin_path();
                    ctx.rect(min.x as f64, min.y as f64, size.x as f64, size.y as f64);
                    ctx.clip();
                }
                DrawCmd::EndClip => ctx.restore(),
            }
        }
        Ok(())
    }
}
