use std::path::Path;

use anyhow::Context;
use kurbo::{Affine, PathEl, RoundedRect, Shape};

use crate::foundation::core::{Canvas, Rect, Rgba8};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::backend::{FrameRGBA, StageRenderer};
use crate::render::text::{TextBrushRgba8, TextLayoutEngine};
use crate::stage::model::{Element, ElementKind, Stage, TextAlign};

#[derive(Clone, Copy)]
struct TextStyle {
    size_px: f32,
    color: Rgba8,
    align: TextAlign,
    center_vertically: bool,
}

struct LoadedFont {
    engine: TextLayoutEngine,
    data: vello_cpu::peniko::FontData,
}

/// Full-resolution CPU rasterizer for a [`Stage`], powered by `vello_cpu`.
///
/// Output is premultiplied RGBA8. Text needs a font; a rasterizer built without one can only
/// draw fills.
pub struct CpuRasterizer {
    font: Option<LoadedFont>,
    ctx: Option<vello_cpu::RenderContext>,
}

impl CpuRasterizer {
    pub fn new(font_bytes: Option<Vec<u8>>) -> ReelResult<Self> {
        let font = match font_bytes {
            Some(bytes) => Some(LoadedFont {
                engine: TextLayoutEngine::new(&bytes)?,
                data: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0),
            }),
            None => None,
        };
        Ok(Self { font, ctx: None })
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    fn ctx_for(&mut self, width: u16, height: u16) -> vello_cpu::RenderContext {
        match self.ctx.take() {
            Some(mut ctx) if ctx.width() == width && ctx.height() == height => {
                ctx.reset();
                ctx
            }
            _ => vello_cpu::RenderContext::new(width, height),
        }
    }

    fn draw_element(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        el: &Element,
    ) -> ReelResult<()> {
        let opacity = el.state.opacity.clamp(0.0, 1.0) as f32;
        let transform = element_transform(el);
        ctx.set_transform(affine_to_cpu(transform));
        if opacity < 1.0 {
            ctx.push_opacity_layer(opacity);
        }
        let drawn = match &el.kind {
            ElementKind::Fill {
                color,
                corner_radius,
            } => {
                fill_box(ctx, el.frame, *corner_radius, *color);
                Ok(())
            }
            ElementKind::Text {
                text,
                size_px,
                color,
                align,
            } => {
                let shown = visible_prefix(text, el.state.visible_chars);
                let style = TextStyle {
                    size_px: *size_px,
                    color: *color,
                    align: *align,
                    center_vertically: false,
                };
                self.draw_text(ctx, transform, shown, style, el.frame)
            }
            ElementKind::Button {
                color,
                corner_radius,
                label,
                size_px,
                label_color,
            } => {
                fill_box(ctx, el.frame, *corner_radius, *color);
                let style = TextStyle {
                    size_px: *size_px,
                    color: *label_color,
                    align: TextAlign::Center,
                    center_vertically: true,
                };
                self.draw_text(ctx, transform, label, style, el.frame)
            }
        };
        if opacity < 1.0 {
            ctx.pop_layer();
        }
        drawn
    }

    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        transform: Affine,
        text: &str,
        style: TextStyle,
        frame: Rect,
    ) -> ReelResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let font = self
            .font
            .as_mut()
            .ok_or_else(|| ReelError::config("text rendering requires a font (font_path)"))?;
        let layout = font.engine.layout(
            text,
            style.size_px,
            TextBrushRgba8::from(style.color),
            frame.width().max(1.0) as f32,
        )?;

        let dx = match style.align {
            TextAlign::Start => 0.0,
            TextAlign::Center => (frame.width() - f64::from(layout.width())).max(0.0) / 2.0,
        };
        let dy = if style.center_vertically {
            (frame.height() - f64::from(layout.height())).max(0.0) / 2.0
        } else {
            0.0
        };
        let origin = (frame.x0 + dx, frame.y0 + dy);
        ctx.set_transform(affine_to_cpu(transform * Affine::translate(origin)));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font.data)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }
}

impl StageRenderer for CpuRasterizer {
    fn render_stage(&mut self, stage: &Stage) -> ReelResult<FrameRGBA> {
        let Canvas { width, height } = stage.canvas();
        let (w, h) = canvas_u16(width, height)?;
        let mut ctx = self.ctx_for(w, h);

        let mut result = Ok(());
        for el in stage.elements().iter().filter(|el| el.is_visible()) {
            result = self.draw_element(&mut ctx, el);
            if result.is_err() {
                break;
            }
        }

        let frame = result.map(|()| {
            let mut pixmap = vello_cpu::Pixmap::new(w, h);
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            FrameRGBA {
                width,
                height,
                data: pixmap.data_as_u8_slice().to_vec(),
                premultiplied: true,
            }
        });
        self.ctx = Some(ctx);
        frame
    }
}

fn canvas_u16(width: u32, height: u32) -> ReelResult<(u16, u16)> {
    let w = u16::try_from(width)
        .map_err(|_| ReelError::validation("canvas width exceeds u16::MAX"))?;
    let h = u16::try_from(height)
        .map_err(|_| ReelError::validation("canvas height exceeds u16::MAX"))?;
    if w == 0 || h == 0 {
        return Err(ReelError::validation("canvas width/height must be > 0"));
    }
    Ok((w, h))
}

/// Translate by the animated offset and scale about the layout box centre.
fn element_transform(el: &Element) -> Affine {
    let c = el.frame.center();
    let s = el.state.scale;
    Affine::translate(el.state.translate)
        * Affine::translate(c.to_vec2())
        * Affine::scale(s)
        * Affine::translate(-c.to_vec2())
}

/// The first `visible` characters of `text`.
fn visible_prefix(text: &str, visible: Option<usize>) -> &str {
    match visible {
        None => text,
        Some(n) => match text.char_indices().nth(n) {
            Some((byte, _)) => &text[..byte],
            None => text,
        },
    }
}

fn fill_box(ctx: &mut vello_cpu::RenderContext, frame: Rect, radius: f64, color: Rgba8) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        color.r, color.g, color.b, color.a,
    ));
    if radius <= 0.0 {
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            frame.x0, frame.y0, frame.x1, frame.y1,
        ));
    } else {
        let rr = RoundedRect::from_rect(frame, radius);
        ctx.fill_path(&bezpath_to_cpu(rr.path_elements(0.1)));
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(elements: impl Iterator<Item = PathEl>) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    for el in elements {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

/// Load font bytes for the rasterizer, if a path is configured.
pub fn load_font(path: Option<&Path>) -> ReelResult<Option<Vec<u8>>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let bytes =
        std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
    Ok(Some(bytes))
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
