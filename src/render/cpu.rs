use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::core::{Point, Rect, Rgba8};
use crate::foundation::error::{SiloError, SiloResult};
use crate::render::backend::FrameRGBA;
use crate::render::config::{RenderConfig, Shading};
use crate::render::layout::CanvasLayout;
use crate::render::shading::{
    self, GradientKey, ParticleClass, ParticlePaint, gradient_tile_side, particle_draw_y,
    radial_gradient_tile,
};
use crate::render::text::{
    LABEL_BOTTOM_PX, LABEL_INSET_PX, LABEL_TOP_PX, LabelBrush, LabelShaper, bitmap_glyph_rects,
    format_params_label, format_top_label,
};
use crate::trace::model::Frame;

/// Largest gradient tile side; bigger discs fall back to a solid fill.
const MAX_GRADIENT_TILE_PX: u32 = 2048;
/// Flattening tolerance for circle outlines, in pixels.
const CIRCLE_TOLERANCE: f64 = 0.1;

/// Draws one [`Frame`] onto a fresh canvas with `vello_cpu`.
///
/// A renderer keeps its render context, gradient tiles and shaped font between frames, so one
/// instance should be reused for a whole sequence (or one per worker thread).
pub struct FrameRenderer {
    ctx: Option<vello_cpu::RenderContext>,
    gradient_cache: HashMap<GradientKey, vello_cpu::Image>,
    shaper: Option<LabelShaper>,
}

impl FrameRenderer {
    /// Build a renderer for `config`. Fails only if a configured label font cannot be used.
    pub fn new(config: &RenderConfig) -> SiloResult<Self> {
        let shaper = config.label_font.as_ref().map(LabelShaper::new).transpose()?;
        Ok(Self {
            ctx: None,
            gradient_cache: HashMap::new(),
            shaper,
        })
    }

    /// Render `frame` at `layout.width_px x layout.height_px`.
    ///
    /// Draw order: background, walls, floor segments, roof outline, particles in trace order,
    /// labels. The output is premultiplied RGBA8 and depends only on the arguments.
    pub fn render(
        &mut self,
        frame: &Frame,
        layout: &CanvasLayout,
        config: &RenderConfig,
    ) -> SiloResult<FrameRGBA> {
        let width_u16: u16 = layout
            .width_px
            .try_into()
            .map_err(|_| SiloError::render("canvas width exceeds u16"))?;
        let height_u16: u16 = layout
            .height_px
            .try_into()
            .map_err(|_| SiloError::render("canvas height exceeds u16"))?;

        let floor_offset = config.floor_offset(frame.t);

        self.with_ctx_mut(width_u16, height_u16, |this, ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

            fill_rect(
                ctx,
                shading::BACKGROUND,
                Rect::new(0.0, 0.0, f64::from(layout.width_px), f64::from(layout.height_px)),
            );
            draw_walls(ctx, layout, config);
            draw_floor(ctx, layout, config, floor_offset);
            draw_roof(ctx, layout, config);
            this.draw_particles(ctx, frame, layout, config, floor_offset);
            this.draw_labels(ctx, frame, layout, config)?;

            let mut pixmap = vello_cpu::Pixmap::new(width_u16, height_u16);
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);

            Ok(FrameRGBA {
                width: layout.width_px,
                height: layout.height_px,
                data: pixmap.data_as_u8_slice().to_vec(),
                premultiplied: true,
            })
        })
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> SiloResult<R>,
    ) -> SiloResult<R> {
        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(width, height),
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            Some(_) => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    fn draw_particles(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        frame: &Frame,
        layout: &CanvasLayout,
        config: &RenderConfig,
        floor_offset: f64,
    ) {
        let outline_px = config.particle_outline_px();
        let silo = Rect::new(0.0, 0.0, layout.silo_width, layout.silo_height);
        let mut outside = 0usize;

        for p in &frame.particles {
            let y = particle_draw_y(p, floor_offset, config.apply_floor_to_particles);
            if !silo.contains(Point::new(p.x, y)) {
                outside += 1;
            }
            let class = ParticleClass::classify(y);
            let paint = ParticlePaint::for_class(class, config.shading);
            let center = layout.map(p.x, y);
            let radius = config.particle_radius_px(p.r);
            if !(center.x.is_finite() && center.y.is_finite() && radius.is_finite()) {
                continue;
            }

            self.fill_disc(ctx, center, radius, class, &paint, config.shading);

            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(outline_px));
            ctx.set_paint(color_to_cpu(paint.outline));
            ctx.stroke_path(&circle_path(center, radius));
        }

        if outside > 0 {
            tracing::debug!(
                t = frame.t,
                outside,
                "particles drawn outside the silo interior"
            );
        }
    }

    fn fill_disc(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        center: Point,
        radius: f64,
        class: ParticleClass,
        paint: &ParticlePaint,
        shading: Shading,
    ) {
        let tile = match shading {
            Shading::Radial if paint.is_gradient() => self.gradient_paint_for(class, radius, paint),
            _ => None,
        };

        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        match tile {
            Some((image, half)) => {
                ctx.set_transform(vello_cpu::kurbo::Affine::translate((
                    center.x - half,
                    center.y - half,
                )));
                ctx.set_paint(image);
                ctx.fill_path(&circle_path(Point::new(half, half), radius));
            }
            None => {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(color_to_cpu(paint.inner));
                ctx.fill_path(&circle_path(center, radius));
            }
        }
    }

    fn gradient_paint_for(
        &mut self,
        class: ParticleClass,
        radius: f64,
        paint: &ParticlePaint,
    ) -> Option<(vello_cpu::Image, f64)> {
        let key = GradientKey::new(class, radius);
        let half = |image: &vello_cpu::Image| match &image.image {
            vello_cpu::ImageSource::Pixmap(p) => Some(f64::from(p.width()) / 2.0),
            _ => None,
        };

        if let Some(image) = self.gradient_cache.get(&key) {
            return half(image).map(|h| (image.clone(), h));
        }

        let side = gradient_tile_side(key.radius_px());
        if side > MAX_GRADIENT_TILE_PX {
            tracing::debug!(side, "gradient tile too large, using solid fill");
            return None;
        }
        let tile = radial_gradient_tile(key.radius_px(), paint.inner, paint.outer);
        let pixmap = premul_bytes_to_pixmap(&tile.bytes, tile.side, tile.side).ok()?;
        let image = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.gradient_cache.insert(key, image.clone());
        Some((image, tile.half()))
    }

    fn draw_labels(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        frame: &Frame,
        layout: &CanvasLayout,
        config: &RenderConfig,
    ) -> SiloResult<()> {
        let ss = config.supersample;
        let font_px = config.font_size_px();
        let x = layout.margin_px + LABEL_INSET_PX * ss;
        let lines = [
            (
                format_top_label(frame, config.label),
                Point::new(x, LABEL_TOP_PX * ss),
                shading::LABEL_PRIMARY,
            ),
            (
                format_params_label(config.amplitude, config.angular_freq),
                Point::new(x, f64::from(layout.height_px) - LABEL_BOTTOM_PX * ss),
                shading::LABEL_SECONDARY,
            ),
        ];

        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        for (text, origin, color) in &lines {
            match self.shaper.as_mut() {
                Some(shaper) => draw_shaped_label(ctx, shaper, text, *origin, font_px, *color)?,
                None => {
                    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                    ctx.set_paint(color_to_cpu(*color));
                    for r in bitmap_glyph_rects(text, *origin, font_px) {
                        ctx.fill_rect(&rect_to_cpu(r));
                    }
                }
            }
        }
        Ok(())
    }
}

fn draw_walls(ctx: &mut vello_cpu::RenderContext, layout: &CanvasLayout, config: &RenderConfig) {
    let silo = layout.silo_rect();
    let t = config.wall_thickness_px();
    fill_rect(ctx, shading::WALL, Rect::new(silo.x0 - t, silo.y0, silo.x0, silo.y1));
    fill_rect(ctx, shading::WALL, Rect::new(silo.x1, silo.y0, silo.x1 + t, silo.y1));
}

/// Two floor segments centered on the displaced floor line, leaving the opening around `W / 2`.
fn draw_floor(
    ctx: &mut vello_cpu::RenderContext,
    layout: &CanvasLayout,
    config: &RenderConfig,
    floor_offset: f64,
) {
    let half = config.floor_thickness_px() / 2.0;
    let w = config.silo_width;
    let gap_left = (w - config.opening) / 2.0;
    let gap_right = (w + config.opening) / 2.0;

    let left_x0 = layout.map(0.0, floor_offset);
    let left_x1 = layout.map(gap_left, floor_offset);
    let right_x0 = layout.map(gap_right, floor_offset);
    let right_x1 = layout.map(w, floor_offset);
    let y = left_x0.y;
    if !y.is_finite() {
        return;
    }

    fill_rect(ctx, shading::FLOOR, Rect::new(left_x0.x, y - half, left_x1.x, y + half));
    fill_rect(ctx, shading::FLOOR, Rect::new(right_x0.x, y - half, right_x1.x, y + half));
}

/// Thin outline around the silo including the wall bars.
fn draw_roof(ctx: &mut vello_cpu::RenderContext, layout: &CanvasLayout, config: &RenderConfig) {
    let silo = layout.silo_rect();
    let t = config.wall_thickness_px();
    let outline = Rect::new(silo.x0 - t, silo.y0, silo.x1 + t, silo.y1);

    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(config.roof_line_px()));
    ctx.set_paint(color_to_cpu(shading::ROOF));
    ctx.stroke_rect(&rect_to_cpu(outline));
}

fn draw_shaped_label(
    ctx: &mut vello_cpu::RenderContext,
    shaper: &mut LabelShaper,
    text: &str,
    origin: Point,
    font_px: f64,
    color: Rgba8,
) -> SiloResult<()> {
    let brush = LabelBrush {
        r: color.r,
        g: color.g,
        b: color.b,
        a: color.a,
    };
    let layout = shaper.layout(text, font_px as f32, brush)?;
    let font = shaper.font().clone();

    ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
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
            ctx.glyph_run(&font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
    Ok(())
}

fn fill_rect(ctx: &mut vello_cpu::RenderContext, color: Rgba8, rect: Rect) {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(color_to_cpu(color));
    ctx.fill_rect(&rect_to_cpu(rect));
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::from_points(
        point_to_cpu(Point::new(r.x0, r.y0)),
        point_to_cpu(Point::new(r.x1, r.y1)),
    )
}

fn circle_path(center: Point, radius: f64) -> vello_cpu::kurbo::BezPath {
    use kurbo::Shape as _;

    let circle = kurbo::Circle::new(center, radius);
    let mut p = vello_cpu::kurbo::BezPath::new();
    for el in circle.path_elements(CIRCLE_TOLERANCE) {
        p.push(el);
    }
    p
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> SiloResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| SiloError::render("tile width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| SiloError::render("tile height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(SiloError::render("tile byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
