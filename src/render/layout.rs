use crate::foundation::core::{Point, Rect};
use crate::render::config::RenderConfig;

/// Extra shift applied to the centered silo origin, in pixels at `supersample = 1`.
///
/// Cosmetic tunable; zero keeps the silo exactly centered.
pub const ORIGIN_NUDGE_PX: (f64, f64) = (0.0, 0.0);

/// Canvas size and world-origin placement, computed once per run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasLayout {
    /// Canvas width in pixels (>= 1).
    pub width_px: u32,
    /// Canvas height in pixels (>= 1).
    pub height_px: u32,
    /// Pixel x of world `x = 0`.
    pub offset_x: f64,
    /// Pixel y of the silo top edge (world `y = silo_height`).
    pub offset_y: f64,
    /// Pixels per world unit (scale * supersample).
    pub eff_scale: f64,
    /// Silo height in world units, the Y-flip reference.
    pub silo_height: f64,
    /// Silo width in world units.
    pub silo_width: f64,
    /// Margin in pixels.
    pub margin_px: f64,
}

impl CanvasLayout {
    /// Derive the canvas layout from a render configuration.
    ///
    /// Without a canvas ratio the canvas is the silo plus a margin on each side. With a ratio
    /// the canvas grows along one axis to match it and the silo is centered.
    pub fn compute(config: &RenderConfig) -> Self {
        let eff_scale = config.effective_scale();
        let margin = config.margin_px();
        let silo_w_px = config.silo_width * eff_scale;
        let silo_h_px = config.silo_height * eff_scale;

        let (width, height) = match config.canvas_ratio {
            None => (
                (silo_w_px + 2.0 * margin).round(),
                (silo_h_px + 2.0 * margin).round(),
            ),
            Some(ratio) if silo_w_px / silo_h_px > ratio => {
                let w = (silo_w_px + 2.0 * margin).round();
                (w, (w / ratio).round())
            }
            Some(ratio) => {
                let h = (silo_h_px + 2.0 * margin).round();
                ((h * ratio).round(), h)
            }
        };
        let width_px = clamp_dim(width);
        let height_px = clamp_dim(height);

        let offset_x = (f64::from(width_px) - silo_w_px) / 2.0 + ORIGIN_NUDGE_PX.0 * config.supersample;
        let offset_y =
            (f64::from(height_px) - silo_h_px) / 2.0 + ORIGIN_NUDGE_PX.1 * config.supersample;

        Self {
            width_px,
            height_px,
            offset_x,
            offset_y,
            eff_scale,
            silo_height: config.silo_height,
            silo_width: config.silo_width,
            margin_px: margin,
        }
    }

    /// Map a world point to canvas pixels. World `y = 0` is the floor; canvas y grows downward.
    pub fn map(&self, x: f64, y: f64) -> Point {
        Point::new(
            self.offset_x + x * self.eff_scale,
            self.offset_y + (self.silo_height - y) * self.eff_scale,
        )
    }

    /// Length in world units to pixels.
    pub fn px(&self, world: f64) -> f64 {
        world * self.eff_scale
    }

    /// Silo interior in canvas pixels.
    pub fn silo_rect(&self) -> Rect {
        let top_left = self.map(0.0, self.silo_height);
        let bottom_right = self.map(self.silo_width, 0.0);
        Rect::from_points(top_left, bottom_right)
    }
}

fn clamp_dim(v: f64) -> u32 {
    if v.is_finite() {
        v.clamp(1.0, f64::from(u32::MAX)) as u32
    } else {
        1
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/layout.rs"]
mod tests;
