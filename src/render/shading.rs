use crate::foundation::core::Rgba8;
use crate::render::config::Shading;
use crate::trace::model::Particle;

/// Inner gradient stop as a fraction of the particle radius.
pub const GRADIENT_INNER_STOP: f64 = 0.2;
/// Gradient tiles are cached per radius rounded to `1 / RADIUS_QUANTUM` pixels.
pub const RADIUS_QUANTUM: f64 = 8.0;

pub const BACKGROUND: Rgba8 = Rgba8::opaque(255, 255, 255);
pub const WALL: Rgba8 = Rgba8::opaque(0xcc, 0xcc, 0xcc);
pub const FLOOR: Rgba8 = Rgba8::opaque(0x88, 0x88, 0x88);
pub const ROOF: Rgba8 = Rgba8::opaque(0x99, 0x99, 0x99);
pub const LABEL_PRIMARY: Rgba8 = Rgba8::opaque(0, 0, 0);
pub const LABEL_SECONDARY: Rgba8 = Rgba8::opaque(0x33, 0x33, 0x33);

/// Visual class of a particle, decided by its drawn `y` relative to the floor line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParticleClass {
    /// At or above the floor line.
    Normal,
    /// Fallen past the floor line (`y < 0`).
    BelowFloor,
}

impl ParticleClass {
    pub fn classify(draw_y: f64) -> Self {
        if draw_y < 0.0 {
            Self::BelowFloor
        } else {
            Self::Normal
        }
    }
}

/// The `y` a particle is drawn at: offset by the floor displacement when requested.
pub fn particle_draw_y(p: &Particle, floor_offset: f64, apply_floor: bool) -> f64 {
    if apply_floor { p.y + floor_offset } else { p.y }
}

/// Fill and outline colors for one particle class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParticlePaint {
    /// Fill at the center (and inside the inner stop for radial shading).
    pub inner: Rgba8,
    /// Fill at the rim. Equal to `inner` for flat shading.
    pub outer: Rgba8,
    pub outline: Rgba8,
}

impl ParticlePaint {
    pub fn for_class(class: ParticleClass, shading: Shading) -> Self {
        let dark_outline = Rgba8::with_alpha(10, 10, 10, 0.4);
        match (class, shading) {
            (ParticleClass::BelowFloor, Shading::Flat) => Self {
                inner: Rgba8::with_alpha(255, 0, 0, 0.45),
                outer: Rgba8::with_alpha(255, 0, 0, 0.45),
                outline: Rgba8::with_alpha(200, 0, 0, 0.6),
            },
            (ParticleClass::BelowFloor, Shading::Radial) => Self {
                inner: Rgba8::with_alpha(255, 0, 0, 0.45),
                outer: Rgba8::with_alpha(200, 0, 0, 0.6),
                outline: dark_outline,
            },
            (ParticleClass::Normal, Shading::Flat) => Self {
                inner: Rgba8::with_alpha(30, 144, 255, 0.9),
                outer: Rgba8::with_alpha(30, 144, 255, 0.9),
                outline: dark_outline,
            },
            (ParticleClass::Normal, Shading::Radial) => Self {
                inner: Rgba8::with_alpha(30, 144, 255, 0.9),
                outer: Rgba8::with_alpha(30, 144, 255, 0.4),
                outline: dark_outline,
            },
        }
    }

    pub fn is_gradient(&self) -> bool {
        self.inner != self.outer
    }
}

/// Cache key for a rasterized radial gradient tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct GradientKey {
    pub(crate) class: ParticleClass,
    pub(crate) radius_q: u32,
}

impl GradientKey {
    pub(crate) fn new(class: ParticleClass, radius_px: f64) -> Self {
        Self {
            class,
            radius_q: (radius_px * RADIUS_QUANTUM).round().max(1.0) as u32,
        }
    }

    pub(crate) fn radius_px(self) -> f64 {
        f64::from(self.radius_q) / RADIUS_QUANTUM
    }
}

/// Square premultiplied RGBA8 tile holding a radial gradient centered in the tile.
#[derive(Clone, Debug)]
pub(crate) struct GradientTile {
    pub(crate) side: u32,
    pub(crate) bytes: Vec<u8>,
}

impl GradientTile {
    /// Distance from the tile origin to its center.
    pub(crate) fn half(&self) -> f64 {
        f64::from(self.side) / 2.0
    }
}

/// Side of the square tile [`radial_gradient_tile`] builds for `radius_px`.
pub(crate) fn gradient_tile_side(radius_px: f64) -> u32 {
    ((2.0 * radius_px).ceil() as u32).saturating_add(2)
}

/// Rasterize a radial gradient of radius `radius_px`: `inner` up to
/// [`GRADIENT_INNER_STOP`] of the radius, blending linearly to `outer` at the rim and beyond.
pub(crate) fn radial_gradient_tile(radius_px: f64, inner: Rgba8, outer: Rgba8) -> GradientTile {
    let side = gradient_tile_side(radius_px);
    let c = f64::from(side) / 2.0;
    let r0 = radius_px * GRADIENT_INNER_STOP;
    let span = (radius_px - r0).max(f64::EPSILON);

    let mut bytes = vec![0u8; (side as usize) * (side as usize) * 4];
    for y in 0..side {
        for x in 0..side {
            let dx = f64::from(x) + 0.5 - c;
            let dy = f64::from(y) + 0.5 - c;
            let d = (dx * dx + dy * dy).sqrt();
            let t = ((d - r0) / span).clamp(0.0, 1.0) as f32;
            let px = inner.lerp(outer, t).to_premul();
            let idx = ((y as usize) * (side as usize) + (x as usize)) * 4;
            bytes[idx..idx + 4].copy_from_slice(&px);
        }
    }
    GradientTile { side, bytes }
}

#[cfg(test)]
#[path = "../../tests/unit/render/shading.rs"]
mod tests;
