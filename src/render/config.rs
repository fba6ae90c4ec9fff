use std::fmt;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::{SiloError, SiloResult};

/// Scale at which the fixed pixel sizes (wall, floor, font) were tuned.
pub const REFERENCE_SCALE: f64 = 400.0;
/// Canvas margin around the silo at `supersample = 1`.
pub const BASE_MARGIN_PX: f64 = 20.0;

const WALL_THICKNESS_PX: f64 = 8.0;
const FLOOR_THICKNESS_PX: f64 = 6.0;
const MIN_BAR_PX: f64 = 2.0;
const ROOF_LINE_PX: f64 = 1.0;
const PARTICLE_OUTLINE_PX: f64 = 0.5;
const FONT_SIZE_PX: f64 = 14.0;
const MIN_FONT_SIZE_PX: f64 = 12.0;

/// How particle discs are filled.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Shading {
    /// Solid translucent fill; outline color follows the particle class.
    Flat,
    /// Radial gradient from 20% of the radius out to the rim.
    #[default]
    Radial,
}

/// What the top annotation line reports next to the time.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum LabelMode {
    /// Cumulative discharged count, `flowtotal=<n>`.
    #[default]
    FlowTotal,
    /// Mean discharge rate, `rate=<flow_total / t> /s`.
    FlowRate,
}

/// Sans-serif families tried, in order, when looking up a system label font.
pub const SYSTEM_SANS_FAMILIES: &[&str] = &[
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Arial",
    "Helvetica",
    "Segoe UI",
];

/// Font bytes for annotation text, loaded once before rendering starts.
#[derive(Clone)]
pub struct LabelFont {
    name: String,
    bytes: Arc<[u8]>,
    index: u32,
}

impl LabelFont {
    /// Wrap in-memory font data (TTF/OTF).
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            index: 0,
        }
    }

    /// Select face `index` inside a font collection (TTC).
    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    /// Read a font file.
    pub fn load(path: &Path) -> SiloResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read label font '{}'", path.display()))?;
        if bytes.is_empty() {
            return Err(SiloError::validation(format!(
                "label font '{}' is empty",
                path.display()
            )));
        }
        Ok(Self::from_bytes(path.display().to_string(), bytes))
    }

    /// Find a regular sans-serif face among the installed system fonts.
    ///
    /// Tries [`SYSTEM_SANS_FAMILIES`], then the generic sans-serif family, then any face at all.
    /// `None` when the system has no usable fonts.
    pub fn system_sans() -> Option<Self> {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "loaded system fonts");
        Self::sans_from_db(&db)
    }

    pub(crate) fn sans_from_db(db: &fontdb::Database) -> Option<Self> {
        let mut families: Vec<fontdb::Family<'_>> = SYSTEM_SANS_FAMILIES
            .iter()
            .map(|name| fontdb::Family::Name(*name))
            .collect();
        families.push(fontdb::Family::SansSerif);

        let id = db
            .query(&fontdb::Query {
                families: &families,
                weight: fontdb::Weight::NORMAL,
                stretch: fontdb::Stretch::Normal,
                style: fontdb::Style::Normal,
            })
            .or_else(|| db.faces().next().map(|face| face.id))?;

        let name = db
            .face(id)
            .and_then(|face| face.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_else(|| "system font".to_string());
        db.with_face_data(id, |data, index| {
            Self::from_bytes(name, data.to_vec()).with_index(index)
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Face index inside the font data.
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelFont")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Immutable configuration for a full rendering run.
///
/// Built once, validated, then shared by the layout and every frame render.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Silo width `W` (world units).
    pub silo_width: f64,
    /// Silo height `L` (world units).
    pub silo_height: f64,
    /// Floor opening `D` (world units), centered at `W / 2`.
    pub opening: f64,
    /// Floor vibration amplitude `A` (world units).
    pub amplitude: f64,
    /// Floor vibration angular frequency `w0` (rad/s).
    pub angular_freq: f64,
    /// Pixels per world unit.
    pub scale: f64,
    /// Resolution multiplier applied to scale, margin, line widths and font size.
    pub supersample: f64,
    /// Target canvas width / height. `None` fits the canvas to the silo plus margins.
    pub canvas_ratio: Option<f64>,
    /// Offset every particle's drawn `y` by the floor displacement.
    pub apply_floor_to_particles: bool,
    /// Multiplier on the drawn particle radius.
    pub particle_scale: f64,
    pub shading: Shading,
    pub label: LabelMode,
    /// Shape labels with this font. `None` draws them with the built-in bitmap font, the
    /// fallback for systems without fonts; [`LabelFont::system_sans`] finds a regular face.
    pub label_font: Option<LabelFont>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            silo_width: 1.0,
            silo_height: 2.0,
            opening: 0.2,
            amplitude: 0.02,
            angular_freq: 30.0,
            scale: 400.0,
            supersample: 1.0,
            canvas_ratio: None,
            apply_floor_to_particles: false,
            particle_scale: 1.0,
            shading: Shading::default(),
            label: LabelMode::default(),
            label_font: None,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> SiloResult<()> {
        fn positive(name: &str, v: f64) -> SiloResult<()> {
            if !v.is_finite() || v <= 0.0 {
                return Err(SiloError::validation(format!(
                    "{name} must be finite and > 0 (got {v})"
                )));
            }
            Ok(())
        }

        positive("silo width", self.silo_width)?;
        positive("silo height", self.silo_height)?;
        positive("scale", self.scale)?;
        positive("supersample", self.supersample)?;
        positive("particle scale", self.particle_scale)?;
        if let Some(ratio) = self.canvas_ratio {
            positive("canvas ratio", ratio)?;
        }

        if !self.opening.is_finite() || self.opening < 0.0 || self.opening >= self.silo_width {
            return Err(SiloError::validation(format!(
                "opening must satisfy 0 <= opening < silo width (got {} with width {})",
                self.opening, self.silo_width
            )));
        }
        if !self.amplitude.is_finite() {
            return Err(SiloError::validation("amplitude must be finite"));
        }
        if !self.angular_freq.is_finite() || self.angular_freq < 0.0 {
            return Err(SiloError::validation(
                "angular frequency must be finite and >= 0",
            ));
        }
        Ok(())
    }

    /// Pixels per world unit after supersampling.
    pub fn effective_scale(&self) -> f64 {
        self.scale * self.supersample
    }

    pub fn margin_px(&self) -> f64 {
        BASE_MARGIN_PX * self.supersample
    }

    /// Vertical floor displacement at time `t`: `A * sin(w0 * t)`.
    pub fn floor_offset(&self, t: f64) -> f64 {
        self.amplitude * (self.angular_freq * t).sin()
    }

    fn fixed_px(&self, base: f64) -> f64 {
        base * (self.scale / REFERENCE_SCALE) * self.supersample
    }

    pub fn wall_thickness_px(&self) -> f64 {
        crate::foundation::math::round_px_at_least(self.fixed_px(WALL_THICKNESS_PX), MIN_BAR_PX)
    }

    pub fn floor_thickness_px(&self) -> f64 {
        crate::foundation::math::round_px_at_least(self.fixed_px(FLOOR_THICKNESS_PX), MIN_BAR_PX)
    }

    pub fn roof_line_px(&self) -> f64 {
        ROOF_LINE_PX * self.supersample
    }

    pub fn particle_outline_px(&self) -> f64 {
        PARTICLE_OUTLINE_PX * self.supersample
    }

    pub fn font_size_px(&self) -> f64 {
        crate::foundation::math::round_px_at_least(
            self.fixed_px(FONT_SIZE_PX),
            MIN_FONT_SIZE_PX,
        )
    }

    /// Drawn particle radius in pixels, never below one pixel.
    pub fn particle_radius_px(&self, r: f64) -> f64 {
        (r * self.effective_scale() * self.particle_scale).max(1.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/config.rs"]
mod tests;
