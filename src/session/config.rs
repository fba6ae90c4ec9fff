use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::Fps;
use crate::foundation::error::{SiloError, SiloResult};
use crate::render::config::{LabelFont, LabelMode, RenderConfig, Shading};
use crate::session::driver::DriverOpts;

/// Full run configuration: every render parameter plus input, output and scheduling options.
///
/// Missing JSON keys take the defaults below; command-line overrides are applied on top.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Trace file to render.
    pub input: Option<PathBuf>,
    /// Output directory for frames and video.
    pub outdir: PathBuf,
    /// Silo width `W`.
    pub width: f64,
    /// Silo height `L`.
    pub height: f64,
    /// Floor opening `D`.
    pub opening: f64,
    /// Floor vibration amplitude `A`.
    pub amplitude: f64,
    /// Floor vibration angular frequency `w0` (rad/s).
    pub w0: f64,
    /// Video frame rate.
    pub fps: u32,
    /// Pixels per world unit.
    pub scale: f64,
    /// Canvas width / height.
    pub ratio: Option<f64>,
    pub supersample: f64,
    pub apply_floor_to_particles: bool,
    pub frames_only: bool,
    pub particle_scale: f64,
    pub shading: Shading,
    pub label: LabelMode,
    /// TTF/OTF file for label text; a system sans-serif face is used when absent.
    pub label_font: Option<PathBuf>,
    /// Draw labels with the built-in bitmap font instead of a system font.
    pub bitmap_labels: bool,
    pub downsample: bool,
    pub parallel: bool,
    pub threads: Option<usize>,
    pub chunk_size: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        let render = RenderConfig::default();
        let driver = DriverOpts::default();
        Self {
            input: None,
            outdir: driver.out_dir,
            width: render.silo_width,
            height: render.silo_height,
            opening: render.opening,
            amplitude: render.amplitude,
            w0: render.angular_freq,
            fps: driver.fps.num,
            scale: render.scale,
            ratio: render.canvas_ratio,
            supersample: render.supersample,
            apply_floor_to_particles: render.apply_floor_to_particles,
            frames_only: driver.frames_only,
            particle_scale: render.particle_scale,
            shading: render.shading,
            label: render.label,
            label_font: None,
            bitmap_labels: false,
            downsample: driver.downsample,
            parallel: driver.parallel,
            threads: driver.threads,
            chunk_size: driver.chunk_size,
        }
    }
}

/// Command-line values that take precedence over the JSON file.
///
/// Flags (`--frames-only` and friends) can only switch an option on.
#[derive(clap::Args, Clone, Debug, Default)]
pub struct RunOverrides {
    /// Trace file to render.
    #[arg(short = 'i', long)]
    pub input: Option<PathBuf>,
    /// Output directory [default: out].
    #[arg(short = 'o', long)]
    pub outdir: Option<PathBuf>,
    /// Silo width [default: 1.0].
    #[arg(long)]
    pub width: Option<f64>,
    /// Silo height [default: 2.0].
    #[arg(long)]
    pub height: Option<f64>,
    /// Floor opening width [default: 0.2].
    #[arg(long)]
    pub opening: Option<f64>,
    /// Floor vibration amplitude [default: 0.02].
    #[arg(long, alias = "A", allow_negative_numbers = true)]
    pub amplitude: Option<f64>,
    /// Floor vibration angular frequency in rad/s [default: 30].
    #[arg(long)]
    pub w0: Option<f64>,
    /// Video frame rate [default: 30].
    #[arg(long)]
    pub fps: Option<u32>,
    /// Pixels per world unit [default: 400].
    #[arg(long)]
    pub scale: Option<f64>,
    /// Canvas aspect ratio (width / height); fits the silo when unset.
    #[arg(long)]
    pub ratio: Option<f64>,
    /// Resolution multiplier [default: 1].
    #[arg(long)]
    pub supersample: Option<f64>,
    /// Offset drawn particles by the floor displacement.
    #[arg(long)]
    pub apply_floor_to_particles: bool,
    /// Write PNG frames only, skip the video.
    #[arg(long)]
    pub frames_only: bool,
    /// Particle radius draw multiplier [default: 1].
    #[arg(long)]
    pub particle_scale: Option<f64>,
    /// Particle fill style [default: radial].
    #[arg(long, value_enum)]
    pub shading: Option<Shading>,
    /// Top label content [default: flow-total].
    #[arg(long, value_enum)]
    pub label: Option<LabelMode>,
    /// TTF/OTF font for labels [default: system sans-serif].
    #[arg(long)]
    pub label_font: Option<PathBuf>,
    /// Use the built-in bitmap font for labels.
    #[arg(long, conflicts_with = "label_font")]
    pub bitmap_labels: bool,
    /// Resample supersampled frames to nominal resolution.
    #[arg(long)]
    pub downsample: bool,
    /// Render frames in parallel.
    #[arg(long)]
    pub parallel: bool,
    /// Worker threads for parallel rendering.
    #[arg(long)]
    pub threads: Option<usize>,
    /// Frames per render chunk [default: 64].
    #[arg(long)]
    pub chunk_size: Option<usize>,
}

impl RunConfig {
    pub fn from_json_str(s: &str) -> SiloResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| SiloError::validation(format!("invalid run config: {e}")))
    }

    /// Load a JSON run configuration file.
    pub fn from_json_path(path: &Path) -> SiloResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read run config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, o: &RunOverrides) -> Self {
        fn set<T: Clone>(dst: &mut T, src: &Option<T>) {
            if let Some(v) = src {
                *dst = v.clone();
            }
        }

        if o.input.is_some() {
            self.input = o.input.clone();
        }
        set(&mut self.outdir, &o.outdir);
        set(&mut self.width, &o.width);
        set(&mut self.height, &o.height);
        set(&mut self.opening, &o.opening);
        set(&mut self.amplitude, &o.amplitude);
        set(&mut self.w0, &o.w0);
        set(&mut self.fps, &o.fps);
        set(&mut self.scale, &o.scale);
        if o.ratio.is_some() {
            self.ratio = o.ratio;
        }
        set(&mut self.supersample, &o.supersample);
        self.apply_floor_to_particles |= o.apply_floor_to_particles;
        self.frames_only |= o.frames_only;
        set(&mut self.particle_scale, &o.particle_scale);
        set(&mut self.shading, &o.shading);
        set(&mut self.label, &o.label);
        if o.label_font.is_some() {
            self.label_font = o.label_font.clone();
        }
        self.bitmap_labels |= o.bitmap_labels;
        self.downsample |= o.downsample;
        self.parallel |= o.parallel;
        if o.threads.is_some() {
            self.threads = o.threads;
        }
        set(&mut self.chunk_size, &o.chunk_size);
        self
    }

    /// Validated render configuration.
    ///
    /// Reads the label font file when one is set. Otherwise looks up a system sans-serif face
    /// unless `bitmap_labels` is set; without any system font the bitmap font is used.
    pub fn render_config(&self) -> SiloResult<RenderConfig> {
        let label_font = match &self.label_font {
            Some(path) => Some(LabelFont::load(path)?),
            None if self.bitmap_labels => None,
            None => {
                let found = LabelFont::system_sans();
                match &found {
                    Some(font) => tracing::info!(font = font.name(), "using system label font"),
                    None => tracing::warn!("no system font found, labels use the bitmap font"),
                }
                found
            }
        };
        let cfg = RenderConfig {
            silo_width: self.width,
            silo_height: self.height,
            opening: self.opening,
            amplitude: self.amplitude,
            angular_freq: self.w0,
            scale: self.scale,
            supersample: self.supersample,
            canvas_ratio: self.ratio,
            apply_floor_to_particles: self.apply_floor_to_particles,
            particle_scale: self.particle_scale,
            shading: self.shading,
            label: self.label,
            label_font,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn driver_opts(&self) -> SiloResult<DriverOpts> {
        Ok(DriverOpts {
            out_dir: self.outdir.clone(),
            fps: Fps::whole(self.fps)?,
            frames_only: self.frames_only,
            parallel: self.parallel,
            threads: self.threads,
            chunk_size: self.chunk_size,
            downsample: self.downsample,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
