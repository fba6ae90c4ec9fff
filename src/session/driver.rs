use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use rayon::prelude::*;

use crate::encode::ffmpeg::{AssembleJob, FfmpegAssembler, VideoAssembler};
use crate::encode::png::{ImageEncoder, PngFrameEncoder};
use crate::foundation::core::Fps;
use crate::foundation::error::{SiloError, SiloResult};
use crate::render::config::RenderConfig;
use crate::render::cpu::FrameRenderer;
use crate::render::layout::CanvasLayout;
use crate::trace::model::Frame;
use crate::trace::parse::{ParseReport, read_trace};

/// printf-style pattern of frame file names, as handed to the video assembler.
pub const FRAME_PATTERN: &str = "frame%05d.png";
/// File name of the assembled video inside the output directory.
pub const VIDEO_FILE_NAME: &str = "silo_animation.mp4";

/// File name of the frame at 1-based position `index` in the trace.
pub fn frame_file_name(index: usize) -> String {
    format!("frame{index:05}.png")
}

/// Options controlling a [`SequenceDriver`] run.
#[derive(Clone, Debug)]
pub struct DriverOpts {
    /// Directory receiving frame images and the video.
    pub out_dir: PathBuf,
    /// Video frame rate.
    pub fps: Fps,
    /// Write frames only; skip video assembly.
    pub frames_only: bool,
    /// Render chunks of frames on a dedicated rayon pool.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Frames rendered per chunk before their files are written.
    pub chunk_size: usize,
    /// Resample supersampled frames back to nominal resolution before encoding.
    pub downsample: bool,
}

impl Default for DriverOpts {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("out"),
            fps: Fps { num: 30, den: 1 },
            frames_only: false,
            parallel: false,
            threads: None,
            chunk_size: 64,
            downsample: false,
        }
    }
}

/// Run statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RenderStats {
    /// Frames found in the trace.
    pub frames_parsed: u64,
    /// Frame images written to disk.
    pub frames_written: u64,
    /// Trace lines skipped by the parser.
    pub lines_skipped: u64,
    /// Whether the video was assembled.
    pub video_written: bool,
}

/// Orchestrates a full run: trace, layout, per-frame render and encode, then video assembly.
pub struct SequenceDriver {
    config: RenderConfig,
    opts: DriverOpts,
    assembler: Arc<dyn VideoAssembler>,
}

impl SequenceDriver {
    /// Validate `config` and build a driver that assembles video with the system `ffmpeg`.
    pub fn new(config: RenderConfig, opts: DriverOpts) -> SiloResult<Self> {
        config.validate()?;
        if opts.threads == Some(0) {
            return Err(SiloError::validation("threads must be >= 1 when set"));
        }
        Ok(Self {
            config,
            opts,
            assembler: Arc::new(FfmpegAssembler::default()),
        })
    }

    /// Replace the video assembler.
    pub fn with_assembler(mut self, assembler: impl VideoAssembler + 'static) -> Self {
        self.assembler = Arc::new(assembler);
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn opts(&self) -> &DriverOpts {
        &self.opts
    }

    /// Path of frame `index` (1-based) inside the output directory.
    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.opts.out_dir.join(frame_file_name(index))
    }

    pub fn video_path(&self) -> PathBuf {
        self.opts.out_dir.join(VIDEO_FILE_NAME)
    }

    /// Read and parse `trace`, then run.
    #[tracing::instrument(skip(self), fields(out_dir = %self.opts.out_dir.display()))]
    pub fn run_file(&self, trace: &Path) -> SiloResult<RenderStats> {
        let report = read_trace(trace)?;
        if report.frames.is_empty() {
            return Err(SiloError::empty_trace(Some(&trace.display().to_string())));
        }
        self.run_report(&report)
    }

    /// Run on an already parsed trace.
    pub fn run_report(&self, report: &ParseReport) -> SiloResult<RenderStats> {
        let mut stats = self.run_frames(&report.frames)?;
        stats.lines_skipped = report.skipped.len() as u64;
        Ok(stats)
    }

    /// Render, encode and write every frame in order, then assemble the video unless
    /// `frames_only` is set.
    #[tracing::instrument(skip_all, fields(frames = frames.len()))]
    pub fn run_frames(&self, frames: &[Frame]) -> SiloResult<RenderStats> {
        if frames.is_empty() {
            return Err(SiloError::empty_trace(None));
        }

        let layout = CanvasLayout::compute(&self.config);
        tracing::debug!(?layout, "canvas layout");
        let encoder = self.encoder_for(&layout);

        std::fs::create_dir_all(&self.opts.out_dir).with_context(|| {
            format!(
                "failed to create output directory '{}'",
                self.opts.out_dir.display()
            )
        })?;

        let mut stats = RenderStats {
            frames_parsed: frames.len() as u64,
            ..RenderStats::default()
        };

        let chunk_size = normalized_chunk_size(self.opts.chunk_size);
        let pool = if self.opts.parallel {
            Some(build_thread_pool(self.opts.threads)?)
        } else {
            None
        };
        // Also surfaces label font errors before any worker starts.
        let mut renderer = FrameRenderer::new(&self.config)?;

        for (chunk_i, chunk) in frames.chunks(chunk_size).enumerate() {
            let base = chunk_i * chunk_size;
            let encoded = match pool.as_ref() {
                Some(pool) => self.encode_chunk_parallel(pool, chunk, &layout, &encoder),
                None => chunk
                    .iter()
                    .map(|frame| {
                        let rgba = renderer.render(frame, &layout, &self.config)?;
                        encoder.encode(&rgba)
                    })
                    .collect::<SiloResult<Vec<_>>>(),
            }?;

            for (i, bytes) in encoded.into_iter().enumerate() {
                let path = self.frame_path(base + i + 1);
                std::fs::write(&path, bytes)
                    .with_context(|| format!("failed to write frame '{}'", path.display()))?;
                stats.frames_written += 1;
            }
            tracing::debug!(written = stats.frames_written, "chunk written");
        }
        tracing::info!(
            frames = stats.frames_written,
            out_dir = %self.opts.out_dir.display(),
            "frames written"
        );

        if self.opts.frames_only {
            tracing::info!("frames only, skipping video assembly");
        } else {
            let job = AssembleJob {
                frames_dir: self.opts.out_dir.clone(),
                pattern: FRAME_PATTERN.to_string(),
                fps: self.opts.fps,
                out_path: self.video_path(),
            };
            self.assembler.assemble(&job)?;
            stats.video_written = true;
        }
        Ok(stats)
    }

    fn encoder_for(&self, layout: &CanvasLayout) -> PngFrameEncoder {
        let encoder = PngFrameEncoder::new();
        let ss = self.config.supersample;
        if !self.opts.downsample || ss == 1.0 {
            return encoder;
        }
        let w = (f64::from(layout.width_px) / ss).round().max(1.0) as u32;
        let h = (f64::from(layout.height_px) / ss).round().max(1.0) as u32;
        encoder.with_resize(w, h)
    }

    fn encode_chunk_parallel(
        &self,
        pool: &rayon::ThreadPool,
        chunk: &[Frame],
        layout: &CanvasLayout,
        encoder: &PngFrameEncoder,
    ) -> SiloResult<Vec<Vec<u8>>> {
        let config = &self.config;
        pool.install(|| {
            chunk
                .par_iter()
                .map_init(
                    || FrameRenderer::new(config).map_err(|e| e.to_string()),
                    |renderer, frame| -> SiloResult<Vec<u8>> {
                        let renderer = renderer.as_mut().map_err(|e| SiloError::render(e.clone()))?;
                        let rgba = renderer.render(frame, layout, config)?;
                        encoder.encode(&rgba)
                    },
                )
                .collect::<SiloResult<Vec<_>>>()
        })
    }
}

fn normalized_chunk_size(chunk_size: usize) -> usize {
    chunk_size.max(1)
}

fn build_thread_pool(threads: Option<usize>) -> SiloResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(SiloError::validation("'threads' must be >= 1 when set"));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| SiloError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/session/driver.rs"]
mod tests;
