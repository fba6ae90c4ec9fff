//! silo-anim renders granular-silo simulation traces into PNG frames and an MP4 video.
//!
//! The pipeline runs one way:
//!
//! - Parse the trace text into [`Frame`]s ([`parse_trace`], [`read_trace`])
//! - Compute the [`CanvasLayout`] once from a [`RenderConfig`]
//! - Draw each frame with a [`FrameRenderer`] (walls, vibrating floor, particles, labels)
//! - Let a [`SequenceDriver`] write `frame00001.png ...` and hand them to a [`VideoAssembler`]
#![forbid(unsafe_code)]

mod foundation;

/// Frame image encoding and video assembly.
pub mod encode;
/// Canvas layout and CPU rasterization.
pub mod render;
/// Run configuration and orchestration.
pub mod session;
/// Trace model and parser.
pub mod trace;

pub use crate::foundation::core::{Fps, Point, Rect, Rgba8};
pub use crate::foundation::error::{SiloError, SiloResult};

pub use crate::encode::ffmpeg::{
    AssembleJob, FfmpegAssembler, FfmpegAssemblerOpts, VideoAssembler, is_ffmpeg_on_path,
};
pub use crate::encode::png::{ImageEncoder, PngFrameEncoder};
pub use crate::render::backend::FrameRGBA;
pub use crate::render::config::{LabelFont, LabelMode, RenderConfig, Shading};
pub use crate::render::cpu::FrameRenderer;
pub use crate::render::layout::CanvasLayout;
pub use crate::session::config::{RunConfig, RunOverrides};
pub use crate::session::driver::{
    DriverOpts, RenderStats, SequenceDriver, VIDEO_FILE_NAME, frame_file_name,
};
pub use crate::trace::model::{Frame, Particle};
pub use crate::trace::parse::{
    ParseReport, SkipReason, SkippedLine, parse_trace, parse_trace_report, read_trace,
};
