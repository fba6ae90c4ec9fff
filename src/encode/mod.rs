//! Output encoders.
//!
//! Frames are written as PNG files; the video is assembled afterwards from those files by an
//! external tool.

/// `ffmpeg`-based video assembly.
pub mod ffmpeg;
/// Per-frame image encoding.
pub mod png;
