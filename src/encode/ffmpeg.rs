use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::foundation::core::Fps;
use crate::foundation::error::{SiloError, SiloResult};

/// One video assembly request: a numbered image sequence on disk to a single video file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssembleJob {
    /// Directory holding the frame images.
    pub frames_dir: PathBuf,
    /// printf-style file pattern inside `frames_dir`, e.g. `frame%05d.png`.
    pub pattern: String,
    /// Output frame rate.
    pub fps: Fps,
    /// Output video path.
    pub out_path: PathBuf,
}

impl AssembleJob {
    /// Full input pattern path passed to the assembler.
    pub fn input_pattern(&self) -> PathBuf {
        self.frames_dir.join(&self.pattern)
    }
}

/// Turns an on-disk frame sequence into a video.
pub trait VideoAssembler: Send + Sync {
    fn assemble(&self, job: &AssembleJob) -> SiloResult<()>;
}

/// Options for [`FfmpegAssembler`] H.264 output.
#[derive(Clone, Debug)]
pub struct FfmpegAssemblerOpts {
    /// Executable name or path.
    pub program: OsString,
    /// x264 constant rate factor.
    pub crf: u8,
    /// x264 preset name.
    pub preset: String,
    /// Pad odd frame sizes to even dimensions (yuv420p requires them).
    pub pad_even: bool,
}

impl Default for FfmpegAssemblerOpts {
    fn default() -> Self {
        Self {
            program: OsString::from("ffmpeg"),
            crf: 18,
            preset: "slow".to_string(),
            pad_even: true,
        }
    }
}

/// Assembles frames by running the system `ffmpeg` (libx264, yuv420p).
#[derive(Clone, Debug, Default)]
pub struct FfmpegAssembler {
    opts: FfmpegAssemblerOpts,
}

impl FfmpegAssembler {
    pub fn new(opts: FfmpegAssemblerOpts) -> Self {
        Self { opts }
    }

    /// Arguments passed to the assembler process for `job`, in order.
    pub fn command_args(&self, job: &AssembleJob) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-y".into(),
            "-framerate".into(),
            job.fps.ffmpeg_rate().into(),
            "-i".into(),
            job.input_pattern().into_os_string(),
        ];
        if self.opts.pad_even {
            args.push("-vf".into());
            args.push("pad=ceil(iw/2)*2:ceil(ih/2)*2".into());
        }
        args.extend(
            [
                "-c:v".to_string(),
                "libx264".to_string(),
                "-crf".to_string(),
                self.opts.crf.to_string(),
                "-preset".to_string(),
                self.opts.preset.clone(),
                "-pix_fmt".to_string(),
                "yuv420p".to_string(),
            ]
            .map(OsString::from),
        );
        args.push(job.out_path.clone().into_os_string());
        args
    }

    fn is_available(&self) -> bool {
        Command::new(&self.opts.program)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

impl VideoAssembler for FfmpegAssembler {
    #[tracing::instrument(skip(self), fields(out = %job.out_path.display()))]
    fn assemble(&self, job: &AssembleJob) -> SiloResult<()> {
        if !self.is_available() {
            return Err(SiloError::encode(format!(
                "{} is required for video assembly, but was not found on PATH",
                self.opts.program.to_string_lossy()
            )));
        }
        ensure_parent_dir(&job.out_path)?;

        let args = self.command_args(job);
        tracing::debug!(?args, "running ffmpeg");
        let output = Command::new(&self.opts.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| SiloError::assembler("spawn failed", e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SiloError::assembler(
                output.status.to_string(),
                stderr.trim().to_string(),
            ));
        }
        tracing::info!(path = %job.out_path.display(), "video written");
        Ok(())
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> SiloResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    FfmpegAssembler::default().is_available()
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
