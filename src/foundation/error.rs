/// Convenience result type used across silo-anim.
pub type SiloResult<T> = Result<T, SiloError>;

/// Top-level error taxonomy for a rendering run.
///
/// Malformed trace lines are not errors; the parser skips them with a warning. Every variant
/// here is fatal for the run that produced it.
#[derive(thiserror::Error, Debug)]
pub enum SiloError {
    /// Invalid run or render configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// The trace contained no frame headers.
    #[error("no frames found in trace{}", source_hint(.0))]
    EmptyTrace(Option<String>),

    /// Rasterization failed (surface allocation, oversized canvas, font shaping).
    #[error("render error: {0}")]
    Render(String),

    /// Encoding or writing an output image failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// The external video assembler failed or exited with a non-zero status.
    #[error("video assembler failed ({status}): {stderr}")]
    Assembler {
        /// Exit status as reported by the process, or a spawn failure description.
        status: String,
        /// Captured diagnostic output (trimmed).
        stderr: String,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn source_hint(source: &Option<String>) -> String {
    match source {
        Some(s) => format!(" '{s}'"),
        None => String::new(),
    }
}

impl SiloError {
    /// Build a [`SiloError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SiloError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`SiloError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`SiloError::EmptyTrace`] value naming the trace source.
    pub fn empty_trace(source: Option<&str>) -> Self {
        Self::EmptyTrace(source.map(str::to_owned))
    }

    /// Build a [`SiloError::Assembler`] value.
    pub fn assembler(status: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::Assembler {
            status: status.into(),
            stderr: stderr.into(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
