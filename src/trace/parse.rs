use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::SiloResult;
use crate::trace::model::{Frame, Particle};

/// Number of comma-separated fields in a particle line: `x,y,vx,vy,r`.
pub const PARTICLE_FIELDS: usize = 5;

/// Why a trace line was skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// A non-header line appeared before any frame header.
    BeforeFirstHeader,
    /// A particle line had fewer than [`PARTICLE_FIELDS`] fields.
    TooFewFields {
        /// Number of fields found.
        found: usize,
    },
    /// A particle field was not a finite number.
    InvalidNumber {
        /// Zero-based field index (`0 = x` .. `4 = r`).
        field: usize,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeforeFirstHeader => write!(f, "not a frame header"),
            Self::TooFewFields { found } => write!(
                f,
                "expected {PARTICLE_FIELDS} comma-separated fields, found {found}"
            ),
            Self::InvalidNumber { field } => {
                write!(f, "field {} is not a finite number", field + 1)
            }
        }
    }
}

/// A line the parser dropped, with its 1-based line number in the input text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedLine {
    pub line_no: usize,
    pub reason: SkipReason,
    pub content: String,
}

/// Parsed frames plus every line that was skipped on the way.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParseReport {
    pub frames: Vec<Frame>,
    pub skipped: Vec<SkippedLine>,
}

impl ParseReport {
    /// Total particle count across all frames.
    pub fn particle_count(&self) -> usize {
        self.frames.iter().map(|f| f.particles.len()).sum()
    }
}

/// Parse trace text into frames, in file order.
///
/// Never fails: malformed lines are skipped with a warning. An empty result means the text had
/// no frame header.
pub fn parse_trace(text: &str) -> Vec<Frame> {
    parse_trace_report(text).frames
}

/// Like [`parse_trace`], also returning the skipped lines.
pub fn parse_trace_report(text: &str) -> ParseReport {
    let mut report = ParseReport::default();
    let mut current: Option<Frame> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let line_no = idx + 1;

        if let Some((t, flow_total)) = parse_header(line) {
            if let Some(done) = current.take() {
                report.frames.push(done);
            }
            current = Some(Frame::new(t, flow_total));
            continue;
        }

        let Some(frame) = current.as_mut() else {
            skip(&mut report, line_no, SkipReason::BeforeFirstHeader, line);
            continue;
        };

        match parse_particle(line) {
            Ok(p) => frame.particles.push(p),
            Err(reason) => skip(&mut report, line_no, reason, line),
        }
    }

    if let Some(done) = current.take() {
        report.frames.push(done);
    }
    report
}

/// Read and parse a trace file.
///
/// Invalid UTF-8 is replaced with U+FFFD, so the affected lines are skipped like any other
/// malformed line.
pub fn read_trace(path: &Path) -> SiloResult<ParseReport> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read trace '{}'", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    if let Cow::Owned(_) = text {
        tracing::warn!(path = %path.display(), "trace is not valid UTF-8, decoding lossily");
    }
    let report = parse_trace_report(&text);
    tracing::info!(
        path = %path.display(),
        frames = report.frames.len(),
        particles = report.particle_count(),
        skipped = report.skipped.len(),
        "parsed trace"
    );
    Ok(report)
}

fn skip(report: &mut ParseReport, line_no: usize, reason: SkipReason, line: &str) {
    tracing::warn!(line = line_no, "skipping trace line ({reason}): \"{line}\"");
    report.skipped.push(SkippedLine {
        line_no,
        reason,
        content: line.to_owned(),
    });
}

/// Match `<float> - <unsigned int>`.
///
/// Float: `[+-]?[0-9]*\.?[0-9]+([eE][+-]?[0-9]+)?`. Whitespace around the dash is optional.
/// Times that overflow to infinity and flow totals that overflow `u64` do not match.
pub(crate) fn parse_header(line: &str) -> Option<(f64, u64)> {
    let bytes = line.as_bytes();
    let mut i = 0usize;

    if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == frac_start {
            return None;
        }
    } else if int_digits == 0 {
        return None;
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return None;
        }
    }

    let t: f64 = line[..i].parse().ok()?;
    if !t.is_finite() {
        return None;
    }

    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if i >= bytes.len() || bytes[i] != b'-' {
        return None;
    }
    i += 1;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }

    let rest = &line[i..];
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let flow_total: u64 = rest.parse().ok()?;
    Some((t, flow_total))
}

/// Parse `x,y,vx,vy,r`. Fields past the fifth are ignored.
pub(crate) fn parse_particle(line: &str) -> Result<Particle, SkipReason> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() < PARTICLE_FIELDS {
        return Err(SkipReason::TooFewFields { found: parts.len() });
    }

    let mut v = [0.0f64; PARTICLE_FIELDS];
    for (field, (slot, s)) in v.iter_mut().zip(&parts).enumerate() {
        match s.parse::<f64>() {
            Ok(n) if n.is_finite() => *slot = n,
            _ => return Err(SkipReason::InvalidNumber { field }),
        }
    }

    let [x, y, vx, vy, r] = v;
    Ok(Particle { x, y, vx, vy, r })
}

#[cfg(test)]
#[path = "../../tests/unit/trace/parse.rs"]
mod tests;
