use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{SiloError, SiloResult};
use crate::render::config::{LabelFont, LabelMode};
use crate::trace::model::Frame;

/// Horizontal label inset from the margin, in pixels at `supersample = 1`.
pub const LABEL_INSET_PX: f64 = 6.0;
/// Top label distance from the canvas top edge, at `supersample = 1`.
pub const LABEL_TOP_PX: f64 = 6.0;
/// Bottom label distance from the canvas bottom edge, at `supersample = 1`.
pub const LABEL_BOTTOM_PX: f64 = 20.0;

pub(crate) const GLYPH_W: usize = 5;
pub(crate) const GLYPH_H: usize = 7;

/// Time and flow annotation, e.g. `t=0.125 s  flowtotal=12`.
pub fn format_top_label(frame: &Frame, mode: LabelMode) -> String {
    // `+ 0.0` folds negative zero so `t=-0.000` never shows up.
    let t = frame.t + 0.0;
    match mode {
        LabelMode::FlowTotal => format!("t={t:.3} s  flowtotal={}", frame.flow_total),
        LabelMode::FlowRate => match frame.flow_rate() {
            Some(rate) => format!("t={t:.3} s  rate={:.3} /s", rate + 0.0),
            None => format!("t={t:.3} s  rate=n/a"),
        },
    }
}

/// Vibration parameter annotation, e.g. `A=0.02, w0=30`.
pub fn format_params_label(amplitude: f64, angular_freq: f64) -> String {
    format!("A={amplitude}, w0={angular_freq}")
}

/// Fallback 5x7 glyph rows, used when no label font is available.
///
/// The lower 5 bits of each row are pixels, bit 4 leftmost.
///
/// Characters outside the table render as blank cells.
pub(crate) const fn glyph(ch: char) -> [u8; GLYPH_H] {
    match ch {
        ' ' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '+' => [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00],
        '/' => [0x01, 0x02, 0x02, 0x04, 0x08, 0x08, 0x10],
        '=' => [0x00, 0x00, 0x1F, 0x00, 0x1F, 0x00, 0x00],
        '(' => [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02],
        ')' => [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x0E, 0x11, 0x01, 0x06, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'N' => [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
        'a' => [0x00, 0x00, 0x0E, 0x01, 0x0F, 0x11, 0x0F],
        'b' => [0x10, 0x10, 0x16, 0x19, 0x11, 0x11, 0x1E],
        'c' => [0x00, 0x00, 0x0E, 0x10, 0x10, 0x11, 0x0E],
        'd' => [0x01, 0x01, 0x0D, 0x13, 0x11, 0x11, 0x0F],
        'e' => [0x00, 0x00, 0x0E, 0x11, 0x1F, 0x10, 0x0E],
        'f' => [0x06, 0x09, 0x08, 0x1C, 0x08, 0x08, 0x08],
        'g' => [0x00, 0x00, 0x0F, 0x11, 0x0F, 0x01, 0x0E],
        'h' => [0x10, 0x10, 0x16, 0x19, 0x11, 0x11, 0x11],
        'i' => [0x04, 0x00, 0x0C, 0x04, 0x04, 0x04, 0x0E],
        'j' => [0x02, 0x00, 0x06, 0x02, 0x02, 0x12, 0x0C],
        'k' => [0x10, 0x10, 0x12, 0x14, 0x18, 0x14, 0x12],
        'l' => [0x0C, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'm' => [0x00, 0x00, 0x1A, 0x15, 0x15, 0x11, 0x11],
        'n' => [0x00, 0x00, 0x16, 0x19, 0x11, 0x11, 0x11],
        'o' => [0x00, 0x00, 0x0E, 0x11, 0x11, 0x11, 0x0E],
        'p' => [0x00, 0x00, 0x1E, 0x11, 0x1E, 0x10, 0x10],
        'q' => [0x00, 0x00, 0x0D, 0x13, 0x0F, 0x01, 0x01],
        'r' => [0x00, 0x00, 0x16, 0x19, 0x10, 0x10, 0x10],
        's' => [0x00, 0x00, 0x0E, 0x10, 0x0E, 0x01, 0x1E],
        't' => [0x08, 0x08, 0x1C, 0x08, 0x08, 0x09, 0x06],
        'u' => [0x00, 0x00, 0x11, 0x11, 0x11, 0x13, 0x0D],
        'v' => [0x00, 0x00, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'w' => [0x00, 0x00, 0x11, 0x11, 0x15, 0x15, 0x0A],
        'x' => [0x00, 0x00, 0x11, 0x0A, 0x04, 0x0A, 0x11],
        'y' => [0x00, 0x00, 0x11, 0x11, 0x0F, 0x01, 0x0E],
        'z' => [0x00, 0x00, 0x1F, 0x02, 0x04, 0x08, 0x1F],
        _ => [0x00; GLYPH_H],
    }
}

/// Side of one font pixel so that a glyph is about `font_size_px` tall.
pub(crate) fn bitmap_cell_px(font_size_px: f64) -> f64 {
    (font_size_px / GLYPH_H as f64).floor().max(1.0)
}

/// Width of `text` in the bitmap font, one blank column between glyphs.
pub fn bitmap_text_width(text: &str, font_size_px: f64) -> f64 {
    let cell = bitmap_cell_px(font_size_px);
    let n = text.chars().count();
    if n == 0 {
        return 0.0;
    }
    (n * (GLYPH_W + 1) - 1) as f64 * cell
}

/// Filled rectangles drawing `text` with its top-left corner at `origin`.
///
/// Runs of set pixels within a glyph row are merged into one rectangle.
pub(crate) fn bitmap_glyph_rects(text: &str, origin: Point, font_size_px: f64) -> Vec<Rect> {
    let cell = bitmap_cell_px(font_size_px);
    let advance = (GLYPH_W + 1) as f64 * cell;
    let mut out = Vec::new();

    for (i, ch) in text.chars().enumerate() {
        let gx = origin.x + i as f64 * advance;
        for (row, bits) in glyph(ch).iter().enumerate() {
            let y0 = origin.y + row as f64 * cell;
            let mut col = 0;
            while col < GLYPH_W {
                if bits & (1 << (GLYPH_W - 1 - col)) == 0 {
                    col += 1;
                    continue;
                }
                let start = col;
                while col < GLYPH_W && bits & (1 << (GLYPH_W - 1 - col)) != 0 {
                    col += 1;
                }
                out.push(Rect::new(
                    gx + start as f64 * cell,
                    y0,
                    gx + col as f64 * cell,
                    y0 + cell,
                ));
            }
        }
    }
    out
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct LabelBrush {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Shapes label text with Parley from a user-supplied or system font.
///
/// The font is registered once; each call only builds a layout.
pub(crate) struct LabelShaper {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<LabelBrush>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

impl LabelShaper {
    pub(crate) fn new(font: &LabelFont) -> SiloResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.bytes().to_vec()), None);
        let family_id = families
            .iter()
            .find(|(_, fonts)| fonts.iter().any(|f| f.index() == font.index()))
            .or_else(|| families.first())
            .map(|(id, _)| *id)
            .ok_or_else(|| {
                SiloError::validation(format!(
                    "no font families registered from label font '{}'",
                    font.name()
                ))
            })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| SiloError::validation("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font: vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(font.bytes().to_vec()),
                font.index(),
            ),
        })
    }

    pub(crate) fn font(&self) -> &vello_cpu::peniko::FontData {
        &self.font
    }

    /// Single-line layout of `text`; glyph positions are relative to the layout's top-left.
    pub(crate) fn layout(
        &mut self,
        text: &str,
        size_px: f32,
        brush: LabelBrush,
    ) -> SiloResult<parley::Layout<LabelBrush>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(SiloError::validation(
                "label size_px must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<LabelBrush> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
