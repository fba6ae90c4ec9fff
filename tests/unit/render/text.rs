use super::*;

#[test]
fn top_label_reports_flow_total() {
    let frame = Frame::new(0.1, 12);
    assert_eq!(
        format_top_label(&frame, LabelMode::FlowTotal),
        "t=0.100 s  flowtotal=12"
    );
    assert_eq!(
        format_top_label(&Frame::new(0.0, 0), LabelMode::FlowTotal),
        "t=0.000 s  flowtotal=0"
    );
    assert_eq!(
        format_top_label(&Frame::new(-0.0, 3), LabelMode::FlowTotal),
        "t=0.000 s  flowtotal=3"
    );
}

#[test]
fn top_label_reports_rate_or_na() {
    assert_eq!(
        format_top_label(&Frame::new(2.0, 5), LabelMode::FlowRate),
        "t=2.000 s  rate=2.500 /s"
    );
    assert_eq!(
        format_top_label(&Frame::new(0.0, 5), LabelMode::FlowRate),
        "t=0.000 s  rate=n/a"
    );
    assert_eq!(
        format_top_label(&Frame::new(1e-320, 5), LabelMode::FlowRate),
        "t=0.000 s  rate=n/a"
    );
}

#[test]
fn params_label_uses_shortest_numbers() {
    assert_eq!(format_params_label(0.02, 30.0), "A=0.02, w0=30");
    assert_eq!(format_params_label(0.0, 12.5), "A=0, w0=12.5");
}

#[test]
fn label_characters_have_glyphs() {
    let text = format!(
        "{} {} {}",
        format_top_label(&Frame::new(1.5, 7), LabelMode::FlowTotal),
        format_top_label(&Frame::new(0.0, 7), LabelMode::FlowRate),
        format_params_label(0.02, 30.0)
    );
    for ch in text.chars().filter(|c| *c != ' ') {
        assert!(glyph(ch).iter().any(|row| *row != 0), "missing glyph for {ch:?}");
    }
    assert_eq!(glyph('~'), [0; GLYPH_H]);
}

#[test]
fn glyph_rows_fit_five_columns() {
    for ch in (' '..='~').chain(['A', 'E', 'N']) {
        for row in glyph(ch) {
            assert_eq!(row & !0x1F, 0, "glyph {ch:?} overflows");
        }
    }
}

#[test]
fn cell_size_tracks_font_size() {
    assert_eq!(bitmap_cell_px(14.0), 2.0);
    assert_eq!(bitmap_cell_px(12.0), 1.0);
    assert_eq!(bitmap_cell_px(28.0), 4.0);
    assert_eq!(bitmap_cell_px(0.5), 1.0);
}

#[test]
fn text_width_counts_gaps_between_glyphs() {
    assert_eq!(bitmap_text_width("", 14.0), 0.0);
    assert_eq!(bitmap_text_width("1", 14.0), 10.0);
    assert_eq!(bitmap_text_width("12", 14.0), 22.0);
}

#[test]
fn glyph_rects_merge_row_runs() {
    // '-' is one full-width run in row 3.
    let rects = bitmap_glyph_rects("-", Point::new(10.0, 20.0), 14.0);
    assert_eq!(rects, vec![Rect::new(10.0, 26.0, 20.0, 28.0)]);

    // '=' has two runs; the second glyph is shifted by one advance.
    let rects = bitmap_glyph_rects(" =", Point::ZERO, 7.0);
    assert_eq!(rects.len(), 2);
    assert_eq!(rects[0], Rect::new(6.0, 2.0, 11.0, 3.0));
    assert_eq!(rects[1], Rect::new(6.0, 4.0, 11.0, 5.0));

    assert!(bitmap_glyph_rects("   ", Point::ZERO, 14.0).is_empty());
}

#[test]
fn glyph_rects_stay_inside_text_box() {
    let text = "t=0.125 s  flowtotal=99";
    let origin = Point::new(26.0, 6.0);
    let width = bitmap_text_width(text, 14.0);
    for r in bitmap_glyph_rects(text, origin, 14.0) {
        assert!(r.x0 >= origin.x && r.x1 <= origin.x + width);
        assert!(r.y0 >= origin.y && r.y1 <= origin.y + 14.0);
    }
}

#[test]
fn shaper_rejects_non_font_bytes() {
    let font = LabelFont::from_bytes("garbage", vec![0u8, 1, 2, 3, 4, 5, 6, 7]);
    assert!(LabelShaper::new(&font).is_err());
}
