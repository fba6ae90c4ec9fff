use super::*;

#[test]
fn default_layout_fits_silo_plus_margins() {
    let layout = CanvasLayout::compute(&RenderConfig::default());
    assert_eq!((layout.width_px, layout.height_px), (440, 840));
    assert_eq!((layout.offset_x, layout.offset_y), (20.0, 20.0));
    assert_eq!(layout.eff_scale, 400.0);
}

#[test]
fn map_flips_y_axis() {
    let layout = CanvasLayout::compute(&RenderConfig::default());
    assert_eq!(layout.map(0.0, 0.0), Point::new(20.0, 820.0));
    assert_eq!(layout.map(1.0, 2.0), Point::new(420.0, 20.0));
    assert_eq!(layout.map(0.5, -0.1), Point::new(220.0, 860.0));
    assert_eq!(layout.silo_rect(), Rect::new(20.0, 20.0, 420.0, 820.0));
}

#[test]
fn wide_ratio_is_height_driven_and_centered() {
    let cfg = RenderConfig {
        canvas_ratio: Some(16.0 / 9.0),
        ..RenderConfig::default()
    };
    let layout = CanvasLayout::compute(&cfg);
    assert_eq!(layout.height_px, 840);
    assert_eq!(layout.width_px, 1493);
    assert_eq!(layout.offset_x, (1493.0 - 400.0) / 2.0);
    assert_eq!(layout.offset_y, 20.0);

    let rect = layout.silo_rect();
    let left = rect.x0;
    let right = f64::from(layout.width_px) - rect.x1;
    assert!((left - right).abs() < 1e-9);
}

#[test]
fn narrow_ratio_is_width_driven_and_centered() {
    let cfg = RenderConfig {
        canvas_ratio: Some(0.25),
        ..RenderConfig::default()
    };
    let layout = CanvasLayout::compute(&cfg);
    assert_eq!(layout.width_px, 440);
    assert_eq!(layout.height_px, 1760);
    assert_eq!(layout.offset_x, 20.0);
    assert_eq!(layout.offset_y, 480.0);
}

#[test]
fn supersample_scales_canvas_and_margin() {
    let cfg = RenderConfig {
        supersample: 2.0,
        scale: 100.0,
        ..RenderConfig::default()
    };
    let layout = CanvasLayout::compute(&cfg);
    assert_eq!(layout.eff_scale, 200.0);
    assert_eq!(layout.margin_px, 40.0);
    assert_eq!((layout.width_px, layout.height_px), (280, 480));
    assert_eq!(layout.map(0.0, 2.0), Point::new(40.0, 40.0));
}

#[test]
fn layout_is_bit_identical_across_calls() {
    let cfg = RenderConfig {
        silo_width: 0.37,
        silo_height: 1.13,
        scale: 333.3,
        supersample: 1.7,
        canvas_ratio: Some(1.41),
        ..RenderConfig::default()
    };
    let a = CanvasLayout::compute(&cfg);
    let b = CanvasLayout::compute(&cfg);
    assert_eq!(a, b);
    assert_eq!(a.offset_x.to_bits(), b.offset_x.to_bits());
    assert_eq!(a.offset_y.to_bits(), b.offset_y.to_bits());
}

#[test]
fn canvas_dimensions_are_at_least_one() {
    let cfg = RenderConfig {
        silo_width: 1e-9,
        silo_height: 1e-9,
        scale: 1e-9,
        supersample: 1e-3,
        ..RenderConfig::default()
    };
    let layout = CanvasLayout::compute(&cfg);
    assert!(layout.width_px >= 1);
    assert!(layout.height_px >= 1);
}

#[test]
fn silo_margins_are_symmetric() {
    for cfg in [
        RenderConfig::default(),
        RenderConfig {
            silo_width: 1.3,
            scale: 317.0,
            canvas_ratio: Some(0.9),
            supersample: 1.5,
            ..RenderConfig::default()
        },
    ] {
        let layout = CanvasLayout::compute(&cfg);
        let silo = layout.silo_rect();
        let left = silo.x0;
        let right = f64::from(layout.width_px) - silo.x1;
        let top = silo.y0;
        let bottom = f64::from(layout.height_px) - silo.y1;
        assert!((left - right).abs() < 1e-9, "{left} vs {right}");
        assert!((top - bottom).abs() < 1e-9, "{top} vs {bottom}");
        assert!(left >= layout.margin_px - 0.5 && top >= layout.margin_px - 0.5);
    }
}
