use super::*;
use crate::render::config::LabelFont;
use crate::trace::model::Particle;

const WHITE: [u8; 4] = [255, 255, 255, 255];
const FLOOR_GRAY: [u8; 4] = [0x88, 0x88, 0x88, 255];
const WALL_GRAY: [u8; 4] = [0xcc, 0xcc, 0xcc, 255];

fn setup(config: RenderConfig) -> (FrameRenderer, CanvasLayout, RenderConfig) {
    let layout = CanvasLayout::compute(&config);
    let renderer = FrameRenderer::new(&config).unwrap();
    (renderer, layout, config)
}

fn particle(x: f64, y: f64, r: f64) -> Particle {
    Particle {
        x,
        y,
        vx: 0.0,
        vy: 0.0,
        r,
    }
}

fn px(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    frame.pixel(x, y).unwrap()
}

fn is_blue(p: [u8; 4]) -> bool {
    p[2] > p[0]
}

fn is_red(p: [u8; 4]) -> bool {
    p[0] > p[2]
}

#[test]
fn empty_frame_draws_walls_floor_and_labels() {
    let (mut r, layout, cfg) = setup(RenderConfig::default());
    let out = r.render(&Frame::new(0.0, 0), &layout, &cfg).unwrap();

    assert_eq!((out.width, out.height), (440, 840));
    assert_eq!(out.data.len(), 440 * 840 * 4);
    assert!(out.premultiplied);

    assert_eq!(px(&out, 14, 400), WALL_GRAY);
    assert_eq!(px(&out, 424, 400), WALL_GRAY);
    assert_eq!(px(&out, 434, 400), WHITE);
    assert_eq!(px(&out, 220, 400), WHITE);

    // Floor line at t = 0 is canvas y = 820, 6 px thick.
    assert_eq!(px(&out, 100, 822), FLOOR_GRAY);
    assert_eq!(px(&out, 340, 822), FLOOR_GRAY);
    assert_eq!(px(&out, 220, 822), WHITE);

    let label_strip_has_ink = (6..20)
        .flat_map(|y| (26..200).map(move |x| (x, y)))
        .any(|(x, y)| px(&out, x, y)[0] < 128);
    assert!(label_strip_has_ink);

    let bottom_strip_has_ink = (820..834)
        .flat_map(|y| (26..200).map(move |x| (x, y)))
        .any(|(x, y)| px(&out, x, y)[0] < 128);
    assert!(bottom_strip_has_ink);
}

#[test]
fn floor_follows_vibration() {
    let (mut r, layout, cfg) = setup(RenderConfig::default());
    // w0 * t = pi / 2, so the floor is raised by A = 0.02 (8 px).
    let t = std::f64::consts::PI / 60.0;
    let out = r.render(&Frame::new(t, 0), &layout, &cfg).unwrap();

    assert_eq!(px(&out, 100, 812), FLOOR_GRAY);
    assert_eq!(px(&out, 100, 822), WHITE);
    assert_eq!(px(&out, 220, 812), WHITE);
}

#[test]
fn particles_are_colored_by_floor_side() {
    for shading in [Shading::Flat, Shading::Radial] {
        let (mut r, layout, cfg) = setup(RenderConfig {
            shading,
            ..RenderConfig::default()
        });
        let mut frame = Frame::new(0.0, 0);
        frame.particles.push(particle(0.5, 0.5, 0.02));
        frame.particles.push(particle(0.5, -0.01, 0.02));
        let out = r.render(&frame, &layout, &cfg).unwrap();

        let above = px(&out, 220, 620);
        let below = px(&out, 220, 824);
        assert!(is_blue(above), "{shading:?} above: {above:?}");
        assert!(is_red(below), "{shading:?} below: {below:?}");
        assert_eq!(above[3], 255);
    }
}

#[test]
fn floor_offset_reclassifies_particles_when_applied() {
    let t = std::f64::consts::PI / 60.0;
    let mut frame = Frame::new(t, 0);
    frame.particles.push(particle(0.5, -0.01, 0.02));

    let (mut r, layout, cfg) = setup(RenderConfig {
        apply_floor_to_particles: true,
        ..RenderConfig::default()
    });
    let out = r.render(&frame, &layout, &cfg).unwrap();
    // Drawn at y = 0.01, 4 px above the rest floor line.
    assert!(is_blue(px(&out, 220, 816)));

    let (mut r, layout, cfg) = setup(RenderConfig::default());
    let out = r.render(&frame, &layout, &cfg).unwrap();
    assert!(is_red(px(&out, 220, 824)));
}

#[test]
fn particles_outside_the_silo_are_still_drawn() {
    let (mut r, layout, cfg) = setup(RenderConfig::default());
    let mut frame = Frame::new(0.0, 0);
    frame.particles.push(particle(-0.03, 0.5, 0.01));
    let out = r.render(&frame, &layout, &cfg).unwrap();
    assert!(is_blue(px(&out, 8, 620)));
}

#[test]
fn rendering_is_repeatable() {
    let (mut r, layout, cfg) = setup(RenderConfig::default());
    let mut frame = Frame::new(0.25, 4);
    for i in 0..20 {
        let f = f64::from(i);
        frame
            .particles
            .push(particle(0.05 + f * 0.045, 0.1 + f * 0.07, 0.01 + f * 0.001));
    }

    let a = r.render(&frame, &layout, &cfg).unwrap();
    let b = r.render(&frame, &layout, &cfg).unwrap();
    assert_eq!(a, b);

    let (mut fresh, _, _) = setup(RenderConfig::default());
    let c = fresh.render(&frame, &layout, &cfg).unwrap();
    assert_eq!(a, c);
}

#[test]
fn non_finite_particles_are_skipped() {
    let (mut r, layout, cfg) = setup(RenderConfig::default());
    let mut frame = Frame::new(0.0, 0);
    frame.particles.push(particle(f64::NAN, 0.5, 0.01));
    frame.particles.push(particle(0.5, f64::INFINITY, 0.01));
    let out = r.render(&frame, &layout, &cfg).unwrap();
    assert_eq!(px(&out, 220, 400), WHITE);
}

#[test]
fn oversized_canvas_is_a_render_error() {
    let (mut r, layout, cfg) = setup(RenderConfig {
        scale: 100_000.0,
        ..RenderConfig::default()
    });
    let err = r.render(&Frame::new(0.0, 0), &layout, &cfg).unwrap_err();
    assert!(matches!(err, SiloError::Render(_)));
}

#[test]
fn supersampling_scales_the_canvas() {
    let (mut r, layout, cfg) = setup(RenderConfig {
        supersample: 2.0,
        ..RenderConfig::default()
    });
    let out = r.render(&Frame::new(0.0, 0), &layout, &cfg).unwrap();
    assert_eq!((out.width, out.height), (880, 1680));
    // Floor line at 1640, 12 px thick.
    assert_eq!(px(&out, 120, 1644), FLOOR_GRAY);
}

#[test]
fn huge_particles_fall_back_to_solid_fill() {
    let (mut r, layout, cfg) = setup(RenderConfig::default());
    let mut frame = Frame::new(0.0, 0);
    // 400000 px radius covers the whole canvas.
    frame.particles.push(particle(0.5, 0.5, 1000.0));
    let out = r.render(&frame, &layout, &cfg).unwrap();

    let center = px(&out, 220, 400);
    assert!(is_blue(center), "{center:?}");
    assert_eq!(center[3], 255);
    assert_eq!(px(&out, 300, 100), center);
    assert!(r.gradient_cache.is_empty());

    // Tile side 4802 is over the cap as well.
    let mut frame = Frame::new(0.0, 0);
    frame.particles.push(particle(0.5, 0.5, 6.0));
    r.render(&frame, &layout, &cfg).unwrap();
    assert!(r.gradient_cache.is_empty());

    let mut frame = Frame::new(0.0, 0);
    frame.particles.push(particle(0.5, 0.5, 0.02));
    r.render(&frame, &layout, &cfg).unwrap();
    assert_eq!(r.gradient_cache.len(), 1);
}

#[test]
fn opening_gap_has_no_floor_pixels() {
    let (mut r, layout, cfg) = setup(RenderConfig {
        silo_width: 1.3,
        opening: 0.35,
        scale: 317.0,
        ..RenderConfig::default()
    });
    let out = r.render(&Frame::new(0.0, 0), &layout, &cfg).unwrap();

    let w = cfg.silo_width;
    let gap_lo = layout.map((w - cfg.opening) / 2.0, 0.0).x;
    let gap_hi = layout.map((w + cfg.opening) / 2.0, 0.0).x;
    let bar_hi = layout.map(w, 0.0).x;
    let y = layout.map(0.0, 0.0).y;
    let half = cfg.floor_thickness_px() / 2.0;

    let mut gap_pixels = 0;
    let mut bar_pixels = 0;
    for row in 0..out.height {
        let cy = f64::from(row) + 0.5;
        if cy <= y - half || cy >= y + half {
            continue;
        }
        // The roof outline also crosses the floor line.
        let under_roof = f64::from(row) + 1.0 > y - 0.5 && f64::from(row) < y + 0.5;
        for x in 0..out.width {
            let cx = f64::from(x) + 0.5;
            let p = px(&out, x, row);
            if cx > gap_lo && cx < gap_hi {
                assert_ne!(p, FLOOR_GRAY, "floor pixel in gap at ({x}, {row})");
                assert!(p[0] > 0x88, "dark pixel in gap at ({x}, {row}): {p:?}");
                gap_pixels += 1;
            }
            let full_row = f64::from(row) >= y - half && f64::from(row) + 1.0 <= y + half;
            let in_left_bar = x >= 120 && f64::from(x) + 1.0 <= gap_lo;
            let in_right_bar = f64::from(x) >= gap_hi && f64::from(x) + 1.0 <= bar_hi;
            if full_row && !under_roof && (in_left_bar || in_right_bar) {
                assert_eq!(p, FLOOR_GRAY, "missing floor at ({x}, {row})");
                bar_pixels += 1;
            }
        }
    }
    assert!(gap_pixels > 100);
    assert!(bar_pixels > 100);
}

#[test]
fn floor_row_follows_sine_law_over_time() {
    let (mut r, layout, cfg) = setup(RenderConfig::default());
    let rest_y = layout.map(0.0, 0.0).y;
    let half = cfg.floor_thickness_px() / 2.0;
    let pi = std::f64::consts::PI;

    for t in [0.0, 0.0123, pi / 180.0, 7.0 * pi / 180.0, pi / 20.0, 0.37] {
        let offset = cfg.floor_offset(t);
        let y = layout.map(0.0, offset).y;
        let expected = rest_y - cfg.amplitude * (cfg.angular_freq * t).sin() * layout.eff_scale;
        assert!((y - expected).abs() < 1e-9, "t={t}");

        let out = r.render(&Frame::new(t, 0), &layout, &cfg).unwrap();
        let mut covered = 0;
        for row in 800..840u32 {
            let (lo, hi) = (f64::from(row), f64::from(row) + 1.0);
            // Roof outline bottom edge.
            if hi > rest_y - 0.5 && lo < rest_y + 0.5 {
                continue;
            }
            let p = px(&out, 340, row);
            if lo >= y - half && hi <= y + half {
                assert_eq!(p, FLOOR_GRAY, "t={t} row={row}");
                covered += 1;
            } else if hi <= y - half || lo >= y + half {
                assert_eq!(p, WHITE, "t={t} row={row}");
            }
        }
        assert!(covered >= 3, "t={t}");
    }
}

#[test]
fn system_font_labels_are_shaped() {
    let Some(font) = LabelFont::system_sans() else {
        return;
    };
    let (mut shaped, layout, cfg) = setup(RenderConfig {
        label_font: Some(font),
        ..RenderConfig::default()
    });
    let frame = Frame::new(0.5, 7);
    let out = shaped.render(&frame, &layout, &cfg).unwrap();

    let top_has_ink = (0..40)
        .flat_map(|y| (20..420).map(move |x| (x, y)))
        .any(|(x, y)| px(&out, x, y)[0] < 128);
    assert!(top_has_ink);

    let (mut bitmap, _, bitmap_cfg) = setup(RenderConfig::default());
    let plain = bitmap.render(&frame, &layout, &bitmap_cfg).unwrap();
    assert_ne!(out, plain);
}
