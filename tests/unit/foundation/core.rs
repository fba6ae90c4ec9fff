use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert!(Fps::whole(30).is_ok());
}

#[test]
fn fps_ffmpeg_rate_prefers_integer_form() {
    assert_eq!(Fps::whole(30).unwrap().ffmpeg_rate(), "30");
    assert_eq!(Fps::new(30000, 1001).unwrap().ffmpeg_rate(), "30000/1001");
    assert!((Fps::new(60, 2).unwrap().as_f64() - 30.0).abs() < 1e-12);
}

#[test]
fn rgba_with_alpha_matches_css_rounding() {
    assert_eq!(Rgba8::with_alpha(30, 144, 255, 1.0).a, 255);
    assert_eq!(Rgba8::with_alpha(255, 0, 0, 0.45).a, 115);
    assert_eq!(Rgba8::with_alpha(0, 0, 0, 2.0).a, 255);
}

#[test]
fn premul_scales_color_channels() {
    let c = Rgba8::new(255, 0, 128, 128);
    assert_eq!(c.to_premul(), [128, 0, 64, 128]);
    assert_eq!(Rgba8::opaque(1, 2, 3).to_premul(), [1, 2, 3, 255]);
}

#[test]
fn lerp_hits_endpoints_and_midpoint() {
    let a = Rgba8::new(0, 0, 0, 0);
    let b = Rgba8::new(200, 100, 50, 255);
    assert_eq!(a.lerp(b, 0.0), a);
    assert_eq!(a.lerp(b, 1.0), b);
    assert_eq!(a.lerp(b, 0.5), Rgba8::new(100, 50, 25, 128));
    assert_eq!(a.lerp(b, 7.0), b);
}
