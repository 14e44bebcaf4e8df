// Host-side tests for palettes and color parsing.

use glam::Vec3;
use motes_core::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn close(a: Vec3, b: Vec3) -> bool {
    a.distance(b) < 1e-3
}

#[test]
fn hex_colors_parse_in_both_lengths() {
    assert!(close(parse_hex_color("#ffd700").unwrap(), Vec3::new(1.0, 0.843, 0.0)));
    assert!(close(parse_hex_color("f00").unwrap(), Vec3::new(1.0, 0.0, 0.0)));
    assert!(close(parse_hex_color(" #FFFFFF ").unwrap(), Vec3::ONE));
}

#[test]
fn malformed_colors_are_errors_and_fall_back() {
    for bad in ["", "#12", "#ggg", "#12345", "#1234567", "rose", "#ffé00"] {
        assert!(
            matches!(parse_hex_color(bad), Err(ConfigError::InvalidColor(_))),
            "{bad:?} parsed"
        );
    }
    let fallback = Vec3::new(0.1, 0.2, 0.3);
    assert_eq!(color_or_default("not-a-color", fallback), fallback);
}

#[test]
fn hsl_round_trips_primary_colors() {
    for rgb in [
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.2, 0.4, 0.8),
        Vec3::new(1.0, 0.7, 0.28),
    ] {
        let (h, s, l) = rgb_to_hsl(rgb);
        assert!(close(hsl_to_rgb(h, s, l), rgb), "{rgb:?}");
    }
    assert_eq!(rgb_to_hsl(Vec3::splat(0.5)), (0.0, 0.0, 0.5));
}

#[test]
fn palettes_sample_inside_the_unit_cube() {
    let mut rng = StdRng::seed_from_u64(17);
    let palettes = [
        Palette::rose_petals(),
        Palette::sacred_fire(),
        Palette::confetti(),
        Palette::musical_notes(),
        Palette::golden_dust(),
        Palette::turmeric(),
        Palette::hue_jitter(Vec3::new(1.0, 0.7, 0.28)),
    ];
    for palette in &palettes {
        for _ in 0..500 {
            let c = palette.sample(&mut rng);
            let inside = c.cmpge(Vec3::splat(-1e-6)).all() && c.cmple(Vec3::splat(1.0 + 1e-6)).all();
            assert!(inside, "{c:?}");
        }
    }
}

#[test]
fn weighted_palette_honors_zero_weights() {
    let palette = Palette::weighted(&[
        Swatch::new(0.0, [1.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
        Swatch::new(1.0, [0.0, 0.0, 1.0], [0.0, 0.0, 1.0]),
    ]);
    let mut rng = StdRng::seed_from_u64(2);
    for _ in 0..200 {
        assert_eq!(palette.sample(&mut rng), Vec3::new(0.0, 0.0, 1.0));
    }
    assert_eq!(Palette::weighted(&[]).sample(&mut rng), Vec3::ONE);
}
