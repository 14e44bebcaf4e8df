//! Color tables for the particle motifs.
//!
//! A palette is sampled once per particle at seed/recycle time. Colors are
//! linear RGB triples in `[0, 1]`; intensity modulation happens later in the
//! publisher.

use crate::error::ConfigError;
use glam::Vec3;
use rand::Rng;
use smallvec::SmallVec;

/// One weighted entry in a palette. Each channel is drawn independently from
/// `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Swatch {
    pub weight: f32,
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Swatch {
    pub const fn new(weight: f32, min: [f32; 3], max: [f32; 3]) -> Self {
        Self { weight, min, max }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        Vec3::new(
            lerp(self.min[0], self.max[0], rng.gen()),
            lerp(self.min[1], self.max[1], rng.gen()),
            lerp(self.min[2], self.max[2], rng.gen()),
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Palette {
    /// Pick a swatch by weight, then jitter each channel inside it.
    Weighted(SmallVec<[Swatch; 5]>),
    /// `base * k + jitter` with one shared `k` drawn from `intensity`.
    Tint {
        base: Vec3,
        intensity: (f32, f32),
        jitter_min: Vec3,
        jitter_max: Vec3,
    },
    /// Base color's hue shifted by up to `±hue_jitter`, fixed saturation and
    /// lightness drawn from `lightness`.
    HueJitter {
        base: Vec3,
        hue_jitter: f32,
        saturation: f32,
        lightness: (f32, f32),
    },
}

impl Palette {
    pub fn weighted(swatches: &[Swatch]) -> Self {
        Palette::Weighted(swatches.iter().copied().collect())
    }

    pub fn tint(base: Vec3, min_intensity: f32, max_intensity: f32) -> Self {
        Palette::Tint {
            base,
            intensity: (min_intensity, max_intensity),
            jitter_min: Vec3::ZERO,
            jitter_max: Vec3::ZERO,
        }
    }

    pub fn rose_petals() -> Self {
        Palette::weighted(&[
            Swatch::new(0.4, [1.0, 0.7, 0.8], [1.0, 1.0, 1.0]), // pink
            Swatch::new(0.3, [0.8, 0.2, 0.3], [1.0, 0.5, 0.5]), // red
            Swatch::new(0.3, [0.9, 0.9, 0.9], [1.0, 1.0, 1.0]), // white
        ])
    }

    pub fn sacred_fire() -> Self {
        Palette::weighted(&[
            Swatch::new(0.3, [0.8, 0.1, 0.0], [1.0, 0.3, 0.0]), // deep red base
            Swatch::new(0.4, [1.0, 0.4, 0.0], [1.0, 0.8, 0.0]), // orange
            Swatch::new(0.3, [1.0, 0.8, 0.1], [1.0, 1.0, 0.4]), // yellow tips
        ])
    }

    pub fn confetti() -> Self {
        Palette::weighted(&[
            Swatch::new(0.2, [1.0, 0.8, 0.0], [1.0, 1.0, 0.0]), // gold
            Swatch::new(0.2, [1.0, 0.2, 0.8], [1.0, 0.6, 1.0]), // pink
            Swatch::new(0.2, [0.1, 0.5, 1.0], [0.4, 1.0, 1.0]), // blue
            Swatch::new(0.2, [0.1, 0.7, 0.2], [0.5, 1.0, 0.5]), // green
            Swatch::new(0.2, [0.6, 0.1, 0.8], [1.0, 0.4, 1.0]), // purple
        ])
    }

    pub fn musical_notes() -> Self {
        Palette::weighted(&[
            Swatch::new(0.25, [0.6, 0.2, 0.8], [1.0, 0.5, 1.0]), // purple
            Swatch::new(0.25, [0.1, 0.4, 0.9], [0.4, 0.8, 1.0]), // blue
            Swatch::new(0.25, [0.9, 0.3, 0.7], [1.0, 0.7, 1.0]), // pink
            Swatch::new(0.25, [0.9, 0.7, 0.1], [1.0, 1.0, 0.3]), // gold
        ])
    }

    pub fn golden_dust() -> Self {
        Palette::tint(Vec3::new(1.0, 0.8, 0.2), 0.8, 1.0)
    }

    pub fn turmeric() -> Self {
        Palette::Tint {
            base: Vec3::new(1.0, 0.8, 0.0),
            intensity: (0.7, 1.0),
            jitter_min: Vec3::new(0.0, 0.0, 0.1),
            jitter_max: Vec3::new(0.0, 0.0, 0.3),
        }
    }

    pub fn hue_jitter(base: Vec3) -> Self {
        Palette::HueJitter {
            base,
            hue_jitter: 0.1,
            saturation: 0.8,
            lightness: (0.5, 0.8),
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        match self {
            Palette::Weighted(swatches) => {
                let total: f32 = swatches.iter().map(|s| s.weight.max(0.0)).sum();
                if swatches.is_empty() || total <= 0.0 {
                    return Vec3::ONE;
                }
                let mut pick = rng.gen::<f32>() * total;
                for s in swatches.iter() {
                    pick -= s.weight.max(0.0);
                    if pick < 0.0 {
                        return s.sample(rng);
                    }
                }
                // float rounding can leave `pick` at exactly zero
                swatches[swatches.len() - 1].sample(rng)
            }
            Palette::Tint {
                base,
                intensity,
                jitter_min,
                jitter_max,
            } => {
                let k = lerp(intensity.0, intensity.1, rng.gen());
                let jitter = Vec3::new(
                    lerp(jitter_min.x, jitter_max.x, rng.gen()),
                    lerp(jitter_min.y, jitter_max.y, rng.gen()),
                    lerp(jitter_min.z, jitter_max.z, rng.gen()),
                );
                (*base * k + jitter).clamp(Vec3::ZERO, Vec3::ONE)
            }
            Palette::HueJitter {
                base,
                hue_jitter,
                saturation,
                lightness,
            } => {
                let (h, _, _) = rgb_to_hsl(*base);
                let hue = h + (rng.gen::<f32>() - 0.5) * 2.0 * hue_jitter;
                let l = lerp(lightness.0, lightness.1, rng.gen());
                hsl_to_rgb(hue, *saturation, l)
            }
        }
    }
}

/// Parse `#rgb` or `#rrggbb` (leading `#` optional) into linear `[0, 1]` RGB.
pub fn parse_hex_color(s: &str) -> Result<Vec3, ConfigError> {
    let hex = s.trim().trim_start_matches('#');
    let invalid = || ConfigError::InvalidColor(s.to_string());
    let expand = |c: char| -> Result<u8, ConfigError> {
        let v = c.to_digit(16).ok_or_else(invalid)? as u8;
        Ok(v * 17)
    };
    let rgb = match hex.len() {
        3 => {
            let mut it = hex.chars();
            let (r, g, b) = match (it.next(), it.next(), it.next()) {
                (Some(r), Some(g), Some(b)) => (r, g, b),
                _ => return Err(invalid()),
            };
            [expand(r)?, expand(g)?, expand(b)?]
        }
        6 if hex.is_ascii() => {
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
            [byte(0)?, byte(2)?, byte(4)?]
        }
        _ => return Err(invalid()),
    };
    Ok(Vec3::new(
        rgb[0] as f32 / 255.0,
        rgb[1] as f32 / 255.0,
        rgb[2] as f32 / 255.0,
    ))
}

/// Parse a color, falling back to `default` (and logging) when malformed.
pub fn color_or_default(s: &str, default: Vec3) -> Vec3 {
    match parse_hex_color(s) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("[config] {e}; using default color");
            default
        }
    }
}

/// Returns `(hue, saturation, lightness)`, each in `[0, 1]`.
pub fn rgb_to_hsl(rgb: Vec3) -> (f32, f32, f32) {
    let max = rgb.max_element();
    let min = rgb.min_element();
    let l = (max + min) * 0.5;
    if max == min {
        return (0.0, 0.0, l);
    }
    let d = max - min;
    let s = if l <= 0.5 {
        d / (max + min)
    } else {
        d / (2.0 - max - min)
    };
    let h = if max == rgb.x {
        (rgb.y - rgb.z) / d + if rgb.y < rgb.z { 6.0 } else { 0.0 }
    } else if max == rgb.y {
        (rgb.z - rgb.x) / d + 2.0
    } else {
        (rgb.x - rgb.y) / d + 4.0
    };
    (h / 6.0, s, l)
}

/// Hue wraps, saturation and lightness are clamped to `[0, 1]`.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Vec3 {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    if s == 0.0 {
        return Vec3::splat(l);
    }
    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Vec3::new(
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

#[inline]
pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
