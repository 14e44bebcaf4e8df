use super::{random_range, Appearance, StepContext};
use crate::buffer::ParticleState;
use crate::constants::DEFAULT_REACTIVITY_STRENGTH;
use crate::modulation::Modulation;
use crate::palette::{color_or_default, Palette};
use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

const DEFAULT_SPHERE_COLOR: Vec3 = Vec3::new(1.0, 0.843, 0.0);

#[derive(Clone, Debug, PartialEq)]
pub struct AudioReactiveParams {
    /// Full turns of the layout spiral across all indices.
    pub turns: f32,
    pub inner_radius: f32,
    pub radius_span: f32,
    pub height_amplitude: f32,
    pub drift: f32,
    pub float_amplitude: f32,
    pub float_rate: f32,
    pub jitter_rate: f32,
    pub reactivity_strength: f32,
    pub scale: (f32, f32),
    pub palette: Palette,
}

impl Default for AudioReactiveParams {
    fn default() -> Self {
        Self {
            turns: 2.0,
            inner_radius: 2.0,
            radius_span: 6.0,
            height_amplitude: 2.0,
            drift: 0.1,
            float_amplitude: 0.3,
            float_rate: 0.5,
            jitter_rate: 10.0,
            reactivity_strength: DEFAULT_REACTIVITY_STRENGTH,
            scale: (0.2, 0.5),
            palette: Palette::hue_jitter(DEFAULT_SPHERE_COLOR),
        }
    }
}

impl AudioReactiveParams {
    pub fn with_color(color: &str, reactivity_strength: f32) -> Self {
        Self {
            reactivity_strength,
            palette: Palette::hue_jitter(color_or_default(color, DEFAULT_SPHERE_COLOR)),
            ..Self::default()
        }
    }
}

pub(super) fn init<R: Rng + ?Sized>(
    p: &AudioReactiveParams,
    index: usize,
    count: usize,
    rng: &mut R,
) -> ParticleState {
    let progress = index as f32 / count.max(1) as f32;
    let angle = progress * p.turns * TAU;
    let radius = p.inner_radius + progress * p.radius_span;
    let position = Vec3::new(
        angle.cos() * radius,
        angle.sin() * p.height_amplitude,
        angle.sin() * radius,
    );
    ParticleState {
        position,
        anchor: Some(position),
        scale: random_range(rng, p.scale),
        binding: rng.gen(),
        color: p.palette.sample(rng),
        phase: index as f32,
        ..ParticleState::default()
    }
}

/// Anchored: only the particle's clock advances.
pub(super) fn step(s: &mut ParticleState, ctx: &StepContext) -> bool {
    s.life += ctx.dt;
    false
}

pub(super) fn appearance(
    p: &AudioReactiveParams,
    s: &ParticleState,
    modulation: &Modulation,
) -> Appearance {
    let t = s.life;
    let float_y = (t * p.float_rate + s.phase * 0.1).sin() * p.float_amplitude;
    let audio_y = modulation.displacement * (t * p.jitter_rate + s.phase).sin();
    Appearance {
        offset: Vec3::new(
            (t + s.phase).sin() * p.drift,
            float_y + audio_y,
            (t + s.phase).cos() * p.drift,
        ),
        scale: s.scale * modulation.scale_factor,
        color: s.color * modulation.color_intensity,
        alpha: 1.0,
    }
}
