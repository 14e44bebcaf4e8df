use super::{random_range, random_rotation, Appearance, StepContext};
use crate::buffer::ParticleState;
use crate::palette::Palette;
use glam::Vec3;
use rand::Rng;
use std::f32::consts::{PI, TAU};

/// Angle between consecutive indices of the spawn spiral.
const GOLDEN_ANGLE: f32 = PI * (3.0 - 2.236_068);

#[derive(Clone, Debug, PartialEq)]
pub struct SpiralParams {
    /// Spawn radius grows with the index across this range.
    pub radius: (f32, f32),
    pub height: (f32, f32),
    pub tangential_speed: f32,
    pub vertical_speed: f32,
    /// Horizontal swirl speed and its angular rate.
    pub swirl: f32,
    pub swirl_rate: f32,
    /// Vertical bob speed and its angular rate.
    pub bob: f32,
    pub bob_rate: f32,
    /// Mandala radius the centering force pulls toward: `base + sin(t + phase)·amplitude`.
    pub target_radius: f32,
    pub target_amplitude: f32,
    /// Fraction of the radial error corrected per second.
    pub pull: f32,
    /// Recycle beyond this radius.
    pub max_radius: f32,
    pub respawn_radius: (f32, f32),
    pub spin: Vec3,
    pub spin_wobble: Vec3,
    pub pulse: f32,
    pub pulse_rate: f32,
    pub glow: f32,
    pub glow_rate: f32,
    pub scale: (f32, f32),
    pub palette: Palette,
}

impl Default for SpiralParams {
    fn default() -> Self {
        Self {
            radius: (3.0, 15.0),
            height: (2.0, 12.0),
            tangential_speed: 0.6,
            vertical_speed: 0.15,
            swirl: 0.12,
            swirl_rate: 0.5,
            bob: 0.06,
            bob_rate: 2.0,
            target_radius: 8.0,
            target_amplitude: 2.0,
            pull: 0.06,
            max_radius: 20.0,
            respawn_radius: (3.0, 11.0),
            spin: Vec3::new(1.2, 0.9, 1.5),
            spin_wobble: Vec3::new(0.6, 0.6, 0.3),
            pulse: 0.3,
            pulse_rate: 3.0,
            glow: 0.2,
            glow_rate: 2.0,
            scale: (0.05, 0.25),
            palette: Palette::golden_dust(),
        }
    }
}

pub(super) fn init<R: Rng + ?Sized>(
    p: &SpiralParams,
    index: usize,
    count: usize,
    rng: &mut R,
) -> ParticleState {
    let progress = (index as f32 + 0.5) / count.max(1) as f32;
    let radius = p.radius.0 + (p.radius.1 - p.radius.0) * progress;
    let angle = index as f32 * GOLDEN_ANGLE;
    let tangent = angle + PI / 2.0;
    ParticleState {
        position: Vec3::new(
            angle.cos() * radius,
            random_range(rng, p.height),
            angle.sin() * radius,
        ),
        velocity: Vec3::new(
            tangent.cos() * p.tangential_speed,
            (rng.gen::<f32>() - 0.5) * 2.0 * p.vertical_speed,
            tangent.sin() * p.tangential_speed,
        ),
        rotation: random_rotation(rng),
        spin: p.spin,
        scale: random_range(rng, p.scale),
        color: p.palette.sample(rng),
        phase: rng.gen::<f32>() * TAU,
        ..ParticleState::default()
    }
}

pub(super) fn step<R: Rng + ?Sized>(
    p: &SpiralParams,
    s: &mut ParticleState,
    ctx: &StepContext,
    rng: &mut R,
) -> bool {
    let t = ctx.elapsed;
    let dt = ctx.dt;
    let swirl = Vec3::new(
        (t * p.swirl_rate + s.phase).sin() * p.swirl,
        (t * p.bob_rate + s.phase).sin() * p.bob,
        (t * p.swirl_rate + s.phase).cos() * p.swirl,
    );
    s.position += (s.velocity + swirl) * dt;

    let radius = (s.position.x * s.position.x + s.position.z * s.position.z).sqrt();
    if radius > 0.0 {
        let target = p.target_radius + (t + s.phase).sin() * p.target_amplitude;
        let push = (target - radius) * p.pull * dt;
        s.position.x += s.position.x / radius * push;
        s.position.z += s.position.z / radius * push;
    }

    let wobble = Vec3::new(
        (t + s.phase).sin(),
        (t + s.phase).cos(),
        (t * 2.0 + s.phase).sin(),
    ) * p.spin_wobble;
    s.rotation += (s.spin + wobble) * dt;
    s.life += dt;

    if radius > p.max_radius {
        let r = random_range(rng, p.respawn_radius);
        let angle = rng.gen::<f32>() * TAU;
        s.position = Vec3::new(angle.cos() * r, random_range(rng, p.height), angle.sin() * r);
        return true;
    }
    false
}

pub(super) fn appearance(p: &SpiralParams, s: &ParticleState) -> Appearance {
    let pulse = 1.0 + (s.life * p.pulse_rate + s.phase).sin() * p.pulse;
    let glow = (1.0 - p.glow) + (s.life * p.glow_rate + s.phase).sin() * p.glow;
    Appearance {
        offset: Vec3::ZERO,
        scale: s.scale * pulse,
        color: s.color * glow,
        alpha: 1.0,
    }
}
