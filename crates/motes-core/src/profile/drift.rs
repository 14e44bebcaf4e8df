use super::{random_range, random_rotation, random_vec3, Appearance, StepContext};
use crate::buffer::ParticleState;
use crate::palette::Palette;
use glam::Vec3;
use rand::Rng;

#[derive(Clone, Debug, PartialEq)]
pub struct DriftParams {
    pub spawn_min: Vec3,
    pub spawn_max: Vec3,
    pub respawn_min: Vec3,
    pub respawn_max: Vec3,
    pub velocity_min: Vec3,
    pub velocity_max: Vec3,
    pub life_rate: f32,
    pub initial_life: (f32, f32),
    pub life_max: f32,
    pub swirl: f32,
    pub swirl_rate: f32,
    pub spin: Vec3,
    pub breathe: f32,
    pub opacity: f32,
    pub scale: (f32, f32),
    pub palette: Palette,
}

impl Default for DriftParams {
    fn default() -> Self {
        Self {
            spawn_min: Vec3::new(-7.5, 2.0, -4.0),
            spawn_max: Vec3::new(7.5, 12.0, 4.0),
            respawn_min: Vec3::new(-1.0, -2.0, -1.0),
            respawn_max: Vec3::new(1.0, -2.0, 1.0),
            velocity_min: Vec3::new(-1.5, 0.6, -0.9),
            velocity_max: Vec3::new(1.5, 1.8, 0.9),
            life_rate: 0.5,
            initial_life: (0.0, 1.0),
            life_max: 10.0,
            swirl: 0.12,
            swirl_rate: 2.0,
            spin: Vec3::new(1.8, 1.2, 1.5),
            breathe: 0.3,
            opacity: 0.8,
            scale: (0.1, 0.4),
            palette: Palette::turmeric(),
        }
    }
}

pub(super) fn init<R: Rng + ?Sized>(p: &DriftParams, index: usize, rng: &mut R) -> ParticleState {
    ParticleState {
        position: random_vec3(rng, p.spawn_min, p.spawn_max),
        velocity: random_vec3(rng, p.velocity_min, p.velocity_max),
        rotation: random_rotation(rng),
        spin: p.spin,
        scale: random_range(rng, p.scale),
        color: p.palette.sample(rng),
        life: random_range(rng, p.initial_life),
        phase: index as f32,
        ..ParticleState::default()
    }
}

pub(super) fn step<R: Rng + ?Sized>(
    p: &DriftParams,
    s: &mut ParticleState,
    ctx: &StepContext,
    rng: &mut R,
) -> bool {
    let t = ctx.elapsed * p.swirl_rate + s.phase;
    s.life += ctx.dt * p.life_rate;
    let motion = Vec3::new(
        s.velocity.x + t.sin() * p.swirl,
        s.velocity.y * s.life.sin(),
        s.velocity.z + t.cos() * p.swirl,
    );
    s.position += motion * ctx.dt;
    s.rotation += s.spin * ctx.dt;

    if s.life > p.life_max {
        s.position = random_vec3(rng, p.respawn_min, p.respawn_max);
        s.life = 0.0;
        return true;
    }
    false
}

pub(super) fn appearance(p: &DriftParams, s: &ParticleState) -> Appearance {
    Appearance {
        offset: Vec3::ZERO,
        scale: s.scale * (1.0 + s.life.sin() * p.breathe),
        color: s.color,
        alpha: ((s.life * 0.5).sin() * p.opacity).max(0.0),
    }
}
