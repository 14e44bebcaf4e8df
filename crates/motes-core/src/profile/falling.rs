use super::{random_range, random_rotation, random_vec3, StepContext};
use crate::buffer::ParticleState;
use crate::palette::Palette;
use glam::Vec3;
use rand::Rng;

#[derive(Clone, Debug, PartialEq)]
pub struct FallingParams {
    pub spawn_min: Vec3,
    pub spawn_max: Vec3,
    pub velocity_min: Vec3,
    pub velocity_max: Vec3,
    /// Horizontal sway speed, units per second.
    pub wind: f32,
    pub spin: Vec3,
    /// Particles below this height respawn at `respawn_y`.
    pub floor: f32,
    pub respawn_y: f32,
    pub scale: (f32, f32),
    pub palette: Palette,
}

impl Default for FallingParams {
    fn default() -> Self {
        Self {
            spawn_min: Vec3::new(-10.0, 5.0, -5.0),
            spawn_max: Vec3::new(10.0, 20.0, 5.0),
            velocity_min: Vec3::new(-0.6, -0.9, -0.3),
            velocity_max: Vec3::new(0.6, -0.3, 0.3),
            wind: 0.06,
            spin: Vec3::new(1.2, 0.6, 0.9),
            floor: -5.0,
            respawn_y: 15.0,
            scale: (0.3, 0.8),
            palette: Palette::rose_petals(),
        }
    }
}

pub(super) fn init<R: Rng + ?Sized>(p: &FallingParams, index: usize, rng: &mut R) -> ParticleState {
    ParticleState {
        position: random_vec3(rng, p.spawn_min, p.spawn_max),
        velocity: random_vec3(rng, p.velocity_min, p.velocity_max),
        rotation: random_rotation(rng),
        spin: p.spin,
        scale: random_range(rng, p.scale),
        color: p.palette.sample(rng),
        phase: index as f32,
        ..ParticleState::default()
    }
}

pub(super) fn step<R: Rng + ?Sized>(
    p: &FallingParams,
    s: &mut ParticleState,
    ctx: &StepContext,
    rng: &mut R,
) -> bool {
    let t = ctx.elapsed + s.phase;
    let sway = Vec3::new(t.sin(), 0.0, t.cos()) * p.wind;
    s.position += (s.velocity + sway) * ctx.dt;
    s.rotation += s.spin * ctx.dt;
    s.life += ctx.dt;

    if s.position.y < p.floor {
        s.position.x = random_range(rng, (p.spawn_min.x, p.spawn_max.x));
        s.position.y = p.respawn_y;
        s.position.z = random_range(rng, (p.spawn_min.z, p.spawn_max.z));
        return true;
    }
    false
}
