use super::{decay, random_range, random_rotation, random_vec3, StepContext};
use crate::buffer::ParticleState;
use crate::palette::Palette;
use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

#[derive(Clone, Debug, PartialEq)]
pub struct ExplosiveParams {
    pub source_min: Vec3,
    pub source_max: Vec3,
    pub respawn_min: Vec3,
    pub respawn_max: Vec3,
    /// Horizontal burst speed range, units per second.
    pub force: (f32, f32),
    pub initial_vertical: (f32, f32),
    pub respawn_vertical: (f32, f32),
    /// Units per second squared.
    pub gravity: f32,
    /// Horizontal velocity kept per nominal frame.
    pub drag: f32,
    pub floor: f32,
    /// Tumble rate range per axis, radians per second.
    pub spin: f32,
    pub scale: (f32, f32),
    pub palette: Palette,
}

impl Default for ExplosiveParams {
    fn default() -> Self {
        Self {
            source_min: Vec3::new(-2.0, 5.0, -2.0),
            source_max: Vec3::new(2.0, 13.0, 2.0),
            respawn_min: Vec3::new(-2.0, 8.0, -2.0),
            respawn_max: Vec3::new(2.0, 10.0, 2.0),
            force: (1.2, 6.0),
            initial_vertical: (-1.5, 1.5),
            respawn_vertical: (-0.6, 2.4),
            gravity: 7.2,
            drag: 0.998,
            floor: -5.0,
            spin: 6.0,
            scale: (0.1, 0.4),
            palette: Palette::confetti(),
        }
    }
}

fn burst<R: Rng + ?Sized>(p: &ExplosiveParams, vertical: (f32, f32), rng: &mut R) -> Vec3 {
    let force = random_range(rng, p.force);
    let angle = rng.gen::<f32>() * TAU;
    Vec3::new(
        angle.cos() * force,
        random_range(rng, vertical),
        angle.sin() * force,
    )
}

pub(super) fn init<R: Rng + ?Sized>(p: &ExplosiveParams, rng: &mut R) -> ParticleState {
    ParticleState {
        position: random_vec3(rng, p.source_min, p.source_max),
        velocity: burst(p, p.initial_vertical, rng),
        rotation: random_rotation(rng),
        spin: random_vec3(rng, Vec3::splat(-p.spin), Vec3::splat(p.spin)),
        scale: random_range(rng, p.scale),
        color: p.palette.sample(rng),
        ..ParticleState::default()
    }
}

pub(super) fn step<R: Rng + ?Sized>(
    p: &ExplosiveParams,
    s: &mut ParticleState,
    ctx: &StepContext,
    rng: &mut R,
) -> bool {
    s.velocity.y -= p.gravity * ctx.dt;
    s.position += s.velocity * ctx.dt;
    let keep = decay(p.drag, ctx.ticks());
    s.velocity.x *= keep;
    s.velocity.z *= keep;
    s.rotation += s.spin * ctx.dt;
    s.life += ctx.dt;

    if s.position.y < p.floor {
        s.position = random_vec3(rng, p.respawn_min, p.respawn_max);
        s.velocity = burst(p, p.respawn_vertical, rng);
        return true;
    }
    false
}
