use super::{decay, random_range, random_vec3, Appearance, StepContext};
use crate::buffer::ParticleState;
use crate::constants::NOMINAL_TICK_RATE;
use crate::modulation::Modulation;
use crate::palette::{color_or_default, Palette};
use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

const DEFAULT_MOTE_COLOR: Vec3 = Vec3::new(1.0, 0.843, 0.0);

/// Direction of the pointer force inside the interaction radius.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerResponse {
    Attract,
    Repel,
}

impl PointerResponse {
    #[inline]
    fn sign(self) -> f32 {
        match self {
            PointerResponse::Attract => 1.0,
            PointerResponse::Repel => -1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpringParams {
    pub spawn_min: Vec3,
    pub spawn_max: Vec3,
    /// Initial speed range per axis, units per second.
    pub initial_speed: f32,
    /// Velocity gained per nominal frame per unit of displacement.
    pub stiffness: f32,
    /// Velocity kept per nominal frame.
    pub damping: f32,
    pub interaction_radius: f32,
    pub influence: f32,
    pub response: PointerResponse,
    /// Display-only vertical bob amplitude.
    pub bob: f32,
    /// Scale and brightness gain at the pointer, falling to zero at the radius.
    pub proximity_boost: f32,
    pub scale: (f32, f32),
    pub palette: Palette,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            spawn_min: Vec3::new(-10.0, -10.0, -5.0),
            spawn_max: Vec3::new(10.0, 10.0, 5.0),
            initial_speed: 0.6,
            stiffness: 0.02,
            damping: 0.95,
            interaction_radius: 3.0,
            influence: 2.0,
            response: PointerResponse::Attract,
            bob: 0.12,
            proximity_boost: 0.5,
            scale: (0.5, 1.0),
            palette: Palette::tint(DEFAULT_MOTE_COLOR, 0.8, 1.0),
        }
    }
}

impl SpringParams {
    pub fn with_color(color: &str) -> Self {
        Self {
            palette: Palette::tint(color_or_default(color, DEFAULT_MOTE_COLOR), 0.8, 1.0),
            ..Self::default()
        }
    }

    /// `(R - d) / R` inside the radius, zero outside.
    pub fn proximity(&self, position: Vec3, pointer: Vec3) -> f32 {
        let r = self.interaction_radius;
        let d = position.distance(pointer);
        if r > 0.0 && d < r {
            (r - d) / r
        } else {
            0.0
        }
    }
}

pub(super) fn init<R: Rng + ?Sized>(p: &SpringParams, rng: &mut R) -> ParticleState {
    let position = random_vec3(rng, p.spawn_min, p.spawn_max);
    ParticleState {
        position,
        anchor: Some(position),
        velocity: random_vec3(rng, Vec3::splat(-p.initial_speed), Vec3::splat(p.initial_speed)),
        scale: random_range(rng, p.scale),
        color: p.palette.sample(rng),
        phase: rng.gen::<f32>() * TAU,
        ..ParticleState::default()
    }
}

pub(super) fn step(
    p: &SpringParams,
    s: &mut ParticleState,
    ctx: &StepContext,
    modulation: &Modulation,
) -> bool {
    let ticks = ctx.ticks();
    let to_pointer = modulation.pointer - s.position;
    let distance = to_pointer.length();
    let r = p.interaction_radius;
    if distance < r && distance > f32::EPSILON {
        let force = (r - distance) / r;
        let push = to_pointer / distance * force * p.influence * 0.1 * p.response.sign();
        s.velocity += push * NOMINAL_TICK_RATE * ticks;
    }

    let anchor = s.anchor.unwrap_or(s.position);
    s.velocity += (anchor - s.position) * p.stiffness * NOMINAL_TICK_RATE * ticks;
    s.velocity *= decay(p.damping, ticks);
    s.position += s.velocity * ctx.dt;
    s.life += ctx.dt;
    false
}

pub(super) fn appearance(p: &SpringParams, s: &ParticleState, modulation: &Modulation) -> Appearance {
    let boost = 1.0 + p.proximity(s.position, modulation.pointer) * p.proximity_boost;
    Appearance {
        offset: Vec3::new(0.0, (s.life + s.phase).sin() * p.bob, 0.0),
        scale: s.scale * boost,
        color: s.color * boost,
        alpha: 1.0,
    }
}
