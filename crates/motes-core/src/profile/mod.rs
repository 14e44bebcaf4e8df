//! Emission profiles: how each motif spawns, moves, recycles and looks.
//!
//! Every profile integrates with explicit Euler against real `dt`. Tuning that
//! was authored per frame is converted through [`NOMINAL_TICK_RATE`]: rates are
//! multiplied by it, per-frame decay factors are raised to `dt * NOMINAL_TICK_RATE`.
//!
//! `step` with `dt == 0` never changes a particle. Anything that depends on
//! wall-clock time alone (pulses, bobbing, audio displacement) lives in
//! [`EmissionProfile::appearance`] and is driven by the particle's own clock.

mod audio_reactive;
mod drift;
mod explosive;
mod falling;
mod rising;
mod spiral;
mod spring;

pub use audio_reactive::AudioReactiveParams;
pub use drift::DriftParams;
pub use explosive::ExplosiveParams;
pub use falling::FallingParams;
pub use rising::{RisingParams, Sway};
pub use spiral::SpiralParams;
pub use spring::{PointerResponse, SpringParams};

use crate::buffer::ParticleState;
use crate::constants::NOMINAL_TICK_RATE;
use crate::modulation::Modulation;
use crate::palette::lerp;
use glam::Vec3;
use rand::Rng;

/// Per-frame inputs shared by every particle of a simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepContext {
    pub dt: f32,
    pub elapsed: f32,
}

impl StepContext {
    pub fn new(dt: f32, elapsed: f32) -> Self {
        Self { dt, elapsed }
    }

    /// Elapsed nominal frames this step represents.
    #[inline]
    pub fn ticks(&self) -> f32 {
        self.dt * NOMINAL_TICK_RATE
    }
}

/// Render-side attributes derived from a particle after its step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Appearance {
    /// Added to the position for display only.
    pub offset: Vec3,
    pub scale: f32,
    pub color: Vec3,
    pub alpha: f32,
}

impl Appearance {
    pub fn plain(state: &ParticleState) -> Self {
        Self {
            offset: Vec3::ZERO,
            scale: state.scale,
            color: state.color,
            alpha: 1.0,
        }
    }
}

/// Spawn volume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Region {
    /// Uniform per axis.
    Box { min: Vec3, max: Vec3 },
    /// Random angle, radius uniform in `[0, radius]`, height in `[y_min, y_max]`.
    Disk { radius: f32, y_min: f32, y_max: f32 },
}

impl Region {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        match *self {
            Region::Box { min, max } => random_vec3(rng, min, max),
            Region::Disk {
                radius,
                y_min,
                y_max,
            } => {
                let r = rng.gen::<f32>() * radius;
                let angle = rng.gen::<f32>() * std::f32::consts::TAU;
                Vec3::new(
                    angle.cos() * r,
                    lerp(y_min, y_max, rng.gen()),
                    angle.sin() * r,
                )
            }
        }
    }
}

/// The closed set of motifs. Each variant carries its own typed parameters.
#[derive(Clone, Debug, PartialEq)]
pub enum EmissionProfile {
    /// Petals drifting down from above the viewport.
    Falling(FallingParams),
    /// Fire and musical notes rising from a base.
    Rising(RisingParams),
    /// Sacred dust circling a breathing mandala radius.
    Spiral(SpiralParams),
    /// Confetti bursting from a point source under gravity.
    Explosive(ExplosiveParams),
    /// Motes anchored to their spawn point that react to the pointer.
    SpringToOrigin(SpringParams),
    /// Spheres on a fixed spiral, displaced by the spectrum.
    AudioReactive(AudioReactiveParams),
    /// Turmeric powder swirling upward on a fade cycle.
    Drift(DriftParams),
}

impl EmissionProfile {
    pub fn rose_petals() -> Self {
        EmissionProfile::Falling(FallingParams::default())
    }

    pub fn sacred_fire() -> Self {
        EmissionProfile::Rising(RisingParams::sacred_fire())
    }

    pub fn musical_notes() -> Self {
        EmissionProfile::Rising(RisingParams::musical_notes())
    }

    pub fn golden_dust() -> Self {
        EmissionProfile::Spiral(SpiralParams::default())
    }

    pub fn confetti() -> Self {
        EmissionProfile::Explosive(ExplosiveParams::default())
    }

    pub fn golden_motes(color: &str) -> Self {
        EmissionProfile::SpringToOrigin(SpringParams::with_color(color))
    }

    pub fn audio_spheres(color: &str, reactivity_strength: f32) -> Self {
        EmissionProfile::AudioReactive(AudioReactiveParams::with_color(color, reactivity_strength))
    }

    pub fn turmeric() -> Self {
        EmissionProfile::Drift(DriftParams::default())
    }

    pub fn name(&self) -> &'static str {
        match self {
            EmissionProfile::Falling(_) => "falling",
            EmissionProfile::Rising(_) => "rising",
            EmissionProfile::Spiral(_) => "spiral",
            EmissionProfile::Explosive(_) => "explosive",
            EmissionProfile::SpringToOrigin(_) => "spring",
            EmissionProfile::AudioReactive(_) => "audio-reactive",
            EmissionProfile::Drift(_) => "drift",
        }
    }

    /// Whether particles keep their spawn position as an anchor.
    pub fn is_anchored(&self) -> bool {
        matches!(
            self,
            EmissionProfile::SpringToOrigin(_) | EmissionProfile::AudioReactive(_)
        )
    }

    /// Audio-driven profiles get a per-particle modulation; the rest see neutral.
    pub fn reacts_to_audio(&self) -> bool {
        match self {
            EmissionProfile::AudioReactive(_) => true,
            EmissionProfile::Rising(p) => p.rhythm,
            _ => false,
        }
    }

    /// Multiplier applied to the combined band reactivity.
    pub fn reactivity_strength(&self) -> f32 {
        match self {
            EmissionProfile::AudioReactive(p) => p.reactivity_strength,
            EmissionProfile::Rising(p) if p.rhythm => 1.0,
            _ => 0.0,
        }
    }

    pub fn init<R: Rng + ?Sized>(&self, index: usize, count: usize, rng: &mut R) -> ParticleState {
        match self {
            EmissionProfile::Falling(p) => falling::init(p, index, rng),
            EmissionProfile::Rising(p) => rising::init(p, index, rng),
            EmissionProfile::Spiral(p) => spiral::init(p, index, count, rng),
            EmissionProfile::Explosive(p) => explosive::init(p, rng),
            EmissionProfile::SpringToOrigin(p) => spring::init(p, rng),
            EmissionProfile::AudioReactive(p) => audio_reactive::init(p, index, count, rng),
            EmissionProfile::Drift(p) => drift::init(p, index, rng),
        }
    }

    /// Advance one particle by `ctx.dt`. Returns `true` when the particle was
    /// recycled during this step.
    pub fn step<R: Rng + ?Sized>(
        &self,
        state: &mut ParticleState,
        ctx: &StepContext,
        modulation: &Modulation,
        rng: &mut R,
    ) -> bool {
        match self {
            EmissionProfile::Falling(p) => falling::step(p, state, ctx, rng),
            EmissionProfile::Rising(p) => rising::step(p, state, ctx, modulation, rng),
            EmissionProfile::Spiral(p) => spiral::step(p, state, ctx, rng),
            EmissionProfile::Explosive(p) => explosive::step(p, state, ctx, rng),
            EmissionProfile::SpringToOrigin(p) => spring::step(p, state, ctx, modulation),
            EmissionProfile::AudioReactive(_) => audio_reactive::step(state, ctx),
            EmissionProfile::Drift(p) => drift::step(p, state, ctx, rng),
        }
    }

    pub fn appearance(&self, state: &ParticleState, modulation: &Modulation) -> Appearance {
        match self {
            EmissionProfile::Falling(_) | EmissionProfile::Explosive(_) => Appearance::plain(state),
            EmissionProfile::Rising(p) => rising::appearance(p, state, modulation),
            EmissionProfile::Spiral(p) => spiral::appearance(p, state),
            EmissionProfile::SpringToOrigin(p) => spring::appearance(p, state, modulation),
            EmissionProfile::AudioReactive(p) => audio_reactive::appearance(p, state, modulation),
            EmissionProfile::Drift(p) => drift::appearance(p, state),
        }
    }
}

#[inline]
pub(crate) fn random_range<R: Rng + ?Sized>(rng: &mut R, range: (f32, f32)) -> f32 {
    lerp(range.0, range.1, rng.gen())
}

#[inline]
pub(crate) fn random_vec3<R: Rng + ?Sized>(rng: &mut R, min: Vec3, max: Vec3) -> Vec3 {
    Vec3::new(
        lerp(min.x, max.x, rng.gen()),
        lerp(min.y, max.y, rng.gen()),
        lerp(min.z, max.z, rng.gen()),
    )
}

#[inline]
pub(crate) fn random_rotation<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    random_vec3(rng, Vec3::ZERO, Vec3::splat(std::f32::consts::TAU))
}

/// Per-frame decay factor applied over `ticks` nominal frames.
#[inline]
pub(crate) fn decay(factor_per_tick: f32, ticks: f32) -> f32 {
    factor_per_tick.powf(ticks)
}
