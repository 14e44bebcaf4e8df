use super::{random_range, random_rotation, random_vec3, Appearance, Region, StepContext};
use crate::buffer::ParticleState;
use crate::modulation::Modulation;
use crate::palette::Palette;
use glam::Vec3;
use rand::Rng;
use std::f32::consts::PI;

/// Lateral oscillation added to the velocity: `x = sin(fx·t + phase)·ax`,
/// `z = cos(fz·t + phase)·az`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sway {
    pub amplitude_x: f32,
    pub amplitude_z: f32,
    pub frequency_x: f32,
    pub frequency_z: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RisingParams {
    pub spawn: Region,
    pub respawn: Region,
    pub velocity_min: Vec3,
    pub velocity_max: Vec3,
    /// Life units gained per second.
    pub life_rate: f32,
    pub initial_life: (f32, f32),
    /// Recycle once life passes this; `None` keeps an unbounded clock.
    pub life_max: Option<f32>,
    /// Recycle once the particle rises above this height.
    pub ceiling: f32,
    pub sway: Sway,
    /// Extra x drift `sin(t + life)·wind`.
    pub wind: f32,
    /// Phase offset between consecutive indices.
    pub phase_step: f32,
    pub spin: Vec3,
    pub scale: (f32, f32),
    /// Peak opacity; bounded-life particles fade with their life curve.
    pub opacity: f32,
    /// Per-particle oscillating reactivity, lifted by live audio when present.
    pub rhythm: bool,
    /// Oscillation rate range for the rhythm, radians per second.
    pub rhythm_rate: (f32, f32),
    pub palette: Palette,
}

impl RisingParams {
    pub fn sacred_fire() -> Self {
        Self {
            spawn: Region::Disk {
                radius: 2.0,
                y_min: 0.0,
                y_max: 0.5,
            },
            respawn: Region::Disk {
                radius: 1.5,
                y_min: 0.0,
                y_max: 0.0,
            },
            velocity_min: Vec3::new(-0.6, 1.2, -0.6),
            velocity_max: Vec3::new(0.6, 4.2, 0.6),
            life_rate: 2.0,
            initial_life: (0.0, 8.0),
            life_max: Some(8.0),
            ceiling: 6.0,
            sway: Sway {
                amplitude_x: 0.06,
                amplitude_z: 0.06,
                frequency_x: 5.0,
                frequency_z: 5.0,
            },
            wind: 0.12,
            phase_step: 1.0,
            spin: Vec3::ZERO,
            scale: (0.1, 0.4),
            opacity: 0.8,
            rhythm: false,
            rhythm_rate: (0.0, 0.0),
            palette: Palette::sacred_fire(),
        }
    }

    pub fn musical_notes() -> Self {
        Self {
            spawn: Region::Box {
                min: Vec3::new(-10.0, 0.0, -6.0),
                max: Vec3::new(10.0, 12.0, 6.0),
            },
            respawn: Region::Box {
                min: Vec3::new(-10.0, -2.0, -6.0),
                max: Vec3::new(10.0, -2.0, 6.0),
            },
            velocity_min: Vec3::new(-0.9, 0.6, -0.6),
            velocity_max: Vec3::new(0.9, 1.8, 0.6),
            life_rate: 1.0,
            initial_life: (0.0, 0.0),
            life_max: None,
            ceiling: 15.0,
            sway: Sway {
                amplitude_x: 0.18,
                amplitude_z: 0.12,
                frequency_x: 3.0,
                frequency_z: 2.0,
            },
            wind: 0.0,
            phase_step: 0.1,
            spin: Vec3::new(1.2, 1.8, 1.5),
            scale: (0.2, 0.6),
            opacity: 1.0,
            rhythm: true,
            rhythm_rate: (1.0, 6.0),
            palette: Palette::musical_notes(),
        }
    }

    /// `sin(π · life / life_max)`, clamped at zero; 1 for unbounded clocks.
    pub fn life_curve(&self, life: f32) -> f32 {
        match self.life_max {
            Some(max) if max > 0.0 => (PI * life / max).sin().max(0.0),
            _ => 1.0,
        }
    }

    /// Oscillating reactivity in `[0, 1]` plus whatever live audio adds.
    pub fn reactivity(&self, s: &ParticleState, modulation: &Modulation) -> f32 {
        if !self.rhythm {
            return 0.0;
        }
        let rate = self.rhythm_rate.0 + (self.rhythm_rate.1 - self.rhythm_rate.0) * s.binding;
        let rhythm = (s.life * rate).sin() * 0.5 + 0.5;
        (rhythm + modulation.reactivity).clamp(0.0, 1.0)
    }
}

pub(super) fn init<R: Rng + ?Sized>(p: &RisingParams, index: usize, rng: &mut R) -> ParticleState {
    ParticleState {
        position: p.spawn.sample(rng),
        velocity: random_vec3(rng, p.velocity_min, p.velocity_max),
        rotation: if p.spin == Vec3::ZERO {
            Vec3::ZERO
        } else {
            random_rotation(rng)
        },
        spin: p.spin,
        scale: random_range(rng, p.scale),
        color: p.palette.sample(rng),
        life: random_range(rng, p.initial_life),
        phase: index as f32 * p.phase_step,
        binding: rng.gen(),
        ..ParticleState::default()
    }
}

pub(super) fn step<R: Rng + ?Sized>(
    p: &RisingParams,
    s: &mut ParticleState,
    ctx: &StepContext,
    modulation: &Modulation,
    rng: &mut R,
) -> bool {
    let t = ctx.elapsed;
    s.life += ctx.dt * p.life_rate;
    let react = p.reactivity(s, modulation);

    let sway = Vec3::new(
        (p.sway.frequency_x * t + s.phase).sin() * p.sway.amplitude_x + (t + s.life).sin() * p.wind,
        0.0,
        (p.sway.frequency_z * t + s.phase).cos() * p.sway.amplitude_z,
    );
    let lift = Vec3::new(1.0, 1.0 + react, 1.0);
    s.position += (s.velocity * lift + sway) * ctx.dt;
    s.rotation += s.spin * (1.0 + react) * ctx.dt;

    let expired = p.life_max.is_some_and(|max| s.life > max);
    if expired || s.position.y > p.ceiling {
        s.position = p.respawn.sample(rng);
        if p.life_max.is_some() {
            s.life = 0.0;
        }
        return true;
    }
    false
}

pub(super) fn appearance(p: &RisingParams, s: &ParticleState, modulation: &Modulation) -> Appearance {
    let curve = p.life_curve(s.life);
    let react = p.reactivity(s, modulation);
    Appearance {
        offset: Vec3::ZERO,
        scale: s.scale * curve * (1.0 + react * 0.5),
        color: if p.rhythm {
            s.color * (0.7 + react * 0.3)
        } else {
            s.color
        },
        alpha: p.opacity * curve,
    }
}
