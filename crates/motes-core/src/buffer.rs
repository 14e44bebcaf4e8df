//! Struct-of-arrays particle storage.
//!
//! A buffer is sized once and never grows or shrinks. Particle `i` keeps index
//! `i` for the buffer's whole lifetime; leaving the valid domain recycles the
//! row in place.

use crate::constants::MAX_PARTICLES_PER_SIMULATION;
use crate::error::ConfigError;
use crate::profile::EmissionProfile;
use glam::Vec3;
use rand::rngs::StdRng;

/// One particle's row, copied out of the buffer for a step and written back.
///
/// Velocities and spins are per second. `life` is the particle's own clock;
/// its unit depends on the profile (seconds, life units, or free phase).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleState {
    pub position: Vec3,
    /// Spawn position for spring-back and anchored profiles.
    pub anchor: Option<Vec3>,
    pub velocity: Vec3,
    /// Euler XYZ, radians.
    pub rotation: Vec3,
    pub spin: Vec3,
    pub scale: f32,
    pub color: Vec3,
    pub life: f32,
    pub phase: f32,
    /// Position in the spectrum, `[0, 1]`.
    pub binding: f32,
}

impl Default for ParticleState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            anchor: None,
            velocity: Vec3::ZERO,
            rotation: Vec3::ZERO,
            spin: Vec3::ZERO,
            scale: 0.0,
            color: Vec3::ZERO,
            life: 0.0,
            phase: 0.0,
            binding: 0.0,
        }
    }
}

impl ParticleState {
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.rotation.is_finite()
            && self.scale.is_finite()
            && self.life.is_finite()
            && self.anchor.map_or(true, |a| a.is_finite())
    }
}

#[derive(Clone, Debug, Default)]
pub struct ParticleBuffer {
    positions: Vec<Vec3>,
    anchors: Option<Vec<Vec3>>,
    velocities: Vec<Vec3>,
    rotations: Vec<Vec3>,
    spins: Vec<Vec3>,
    scales: Vec<f32>,
    colors: Vec<Vec3>,
    life: Vec<f32>,
    phases: Vec<f32>,
    bindings: Vec<f32>,
}

impl ParticleBuffer {
    /// Zero-initialized storage for `count` particles. The anchor column only
    /// exists for profiles that spring back to their spawn point.
    pub fn allocate(count: usize, anchored: bool) -> Self {
        Self {
            positions: vec![Vec3::ZERO; count],
            anchors: anchored.then(|| vec![Vec3::ZERO; count]),
            velocities: vec![Vec3::ZERO; count],
            rotations: vec![Vec3::ZERO; count],
            spins: vec![Vec3::ZERO; count],
            scales: vec![0.0; count],
            colors: vec![Vec3::ZERO; count],
            life: vec![0.0; count],
            phases: vec![0.0; count],
            bindings: vec![0.0; count],
        }
    }

    /// Run the profile's `init` for every index.
    pub fn seed(&mut self, profile: &EmissionProfile, rng: &mut StdRng) {
        let count = self.len();
        for i in 0..count {
            let state = profile.init(i, count, rng);
            self.write(i, &state);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn read(&self, i: usize) -> ParticleState {
        ParticleState {
            position: self.positions[i],
            anchor: self.anchors.as_ref().map(|a| a[i]),
            velocity: self.velocities[i],
            rotation: self.rotations[i],
            spin: self.spins[i],
            scale: self.scales[i],
            color: self.colors[i],
            life: self.life[i],
            phase: self.phases[i],
            binding: self.bindings[i],
        }
    }

    #[inline]
    pub fn write(&mut self, i: usize, state: &ParticleState) {
        self.positions[i] = state.position;
        if let (Some(anchors), Some(anchor)) = (self.anchors.as_mut(), state.anchor) {
            anchors[i] = anchor;
        }
        self.velocities[i] = state.velocity;
        self.rotations[i] = state.rotation;
        self.spins[i] = state.spin;
        self.scales[i] = state.scale;
        self.colors[i] = state.color;
        self.life[i] = state.life;
        self.phases[i] = state.phase;
        self.bindings[i] = state.binding;
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn rotations(&self) -> &[Vec3] {
        &self.rotations
    }
}

/// Turn a requested particle count into a usable one.
///
/// Non-positive counts become an empty (no-op) simulation and oversized counts
/// are capped; both cases are logged rather than returned as errors.
pub fn sanitize_count(requested: i64) -> usize {
    if requested <= 0 {
        if requested < 0 {
            log::warn!(
                "[config] {}",
                ConfigError::InvalidCount {
                    requested,
                    clamped: 0
                }
            );
        }
        return 0;
    }
    let max = MAX_PARTICLES_PER_SIMULATION;
    if requested as u64 > max as u64 {
        log::warn!(
            "[config] {}",
            ConfigError::InvalidCount {
                requested,
                clamped: max
            }
        );
        return max;
    }
    requested as usize
}
