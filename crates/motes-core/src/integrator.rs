//! Per-frame update of one simulation.
//!
//! [`Simulation::step`] walks every particle once, then hands back a
//! [`Stepped`] token. Instance data can only be published through that token,
//! so a publish always observes a complete pass.

use crate::audio::AudioSnapshot;
use crate::buffer::{sanitize_count, ParticleBuffer};
use crate::constants::{pointer_sentinel_vec3, MAX_FRAME_DT_SEC, MAX_PARTICLES_PER_SIMULATION};
use crate::instance::InstancePublisher;
use crate::modulation::{modulate, Modulation, PointerState};
use crate::profile::{Appearance, EmissionProfile, StepContext};
use glam::Vec3;
use rand::prelude::*;

/// Everything a simulation needs from the outside for one frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput<'a> {
    pub dt: f32,
    pub elapsed: f32,
    pub audio: Option<&'a AudioSnapshot>,
    pub pointer: Option<PointerState>,
}

impl<'a> FrameInput<'a> {
    pub fn new(dt: f32, elapsed: f32) -> Self {
        Self {
            dt,
            elapsed,
            audio: None,
            pointer: None,
        }
    }

    pub fn with_audio(mut self, audio: Option<&'a AudioSnapshot>) -> Self {
        self.audio = audio;
        self
    }

    pub fn with_pointer(mut self, pointer: Option<PointerState>) -> Self {
        self.pointer = pointer;
        self
    }

    /// Non-finite or negative deltas become zero; long stalls are capped.
    pub fn sanitized_dt(&self) -> f32 {
        if self.dt.is_finite() {
            self.dt.clamp(0.0, MAX_FRAME_DT_SEC)
        } else {
            0.0
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimulationStats {
    pub frames: u64,
    pub recycled_last_frame: usize,
    pub recycled_total: u64,
}

pub struct Simulation {
    profile: EmissionProfile,
    buffer: ParticleBuffer,
    display: Vec<Appearance>,
    rng: StdRng,
    stats: SimulationStats,
}

impl Simulation {
    pub fn new(profile: EmissionProfile, count: usize, seed: u64) -> Self {
        let count = if count > MAX_PARTICLES_PER_SIMULATION {
            sanitize_count(count as i64)
        } else {
            count
        };
        let mut rng = StdRng::seed_from_u64(seed);
        let mut buffer = ParticleBuffer::allocate(count, profile.is_anchored());
        buffer.seed(&profile, &mut rng);
        let display = (0..count)
            .map(|i| profile.appearance(&buffer.read(i), &Modulation::NEUTRAL))
            .collect();
        log::debug!("[sim] mounted {} x{}", profile.name(), count);
        Self {
            profile,
            buffer,
            display,
            rng,
            stats: SimulationStats::default(),
        }
    }

    /// Build from an unvalidated count; non-positive counts give an empty,
    /// no-op simulation.
    pub fn from_requested(profile: EmissionProfile, requested: i64, seed: u64) -> Self {
        Self::new(profile, sanitize_count(requested), seed)
    }

    pub fn step(&mut self, input: &FrameInput<'_>) -> Stepped<'_> {
        let ctx = StepContext::new(input.sanitized_dt(), input.elapsed);
        // pointer is sampled once per frame
        let pointer = input.pointer;
        let pointer_world = pointer.map_or_else(pointer_sentinel_vec3, |p| p.world);
        let shared = Modulation::with_pointer(pointer_world);
        let reacts = self.profile.reacts_to_audio();
        let strength = self.profile.reactivity_strength();

        let mut recycled = 0usize;
        for i in 0..self.buffer.len() {
            let mut state = self.buffer.read(i);
            let m = if reacts {
                modulate(input.audio, pointer.as_ref(), state.binding, strength)
            } else {
                shared
            };
            if self.profile.step(&mut state, &ctx, &m, &mut self.rng) {
                recycled += 1;
            }
            self.display[i] = self.profile.appearance(&state, &m);
            self.buffer.write(i, &state);
        }

        self.stats.frames += 1;
        self.stats.recycled_last_frame = recycled;
        self.stats.recycled_total += recycled as u64;
        Stepped { sim: self }
    }

    pub fn profile(&self) -> &EmissionProfile {
        &self.profile
    }

    pub fn buffer(&self) -> &ParticleBuffer {
        &self.buffer
    }

    pub fn display(&self) -> &[Appearance] {
        &self.display
    }

    pub fn stats(&self) -> SimulationStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

/// Proof that a full integrator pass just finished.
pub struct Stepped<'a> {
    sim: &'a Simulation,
}

impl<'a> Stepped<'a> {
    pub fn recycled(&self) -> usize {
        self.sim.stats.recycled_last_frame
    }

    /// Write this frame's instances, shifted by the simulation's world offset.
    pub fn publish(self, publisher: &mut InstancePublisher, offset: Vec3) {
        publisher.publish(
            self.sim.buffer.positions(),
            self.sim.buffer.rotations(),
            &self.sim.display,
            offset,
        );
    }
}
