//! Maps audio features and pointer position onto per-particle multipliers.
//!
//! Everything here is a pure function of its inputs. Missing inputs are valid
//! and produce [`Modulation::NEUTRAL`] values.

use crate::audio::AudioSnapshot;
use crate::camera::Camera;
use crate::constants::{
    pointer_sentinel_vec3, BASS_BINDING_MAX, DISPLACEMENT_PER_REACTIVITY, MID_BINDING_MAX,
    POINTER_PLANE_Z, POINTER_SENTINEL, SCALE_PER_REACTIVITY,
};
use glam::{Vec2, Vec3};

/// Latest pointer sample: NDC as reported plus its world-space point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerState {
    pub ndc: Vec2,
    pub world: Vec3,
}

impl PointerState {
    /// Unproject `ndc` onto the interaction plane. A ray that never reaches
    /// the plane resolves to the far-away sentinel.
    pub fn from_ndc(ndc: Vec2, camera: &Camera) -> Self {
        let ndc = ndc.clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
        let world = camera
            .unproject_to_plane(ndc, POINTER_PLANE_Z)
            .unwrap_or_else(pointer_sentinel_vec3);
        Self { ndc, world }
    }
}

/// Multipliers applied to one particle for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Modulation {
    /// Combined band and bin reactivity, already scaled by strength.
    pub reactivity: f32,
    pub displacement: f32,
    pub scale_factor: f32,
    pub color_intensity: f32,
    /// World-space pointer, or the sentinel when none is known.
    pub pointer: Vec3,
}

impl Modulation {
    pub const NEUTRAL: Modulation = Modulation {
        reactivity: 0.0,
        displacement: 0.0,
        scale_factor: 1.0,
        color_intensity: 1.0,
        pointer: Vec3::new(POINTER_SENTINEL[0], POINTER_SENTINEL[1], POINTER_SENTINEL[2]),
    };

    /// Neutral audio response with a known pointer.
    pub fn with_pointer(pointer: Vec3) -> Self {
        Self {
            pointer,
            ..Self::NEUTRAL
        }
    }

    fn from_reactivity(reactivity: f32, pointer: Vec3) -> Self {
        Self {
            reactivity,
            displacement: reactivity * DISPLACEMENT_PER_REACTIVITY,
            scale_factor: 1.0 + reactivity * SCALE_PER_REACTIVITY,
            color_intensity: 1.0 + reactivity,
            pointer,
        }
    }
}

impl Default for Modulation {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Band level picked by `binding`: bass below 0.3, mid below 0.7, treble above.
#[inline]
pub fn dominant_band(audio: &AudioSnapshot, binding: f32) -> f32 {
    if binding < BASS_BINDING_MAX {
        audio.bass
    } else if binding < MID_BINDING_MAX {
        audio.mid
    } else {
        audio.treble
    }
}

/// The spectrum bin at `floor(binding · len)`, clamped to the last bin, in `[0, 1]`.
#[inline]
pub fn bound_bin(audio: &AudioSnapshot, binding: f32) -> f32 {
    let len = audio.frequency.len();
    if len == 0 {
        return 0.0;
    }
    let index = ((binding * len as f32).floor().max(0.0) as usize).min(len - 1);
    audio.frequency[index] as f32 / 255.0
}

/// `(dominant band + bound bin) · strength`.
pub fn reactivity(audio: &AudioSnapshot, binding: f32, strength: f32) -> f32 {
    let binding = if binding.is_finite() {
        binding.clamp(0.0, 1.0)
    } else {
        0.0
    };
    (dominant_band(audio, binding) + bound_bin(audio, binding)) * strength
}

pub fn modulate(
    audio: Option<&AudioSnapshot>,
    pointer: Option<&PointerState>,
    binding: f32,
    strength: f32,
) -> Modulation {
    let pointer = pointer.map_or_else(pointer_sentinel_vec3, |p| p.world);
    match audio {
        Some(a) => Modulation::from_reactivity(reactivity(a, binding, strength), pointer),
        None => Modulation::with_pointer(pointer),
    }
}
