use glam::Vec3;

// Shared simulation and audio tuning constants used by both web and native frontends.

// Integration
pub const NOMINAL_TICK_RATE: f32 = 60.0; // frames per second the per-tick motif tuning assumes
pub const MAX_FRAME_DT_SEC: f32 = 0.1; // longest step a single frame may integrate
pub const MAX_PARTICLES_PER_SIMULATION: usize = 20_000; // counts above this are clamped

// Analyser (mirrors the WebAudio AnalyserNode configuration)
pub const FFT_SIZE: usize = 512;
pub const FREQUENCY_BIN_COUNT: usize = FFT_SIZE / 2;
pub const SMOOTHING_TIME_CONSTANT: f32 = 0.8;
pub const MIN_DECIBELS: f32 = -100.0;
pub const MAX_DECIBELS: f32 = -30.0;

// Band split, as fractions of the bin count
pub const BASS_BAND_END: f32 = 0.1; // bottom 10%
pub const MID_BAND_END: f32 = 0.5; // next 40%; treble is the remaining 50%

// Modulation
pub const BASS_BINDING_MAX: f32 = 0.3; // bindings below this follow bass
pub const MID_BINDING_MAX: f32 = 0.7; // bindings below this follow mid, above follow treble
pub const DISPLACEMENT_PER_REACTIVITY: f32 = 2.0;
pub const SCALE_PER_REACTIVITY: f32 = 3.0;
pub const DEFAULT_REACTIVITY_STRENGTH: f32 = 2.0;

// Pointer
pub const POINTER_SENTINEL: [f32; 3] = [1.0e4, 1.0e4, 0.0]; // world position assumed with no pointer
pub const POINTER_PLANE_Z: f32 = 0.0; // world plane the NDC pointer is unprojected onto

// Quality budgets (aggregate particles across all mounted simulations)
pub const HIGH_PARTICLE_BUDGET: usize = 14_500;
pub const MEDIUM_PARTICLE_BUDGET: usize = 8_000;
pub const LOW_PARTICLE_BUDGET: usize = 4_000;
pub const FPS_SAMPLE_FRAMES: u32 = 60; // frames per FPS measurement window
pub const HIGH_TIER_MIN_FPS: f32 = 50.0; // below this a device drops to medium
pub const MEDIUM_TIER_MIN_FPS: f32 = 30.0; // below this a device drops to low
pub const HIGH_TIER_MIN_MEMORY_GB: f32 = 8.0;
pub const MEDIUM_TIER_MIN_MEMORY_GB: f32 = 4.0;
pub const ASSUMED_DEVICE_MEMORY_GB: f32 = 4.0; // when the platform does not report memory

// Camera
pub const CAMERA_Z: f32 = 5.0;
pub const CAMERA_FOVY_DEG: f32 = 75.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 1000.0;

// Scene visibility
pub const VISIBILITY_MARGIN: f32 = 0.1; // fraction of a section's scroll span stepped before entry

#[inline]
pub fn pointer_sentinel_vec3() -> Vec3 {
    Vec3::from(POINTER_SENTINEL)
}
