// Host-side tests for tuning constants and their relationships.

use motes_core::*;

#[test]
#[allow(clippy::assertions_on_constants)]
fn band_and_binding_splits_are_ordered() {
    assert!(0.0 < BASS_BAND_END && BASS_BAND_END < MID_BAND_END && MID_BAND_END < 1.0);
    assert!(0.0 < BASS_BINDING_MAX && BASS_BINDING_MAX < MID_BINDING_MAX && MID_BINDING_MAX < 1.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn analyser_constants_match_the_browser_defaults() {
    assert!(FFT_SIZE.is_power_of_two());
    assert_eq!(FREQUENCY_BIN_COUNT * 2, FFT_SIZE);
    assert!(SMOOTHING_TIME_CONSTANT >= 0.0 && SMOOTHING_TIME_CONSTANT < 1.0);
    assert!(MIN_DECIBELS < MAX_DECIBELS);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn budgets_shrink_with_quality() {
    assert!(HIGH_PARTICLE_BUDGET > MEDIUM_PARTICLE_BUDGET);
    assert!(MEDIUM_PARTICLE_BUDGET > LOW_PARTICLE_BUDGET);
    assert!(MEDIUM_TIER_MIN_FPS < HIGH_TIER_MIN_FPS);
    assert!(MEDIUM_TIER_MIN_MEMORY_GB < HIGH_TIER_MIN_MEMORY_GB);
    assert!(HIGH_PARTICLE_BUDGET <= MAX_PARTICLES_PER_SIMULATION);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn frame_clamp_and_camera_are_sane() {
    assert!(MAX_FRAME_DT_SEC > 1.0 / NOMINAL_TICK_RATE);
    assert!(CAMERA_ZNEAR > 0.0 && CAMERA_ZNEAR < CAMERA_ZFAR);
    assert!(CAMERA_Z > CAMERA_ZNEAR);
    assert!(pointer_sentinel_vec3().length() > 1000.0);
}
