// Host-side tests for emission profiles and the integrator.

use glam::{Vec2, Vec3};
use motes_core::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

const DT: f32 = 1.0 / 60.0;

fn all_profiles() -> Vec<EmissionProfile> {
    vec![
        EmissionProfile::rose_petals(),
        EmissionProfile::sacred_fire(),
        EmissionProfile::musical_notes(),
        EmissionProfile::golden_dust(),
        EmissionProfile::confetti(),
        EmissionProfile::golden_motes("#ffd700"),
        EmissionProfile::audio_spheres("#ffb347", 2.0),
        EmissionProfile::turmeric(),
    ]
}

#[test]
fn zero_dt_step_leaves_initial_state_unchanged() {
    let mut rng = StdRng::seed_from_u64(7);
    for profile in all_profiles() {
        let count = 200;
        for i in 0..count {
            let initial = profile.init(i, count, &mut rng);
            let mut state = initial;
            let ctx = StepContext::new(0.0, 3.5);
            let recycled = profile.step(&mut state, &ctx, &Modulation::NEUTRAL, &mut rng);
            assert!(!recycled, "{} recycled at dt=0", profile.name());
            assert_eq!(state, initial, "{} particle {i} moved at dt=0", profile.name());
        }
    }
}

#[test]
fn zero_dt_frame_keeps_buffer_identical() {
    for profile in all_profiles() {
        let mut sim = Simulation::new(profile, 300, 11);
        let before: Vec<_> = (0..sim.len()).map(|i| sim.buffer().read(i)).collect();
        let _ = sim.step(&FrameInput::new(0.0, 1.0));
        for (i, state) in before.iter().enumerate() {
            assert_eq!(&sim.buffer().read(i), state);
        }
    }
}

#[test]
fn explosive_height_strictly_decreases_once_falling() {
    let profile = EmissionProfile::confetti();
    let mut rng = StdRng::seed_from_u64(3);
    let ctx = StepContext::new(DT, 0.0);
    for i in 0..100 {
        let mut state = profile.init(i, 100, &mut rng);
        let mut falling_from: Option<f32> = None;
        for _ in 0..600 {
            let recycled = profile.step(&mut state, &ctx, &Modulation::NEUTRAL, &mut rng);
            if recycled {
                falling_from = None;
                continue;
            }
            if let Some(prev) = falling_from {
                assert!(state.position.y < prev, "particle {i} rose while falling");
            }
            if state.velocity.y < 0.0 {
                falling_from = Some(state.position.y);
            }
        }
    }
}

#[test]
fn explosive_recycles_above_the_floor() {
    let ExplosiveParams {
        floor, respawn_min, ..
    } = ExplosiveParams::default();
    let profile = EmissionProfile::confetti();
    let mut rng = StdRng::seed_from_u64(5);
    let ctx = StepContext::new(DT, 0.0);
    let mut recycles = 0;
    for i in 0..50 {
        let mut state = profile.init(i, 50, &mut rng);
        for _ in 0..900 {
            if profile.step(&mut state, &ctx, &Modulation::NEUTRAL, &mut rng) {
                recycles += 1;
                assert!(state.position.y >= respawn_min.y);
            }
            assert!(state.position.y >= floor);
        }
    }
    assert!(recycles > 0);
}

#[test]
fn spring_settles_on_anchor_with_distant_pointer() {
    let profile = EmissionProfile::golden_motes("#ffd700");
    let mut rng = StdRng::seed_from_u64(9);
    let far = Modulation::with_pointer(Vec3::new(500.0, 500.0, 0.0));
    let ctx = StepContext::new(DT, 0.0);
    for i in 0..50 {
        let mut state = profile.init(i, 50, &mut rng);
        let anchor = state.anchor.expect("spring particles are anchored");
        for _ in 0..3000 {
            profile.step(&mut state, &ctx, &far, &mut rng);
        }
        assert!(
            state.position.distance(anchor) < 1e-3,
            "particle {i} ended {} from its anchor",
            state.position.distance(anchor)
        );
    }
}

#[test]
fn spring_pointer_attracts_and_repels() {
    let mut rng = StdRng::seed_from_u64(1);
    let pointer = Modulation::with_pointer(Vec3::new(1.0, 0.0, 0.0));
    let ctx = StepContext::new(DT, 0.0);
    let start = ParticleState {
        position: Vec3::ZERO,
        anchor: Some(Vec3::ZERO),
        ..ParticleState::default()
    };

    let attract = EmissionProfile::SpringToOrigin(SpringParams::default());
    let mut s = start;
    attract.step(&mut s, &ctx, &pointer, &mut rng);
    assert!(s.velocity.x > 0.0);

    let repel = EmissionProfile::SpringToOrigin(SpringParams {
        response: PointerResponse::Repel,
        ..SpringParams::default()
    });
    let mut s = start;
    repel.step(&mut s, &ctx, &pointer, &mut rng);
    assert!(s.velocity.x < 0.0);
}

#[test]
fn falling_particles_never_stay_below_the_floor() {
    let params = FallingParams::default();
    let profile = EmissionProfile::Falling(params.clone());
    let mut sim = Simulation::new(profile, 100, 21);
    for frame in 0..2000 {
        let _ = sim.step(&FrameInput::new(DT, frame as f32 * DT));
        for y in sim.buffer().positions().iter().map(|p| p.y) {
            assert!(y >= params.floor, "frame {frame}: y {y} below floor");
        }
    }
}

#[test]
fn falling_end_to_end_stays_finite_and_recycles() {
    let mut sim = Simulation::new(EmissionProfile::rose_petals(), 100, 42);
    let mut elapsed = 0.0;
    let mut recycled = 0;
    for _ in 0..1000 {
        elapsed += DT;
        recycled += sim.step(&FrameInput::new(DT, elapsed)).recycled();
    }
    for i in 0..sim.len() {
        let s = sim.buffer().read(i);
        assert!(s.position.is_finite() && s.velocity.is_finite());
    }
    assert!(recycled >= 1);
    assert_eq!(sim.stats().recycled_total, recycled as u64);
    assert_eq!(sim.stats().frames, 1000);
}

#[test]
fn every_profile_stays_finite_under_audio_and_pointer() {
    let camera = Camera::default();
    let pointer = PointerState::from_ndc(Vec2::new(0.2, -0.1), &camera);
    let audio = AudioSnapshot::from_bytes(vec![200; 256], vec![128; 256]);
    for profile in all_profiles() {
        let name = profile.name();
        let mut sim = Simulation::new(profile, 250, 8);
        for frame in 0..600 {
            let input = FrameInput::new(DT, frame as f32 * DT)
                .with_audio(Some(&audio))
                .with_pointer(Some(pointer));
            let _ = sim.step(&input);
        }
        for i in 0..sim.len() {
            assert!(sim.buffer().read(i).is_finite(), "{name} particle {i}");
        }
        for a in sim.display() {
            assert!(a.offset.is_finite() && a.scale.is_finite() && a.color.is_finite());
            assert!(a.alpha.is_finite());
        }
    }
}

#[test]
fn fire_recycles_on_life_bound_and_resets_clock() {
    let params = RisingParams::sacred_fire();
    let profile = EmissionProfile::Rising(params.clone());
    let mut rng = StdRng::seed_from_u64(4);
    let mut state = profile.init(0, 1, &mut rng);
    state.life = 7.99;
    state.position.y = 0.0;
    let recycled = profile.step(
        &mut state,
        &StepContext::new(0.05, 0.0),
        &Modulation::NEUTRAL,
        &mut rng,
    );
    assert!(recycled);
    assert_eq!(state.life, 0.0);
    assert!(state.position.y <= params.ceiling);
}

#[test]
fn audio_spheres_hold_position_and_react_in_appearance() {
    let profile = EmissionProfile::audio_spheres("#ffb347", 2.0);
    let loud = AudioSnapshot::from_bytes(vec![255; 256], vec![128; 256]);
    let mut sim = Simulation::new(profile, 64, 2);
    let anchors: Vec<Vec3> = sim.buffer().positions().to_vec();
    let quiet_scale: Vec<f32> = sim.display().iter().map(|a| a.scale).collect();

    let input = FrameInput::new(DT, 0.5).with_audio(Some(&loud));
    let _ = sim.step(&input);
    assert_eq!(sim.buffer().positions(), anchors.as_slice());
    for (a, quiet) in sim.display().iter().zip(quiet_scale) {
        // reactivity (1 + 1) * 2 = 4 -> scale factor 13
        assert!((a.scale - quiet * 13.0).abs() < 1e-4);
    }
}

#[test]
fn non_positive_counts_give_empty_noop_simulations() {
    for requested in [0, -5] {
        let mut sim = Simulation::from_requested(EmissionProfile::confetti(), requested, 1);
        assert!(sim.is_empty());
        let mut publisher = InstancePublisher::new(0);
        sim.step(&FrameInput::new(DT, DT)).publish(&mut publisher, Vec3::ZERO);
        assert!(publisher.is_empty());
    }
}

#[test]
fn oversized_counts_are_capped() {
    let sim = Simulation::from_requested(EmissionProfile::rose_petals(), 1_000_000, 1);
    assert_eq!(sim.len(), MAX_PARTICLES_PER_SIMULATION);
}

#[test]
fn bad_frame_deltas_are_sanitized() {
    assert_eq!(FrameInput::new(f32::NAN, 0.0).sanitized_dt(), 0.0);
    assert_eq!(FrameInput::new(-1.0, 0.0).sanitized_dt(), 0.0);
    assert_eq!(FrameInput::new(5.0, 0.0).sanitized_dt(), MAX_FRAME_DT_SEC);
}

#[test]
fn seeded_simulations_are_reproducible() {
    let run = || {
        let mut sim = Simulation::new(EmissionProfile::golden_dust(), 128, 99);
        for f in 0..120 {
            let _ = sim.step(&FrameInput::new(DT, f as f32 * DT));
        }
        sim.buffer().positions().to_vec()
    };
    assert_eq!(run(), run());
}

#[test]
fn requested_counts_are_sanitized() {
    assert_eq!(sanitize_count(-3), 0);
    assert_eq!(sanitize_count(0), 0);
    assert_eq!(sanitize_count(800), 800);
    assert_eq!(sanitize_count(i64::MAX), MAX_PARTICLES_PER_SIMULATION);
}

fn horizontal_radius(p: Vec3) -> f32 {
    (p.x * p.x + p.z * p.z).sqrt()
}

#[test]
fn spiral_recycles_beyond_its_radius() {
    let profile = EmissionProfile::golden_dust();
    let SpiralParams {
        respawn_radius,
        height,
        ..
    } = SpiralParams::default();
    let mut rng = StdRng::seed_from_u64(21);
    let ctx = StepContext::new(DT, 0.0);
    for _ in 0..50 {
        let mut state = ParticleState {
            position: Vec3::new(25.0, 5.0, 0.0),
            scale: 0.1,
            ..ParticleState::default()
        };
        let recycled = profile.step(&mut state, &ctx, &Modulation::NEUTRAL, &mut rng);
        assert!(recycled);
        let r = horizontal_radius(state.position);
        assert!(r >= respawn_radius.0 - 1e-4 && r <= respawn_radius.1 + 1e-4, "radius {r}");
        assert!(state.position.y >= height.0 && state.position.y <= height.1);
    }
}

#[test]
fn spiral_pulls_toward_the_mandala_radius() {
    let profile = EmissionProfile::golden_dust();
    let SpiralParams { target_radius, .. } = SpiralParams::default();
    let mut rng = StdRng::seed_from_u64(22);
    // phase 0 at t = 0 puts the target exactly at the base radius
    let ctx = StepContext::new(DT, 0.0);
    for start in [4.0_f32, 14.0] {
        let mut state = ParticleState {
            position: Vec3::new(start, 5.0, 0.0),
            ..ParticleState::default()
        };
        let before = (horizontal_radius(state.position) - target_radius).abs();
        for _ in 0..30 {
            assert!(!profile.step(&mut state, &ctx, &Modulation::NEUTRAL, &mut rng));
        }
        let after = (horizontal_radius(state.position) - target_radius).abs();
        assert!(after < before, "start {start}: error {before} -> {after}");
    }
}

#[test]
fn notes_recycle_at_the_ceiling_and_keep_their_clock() {
    let profile = EmissionProfile::musical_notes();
    let mut rng = StdRng::seed_from_u64(23);
    let ctx = StepContext::new(DT, 0.0);

    let mut state = ParticleState {
        position: Vec3::new(1.0, 15.5, 0.0),
        life: 3.7,
        scale: 0.3,
        ..ParticleState::default()
    };
    assert!(profile.step(&mut state, &ctx, &Modulation::NEUTRAL, &mut rng));
    assert_eq!(state.position.y, -2.0);
    assert!(state.position.x.abs() <= 10.0 && state.position.z.abs() <= 6.0);
    assert!((state.life - (3.7 + DT)).abs() < 1e-5);

    // an unbounded clock never expires on its own
    let mut state = ParticleState {
        position: Vec3::new(0.0, 5.0, 0.0),
        life: 10_000.0,
        ..ParticleState::default()
    };
    assert!(!profile.step(&mut state, &ctx, &Modulation::NEUTRAL, &mut rng));
}

#[test]
fn fire_scale_follows_its_life_curve() {
    let profile = EmissionProfile::sacred_fire();
    let at = |life: f32| {
        let state = ParticleState {
            scale: 0.3,
            color: Vec3::ONE,
            life,
            ..ParticleState::default()
        };
        profile.appearance(&state, &Modulation::NEUTRAL)
    };
    assert!(at(0.0).scale.abs() < 1e-6);
    assert!(at(0.0).alpha.abs() < 1e-6);
    assert!((at(4.0).scale - 0.3).abs() < 1e-6);
    assert!((at(4.0).alpha - 0.8).abs() < 1e-6);
    assert!(at(8.0).scale.abs() < 1e-6);
    assert!((at(2.0).scale - 0.3 * std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
    assert!(at(2.0).scale < at(4.0).scale && at(6.0).scale < at(4.0).scale);
}

#[test]
fn fire_expires_back_to_the_base() {
    let profile = EmissionProfile::sacred_fire();
    let mut rng = StdRng::seed_from_u64(24);
    let ctx = StepContext::new(DT, 0.0);
    let mut state = ParticleState {
        position: Vec3::new(0.5, 3.0, 0.5),
        velocity: Vec3::new(0.0, 2.0, 0.0),
        life: 7.99,
        scale: 0.2,
        ..ParticleState::default()
    };
    assert!(profile.step(&mut state, &ctx, &Modulation::NEUTRAL, &mut rng));
    assert_eq!(state.life, 0.0);
    assert_eq!(state.position.y, 0.0);
    assert!(horizontal_radius(state.position) <= 1.5 + 1e-5);
}

#[test]
fn turmeric_respawns_at_its_source_after_the_life_bound() {
    let profile = EmissionProfile::turmeric();
    let DriftParams {
        respawn_min,
        respawn_max,
        life_max,
        ..
    } = DriftParams::default();
    let mut rng = StdRng::seed_from_u64(25);
    let ctx = StepContext::new(DT, 0.0);

    let mut state = ParticleState {
        position: Vec3::new(5.0, 8.0, 3.0),
        velocity: Vec3::new(0.5, 1.0, 0.2),
        life: life_max,
        scale: 0.2,
        ..ParticleState::default()
    };
    assert!(profile.step(&mut state, &ctx, &Modulation::NEUTRAL, &mut rng));
    assert_eq!(state.life, 0.0);
    let p = state.position;
    assert!(p.cmpge(respawn_min).all() && p.cmple(respawn_max).all(), "{p:?}");

    let mut state = ParticleState {
        position: Vec3::new(5.0, 8.0, 3.0),
        life: life_max * 0.5,
        ..ParticleState::default()
    };
    assert!(!profile.step(&mut state, &ctx, &Modulation::NEUTRAL, &mut rng));
}
