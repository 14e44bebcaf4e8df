// Host-side tests for the scroll-driven scene driver, instance publishing and
// quality tiers.

use glam::Vec3;
use motes_core::*;

const DT: f32 = 1.0 / 60.0;

fn driver(tier: QualityTier) -> SceneDriver {
    SceneDriver::new(SceneConfig::default(), tier).expect("default scene is valid")
}

fn id(section: u16, slot: u16) -> SimulationId {
    SimulationId { section, slot }
}

#[test]
fn default_scene_has_four_ordered_sections() {
    let config = SceneConfig::default();
    assert_eq!(config.sections.len(), 4);
    assert!(config.validate().is_ok());
    for pair in config.sections.windows(2) {
        assert!(pair[0].scroll_end <= pair[1].scroll_start + 1e-6);
    }
    let offsets: Vec<Vec3> = config.sections[2].simulations.iter().map(|s| s.offset).collect();
    assert_eq!(offsets, vec![Vec3::new(-5.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0)]);
}

#[test]
fn inverted_scroll_range_is_rejected() {
    let mut config = SceneConfig::default();
    config.sections[1].scroll_start = 0.6;
    assert!(matches!(
        SceneDriver::new(config, QualityTier::High),
        Err(ConfigError::InvalidScrollRange(_))
    ));
}

#[test]
fn simulations_mount_lazily_on_first_visibility() {
    let mut scene = driver(QualityTier::High);
    assert_eq!(scene.mounted_count(), 0);

    scene.set_scroll(0.1);
    let stepped = scene.frame(&FrameInput::new(DT, DT));
    assert_eq!(stepped, 2);
    assert!(scene.is_mounted(id(0, 0)));
    assert!(scene.is_mounted(id(0, 1)));
    assert!(!scene.is_mounted(id(3, 0)));

    let petals = scene.get(id(0, 0)).expect("mounted");
    assert_eq!(petals.simulation.len(), 5000);
    assert_eq!(petals.publisher.len(), 5000);
}

#[test]
fn hidden_sections_are_not_stepped() {
    let mut scene = driver(QualityTier::High);
    scene.set_scroll(0.1);
    scene.frame(&FrameInput::new(DT, DT));
    let frames_before = scene.get(id(0, 0)).map(|m| m.simulation.stats().frames);

    scene.set_scroll(0.9);
    let stepped = scene.frame(&FrameInput::new(DT, 2.0 * DT));
    assert_eq!(stepped, 2);
    assert_eq!(
        scene.get(id(0, 0)).map(|m| m.simulation.stats().frames),
        frames_before
    );
    assert!(scene.is_mounted(id(3, 1)));
}

#[test]
fn margin_steps_the_next_section_before_entry() {
    let mut scene = driver(QualityTier::High);
    // 0.245 is inside engagement and within 10% of tilak's span
    scene.set_scroll(0.245);
    assert_eq!(scene.visible_sections().as_slice(), &[0, 1]);
    assert_eq!(scene.current_section(), Some(0));
    assert_eq!(scene.frame(&FrameInput::new(DT, DT)), 4);
}

#[test]
fn lower_tiers_scale_counts_at_mount() {
    let mut scene = driver(QualityTier::Low);
    scene.set_scroll(0.1);
    scene.frame(&FrameInput::new(DT, DT));
    let expected = QualityTier::Low.scale_count(5000) as usize;
    assert_eq!(scene.get(id(0, 0)).map(|m| m.simulation.len()), Some(expected));
    assert!(expected < 5000);
}

#[test]
fn teardown_releases_everything() {
    let mut scene = driver(QualityTier::Medium);
    scene.set_scroll(0.5);
    scene.frame(&FrameInput::new(DT, DT));
    assert!(scene.mounted_count() > 0);
    scene.teardown();
    assert_eq!(scene.mounted_count(), 0);
    assert_eq!(scene.mounted_particles(), 0);
}

#[test]
fn scroll_is_clamped_and_ignores_nan() {
    let mut scene = driver(QualityTier::High);
    scene.set_scroll(4.0);
    assert_eq!(scene.progress(), 1.0);
    scene.set_scroll(f32::NAN);
    assert_eq!(scene.progress(), 1.0);
    assert_eq!(scene.camera_z(), 8.0);
}

#[test]
fn scroll_progress_covers_the_scrollable_distance() {
    assert_eq!(scroll_progress(0.0, 4000.0, 1000.0), 0.0);
    assert_eq!(scroll_progress(1500.0, 4000.0, 1000.0), 0.5);
    assert_eq!(scroll_progress(9000.0, 4000.0, 1000.0), 1.0);
    assert_eq!(scroll_progress(200.0, 800.0, 1000.0), 0.0);
}

#[test]
fn publish_writes_one_instance_per_particle_once_per_frame() {
    let mut sim = Simulation::new(EmissionProfile::confetti(), 64, 5);
    let mut publisher = InstancePublisher::new(sim.len());
    assert!(!publisher.is_dirty());

    let offset = Vec3::new(4.0, 0.0, 0.0);
    sim.step(&FrameInput::new(DT, DT)).publish(&mut publisher, offset);
    assert_eq!(publisher.len(), 64);
    assert_eq!(publisher.generation(), 1);
    assert!(publisher.take_dirty());
    assert!(!publisher.take_dirty());
    assert_eq!(
        publisher.as_bytes().len(),
        64 * std::mem::size_of::<InstanceRaw>()
    );

    // instance i tracks particle i
    for (i, inst) in publisher.instances().iter().enumerate() {
        let expected = sim.buffer().positions()[i] + offset + sim.display()[i].offset;
        assert!(inst.translation().distance(expected) < 1e-4);
    }
}

#[test]
fn instance_color_carries_alpha() {
    let appearance = Appearance {
        offset: Vec3::ZERO,
        scale: 2.0,
        color: Vec3::new(0.5, 0.25, 1.0),
        alpha: 1.7,
    };
    let raw = InstanceRaw::new(Vec3::ONE, Vec3::ZERO, &appearance);
    assert_eq!(raw.color, [0.5, 0.25, 1.0, 1.0]);
    assert_eq!(raw.model[0][0], 2.0);
    assert_eq!(raw.translation(), Vec3::ONE);
}

#[test]
fn quality_tiers_follow_device_hints_and_fps() {
    let mobile = DeviceHints {
        mobile: true,
        ..DeviceHints::default()
    };
    assert_eq!(QualityTier::from_hints(&mobile), QualityTier::Low);
    let mid = DeviceHints {
        device_memory_gb: Some(4.0),
        ..DeviceHints::default()
    };
    assert_eq!(QualityTier::from_hints(&mid), QualityTier::Medium);
    let big = DeviceHints {
        device_memory_gb: Some(16.0),
        mobile: false,
    };
    assert_eq!(QualityTier::from_hints(&big), QualityTier::High);

    assert_eq!(QualityTier::from_fps(60.0), QualityTier::High);
    assert_eq!(QualityTier::from_fps(45.0), QualityTier::Medium);
    assert_eq!(QualityTier::from_fps(20.0), QualityTier::Low);
    assert_eq!(
        QualityTier::High.combine(QualityTier::Medium),
        QualityTier::Medium
    );
    assert_eq!(QualityTier::Medium.particle_budget(), 8000);
}

#[test]
fn quality_tier_labels_parse_back() {
    for tier in [QualityTier::Low, QualityTier::Medium, QualityTier::High] {
        assert_eq!(tier.label().parse::<QualityTier>(), Ok(tier));
    }
    assert_eq!(" HIGH ".parse::<QualityTier>(), Ok(QualityTier::High));
    assert!(matches!(
        "ultra".parse::<QualityTier>(),
        Err(ConfigError::InvalidQualityTier(_))
    ));
}

#[test]
fn mobile_user_agents_are_detected() {
    assert!(DeviceHints::is_mobile_user_agent(
        "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)"
    ));
    assert!(DeviceHints::is_mobile_user_agent("Mozilla/5.0 (Linux; ANDROID 14)"));
    assert!(!DeviceHints::is_mobile_user_agent(
        "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/131.0"
    ));
}

#[test]
fn fps_meter_reports_once_per_window() {
    let mut meter = FpsMeter::new(60);
    for _ in 0..59 {
        assert!(meter.record(DT).is_none());
    }
    let fps = meter.record(DT).expect("window complete");
    assert!((fps - 60.0).abs() < 0.1);
    assert_eq!(meter.last_fps(), Some(fps));
}

#[test]
fn frame_clock_clamps_long_frames() {
    let mut clock = FrameClock::new();
    let t = clock.advance(2.5);
    assert_eq!(t.dt, MAX_FRAME_DT_SEC);
    let t = clock.advance(f32::INFINITY);
    assert_eq!(t.dt, 0.0);
    assert_eq!(t.frame, 2);
    assert!((clock.elapsed() - MAX_FRAME_DT_SEC).abs() < 1e-6);
    assert_eq!(clock.tick().dt, 0.0);
}
