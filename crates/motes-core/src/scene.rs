//! Scroll-driven scene layout.
//!
//! A scene is a list of sections, each owning a scroll range and a handful of
//! simulations. Simulations are mounted the first time their section comes
//! into view, stepped only while visible, and all dropped on teardown.

use crate::constants::{CAMERA_Z, DEFAULT_REACTIVITY_STRENGTH, VISIBILITY_MARGIN};
use crate::error::ConfigError;
use crate::instance::InstancePublisher;
use crate::integrator::{FrameInput, Simulation};
use crate::profile::EmissionProfile;
use crate::quality::QualityTier;
use fnv::FnvHashMap;
use glam::Vec3;
use smallvec::{smallvec, SmallVec};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeshKind {
    /// Unit quad in the XY plane, scaled by `Visual::size.xy`.
    Plane,
    /// Unit box scaled by `Visual::size`.
    Box,
    Sphere,
    Octahedron,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlendMode {
    Alpha,
    Additive,
}

/// How a simulation's particles are drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Visual {
    pub mesh: MeshKind,
    /// Base mesh dimensions before per-particle scale.
    pub size: Vec3,
    pub blend: BlendMode,
    /// Multiplied into every instance's alpha.
    pub opacity: f32,
}

impl Visual {
    pub const fn new(mesh: MeshKind, size: Vec3, blend: BlendMode, opacity: f32) -> Self {
        Self {
            mesh,
            size,
            blend,
            opacity,
        }
    }

    pub const fn sphere(radius: f32, blend: BlendMode, opacity: f32) -> Self {
        Self::new(MeshKind::Sphere, Vec3::splat(radius), blend, opacity)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationSpec {
    pub label: &'static str,
    pub profile: EmissionProfile,
    /// Requested count at the high tier; lower tiers scale it down.
    pub count: i64,
    pub offset: Vec3,
    pub visual: Visual,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SectionConfig {
    pub name: &'static str,
    pub scroll_start: f32,
    pub scroll_end: f32,
    pub camera_z: f32,
    pub simulations: SmallVec<[SimulationSpec; 3]>,
}

impl SectionConfig {
    /// Whether `progress` lies inside the section, widened by `margin` of its span.
    pub fn contains(&self, progress: f32, margin: f32) -> bool {
        let pad = (self.scroll_end - self.scroll_start) * margin;
        progress >= self.scroll_start - pad && progress <= self.scroll_end + pad
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub sections: Vec<SectionConfig>,
    pub margin: f32,
    pub seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let petals = Visual::new(
            MeshKind::Plane,
            Vec3::new(0.1, 0.15, 1.0),
            BlendMode::Additive,
            0.8,
        );
        let motes = Visual::sphere(0.1, BlendMode::Alpha, 0.8);
        let dust = Visual::new(MeshKind::Octahedron, Vec3::ONE, BlendMode::Additive, 0.8);
        let spheres = Visual::sphere(1.0, BlendMode::Alpha, 0.8);
        let turmeric = Visual::sphere(1.0, BlendMode::Additive, 0.7);
        let notes = Visual::sphere(1.0, BlendMode::Alpha, 0.8);
        let fire = Visual::sphere(1.0, BlendMode::Additive, 0.8);
        let confetti = Visual::new(
            MeshKind::Box,
            Vec3::new(2.0, 0.1, 1.0),
            BlendMode::Alpha,
            0.9,
        );

        let spec = |label: &'static str,
                    profile: EmissionProfile,
                    count: i64,
                    offset: Vec3,
                    visual: Visual| SimulationSpec {
            label,
            profile,
            count,
            offset,
            visual,
        };

        Self {
            sections: vec![
                SectionConfig {
                    name: "engagement",
                    scroll_start: 0.0,
                    scroll_end: 0.25,
                    camera_z: CAMERA_Z,
                    simulations: smallvec![
                        spec("rose-petals", EmissionProfile::rose_petals(), 5000, Vec3::ZERO, petals),
                        spec(
                            "golden-motes",
                            EmissionProfile::golden_motes("#ffd700"),
                            800,
                            Vec3::ZERO,
                            motes
                        ),
                    ],
                },
                SectionConfig {
                    name: "tilak",
                    scroll_start: 0.25,
                    scroll_end: 0.5,
                    camera_z: 6.0,
                    simulations: smallvec![
                        spec("golden-dust", EmissionProfile::golden_dust(), 1500, Vec3::ZERO, dust),
                        spec(
                            "audio-spheres",
                            EmissionProfile::audio_spheres("#ffb347", DEFAULT_REACTIVITY_STRENGTH),
                            1000,
                            Vec3::ZERO,
                            spheres
                        ),
                    ],
                },
                SectionConfig {
                    name: "haldi-sangeet",
                    scroll_start: 0.5,
                    scroll_end: 0.75,
                    camera_z: 8.0,
                    simulations: smallvec![
                        spec(
                            "turmeric",
                            EmissionProfile::turmeric(),
                            3000,
                            Vec3::new(-5.0, 0.0, 0.0),
                            turmeric
                        ),
                        spec(
                            "musical-notes",
                            EmissionProfile::musical_notes(),
                            2500,
                            Vec3::new(5.0, 0.0, 0.0),
                            notes
                        ),
                    ],
                },
                SectionConfig {
                    name: "wedding-reception",
                    scroll_start: 0.75,
                    scroll_end: 1.0,
                    camera_z: 8.0,
                    simulations: smallvec![
                        spec(
                            "sacred-fire",
                            EmissionProfile::sacred_fire(),
                            2000,
                            Vec3::new(-4.0, 0.0, 0.0),
                            fire
                        ),
                        spec(
                            "confetti",
                            EmissionProfile::confetti(),
                            3000,
                            Vec3::new(4.0, 0.0, 0.0),
                            confetti
                        ),
                    ],
                },
            ],
            margin: VISIBILITY_MARGIN,
            seed: 0x6d6f_7465,
        }
    }
}

impl SceneConfig {
    /// Reject sections whose scroll range is empty, inverted or non-finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for section in &self.sections {
            let (a, b) = (section.scroll_start, section.scroll_end);
            if !a.is_finite() || !b.is_finite() || a >= b {
                return Err(ConfigError::InvalidScrollRange(format!(
                    "{}: {a}..{b}",
                    section.name
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimulationId {
    pub section: u16,
    pub slot: u16,
}

/// Page scroll as a fraction of the scrollable distance. A page that does
/// not scroll reports 0.
pub fn scroll_progress(scroll_top: f32, content_height: f32, viewport_height: f32) -> f32 {
    let scrollable = content_height - viewport_height;
    if !scrollable.is_finite() || scrollable <= 0.0 || !scroll_top.is_finite() {
        return 0.0;
    }
    (scroll_top / scrollable).clamp(0.0, 1.0)
}

pub struct MountedSimulation {
    pub label: &'static str,
    pub simulation: Simulation,
    pub publisher: InstancePublisher,
    pub offset: Vec3,
    pub visual: Visual,
}

pub struct SceneDriver {
    config: SceneConfig,
    tier: QualityTier,
    progress: f32,
    mounted: FnvHashMap<SimulationId, MountedSimulation>,
}

impl SceneDriver {
    pub fn new(config: SceneConfig, tier: QualityTier) -> Result<Self, ConfigError> {
        config.validate()?;
        log::info!(
            "[scene] {} sections, quality {}",
            config.sections.len(),
            tier.label()
        );
        Ok(Self {
            config,
            tier,
            progress: 0.0,
            mounted: FnvHashMap::default(),
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn tier(&self) -> QualityTier {
        self.tier
    }

    /// Applies to simulations mounted from now on.
    pub fn set_tier(&mut self, tier: QualityTier) {
        if tier != self.tier {
            log::info!("[scene] quality {} -> {}", self.tier.label(), tier.label());
            self.tier = tier;
        }
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Scroll progress in `[0, 1]`; non-finite values are ignored.
    pub fn set_scroll(&mut self, progress: f32) {
        if progress.is_finite() {
            self.progress = progress.clamp(0.0, 1.0);
        }
    }

    pub fn is_visible(&self, section: usize) -> bool {
        self.config
            .sections
            .get(section)
            .is_some_and(|s| s.contains(self.progress, self.config.margin))
    }

    pub fn visible_sections(&self) -> SmallVec<[usize; 4]> {
        (0..self.config.sections.len())
            .filter(|&i| self.is_visible(i))
            .collect()
    }

    /// Section the scroll position falls in, ignoring the margin.
    pub fn current_section(&self) -> Option<usize> {
        self.config
            .sections
            .iter()
            .position(|s| s.contains(self.progress, 0.0))
    }

    pub fn camera_z(&self) -> f32 {
        self.current_section()
            .map_or(CAMERA_Z, |i| self.config.sections[i].camera_z)
    }

    fn mount(&mut self, id: SimulationId) {
        let Some(spec) = self
            .config
            .sections
            .get(id.section as usize)
            .and_then(|s| s.simulations.get(id.slot as usize))
        else {
            return;
        };
        let count = self.tier.scale_count(spec.count);
        let seed = self.config.seed
            ^ (((id.section as u64) << 16) | id.slot as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let simulation = Simulation::from_requested(spec.profile.clone(), count, seed);
        log::info!(
            "[scene] mount {} ({} particles)",
            spec.label,
            simulation.len()
        );
        let publisher = InstancePublisher::new(simulation.len());
        self.mounted.insert(
            id,
            MountedSimulation {
                label: spec.label,
                simulation,
                publisher,
                offset: spec.offset,
                visual: spec.visual,
            },
        );
    }

    /// Mount anything newly visible, then step and publish every visible
    /// simulation. Returns how many simulations were stepped.
    pub fn frame(&mut self, input: &FrameInput<'_>) -> usize {
        let mut stepped = 0;
        for section in self.visible_sections() {
            let slots = self.config.sections[section].simulations.len();
            for slot in 0..slots {
                let id = SimulationId {
                    section: section as u16,
                    slot: slot as u16,
                };
                if !self.mounted.contains_key(&id) {
                    self.mount(id);
                }
                if let Some(m) = self.mounted.get_mut(&id) {
                    let MountedSimulation {
                        simulation,
                        publisher,
                        offset,
                        ..
                    } = m;
                    simulation.step(input).publish(publisher, *offset);
                    stepped += 1;
                }
            }
        }
        stepped
    }

    pub fn is_mounted(&self, id: SimulationId) -> bool {
        self.mounted.contains_key(&id)
    }

    pub fn mounted_count(&self) -> usize {
        self.mounted.len()
    }

    pub fn mounted_particles(&self) -> usize {
        self.mounted.values().map(|m| m.simulation.len()).sum()
    }

    pub fn get(&self, id: SimulationId) -> Option<&MountedSimulation> {
        self.mounted.get(&id)
    }

    /// Mounted simulations of visible sections, in draw order.
    pub fn visible_mut(&mut self) -> impl Iterator<Item = (SimulationId, &mut MountedSimulation)> {
        let visible = self.visible_sections();
        let mut items: Vec<_> = self
            .mounted
            .iter_mut()
            .filter(|(id, _)| visible.contains(&(id.section as usize)))
            .map(|(id, m)| (*id, m))
            .collect();
        items.sort_by_key(|(id, _)| *id);
        items.into_iter()
    }

    /// Drop every mounted simulation.
    pub fn teardown(&mut self) {
        if !self.mounted.is_empty() {
            log::info!("[scene] teardown ({} simulations)", self.mounted.len());
        }
        self.mounted.clear();
    }
}
