//! Device quality tiers and the particle budget each one allows.

use crate::constants::{
    ASSUMED_DEVICE_MEMORY_GB, FPS_SAMPLE_FRAMES, HIGH_PARTICLE_BUDGET, HIGH_TIER_MIN_FPS,
    HIGH_TIER_MIN_MEMORY_GB, LOW_PARTICLE_BUDGET, MEDIUM_PARTICLE_BUDGET, MEDIUM_TIER_MIN_FPS,
    MEDIUM_TIER_MIN_MEMORY_GB,
};
use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum QualityTier {
    Low,
    Medium,
    #[default]
    High,
}

/// What the platform reports about itself. Missing values are `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DeviceHints {
    pub device_memory_gb: Option<f32>,
    pub mobile: bool,
}

const MOBILE_AGENT_MARKERS: [&str; 7] = [
    "android",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

impl DeviceHints {
    /// Case-insensitive match on the handset families browsers advertise.
    pub fn is_mobile_user_agent(user_agent: &str) -> bool {
        let ua = user_agent.to_ascii_lowercase();
        MOBILE_AGENT_MARKERS.iter().any(|m| ua.contains(m))
    }
}

impl QualityTier {
    /// Total particles across all mounted simulations.
    pub fn particle_budget(self) -> usize {
        match self {
            QualityTier::High => HIGH_PARTICLE_BUDGET,
            QualityTier::Medium => MEDIUM_PARTICLE_BUDGET,
            QualityTier::Low => LOW_PARTICLE_BUDGET,
        }
    }

    /// Multiplier applied to configured counts; high keeps them as written.
    pub fn count_scale(self) -> f32 {
        self.particle_budget() as f32 / HIGH_PARTICLE_BUDGET as f32
    }

    pub fn scale_count(self, requested: i64) -> i64 {
        if requested <= 0 {
            return requested;
        }
        ((requested as f64) * self.count_scale() as f64).round() as i64
    }

    pub fn from_fps(fps: f32) -> Self {
        if !fps.is_finite() || fps < MEDIUM_TIER_MIN_FPS {
            QualityTier::Low
        } else if fps < HIGH_TIER_MIN_FPS {
            QualityTier::Medium
        } else {
            QualityTier::High
        }
    }

    pub fn from_hints(hints: &DeviceHints) -> Self {
        let memory = hints.device_memory_gb.unwrap_or(ASSUMED_DEVICE_MEMORY_GB);
        if hints.mobile || memory < MEDIUM_TIER_MIN_MEMORY_GB {
            QualityTier::Low
        } else if memory < HIGH_TIER_MIN_MEMORY_GB {
            QualityTier::Medium
        } else {
            QualityTier::High
        }
    }

    /// The more conservative of two tiers.
    pub fn combine(self, other: QualityTier) -> QualityTier {
        self.min(other)
    }

    pub fn label(self) -> &'static str {
        match self {
            QualityTier::High => "high",
            QualityTier::Medium => "medium",
            QualityTier::Low => "low",
        }
    }
}

impl std::str::FromStr for QualityTier {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(QualityTier::Low),
            "medium" => Ok(QualityTier::Medium),
            "high" => Ok(QualityTier::High),
            _ => Err(ConfigError::InvalidQualityTier(s.to_string())),
        }
    }
}

/// Averages frame rate over fixed windows of frames.
#[derive(Clone, Debug)]
pub struct FpsMeter {
    window: u32,
    frames: u32,
    seconds: f32,
    last_fps: Option<f32>,
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self::new(FPS_SAMPLE_FRAMES)
    }
}

impl FpsMeter {
    pub fn new(window: u32) -> Self {
        Self {
            window: window.max(1),
            frames: 0,
            seconds: 0.0,
            last_fps: None,
        }
    }

    /// Record one frame. Returns the new average when a window completes.
    pub fn record(&mut self, dt: f32) -> Option<f32> {
        if dt.is_finite() && dt > 0.0 {
            self.seconds += dt;
        }
        self.frames += 1;
        if self.frames < self.window {
            return None;
        }
        let fps = if self.seconds > 0.0 {
            self.frames as f32 / self.seconds
        } else {
            0.0
        };
        self.frames = 0;
        self.seconds = 0.0;
        self.last_fps = Some(fps);
        Some(fps)
    }

    pub fn last_fps(&self) -> Option<f32> {
        self.last_fps
    }
}
