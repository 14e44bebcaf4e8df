//! Error types for configuration and audio acquisition.
//!
//! None of these are fatal. Configuration errors are clamped to a safe default
//! and logged; audio errors move the extractor onto the synthetic fallback.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid color {0:?}: expected #rgb or #rrggbb")]
    InvalidColor(String),

    #[error("invalid particle count {requested}: clamped to {clamped}")]
    InvalidCount { requested: i64, clamped: usize },

    #[error("section {0:?} has an empty or inverted scroll range")]
    InvalidScrollRange(String),

    #[error("unknown quality tier {0:?}: expected low, medium or high")]
    InvalidQualityTier(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AudioError {
    #[error("audio context unavailable: {0}")]
    ContextUnavailable(String),

    #[error("microphone permission denied: {0}")]
    PermissionDenied(String),

    #[error("no audio input device")]
    NoInputDevice,

    #[error("audio stream failed: {0}")]
    Stream(String),
}
