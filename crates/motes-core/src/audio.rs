//! Audio feature extraction.
//!
//! The extractor owns a small state machine that tracks how far audio startup
//! has progressed and a reusable [`AudioSnapshot`] that is refilled from a
//! [`SpectrumSource`] once per animation frame. Only the frontends know how to
//! acquire a microphone or build oscillators; they report the outcome here.

use crate::constants::{BASS_BAND_END, FREQUENCY_BIN_COUNT, MID_BAND_END};
use crate::error::AudioError;

/// Volume and band means, each in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BandLevels {
    pub volume: f32,
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
}

/// Mean of all bins for `volume`; bass, mid and treble are means over the
/// bottom 10%, the next 40% and the remaining 50% of bins. Short spectra still
/// give bass and mid at least one bin each; a band left empty (fewer than three
/// bins) reports `volume`, so a uniform spectrum always yields uniform bands.
pub fn aggregate_bands(frequency: &[u8]) -> BandLevels {
    let len = frequency.len();
    let bass_end = ((len as f32 * BASS_BAND_END) as usize).max(1).min(len);
    let mid_end = ((len as f32 * MID_BAND_END) as usize)
        .max(bass_end + 1)
        .min(len);
    let volume = mean(frequency);
    let band = |bins: &[u8]| if bins.is_empty() { volume } else { mean(bins) };
    BandLevels {
        volume,
        bass: band(&frequency[..bass_end]),
        mid: band(&frequency[bass_end..mid_end]),
        treble: band(&frequency[mid_end..]),
    }
}

#[inline]
fn mean(bins: &[u8]) -> f32 {
    if bins.is_empty() {
        return 0.0;
    }
    let sum: u32 = bins.iter().map(|&b| b as u32).sum();
    sum as f32 / bins.len() as f32 / 255.0
}

/// One frame's worth of audio features. Reused across frames; consumers only
/// ever see it between two [`AudioFeatureExtractor::poll`] calls.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioSnapshot {
    pub frequency: Vec<u8>,
    pub time_domain: Vec<u8>,
    pub volume: f32,
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
}

impl AudioSnapshot {
    pub fn silent(bins: usize) -> Self {
        Self {
            frequency: vec![0; bins],
            time_domain: vec![128; bins],
            volume: 0.0,
            bass: 0.0,
            mid: 0.0,
            treble: 0.0,
        }
    }

    pub fn from_bytes(frequency: Vec<u8>, time_domain: Vec<u8>) -> Self {
        let mut snapshot = Self {
            frequency,
            time_domain,
            volume: 0.0,
            bass: 0.0,
            mid: 0.0,
            treble: 0.0,
        };
        snapshot.refresh_bands();
        snapshot
    }

    /// Recompute the scalar features from the byte arrays.
    pub fn refresh_bands(&mut self) {
        let levels = aggregate_bands(&self.frequency);
        self.volume = levels.volume;
        self.bass = levels.bass;
        self.mid = levels.mid;
        self.treble = levels.treble;
    }
}

/// Where analysed samples come from once audio is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioSourceKind {
    Microphone,
    Synthetic,
}

/// Audio startup progress.
///
/// `Uninitialized → Initializing → {MicrophoneActive | SyntheticFallback} → Analyzing`.
/// `Unavailable` is terminal and means no audio at all; consumers then run
/// with neutral modulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioPhase {
    Uninitialized,
    Initializing,
    MicrophoneActive,
    SyntheticFallback,
    Analyzing(AudioSourceKind),
    Unavailable,
}

impl AudioPhase {
    pub fn is_analyzing(self) -> bool {
        matches!(self, AudioPhase::Analyzing(_))
    }
}

/// Anything that can fill byte spectra the way a WebAudio `AnalyserNode` does.
pub trait SpectrumSource {
    fn bin_count(&self) -> usize;
    fn fill_frequency(&mut self, out: &mut [u8]);
    fn fill_time_domain(&mut self, out: &mut [u8]);
}

pub struct AudioFeatureExtractor {
    phase: AudioPhase,
    snapshot: AudioSnapshot,
}

impl Default for AudioFeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioFeatureExtractor {
    pub fn new() -> Self {
        Self {
            phase: AudioPhase::Uninitialized,
            snapshot: AudioSnapshot::silent(FREQUENCY_BIN_COUNT),
        }
    }

    pub fn phase(&self) -> AudioPhase {
        self.phase
    }

    /// First user gesture. Returns `true` when the caller should start
    /// acquiring audio; later gestures are ignored.
    pub fn on_gesture(&mut self) -> bool {
        if self.phase != AudioPhase::Uninitialized {
            return false;
        }
        log::info!("[audio] gesture received; initializing");
        self.phase = AudioPhase::Initializing;
        true
    }

    pub fn on_microphone_granted(&mut self) {
        if self.phase == AudioPhase::Initializing {
            log::info!("[audio] microphone active");
            self.phase = AudioPhase::MicrophoneActive;
        }
    }

    /// Degrade to the synthetic signal. Not an error for the caller.
    pub fn on_microphone_denied(&mut self, err: &AudioError) {
        if self.phase == AudioPhase::Initializing {
            log::warn!("[audio] {err}; falling back to synthetic signal");
            self.phase = AudioPhase::SyntheticFallback;
        }
    }

    /// The analyser is wired to a source; polling starts producing snapshots.
    pub fn on_analyser_ready(&mut self) {
        let source = match self.phase {
            AudioPhase::MicrophoneActive => AudioSourceKind::Microphone,
            AudioPhase::SyntheticFallback => AudioSourceKind::Synthetic,
            other => {
                log::debug!("[audio] analyser ready ignored in phase {:?}", other);
                return;
            }
        };
        log::info!("[audio] analysing {:?} input", source);
        self.phase = AudioPhase::Analyzing(source);
    }

    /// No audio graph could be built at all.
    pub fn on_unavailable(&mut self, err: &AudioError) {
        log::warn!("[audio] {err}; continuing without audio");
        self.phase = AudioPhase::Unavailable;
    }

    /// Back to the start, e.g. after the audio graph was closed on unmount.
    pub fn reset(&mut self) {
        self.phase = AudioPhase::Uninitialized;
    }

    /// Refill the snapshot from `source` when analysing. `None` means the
    /// frame runs with neutral modulation.
    pub fn poll(&mut self, source: Option<&mut dyn SpectrumSource>) -> Option<&AudioSnapshot> {
        if !self.phase.is_analyzing() {
            return None;
        }
        let source = source?;
        let bins = source.bin_count();
        if self.snapshot.frequency.len() != bins {
            self.snapshot.frequency.resize(bins, 0);
            self.snapshot.time_domain.resize(bins, 128);
        }
        source.fill_frequency(&mut self.snapshot.frequency);
        source.fill_time_domain(&mut self.snapshot.time_domain);
        self.snapshot.refresh_bands();
        Some(&self.snapshot)
    }

    /// The most recent snapshot when analysing.
    pub fn snapshot(&self) -> Option<&AudioSnapshot> {
        self.phase.is_analyzing().then_some(&self.snapshot)
    }
}
