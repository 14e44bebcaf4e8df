// Host-side tests for audio feature extraction, the software analyser and the
// synthetic fallback signal.

use motes_core::*;
use std::f32::consts::TAU;

#[test]
fn saturated_spectrum_aggregates_to_one() {
    let levels = aggregate_bands(&[255; 256]);
    assert_eq!(levels.volume, 1.0);
    assert_eq!(levels.bass, 1.0);
    assert_eq!(levels.mid, 1.0);
    assert_eq!(levels.treble, 1.0);
}

#[test]
fn silent_spectrum_aggregates_to_zero() {
    let levels = aggregate_bands(&[0; 256]);
    assert_eq!(levels, BandLevels::default());
}

#[test]
fn bands_split_ten_forty_fifty() {
    let mut bins = vec![0u8; 100];
    bins[..10].fill(255);
    let levels = aggregate_bands(&bins);
    assert_eq!(levels.bass, 1.0);
    assert_eq!(levels.mid, 0.0);
    assert_eq!(levels.treble, 0.0);
    assert!((levels.volume - 0.1).abs() < 1e-6);

    let mut bins = vec![0u8; 100];
    bins[50..].fill(255);
    let levels = aggregate_bands(&bins);
    assert_eq!(levels.treble, 1.0);
    assert_eq!(levels.mid, 0.0);
}

#[test]
fn uniform_spectra_give_uniform_bands_at_any_length() {
    assert_eq!(aggregate_bands(&[]), BandLevels::default());
    for len in 1..=12 {
        let levels = aggregate_bands(&vec![255; len]);
        assert_eq!(levels.volume, 1.0, "len {len}");
        assert_eq!(levels.bass, 1.0, "len {len}");
        assert_eq!(levels.mid, 1.0, "len {len}");
        assert_eq!(levels.treble, 1.0, "len {len}");
        assert_eq!(aggregate_bands(&vec![0; len]), BandLevels::default());
    }
}

#[test]
fn short_spectra_keep_one_bin_per_low_band() {
    // 5 bins: bass is bin 0, mid is bin 1, treble is bins 2..5
    let levels = aggregate_bands(&[255, 0, 0, 0, 0]);
    assert_eq!(levels.bass, 1.0);
    assert_eq!(levels.mid, 0.0);
    assert_eq!(levels.treble, 0.0);

    let levels = aggregate_bands(&[0, 255, 0, 0, 0]);
    assert_eq!(levels.bass, 0.0);
    assert_eq!(levels.mid, 1.0);

    // 2 bins: treble has nothing of its own and follows volume
    let levels = aggregate_bands(&[255, 0]);
    assert_eq!(levels.bass, 1.0);
    assert_eq!(levels.mid, 0.0);
    assert!((levels.treble - 0.5).abs() < 1e-6);
}

struct Constant(u8);

impl SpectrumSource for Constant {
    fn bin_count(&self) -> usize {
        64
    }
    fn fill_frequency(&mut self, out: &mut [u8]) {
        out.fill(self.0);
    }
    fn fill_time_domain(&mut self, out: &mut [u8]) {
        out.fill(128);
    }
}

#[test]
fn extractor_follows_the_startup_state_machine() {
    let mut audio = AudioFeatureExtractor::new();
    assert_eq!(audio.phase(), AudioPhase::Uninitialized);
    assert!(audio.on_gesture());
    assert!(!audio.on_gesture());
    assert_eq!(audio.phase(), AudioPhase::Initializing);

    audio.on_microphone_denied(&AudioError::PermissionDenied("NotAllowedError".into()));
    assert_eq!(audio.phase(), AudioPhase::SyntheticFallback);
    audio.on_analyser_ready();
    assert_eq!(
        audio.phase(),
        AudioPhase::Analyzing(AudioSourceKind::Synthetic)
    );
}

#[test]
fn microphone_path_reaches_analyzing() {
    let mut audio = AudioFeatureExtractor::new();
    audio.on_gesture();
    audio.on_microphone_granted();
    assert_eq!(audio.phase(), AudioPhase::MicrophoneActive);
    audio.on_analyser_ready();
    assert!(audio.phase().is_analyzing());
}

#[test]
fn poll_is_neutral_until_analyzing() {
    let mut audio = AudioFeatureExtractor::new();
    let mut source = Constant(255);
    assert!(audio.poll(Some(&mut source)).is_none());
    assert!(audio.snapshot().is_none());

    audio.on_gesture();
    audio.on_microphone_granted();
    audio.on_analyser_ready();
    assert!(audio.poll(None).is_none());
    let snapshot = audio.poll(Some(&mut source)).expect("analysing");
    assert_eq!(snapshot.frequency.len(), 64);
    assert_eq!(snapshot.volume, 1.0);
}

#[test]
fn unavailable_is_terminal_until_reset() {
    let mut audio = AudioFeatureExtractor::new();
    audio.on_gesture();
    audio.on_unavailable(&AudioError::ContextUnavailable("no AudioContext".into()));
    assert_eq!(audio.phase(), AudioPhase::Unavailable);
    assert!(!audio.on_gesture());
    audio.on_analyser_ready();
    assert_eq!(audio.phase(), AudioPhase::Unavailable);
    audio.reset();
    assert!(audio.on_gesture());
}

#[test]
fn analyser_places_a_low_tone_in_the_bass_band() {
    let mut analyser = SpectrumAnalyser::default();
    let sample_rate = 48_000.0;
    // bin width is 48000 / 512 = 93.75 Hz; 281.25 Hz lands on bin 3
    let freq = 281.25;
    let samples: Vec<f32> = (0..4096)
        .map(|i| (TAU * freq * i as f32 / sample_rate).sin() * 0.01)
        .collect();
    let mut bins = vec![0u8; analyser.bin_count()];
    for chunk in samples.chunks(512) {
        analyser.push_samples(chunk);
        analyser.fill_frequency(&mut bins);
    }
    let peak = bins
        .iter()
        .enumerate()
        .max_by_key(|(_, b)| **b)
        .map(|(i, _)| i)
        .unwrap_or_default();
    assert_eq!(peak, 3);
    let levels = aggregate_bands(&bins);
    assert!(levels.bass > levels.treble);
}

#[test]
fn analyser_silence_is_zero() {
    let mut analyser = SpectrumAnalyser::default();
    analyser.push_samples(&[0.0; 512]);
    let mut bins = vec![1u8; 256];
    analyser.fill_frequency(&mut bins);
    assert!(bins.iter().all(|&b| b == 0));
    let mut wave = vec![0u8; 256];
    analyser.fill_time_domain(&mut wave);
    assert!(wave.iter().all(|&b| b == 128));
}

#[test]
fn pulse_gain_ramps_up_then_back_down() {
    assert!((pulse_gain(0.0) - SYNTH_PULSE_BASE_GAIN).abs() < 1e-6);
    assert!((pulse_gain(SYNTH_PULSE_ATTACK_SEC) - SYNTH_PULSE_PEAK_GAIN).abs() < 1e-4);
    assert!(pulse_gain(0.05) > SYNTH_PULSE_BASE_GAIN && pulse_gain(0.05) < SYNTH_PULSE_PEAK_GAIN);
    assert!(pulse_gain(0.3) < pulse_gain(0.15));
    assert!((pulse_gain(0.6) - SYNTH_PULSE_BASE_GAIN).abs() < 1e-6);
}

#[test]
fn rhythm_clock_fires_each_oscillator_on_its_period() {
    let mut clock = RhythmClock::new(0.0, 3);
    assert!(clock.due(0.5).is_empty());
    assert_eq!(clock.due(1.0).as_slice(), &[0]);
    assert_eq!(clock.due(1.25).as_slice(), &[1]);
    assert_eq!(clock.due(1.45).as_slice(), &[2]);
    assert_eq!(clock.due(2.0).as_slice(), &[0]);
    // a long stall fires once per oscillator, not a backlog
    assert_eq!(clock.due(30.0).len(), 3);
    assert!(clock.due(30.01).is_empty());
}

#[test]
fn synthetic_signal_is_bounded_and_feeds_the_analyser() {
    let mut signal = SyntheticSignal::new(44_100.0, 0.0);
    let mut buf = vec![0.0f32; 44_100];
    signal.render(&mut buf);
    assert!(buf.iter().all(|s| s.is_finite() && s.abs() <= SYNTH_MASTER_GAIN));
    assert!((signal.elapsed() - 1.0).abs() < 1e-3);

    let mut analyser = SpectrumAnalyser::default();
    analyser.push_samples(&buf[buf.len() - 512..]);
    let mut bins = vec![0u8; 256];
    analyser.fill_frequency(&mut bins);
    assert!(aggregate_bands(&bins).volume > 0.0);
}
