//! Synthetic fallback signal used when no microphone is available.
//!
//! Three oscillators cover the bass, mid and treble bands. Each one pulses its
//! gain on its own period and glides upward in pitch over the first seconds.
//! The web frontend schedules these parameters on real oscillator nodes;
//! [`SyntheticSignal`] renders the same thing as samples.

use smallvec::SmallVec;
use std::f32::consts::TAU;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Sawtooth,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OscillatorSpec {
    pub frequency_hz: f32,
    pub waveform: Waveform,
}

pub const SYNTHETIC_OSCILLATORS: [OscillatorSpec; 3] = [
    OscillatorSpec {
        frequency_hz: 60.0,
        waveform: Waveform::Sine,
    }, // bass
    OscillatorSpec {
        frequency_hz: 200.0,
        waveform: Waveform::Triangle,
    }, // mid
    OscillatorSpec {
        frequency_hz: 800.0,
        waveform: Waveform::Sawtooth,
    }, // treble
];

pub const SYNTH_MASTER_GAIN: f32 = 0.1;
pub const SYNTH_RESTING_GAIN: f32 = 0.3 / SYNTHETIC_OSCILLATORS.len() as f32;
pub const SYNTH_PULSE_BASE_GAIN: f32 = 0.1;
pub const SYNTH_PULSE_PEAK_GAIN: f32 = 0.3;
pub const SYNTH_PULSE_ATTACK_SEC: f32 = 0.1;
pub const SYNTH_PULSE_RELEASE_END_SEC: f32 = 0.5;
pub const SYNTH_GLIDE_SEC: f32 = 2.0;

/// Seconds between gain pulses for oscillator `index`.
#[inline]
pub fn rhythm_period_sec(index: usize) -> f32 {
    1.0 + index as f32 * 0.2
}

/// Pitch the oscillator glides to; `wall_seconds` seeds the small variation.
#[inline]
pub fn glide_target_hz(spec: &OscillatorSpec, index: usize, wall_seconds: f64) -> f32 {
    spec.frequency_hz * (1.2 + ((wall_seconds + index as f64).sin() as f32) * 0.1)
}

/// Gain `since` seconds after a pulse: exponential rise to the peak, then an
/// exponential fall back to the base.
pub fn pulse_gain(since: f32) -> f32 {
    let (base, peak) = (SYNTH_PULSE_BASE_GAIN, SYNTH_PULSE_PEAK_GAIN);
    if since <= 0.0 {
        base
    } else if since < SYNTH_PULSE_ATTACK_SEC {
        exp_ramp(base, peak, since / SYNTH_PULSE_ATTACK_SEC)
    } else if since < SYNTH_PULSE_RELEASE_END_SEC {
        let t = (since - SYNTH_PULSE_ATTACK_SEC)
            / (SYNTH_PULSE_RELEASE_END_SEC - SYNTH_PULSE_ATTACK_SEC);
        exp_ramp(peak, base, t)
    } else {
        base
    }
}

#[inline]
fn exp_ramp(from: f32, to: f32, t: f32) -> f32 {
    from * (to / from).powf(t.clamp(0.0, 1.0))
}

/// Decides when each oscillator's next gain pulse is due. Polled from the
/// frame loop instead of running timers.
#[derive(Clone, Debug)]
pub struct RhythmClock {
    next_due: SmallVec<[f64; 3]>,
}

impl RhythmClock {
    pub fn new(start_time: f64, oscillators: usize) -> Self {
        Self {
            next_due: (0..oscillators)
                .map(|i| start_time + rhythm_period_sec(i) as f64)
                .collect(),
        }
    }

    /// Oscillators whose pulse is due at `now`. A late poll fires once and
    /// reschedules from `now`, so stalls never produce a burst.
    pub fn due(&mut self, now: f64) -> SmallVec<[usize; 3]> {
        let mut fired = SmallVec::new();
        for (i, next) in self.next_due.iter_mut().enumerate() {
            if now >= *next {
                fired.push(i);
                let period = rhythm_period_sec(i) as f64;
                *next += period;
                if *next <= now {
                    *next = now + period;
                }
            }
        }
        fired
    }
}

/// Sample-accurate rendition of the fallback signal.
#[derive(Clone, Debug)]
pub struct SyntheticSignal {
    sample_rate: f32,
    phases: [f32; 3],
    glide_targets: [f32; 3],
    sample_index: u64,
}

impl SyntheticSignal {
    pub fn new(sample_rate: f32, wall_seconds: f64) -> Self {
        let mut glide_targets = [0.0; 3];
        for (i, spec) in SYNTHETIC_OSCILLATORS.iter().enumerate() {
            glide_targets[i] = glide_target_hz(spec, i, wall_seconds);
        }
        Self {
            sample_rate: sample_rate.max(1.0),
            phases: [0.0; 3],
            glide_targets,
            sample_index: 0,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Seconds rendered so far.
    pub fn elapsed(&self) -> f32 {
        self.sample_index as f32 / self.sample_rate
    }

    fn frequency_at(&self, index: usize, t: f32) -> f32 {
        let start = SYNTHETIC_OSCILLATORS[index].frequency_hz;
        exp_ramp(start, self.glide_targets[index], t / SYNTH_GLIDE_SEC)
    }

    fn gain_at(index: usize, t: f32) -> f32 {
        let period = rhythm_period_sec(index);
        if t < period {
            SYNTH_RESTING_GAIN
        } else {
            pulse_gain(t % period)
        }
    }

    /// Fill `out` with mono samples.
    pub fn render(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            let t = self.elapsed();
            let mut mix = 0.0;
            for (i, spec) in SYNTHETIC_OSCILLATORS.iter().enumerate() {
                let phase = self.phases[i];
                mix += waveform_sample(spec.waveform, phase) * Self::gain_at(i, t);
                self.phases[i] = (phase + self.frequency_at(i, t) / self.sample_rate).fract();
            }
            *sample = mix * SYNTH_MASTER_GAIN;
            self.sample_index += 1;
        }
    }
}

/// One sample at `phase` cycles in `[0, 1)`.
pub fn waveform_sample(waveform: Waveform, phase: f32) -> f32 {
    match waveform {
        Waveform::Sine => (phase * TAU).sin(),
        Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        Waveform::Sawtooth => 2.0 * phase - 1.0,
    }
}
