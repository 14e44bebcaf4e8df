//! Software spectrum analyser producing the same byte spectra as a browser
//! `AnalyserNode`, for audio sources outside the browser.

use crate::audio::SpectrumSource;
use crate::constants::{FFT_SIZE, MAX_DECIBELS, MIN_DECIBELS, SMOOTHING_TIME_CONSTANT};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnalyserConfig {
    /// Power of two; `fft_size / 2` bins are produced.
    pub fft_size: usize,
    /// Weight of the previous frame in `[0, 1)`.
    pub smoothing: f32,
    pub min_decibels: f32,
    pub max_decibels: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: FFT_SIZE,
            smoothing: SMOOTHING_TIME_CONSTANT,
            min_decibels: MIN_DECIBELS,
            max_decibels: MAX_DECIBELS,
        }
    }
}

pub struct SpectrumAnalyser {
    config: AnalyserConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    /// Ring of the most recent `fft_size` samples; `write` is the oldest.
    history: Vec<f32>,
    write: usize,
    spectrum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl SpectrumAnalyser {
    pub fn new(config: AnalyserConfig) -> Self {
        let n = config.fft_size.max(32).next_power_of_two();
        let config = AnalyserConfig {
            fft_size: n,
            smoothing: config.smoothing.clamp(0.0, 1.0),
            ..config
        };
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        Self {
            config,
            fft,
            window: (0..n).map(|i| blackman_window(i, n)).collect(),
            history: vec![0.0; n],
            write: 0,
            spectrum: vec![Complex::new(0.0, 0.0); n],
            scratch,
            smoothed: vec![0.0; n / 2],
        }
    }

    pub fn config(&self) -> &AnalyserConfig {
        &self.config
    }

    /// Append mono samples in `[-1, 1]`.
    pub fn push_samples(&mut self, samples: &[f32]) {
        let n = self.history.len();
        for &s in samples {
            self.history[self.write] = if s.is_finite() { s } else { 0.0 };
            self.write = (self.write + 1) % n;
        }
    }

    /// Append interleaved frames, averaging channels to mono.
    pub fn push_interleaved(&mut self, data: &[f32], channels: usize) {
        let channels = channels.max(1);
        let n = self.history.len();
        for frame in data.chunks(channels) {
            let mono = frame.iter().sum::<f32>() / frame.len() as f32;
            self.history[self.write] = if mono.is_finite() { mono } else { 0.0 };
            self.write = (self.write + 1) % n;
        }
    }

    #[inline]
    fn sample(&self, i: usize) -> f32 {
        self.history[(self.write + i) % self.history.len()]
    }

    /// Window, transform and fold the newest block into the smoothed magnitudes.
    fn analyse(&mut self) {
        let n = self.history.len();
        for i in 0..n {
            self.spectrum[i] = Complex::new(self.sample(i) * self.window[i], 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.spectrum, &mut self.scratch);
        let tau = self.config.smoothing;
        let scale = 1.0 / n as f32;
        for (k, smoothed) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.spectrum[k].norm() * scale;
            let next = tau * *smoothed + (1.0 - tau) * magnitude;
            *smoothed = if next.is_finite() { next } else { 0.0 };
        }
    }

    /// Map a linear magnitude onto `0..=255` across the decibel range.
    pub fn magnitude_to_byte(&self, magnitude: f32) -> u8 {
        if magnitude <= 0.0 {
            return 0;
        }
        let db = 20.0 * magnitude.log10();
        let range = self.config.max_decibels - self.config.min_decibels;
        if range <= 0.0 {
            return 0;
        }
        let scaled = (db - self.config.min_decibels) * 255.0 / range;
        scaled.clamp(0.0, 255.0) as u8
    }
}

impl Default for SpectrumAnalyser {
    fn default() -> Self {
        Self::new(AnalyserConfig::default())
    }
}

impl SpectrumSource for SpectrumAnalyser {
    fn bin_count(&self) -> usize {
        self.smoothed.len()
    }

    fn fill_frequency(&mut self, out: &mut [u8]) {
        self.analyse();
        for (k, byte) in out.iter_mut().enumerate() {
            *byte = self
                .smoothed
                .get(k)
                .map_or(0, |&m| self.magnitude_to_byte(m));
        }
    }

    fn fill_time_domain(&mut self, out: &mut [u8]) {
        let n = self.history.len();
        let start = n.saturating_sub(out.len());
        for (i, byte) in out.iter_mut().enumerate() {
            let s = if start + i < n { self.sample(start + i) } else { 0.0 };
            *byte = (128.0 * (1.0 + s)).clamp(0.0, 255.0) as u8;
        }
    }
}

/// Blackman window (alpha 0.16), as used by the browser analyser.
pub fn blackman_window(index: usize, size: usize) -> f32 {
    let a0 = 0.42;
    let a1 = 0.5;
    let a2 = 0.08;
    let x = index as f32 / size as f32;
    a0 - a1 * (2.0 * PI * x).cos() + a2 * (4.0 * PI * x).cos()
}
