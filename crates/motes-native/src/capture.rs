//! Native audio input. The default input device feeds a shared analyser from
//! the cpal callback; without one the synthetic signal is rendered on the
//! frame thread instead.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use motes_core::{
    AnalyserConfig, AudioError, AudioSourceKind, SpectrumAnalyser, SpectrumSource,
    SyntheticSignal, FFT_SIZE,
};
use std::sync::{Arc, Mutex, PoisonError};

const SYNTHETIC_SAMPLE_RATE: f32 = 44_100.0;

pub enum Capture {
    Microphone {
        analyser: Arc<Mutex<SpectrumAnalyser>>,
        _stream: cpal::Stream,
    },
    Synthetic {
        analyser: SpectrumAnalyser,
        signal: SyntheticSignal,
        scratch: Vec<f32>,
    },
}

impl Capture {
    pub fn open_microphone() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_input_device().ok_or(AudioError::NoInputDevice)?;
        let supported = device
            .default_input_config()
            .map_err(|e| AudioError::Stream(e.to_string()))?;
        let channels = supported.channels() as usize;
        let analyser = Arc::new(Mutex::new(SpectrumAnalyser::new(AnalyserConfig::default())));
        let config: cpal::StreamConfig = supported.config();

        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => {
                build_input::<f32>(&device, &config, channels, Arc::clone(&analyser))
            }
            cpal::SampleFormat::I16 => {
                build_input::<i16>(&device, &config, channels, Arc::clone(&analyser))
            }
            cpal::SampleFormat::U16 => {
                build_input::<u16>(&device, &config, channels, Arc::clone(&analyser))
            }
            other => {
                return Err(AudioError::Stream(format!("unsupported sample format {other:?}")))
            }
        }
        .map_err(|e| AudioError::Stream(e.to_string()))?;
        stream
            .play()
            .map_err(|e| AudioError::Stream(e.to_string()))?;
        log::info!(
            "[audio] input {} @ {} Hz x{}",
            device.name().unwrap_or_else(|_| "unknown".into()),
            config.sample_rate.0,
            channels
        );
        Ok(Capture::Microphone {
            analyser,
            _stream: stream,
        })
    }

    pub fn synthetic(wall_seconds: f64) -> Self {
        Capture::Synthetic {
            analyser: SpectrumAnalyser::new(AnalyserConfig::default()),
            signal: SyntheticSignal::new(SYNTHETIC_SAMPLE_RATE, wall_seconds),
            scratch: Vec::with_capacity(FFT_SIZE * 4),
        }
    }

    pub fn kind(&self) -> AudioSourceKind {
        match self {
            Capture::Microphone { .. } => AudioSourceKind::Microphone,
            Capture::Synthetic { .. } => AudioSourceKind::Synthetic,
        }
    }

    /// Render `dt` seconds of the synthetic signal into its analyser. The
    /// microphone fills its analyser from the audio thread.
    pub fn advance(&mut self, dt: f32) {
        if let Capture::Synthetic {
            analyser,
            signal,
            scratch,
        } = self
        {
            let samples = ((dt.max(0.0) * signal.sample_rate()) as usize).min(FFT_SIZE * 4);
            scratch.resize(samples, 0.0);
            signal.render(&mut scratch[..]);
            analyser.push_samples(&scratch[..]);
        }
    }

    fn with_analyser<R>(&mut self, f: impl FnOnce(&mut SpectrumAnalyser) -> R) -> R {
        match self {
            Capture::Microphone { analyser, .. } => {
                let mut guard = analyser.lock().unwrap_or_else(PoisonError::into_inner);
                f(&mut guard)
            }
            Capture::Synthetic { analyser, .. } => f(analyser),
        }
    }
}

impl SpectrumSource for Capture {
    fn bin_count(&self) -> usize {
        match self {
            Capture::Microphone { analyser, .. } => analyser
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .bin_count(),
            Capture::Synthetic { analyser, .. } => analyser.bin_count(),
        }
    }

    fn fill_frequency(&mut self, out: &mut [u8]) {
        self.with_analyser(|a| a.fill_frequency(out));
    }

    fn fill_time_domain(&mut self, out: &mut [u8]) {
        self.with_analyser(|a| a.fill_time_domain(out));
    }
}

fn build_input<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    analyser: Arc<Mutex<SpectrumAnalyser>>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let mut converted: Vec<f32> = Vec::new();
    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            converted.clear();
            converted.extend(data.iter().map(|&s| s.to_sample::<f32>()));
            analyser
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_interleaved(&converted, channels);
        },
        |err| log::error!("[audio] input stream error: {err}"),
        None,
    )
}
