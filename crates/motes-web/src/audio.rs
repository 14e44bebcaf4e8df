//! WebAudio graph feeding the analyser: the microphone when the user grants
//! it, otherwise three silent oscillators pulsing on their own rhythm.

use motes_core::{
    glide_target_hz, pulse_gain, AudioError, RhythmClock, SpectrumSource, Waveform, FFT_SIZE,
    MAX_DECIBELS, MIN_DECIBELS, SMOOTHING_TIME_CONSTANT, SYNTHETIC_OSCILLATORS,
    SYNTH_GLIDE_SEC, SYNTH_MASTER_GAIN, SYNTH_PULSE_ATTACK_SEC, SYNTH_PULSE_BASE_GAIN,
    SYNTH_PULSE_RELEASE_END_SEC, SYNTH_RESTING_GAIN,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

fn js_err(e: JsValue) -> String {
    format!("{:?}", e)
}

struct Voice {
    oscillator: web::OscillatorNode,
    gain: web::GainNode,
}

enum Source {
    Microphone {
        stream: web::MediaStream,
        _node: web::MediaStreamAudioSourceNode,
    },
    Synthetic {
        voices: Vec<Voice>,
        _master: web::GainNode,
        rhythm: RhythmClock,
    },
}

pub struct WebAudio {
    ctx: web::AudioContext,
    analyser: web::AnalyserNode,
    source: Source,
}

/// Build the context and analyser. Fails only when WebAudio itself is
/// unusable; microphone refusal is reported by [`WebAudio::attach_microphone`].
pub fn open_context() -> Result<(web::AudioContext, web::AnalyserNode), AudioError> {
    let ctx =
        web::AudioContext::new().map_err(|e| AudioError::ContextUnavailable(js_err(e)))?;
    let analyser = ctx
        .create_analyser()
        .map_err(|e| AudioError::ContextUnavailable(js_err(e)))?;
    analyser.set_fft_size(FFT_SIZE as u32);
    analyser.set_smoothing_time_constant(SMOOTHING_TIME_CONSTANT as f64);
    analyser.set_min_decibels(MIN_DECIBELS as f64);
    analyser.set_max_decibels(MAX_DECIBELS as f64);
    Ok((ctx, analyser))
}

impl WebAudio {
    pub async fn attach_microphone(
        ctx: web::AudioContext,
        analyser: web::AnalyserNode,
    ) -> Result<Self, (AudioError, web::AudioContext, web::AnalyserNode)> {
        match request_microphone(&ctx, &analyser).await {
            Ok(source) => Ok(Self {
                ctx,
                analyser,
                source,
            }),
            Err(e) => Err((e, ctx, analyser)),
        }
    }

    pub fn attach_synthetic(
        ctx: web::AudioContext,
        analyser: web::AnalyserNode,
    ) -> Result<Self, AudioError> {
        let source = build_synthetic(&ctx, &analyser)
            .map_err(|e| AudioError::ContextUnavailable(js_err(e)))?;
        Ok(Self {
            ctx,
            analyser,
            source,
        })
    }

    /// Schedule gain pulses for oscillators whose beat came due.
    pub fn tick(&mut self) {
        if let Source::Synthetic { voices, rhythm, .. } = &mut self.source {
            let now = self.ctx.current_time();
            for i in rhythm.due(now) {
                if let Some(voice) = voices.get(i) {
                    schedule_pulse(&voice.gain, now);
                }
            }
        }
    }

    pub fn close(self) {
        match &self.source {
            Source::Microphone { stream, .. } => {
                for track in stream.get_tracks().iter() {
                    if let Ok(track) = track.dyn_into::<web::MediaStreamTrack>() {
                        track.stop();
                    }
                }
            }
            Source::Synthetic { voices, .. } => {
                for voice in voices {
                    let _ = voice.oscillator.stop();
                }
            }
        }
        let _ = self.analyser.disconnect();
        if let Err(e) = self.ctx.close() {
            log::warn!("[audio] close failed: {:?}", e);
        }
        log::info!("[audio] closed");
    }
}

impl SpectrumSource for WebAudio {
    fn bin_count(&self) -> usize {
        self.analyser.frequency_bin_count() as usize
    }

    fn fill_frequency(&mut self, out: &mut [u8]) {
        self.analyser.get_byte_frequency_data(out);
    }

    fn fill_time_domain(&mut self, out: &mut [u8]) {
        self.analyser.get_byte_time_domain_data(out);
    }
}

async fn request_microphone(
    ctx: &web::AudioContext,
    analyser: &web::AnalyserNode,
) -> Result<Source, AudioError> {
    let window = web::window().ok_or(AudioError::NoInputDevice)?;
    let devices = window
        .navigator()
        .media_devices()
        .map_err(|_| AudioError::NoInputDevice)?;
    let constraints = web::MediaStreamConstraints::new();
    constraints.set_audio(&JsValue::TRUE);
    let promise = devices
        .get_user_media_with_constraints(&constraints)
        .map_err(|e| AudioError::PermissionDenied(js_err(e)))?;
    let stream: web::MediaStream = JsFuture::from(promise)
        .await
        .map_err(|e| AudioError::PermissionDenied(js_err(e)))?
        .dyn_into()
        .map_err(|e| AudioError::Stream(js_err(e)))?;
    let node = ctx
        .create_media_stream_source(&stream)
        .map_err(|e| AudioError::Stream(js_err(e)))?;
    node.connect_with_audio_node(analyser)
        .map_err(|e| AudioError::Stream(js_err(e)))?;
    Ok(Source::Microphone {
        stream,
        _node: node,
    })
}

// The synthetic graph ends at the analyser and is never audible.
fn build_synthetic(ctx: &web::AudioContext, analyser: &web::AnalyserNode) -> Result<Source, JsValue> {
    let master = web::GainNode::new(ctx)?;
    master.gain().set_value(SYNTH_MASTER_GAIN);
    master.connect_with_audio_node(analyser)?;

    let now = ctx.current_time();
    let wall_seconds = js_sys::Date::now() / 1000.0;
    let mut voices = Vec::with_capacity(SYNTHETIC_OSCILLATORS.len());
    for (i, spec) in SYNTHETIC_OSCILLATORS.iter().enumerate() {
        let oscillator = web::OscillatorNode::new(ctx)?;
        oscillator.set_type(match spec.waveform {
            Waveform::Sine => web::OscillatorType::Sine,
            Waveform::Triangle => web::OscillatorType::Triangle,
            Waveform::Sawtooth => web::OscillatorType::Sawtooth,
        });
        let frequency = oscillator.frequency();
        frequency.set_value_at_time(spec.frequency_hz, now)?;
        frequency.exponential_ramp_to_value_at_time(
            glide_target_hz(spec, i, wall_seconds),
            now + SYNTH_GLIDE_SEC as f64,
        )?;
        let gain = web::GainNode::new(ctx)?;
        gain.gain().set_value(SYNTH_RESTING_GAIN);
        oscillator.connect_with_audio_node(&gain)?;
        gain.connect_with_audio_node(&master)?;
        oscillator.start()?;
        voices.push(Voice { oscillator, gain });
    }
    log::info!("[audio] synthetic signal with {} oscillators", voices.len());
    Ok(Source::Synthetic {
        voices,
        _master: master,
        rhythm: RhythmClock::new(now, SYNTHETIC_OSCILLATORS.len()),
    })
}

fn schedule_pulse(gain: &web::GainNode, now: f64) {
    let param = gain.gain();
    let _ = param.cancel_scheduled_values(now);
    let _ = param.set_value_at_time(SYNTH_PULSE_BASE_GAIN, now);
    let _ = param.exponential_ramp_to_value_at_time(
        pulse_gain(SYNTH_PULSE_ATTACK_SEC),
        now + SYNTH_PULSE_ATTACK_SEC as f64,
    );
    let _ = param.exponential_ramp_to_value_at_time(
        pulse_gain(SYNTH_PULSE_RELEASE_END_SEC),
        now + SYNTH_PULSE_RELEASE_END_SEC as f64,
    );
}
