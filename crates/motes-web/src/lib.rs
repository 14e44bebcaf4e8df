#![cfg(target_arch = "wasm32")]
mod audio;
mod dom;
mod events;
mod frame;

use anyhow::anyhow;
use audio::WebAudio;
use frame::AnimationLoop;
use glam::Vec2;
use motes_core::{
    AudioFeatureExtractor, AudioPhase, Camera, FpsMeter, FrameClock, FrameInput, PointerState,
    QualityTier, SceneConfig, SceneDriver, SpectrumSource,
};
use motes_render::SurfaceRenderer;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

const CANVAS_ID: &str = "motes-canvas";

thread_local! {
    static MOUNTED: RefCell<Option<Mounted>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("motes-web starting");

    spawn_local(async move {
        if let Err(e) = mount().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

/// Stop the frame loop, detach listeners, close audio and drop every
/// simulation. Safe to call when nothing is mounted.
#[wasm_bindgen]
pub fn unmount() {
    if let Some(mounted) = MOUNTED.with(|m| m.borrow_mut().take()) {
        mounted.unmount();
    }
}

pub(crate) struct App {
    pub(crate) canvas: web::HtmlCanvasElement,
    pub(crate) scene: SceneDriver,
    pub(crate) clock: FrameClock,
    pub(crate) pointer_ndc: Option<Vec2>,
    gpu: SurfaceRenderer<'static>,
    camera: Camera,
    fps: FpsMeter,
    device_tier: QualityTier,
    extractor: AudioFeatureExtractor,
    audio: Option<WebAudio>,
}

impl App {
    fn frame(&mut self) {
        let time = self.clock.tick();
        if let Some(fps) = self.fps.record(time.dt) {
            let tier = self.device_tier.combine(QualityTier::from_fps(fps));
            if tier != self.scene.tier() {
                log::info!("[quality] {:.1} fps -> {}", fps, tier.label());
                self.scene.set_tier(tier);
            }
        }
        if let Some(audio) = self.audio.as_mut() {
            audio.tick();
        }

        let (width, height) = (self.canvas.width(), self.canvas.height());
        self.gpu.resize(width, height);
        let (width, height) = self.gpu.size();
        self.camera.set_viewport(width, height);
        self.camera.eye.z = self.scene.camera_z();

        let pointer = self
            .pointer_ndc
            .map(|ndc| PointerState::from_ndc(ndc, &self.camera));
        let source = self.audio.as_mut().map(|a| a as &mut dyn SpectrumSource);
        let snapshot = self.extractor.poll(source);
        let input = FrameInput::new(time.dt, time.elapsed)
            .with_audio(snapshot)
            .with_pointer(pointer);
        self.scene.frame(&input);

        match self.gpu.render(&mut self.scene, &self.camera) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("[gpu] surface lost; reconfiguring");
                self.gpu.reconfigure();
            }
            Err(e) => log::error!("render error: {:?}", e),
        }
    }
}

struct Mounted {
    app: Rc<RefCell<App>>,
    frames: AnimationLoop,
    listeners: Vec<dom::Listener>,
}

impl Mounted {
    fn unmount(self) {
        self.frames.stop();
        drop(self.listeners);
        let mut app = self.app.borrow_mut();
        if let Some(audio) = app.audio.take() {
            audio.close();
        }
        app.extractor.reset();
        app.scene.teardown();
        app.gpu.clear();
        log::info!("motes-web unmounted");
    }
}

async fn mount() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow!("no window"))?;
    let document = window.document().ok_or_else(|| anyhow!("no document"))?;
    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| anyhow!("missing #{}", CANVAS_ID))?
        .dyn_into()
        .map_err(|e| anyhow!("{:?}", e))?;
    dom::sync_canvas_backing_size(&canvas);

    let hints = dom::device_hints(&window);
    let device_tier = QualityTier::from_hints(&hints);
    log::info!("[quality] {:?} -> {}", hints, device_tier.label());

    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
    let gpu = SurfaceRenderer::new(&instance, surface, canvas.width(), canvas.height())
        .await
        .map_err(|e| anyhow!("{e}"))?;
    let mut scene = SceneDriver::new(SceneConfig::default(), device_tier)?;
    scene.set_scroll(dom::page_scroll_progress(&window));

    let app = Rc::new(RefCell::new(App {
        canvas,
        scene,
        clock: FrameClock::new(),
        pointer_ndc: None,
        gpu,
        camera: Camera::default(),
        fps: FpsMeter::default(),
        device_tier,
        extractor: AudioFeatureExtractor::new(),
        audio: None,
    }));

    let listeners = events::wire(&app, &window).map_err(|e| anyhow!("{:?}", e))?;
    let frames = {
        let app = app.clone();
        AnimationLoop::start(move |_| {
            if let Ok(mut app) = app.try_borrow_mut() {
                app.frame();
            }
        })
    };

    // a second start replaces the first
    unmount();
    MOUNTED.with(|m| {
        *m.borrow_mut() = Some(Mounted {
            app,
            frames,
            listeners,
        })
    });
    Ok(())
}

/// Acquire audio on the first gesture: the microphone if allowed, else the
/// synthetic oscillators. Resolves into the app unless it was unmounted in
/// the meantime.
pub(crate) fn start_audio(app: Rc<RefCell<App>>) {
    let first = app
        .try_borrow_mut()
        .map(|mut a| a.extractor.on_gesture())
        .unwrap_or(false);
    if !first {
        return;
    }
    spawn_local(async move {
        let (ctx, analyser) = match audio::open_context() {
            Ok(pair) => pair,
            Err(e) => {
                app.borrow_mut().extractor.on_unavailable(&e);
                return;
            }
        };
        let web_audio = match WebAudio::attach_microphone(ctx, analyser).await {
            Ok(web_audio) => {
                app.borrow_mut().extractor.on_microphone_granted();
                web_audio
            }
            Err((e, ctx, analyser)) => {
                app.borrow_mut().extractor.on_microphone_denied(&e);
                match WebAudio::attach_synthetic(ctx, analyser) {
                    Ok(web_audio) => web_audio,
                    Err(e) => {
                        app.borrow_mut().extractor.on_unavailable(&e);
                        return;
                    }
                }
            }
        };

        let mut app = app.borrow_mut();
        match app.extractor.phase() {
            AudioPhase::MicrophoneActive | AudioPhase::SyntheticFallback => {
                app.audio = Some(web_audio);
                app.extractor.on_analyser_ready();
            }
            phase => {
                log::info!("[audio] discarding graph acquired in phase {:?}", phase);
                web_audio.close();
            }
        }
    });
}
