mod capture;

use capture::Capture;
use glam::Vec2;
use motes_core::{
    pixel_to_ndc, AudioFeatureExtractor, Camera, DeviceHints, FpsMeter, FrameClock, FrameInput,
    PointerState, QualityTier, SceneConfig, SceneDriver, SpectrumSource,
};
use motes_render::SurfaceRenderer;
use std::time::{SystemTime, UNIX_EPOCH};
use winit::dpi::PhysicalSize;
use winit::event::*;
use winit::event_loop::EventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

const QUALITY_ENV: &str = "MOTES_QUALITY";
// wheel travel per line and per pixel, as scroll progress
const SCROLL_PER_LINE: f32 = 0.02;
const SCROLL_PER_PIXEL: f32 = 0.0005;

struct State<'w> {
    window: &'w Window,
    gpu: SurfaceRenderer<'w>,
    scene: SceneDriver,
    camera: Camera,
    clock: FrameClock,
    fps: FpsMeter,
    device_tier: QualityTier,
    extractor: AudioFeatureExtractor,
    capture: Option<Capture>,
    pointer_ndc: Option<Vec2>,
}

impl<'w> State<'w> {
    async fn new(window: &'w Window, device_tier: QualityTier) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let gpu = SurfaceRenderer::new(&instance, surface, size.width, size.height).await?;

        let mut camera = Camera::default();
        let (width, height) = gpu.size();
        camera.set_viewport(width, height);

        Ok(Self {
            window,
            gpu,
            scene: SceneDriver::new(SceneConfig::default(), device_tier)?,
            camera,
            clock: FrameClock::new(),
            fps: FpsMeter::default(),
            device_tier,
            extractor: AudioFeatureExtractor::new(),
            capture: None,
            pointer_ndc: None,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.gpu.resize(size.width, size.height);
        let (width, height) = self.gpu.size();
        self.camera.set_viewport(width, height);
    }

    /// Desktop has no autoplay policy, so audio starts with the window.
    fn start_audio(&mut self) {
        if !self.extractor.on_gesture() {
            return;
        }
        let capture = match Capture::open_microphone() {
            Ok(capture) => {
                self.extractor.on_microphone_granted();
                capture
            }
            Err(e) => {
                self.extractor.on_microphone_denied(&e);
                Capture::synthetic(wall_seconds())
            }
        };
        log::info!("[audio] source {:?}", capture.kind());
        self.capture = Some(capture);
        self.extractor.on_analyser_ready();
    }

    fn scroll_by(&mut self, delta: f32) {
        self.scene.set_scroll(self.scene.progress() + delta);
    }

    fn jump_section(&mut self, forward: bool) {
        let sections = self.scene.config().sections.len();
        let current = self.scene.current_section().unwrap_or(0);
        let target = if forward {
            (current + 1).min(sections.saturating_sub(1))
        } else {
            current.saturating_sub(1)
        };
        // land mid-section; boundaries belong to the earlier section
        if let Some(section) = self.scene.config().sections.get(target) {
            let middle = (section.scroll_start + section.scroll_end) * 0.5;
            self.scene.set_scroll(middle);
        }
    }

    fn frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let time = self.clock.tick();
        if let Some(fps) = self.fps.record(time.dt) {
            let tier = self.device_tier.combine(QualityTier::from_fps(fps));
            if tier != self.scene.tier() {
                log::info!("[quality] {:.1} fps -> {}", fps, tier.label());
                self.scene.set_tier(tier);
            }
        }
        if let Some(capture) = self.capture.as_mut() {
            capture.advance(time.dt);
        }

        self.camera.eye.z = self.scene.camera_z();
        let pointer = self
            .pointer_ndc
            .map(|ndc| PointerState::from_ndc(ndc, &self.camera));
        let source = self.capture.as_mut().map(|c| c as &mut dyn SpectrumSource);
        let snapshot = self.extractor.poll(source);
        let input = FrameInput::new(time.dt, time.elapsed)
            .with_audio(snapshot)
            .with_pointer(pointer);
        self.scene.frame(&input);

        self.gpu.render(&mut self.scene, &self.camera)
    }

    fn shutdown(&mut self) {
        self.capture = None;
        self.extractor.reset();
        self.scene.teardown();
        self.gpu.clear();
        log::info!("[scene] torn down");
    }
}

fn wall_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

fn device_tier() -> QualityTier {
    if let Ok(label) = std::env::var(QUALITY_ENV) {
        match label.parse::<QualityTier>() {
            Ok(tier) => return tier,
            Err(e) => log::warn!("[config] {QUALITY_ENV}: {e}"),
        }
    }
    // desktop reports no device memory; the assumed default applies
    QualityTier::from_hints(&DeviceHints::default())
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let tier = device_tier();
    log::info!("[quality] starting at {}", tier.label());

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("motes")
        .build(&event_loop)?;

    let mut state = pollster::block_on(State::new(&window, tier))?;
    state.start_audio();

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::Resized(size) => state.resize(size),
            WindowEvent::CloseRequested => {
                state.shutdown();
                elwt.exit();
            }
            WindowEvent::CursorMoved { position, .. } => {
                let size = state.window.inner_size();
                state.pointer_ndc = Some(pixel_to_ndc(
                    position.x as f32,
                    position.y as f32,
                    size.width as f32,
                    size.height as f32,
                ));
            }
            WindowEvent::CursorLeft { .. } => state.pointer_ndc = None,
            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * SCROLL_PER_LINE,
                    MouseScrollDelta::PixelDelta(p) => -(p.y as f32) * SCROLL_PER_PIXEL,
                };
                state.scroll_by(delta);
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                match event.logical_key {
                    Key::Named(NamedKey::PageDown) | Key::Named(NamedKey::ArrowDown) => {
                        state.jump_section(true)
                    }
                    Key::Named(NamedKey::PageUp) | Key::Named(NamedKey::ArrowUp) => {
                        state.jump_section(false)
                    }
                    Key::Named(NamedKey::Home) => state.scene.set_scroll(0.0),
                    Key::Named(NamedKey::End) => state.scene.set_scroll(1.0),
                    Key::Named(NamedKey::Escape) => {
                        state.shutdown();
                        elwt.exit();
                    }
                    _ => {}
                }
            }
            _ => {}
        },
        Event::AboutToWait => match state.frame() {
            Ok(()) => state.window.request_redraw(),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => state.gpu.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
            Err(e) => log::warn!("[gpu] {:?}", e),
        },
        _ => {}
    })?;
    Ok(())
}
