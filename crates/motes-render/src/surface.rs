//! Device acquisition and per-frame presentation, shared by the front ends.
//! Each front end only creates the `wgpu::Surface` for its window or canvas.

use motes_core::{Camera, SceneDriver};
use thiserror::Error;

use crate::renderer::{pick_surface_format, ParticleRenderer};

#[derive(Debug, Error)]
pub enum GpuError {
    #[error("no compatible GPU adapter")]
    NoAdapter,
    #[error("device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface is not supported by the adapter")]
    UnsupportedSurface,
}

pub struct SurfaceRenderer<'w> {
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: ParticleRenderer,
}

impl<'w> SurfaceRenderer<'w> {
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'w>,
        width: u32,
        height: u32,
    ) -> Result<Self, GpuError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("motes_device"),
                    memory_hints: wgpu::MemoryHints::Performance,
                    ..Default::default()
                },
                None,
            )
            .await?;

        let mut config = surface
            .get_default_config(&adapter, width.max(1), height.max(1))
            .ok_or(GpuError::UnsupportedSurface)?;
        if let Some(format) = pick_surface_format(&surface.get_capabilities(&adapter).formats) {
            config.format = format;
        }
        config.present_mode = wgpu::PresentMode::Fifo;
        surface.configure(&device, &config);
        log::info!(
            "[gpu] {:?} surface {}x{} {:?}",
            adapter.get_info().backend,
            config.width,
            config.height,
            config.format
        );

        let renderer = ParticleRenderer::new(&device, config.format);
        Ok(Self {
            surface,
            device,
            queue,
            config,
            renderer,
        })
    }

    /// Zero-sized or unchanged sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == self.size() {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Upload what the scene published this frame and draw it. A surface
    /// error means the frame is skipped; nothing is queued for later.
    pub fn render(
        &mut self,
        scene: &mut SceneDriver,
        camera: &Camera,
    ) -> Result<(), wgpu::SurfaceError> {
        self.renderer.set_view_proj(&self.queue, camera.view_proj());
        self.renderer.sync(&self.device, &self.queue, scene);

        let output = self.surface.get_current_texture()?;
        let target = output.texture.create_view(&Default::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("motes_frame"),
            });
        self.renderer.render(&mut encoder, &target);
        self.queue.submit([encoder.finish()]);
        output.present();
        Ok(())
    }

    /// Drop every GPU batch and mesh; the device and surface stay alive.
    pub fn clear(&mut self) {
        self.renderer.clear();
    }
}
