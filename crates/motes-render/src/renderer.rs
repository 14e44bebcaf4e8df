//! Instanced particle renderer.
//!
//! Owns the pipelines, one mesh per (shape, size) and one instance buffer per
//! mounted simulation. Device and surface handling live in `surface`.

use fnv::FnvHashMap;
use glam::Mat4;
use motes_core::{
    BlendMode, InstanceRaw, MeshKind, MountedSimulation, SceneDriver, SimulationId, Visual,
    PARTICLES_WGSL,
};
use std::mem::size_of;
use wgpu::util::DeviceExt;

use crate::mesh::{build_mesh, Vertex};

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.01,
    b: 0.03,
    a: 1.0,
};

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct MaterialUniform {
    tint: [f32; 4],
}

/// Prefer an sRGB surface format when the adapter offers one.
pub fn pick_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| {
            matches!(
                f,
                wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
            )
        })
        .or_else(|| formats.first().copied())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct MeshKey {
    kind: MeshKind,
    size: [u32; 3],
}

impl MeshKey {
    fn of(visual: &Visual) -> Self {
        Self {
            kind: visual.mesh,
            size: visual.size.to_array().map(f32::to_bits),
        }
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

struct Batch {
    mesh: MeshKey,
    blend: BlendMode,
    instance_buffer: wgpu::Buffer,
    capacity: usize,
    count: u32,
    material_bind_group: wgpu::BindGroup,
}

pub struct ParticleRenderer {
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    material_layout: wgpu::BindGroupLayout,
    alpha_pipeline: wgpu::RenderPipeline,
    additive_pipeline: wgpu::RenderPipeline,
    meshes: FnvHashMap<MeshKey, GpuMesh>,
    batches: FnvHashMap<SimulationId, Batch>,
    /// Batches to draw this frame, in draw order.
    draw_list: Vec<SimulationId>,
}

fn uniform_layout(
    device: &wgpu::Device,
    label: &str,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

const MESH_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
    2 => Float32x4,
    3 => Float32x4,
    4 => Float32x4,
    5 => Float32x4,
    6 => Float32x4
];

fn make_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    blend: wgpu::BlendState,
    label: &str,
) -> wgpu::RenderPipeline {
    let vertex_buffers = [
        // slot 0: mesh
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &MESH_ATTRIBUTES,
        },
        // slot 1: per-particle model matrix + color
        wgpu::VertexBufferLayout {
            array_stride: size_of::<InstanceRaw>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &INSTANCE_ATTRIBUTES,
        },
    ];
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &vertex_buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        cache: None,
        multiview: None,
    })
}

const ADDITIVE_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::Zero,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

impl ParticleRenderer {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("particles_shader"),
            source: wgpu::ShaderSource::Wgsl(PARTICLES_WGSL.into()),
        });
        let camera_layout = uniform_layout(device, "camera_bgl", wgpu::ShaderStages::VERTEX);
        let material_layout = uniform_layout(device, "material_bgl", wgpu::ShaderStages::VERTEX);
        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("camera_uniforms"),
            size: size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bg"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("particles_pl"),
            bind_group_layouts: &[&camera_layout, &material_layout],
            push_constant_ranges: &[],
        });
        let alpha_pipeline = make_pipeline(
            device,
            &layout,
            &shader,
            format,
            wgpu::BlendState::ALPHA_BLENDING,
            "particles_alpha",
        );
        let additive_pipeline = make_pipeline(
            device,
            &layout,
            &shader,
            format,
            ADDITIVE_BLENDING,
            "particles_additive",
        );
        log::info!("[gpu] particle pipelines ready ({format:?})");
        Self {
            camera_buffer,
            camera_bind_group,
            material_layout,
            alpha_pipeline,
            additive_pipeline,
            meshes: FnvHashMap::default(),
            batches: FnvHashMap::default(),
            draw_list: Vec::new(),
        }
    }

    pub fn set_view_proj(&self, queue: &wgpu::Queue, view_proj: Mat4) {
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&CameraUniform {
                view_proj: view_proj.to_cols_array_2d(),
            }),
        );
    }

    fn ensure_mesh(&mut self, device: &wgpu::Device, visual: &Visual) -> MeshKey {
        let key = MeshKey::of(visual);
        self.meshes.entry(key).or_insert_with(|| {
            let data = build_mesh(visual.mesh, visual.size);
            GpuMesh {
                vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("mesh_vb"),
                    contents: bytemuck::cast_slice(&data.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
                index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("mesh_ib"),
                    contents: bytemuck::cast_slice(&data.indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
                index_count: data.index_count(),
            }
        });
        key
    }

    fn create_batch(&mut self, device: &wgpu::Device, mounted: &MountedSimulation) -> Batch {
        let mesh = self.ensure_mesh(device, &mounted.visual);
        let capacity = mounted.simulation.len().max(1);
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(mounted.label),
            size: (size_of::<InstanceRaw>() * capacity) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let material = MaterialUniform {
            tint: [1.0, 1.0, 1.0, mounted.visual.opacity.clamp(0.0, 1.0)],
        };
        let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("material_uniforms"),
            contents: bytemuck::bytes_of(&material),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("material_bg"),
            layout: &self.material_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: material_buffer.as_entire_binding(),
            }],
        });
        log::debug!("[gpu] batch {} x{}", mounted.label, capacity);
        Batch {
            mesh,
            blend: mounted.visual.blend,
            instance_buffer,
            capacity,
            count: 0,
            material_bind_group,
        }
    }

    /// Upload freshly published instances for every visible simulation and
    /// record the draw order: alpha batches first, additive on top.
    pub fn sync(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, scene: &mut SceneDriver) {
        self.draw_list.clear();
        for (id, mounted) in scene.visible_mut() {
            let needs_batch = self
                .batches
                .get(&id)
                .map_or(true, |b| b.capacity < mounted.publisher.len());
            if needs_batch {
                let batch = self.create_batch(device, mounted);
                self.batches.insert(id, batch);
            }
            let Some(batch) = self.batches.get_mut(&id) else {
                continue;
            };
            if mounted.publisher.take_dirty() {
                queue.write_buffer(&batch.instance_buffer, 0, mounted.publisher.as_bytes());
                batch.count = mounted.publisher.len() as u32;
            }
            if batch.count > 0 {
                self.draw_list.push(id);
            }
        }
        let batches = &self.batches;
        self.draw_list
            .sort_by_key(|id| batches.get(id).map(|b| b.blend == BlendMode::Additive));
    }

    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("particles_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        rpass.set_bind_group(0, &self.camera_bind_group, &[]);
        for id in &self.draw_list {
            let Some(batch) = self.batches.get(id) else {
                continue;
            };
            let Some(mesh) = self.meshes.get(&batch.mesh) else {
                continue;
            };
            rpass.set_pipeline(match batch.blend {
                BlendMode::Alpha => &self.alpha_pipeline,
                BlendMode::Additive => &self.additive_pipeline,
            });
            rpass.set_bind_group(1, &batch.material_bind_group, &[]);
            rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            rpass.set_vertex_buffer(1, batch.instance_buffer.slice(..));
            rpass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            rpass.draw_indexed(0..mesh.index_count, 0, 0..batch.count);
        }
    }

    pub fn clear(&mut self) {
        self.batches.clear();
        self.draw_list.clear();
        self.meshes.clear();
    }
}
