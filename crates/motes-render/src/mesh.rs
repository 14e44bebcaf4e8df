//! Procedural meshes for each particle shape. Dimensions are baked into the
//! vertices so the instance transform only carries per-particle scale.

use glam::Vec3;
use motes_core::MeshKind;
use std::f32::consts::{PI, TAU};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.normalize_or_zero().to_array(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl MeshData {
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    fn push_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        let normal = (b - a).cross(c - a);
        let base = self.vertices.len() as u16;
        for p in [a, b, c] {
            self.vertices.push(Vertex::new(p, normal));
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }
}

const SPHERE_SEGMENTS: u16 = 12;
const SPHERE_RINGS: u16 = 8;

pub fn build_mesh(kind: MeshKind, size: Vec3) -> MeshData {
    match kind {
        MeshKind::Plane => plane(size.x, size.y),
        MeshKind::Box => cuboid(size),
        MeshKind::Sphere => sphere(size.x, SPHERE_SEGMENTS, SPHERE_RINGS),
        MeshKind::Octahedron => octahedron(size.x),
    }
}

fn plane(width: f32, height: f32) -> MeshData {
    let (hw, hh) = (width * 0.5, height * 0.5);
    let n = Vec3::Z;
    MeshData {
        vertices: vec![
            Vertex::new(Vec3::new(-hw, -hh, 0.0), n),
            Vertex::new(Vec3::new(hw, -hh, 0.0), n),
            Vertex::new(Vec3::new(hw, hh, 0.0), n),
            Vertex::new(Vec3::new(-hw, hh, 0.0), n),
        ],
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}

fn cuboid(size: Vec3) -> MeshData {
    let h = size * 0.5;
    let mut mesh = MeshData::default();
    // (normal, u axis, v axis) per face, wound counter-clockwise from outside
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];
    for (n, u, v) in faces {
        let center = n * h;
        let (du, dv) = (u * h, v * h);
        let base = mesh.vertices.len() as u16;
        for corner in [
            center - du - dv,
            center + du - dv,
            center + du + dv,
            center - du + dv,
        ] {
            mesh.vertices.push(Vertex::new(corner, n));
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

fn sphere(radius: f32, segments: u16, rings: u16) -> MeshData {
    let mut mesh = MeshData::default();
    for ring in 0..=rings {
        let theta = ring as f32 / rings as f32 * PI;
        for seg in 0..=segments {
            let phi = seg as f32 / segments as f32 * TAU;
            let n = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
            mesh.vertices.push(Vertex::new(n * radius, n));
        }
    }
    let stride = segments + 1;
    for ring in 0..rings {
        for seg in 0..segments {
            let a = ring * stride + seg;
            let b = a + stride;
            mesh.indices
                .extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }
    mesh
}

fn octahedron(radius: f32) -> MeshData {
    let mut mesh = MeshData::default();
    let (top, bottom) = (Vec3::Y * radius, Vec3::NEG_Y * radius);
    let ring = [Vec3::X, Vec3::NEG_Z, Vec3::NEG_X, Vec3::Z].map(|d| d * radius);
    for i in 0..4 {
        let (a, b) = (ring[i], ring[(i + 1) % 4]);
        mesh.push_triangle(a, b, top);
        mesh.push_triangle(b, a, bottom);
    }
    mesh
}
