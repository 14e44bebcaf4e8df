pub mod mesh;
pub mod renderer;
pub mod surface;

pub use mesh::{build_mesh, MeshData, Vertex};
pub use renderer::{pick_surface_format, ParticleRenderer, CLEAR_COLOR};
pub use surface::{GpuError, SurfaceRenderer};
