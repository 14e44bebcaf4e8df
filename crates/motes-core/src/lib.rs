pub mod analyser;
pub mod audio;
pub mod buffer;
pub mod camera;
pub mod clock;
pub mod constants;
pub mod error;
pub mod instance;
pub mod integrator;
pub mod modulation;
pub mod palette;
pub mod profile;
pub mod quality;
pub mod scene;
pub mod synth;

pub static PARTICLES_WGSL: &str = include_str!("../shaders/particles.wgsl");

pub use analyser::*;
pub use audio::*;
pub use buffer::*;
pub use camera::*;
pub use clock::*;
pub use constants::*;
pub use error::*;
pub use instance::*;
pub use integrator::*;
pub use modulation::*;
pub use palette::*;
pub use profile::*;
pub use quality::*;
pub use scene::*;
pub use synth::*;
