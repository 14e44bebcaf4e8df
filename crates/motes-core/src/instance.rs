//! GPU instance data.
//!
//! One [`InstanceRaw`] per particle, index for index. The publisher owns a
//! preallocated vector that is rewritten in place each frame and flagged dirty
//! once for the renderer to upload.

use crate::profile::Appearance;
use glam::{EulerRot, Mat4, Quat, Vec3};

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl InstanceRaw {
    pub fn new(position: Vec3, rotation: Vec3, appearance: &Appearance) -> Self {
        let rotation = Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z);
        let model = Mat4::from_scale_rotation_translation(
            Vec3::splat(appearance.scale.max(0.0)),
            rotation,
            position + appearance.offset,
        );
        Self {
            model: model.to_cols_array_2d(),
            color: appearance.color.extend(appearance.alpha.clamp(0.0, 1.0)).to_array(),
        }
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.model[3][0], self.model[3][1], self.model[3][2])
    }
}

#[derive(Debug, Default)]
pub struct InstancePublisher {
    instances: Vec<InstanceRaw>,
    dirty: bool,
    generation: u64,
}

impl InstancePublisher {
    pub fn new(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
            dirty: false,
            generation: 0,
        }
    }

    /// Rewrite every instance and mark the data dirty. Reached only through
    /// a completed integrator pass.
    pub(crate) fn publish(
        &mut self,
        positions: &[Vec3],
        rotations: &[Vec3],
        display: &[Appearance],
        offset: Vec3,
    ) {
        let n = positions.len().min(rotations.len()).min(display.len());
        self.instances.resize(n, InstanceRaw::default());
        for (i, slot) in self.instances.iter_mut().enumerate() {
            *slot = InstanceRaw::new(positions[i] + offset, rotations[i], &display[i]);
        }
        self.dirty = true;
        self.generation += 1;
    }

    pub fn instances(&self) -> &[InstanceRaw] {
        &self.instances
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns whether an upload is pending and clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Number of publishes so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
