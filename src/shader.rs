//! WGSL sources and the GPU-side data layouts they expect.

use crate::animation::DiamondTransform;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Instanced, video-textured octahedra.
pub const DIAMOND_SHADER: &str = include_str!("shaders/diamond.wgsl");
/// Video plane or skybox.
pub const BACKDROP_SHADER: &str = include_str!("shaders/backdrop.wgsl");

/// Per-frame uniforms for the diamond pass.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
}

impl Uniforms {
    pub fn new(view_proj: Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
        }
    }
}

/// Uniforms for the backdrop pass.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct BackdropUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
}

impl BackdropUniforms {
    pub fn new(view_proj: Mat4, model: Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
        }
    }
}

/// One diamond as a per-instance vertex.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct DiamondInstance {
    pub position: [f32; 3],
    pub scale: f32,
    /// Euler angles, XYZ order.
    pub rotation: [f32; 3],
    pub _pad: f32,
}

impl DiamondInstance {
    /// Locations 0 and 1 belong to the mesh vertex.
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![2 => Float32x3, 3 => Float32, 4 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<DiamondInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

impl From<&DiamondTransform> for DiamondInstance {
    fn from(t: &DiamondTransform) -> Self {
        Self {
            position: t.position.to_array(),
            scale: t.scale,
            rotation: t.rotation.to_array(),
            _pad: 0.0,
        }
    }
}
