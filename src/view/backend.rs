//! The seam between meshes and whatever owns the GPU.
//!
//! Mirrors the binding model meshes are written against: numbered texture
//! units, sampler uniforms that hold a unit index, and indexed draws over
//! buffers that were uploaded once. [`crate::view::WgpuContext`] implements it
//! on top of wgpu; tests use [`recording::RecordingContext`].

use glam::{Mat4, Vec3, Vec4};

/// Opaque handle to a texture owned by the graphics context.
///
/// Handles are shared freely between meshes; releasing the texture is the
/// context owner's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Mat4(Mat4),
    Vec3(Vec3),
    Vec4(Vec4),
    Float(f32),
    Int(i32),
}

/// A linked shader program whose uniforms can be set by name.
///
/// Names the program does not declare are ignored.
pub trait ShaderProgram {
    fn set_uniform(&mut self, name: &str, value: UniformValue);

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.set_uniform(name, UniformValue::Mat4(value));
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.set_uniform(name, UniformValue::Vec3(value));
    }

    fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.set_uniform(name, UniformValue::Vec4(value));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.set_uniform(name, UniformValue::Float(value));
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.set_uniform(name, UniformValue::Int(value));
    }
}

/// Component type of one vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeFormat {
    Float32x2,
    Float32x3,
    Float32x4,
    /// Integer attribute, read by the shader without conversion to float
    Sint32x4,
}

impl AttributeFormat {
    pub fn size(self) -> u64 {
        match self {
            AttributeFormat::Float32x2 => 8,
            AttributeFormat::Float32x3 => 12,
            AttributeFormat::Float32x4 | AttributeFormat::Sint32x4 => 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    pub location: u32,
    pub format: AttributeFormat,
    pub offset: u64,
}

/// Interleaved layout of one vertex buffer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    pub stride: u64,
    pub attributes: Vec<VertexAttribute>,
}

/// GPU state a mesh draws through.
///
/// Binding calls mutate context-global state (active unit, unit bindings);
/// nothing is restored between draws unless the caller does it.
pub trait GraphicsContext {
    type Program: ShaderProgram;
    /// Vertex buffer, index buffer and attribute binding of one mesh.
    /// Dropping it releases the GPU memory.
    type MeshBuffers;

    /// Allocate and fill static vertex and index buffers.
    fn create_mesh_buffers(&mut self, vertex_bytes: &[u8], indices: &[u32], layout: &VertexLayout) -> Self::MeshBuffers;

    fn set_active_texture_unit(&mut self, unit: u32);

    /// Bind `texture` to the active unit.
    fn bind_texture(&mut self, texture: TextureId);

    /// Triangle-list draw of the first `index_count` indices.
    fn draw_indexed(&mut self, program: &mut Self::Program, buffers: &Self::MeshBuffers, index_count: u32);
}
