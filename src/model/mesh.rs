use bytemuck::{Pod, Zeroable};
use std::mem::{offset_of, size_of};
use std::path::PathBuf;

use super::sampler::{PerKindCounter, SamplerNameResolver, TextureKind};
use crate::view::backend::{AttributeFormat, GraphicsContext, ShaderProgram, TextureId, VertexAttribute, VertexLayout};

pub const MAX_BONE_INFLUENCE: usize = 4;

/// One interleaved vertex record.
///
/// The bone slots keep the record layout compatible with skinned assets;
/// they stay zeroed here and nothing reads them on the draw path.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
    pub bone_ids: [i32; MAX_BONE_INFLUENCE],
    pub weights: [f32; MAX_BONE_INFLUENCE],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Self { position, normal, tex_coords, ..Self::zeroed() }
    }

    /// Fixed 7-slot attribute layout, stride one full record
    pub fn layout() -> VertexLayout {
        let attr = |location, format, offset: usize| VertexAttribute { location, format, offset: offset as u64 };
        VertexLayout {
            stride: size_of::<Vertex>() as u64,
            attributes: vec![
                attr(0, AttributeFormat::Float32x3, offset_of!(Vertex, position)),
                attr(1, AttributeFormat::Float32x3, offset_of!(Vertex, normal)),
                attr(2, AttributeFormat::Float32x2, offset_of!(Vertex, tex_coords)),
                attr(3, AttributeFormat::Float32x3, offset_of!(Vertex, tangent)),
                attr(4, AttributeFormat::Float32x3, offset_of!(Vertex, bitangent)),
                attr(5, AttributeFormat::Sint32x4, offset_of!(Vertex, bone_ids)),
                attr(6, AttributeFormat::Float32x4, offset_of!(Vertex, weights)),
            ],
        }
    }
}

/// A texture as a mesh sees it: handle, role, and where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct TextureBinding {
    pub id: TextureId,
    pub kind: TextureKind,
    /// Informational only
    pub path: PathBuf,
}

/// Static, textured, indexed geometry living on the GPU.
///
/// Buffers are created once in [`RenderableMesh::new`] and released when
/// the mesh is dropped. Texture handles are borrowed, not owned.
pub struct RenderableMesh<C: GraphicsContext> {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    textures: Vec<TextureBinding>,
    buffers: C::MeshBuffers,
}

impl<C: GraphicsContext> RenderableMesh<C> {
    /// Upload the geometry. Empty inputs are valid and draw nothing.
    pub fn new(ctx: &mut C, vertices: Vec<Vertex>, indices: Vec<u32>, textures: Vec<TextureBinding>) -> Self {
        let buffers = ctx.create_mesh_buffers(bytemuck::cast_slice(&vertices), &indices, &Vertex::layout());
        tracing::debug!(
            vertices = vertices.len(),
            indices = indices.len(),
            textures = textures.len(),
            "mesh uploaded"
        );
        Self { vertices, indices, textures, buffers }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn textures(&self) -> &[TextureBinding] {
        &self.textures
    }

    pub fn primitive_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Bind every texture to its own unit under the `texture_<kind><n>`
    /// sampler names and issue one indexed draw.
    pub fn draw(&self, ctx: &mut C, program: &mut C::Program) {
        self.draw_with(ctx, program, &mut PerKindCounter::new());
    }

    /// Like [`draw`](Self::draw) with a caller-supplied sampler naming scheme.
    ///
    /// Texture `i` goes to unit `i`. Leaves unit 0 active on return.
    pub fn draw_with(&self, ctx: &mut C, program: &mut C::Program, names: &mut impl SamplerNameResolver) {
        for (unit, texture) in self.textures.iter().enumerate() {
            let unit = unit as u32;
            ctx.set_active_texture_unit(unit);
            let name = names.next_name(texture.kind);
            program.set_int(&name, unit as i32);
            ctx.bind_texture(texture.id);
        }

        ctx.draw_indexed(program, &self.buffers, self.indices.len() as u32);

        ctx.set_active_texture_unit(0);
    }
}
