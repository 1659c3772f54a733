//! wgpu implementation of [`GraphicsContext`].
//!
//! wgpu has no texture units and no named uniforms, so the context keeps
//! that state itself. Each program declares a uniform block (bind group 0,
//! dynamic offset) and a list of sampler slots (bind group 1: one shared
//! sampler at binding 0, slot `i` texture at binding `i + 1`). A draw
//! snapshots the program's uniform block into a per-frame arena and resolves
//! each sampler slot through the unit it points at; [`WgpuContext::flush`]
//! replays the recorded draws into one render pass in issue order.

use std::collections::HashMap;
use std::sync::Arc;

use wgpu::util::DeviceExt;

use super::backend::{AttributeFormat, GraphicsContext, ShaderProgram, TextureId, UniformValue, VertexLayout};

pub const MAX_TEXTURE_UNITS: usize = 16;
const INITIAL_ARENA_SLOTS: u64 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformType {
    Mat4,
    Vec3,
    Vec4,
    Float,
    Int,
}

impl UniformType {
    fn align(self) -> u64 {
        match self {
            UniformType::Mat4 | UniformType::Vec3 | UniformType::Vec4 => 16,
            UniformType::Float | UniformType::Int => 4,
        }
    }

    fn size(self) -> u64 {
        match self {
            UniformType::Mat4 => 64,
            UniformType::Vec3 => 12,
            UniformType::Vec4 => 16,
            UniformType::Float | UniformType::Int => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UniformField {
    pub name: String,
    pub ty: UniformType,
    pub offset: u64,
}

/// Byte layout of a WGSL uniform struct, fields in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct UniformLayout {
    fields: Vec<UniformField>,
    size: u64,
}

impl UniformLayout {
    pub fn new(fields: &[(&str, UniformType)]) -> Self {
        let mut offset = 0;
        let fields = fields
            .iter()
            .map(|&(name, ty)| {
                offset = align_up(offset, ty.align());
                let field = UniformField { name: name.to_string(), ty, offset };
                offset += ty.size();
                field
            })
            .collect();
        Self { fields, size: align_up(offset, 16).max(16) }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn field(&self, name: &str) -> Option<&UniformField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

fn align_up(value: u64, align: u64) -> u64 {
    value.div_ceil(align) * align
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(usize);

/// Everything needed to build a render pipeline for one program
pub struct ProgramDescriptor<'a> {
    pub label: &'a str,
    pub wgsl: &'a str,
    pub uniforms: UniformLayout,
    pub samplers: &'a [&'a str],
    pub vertex_layout: VertexLayout,
}

/// CPU side of a program: current uniform values and sampler units.
pub struct WgpuProgram {
    id: ProgramId,
    uniforms: Arc<UniformLayout>,
    block: Vec<u8>,
    sampler_names: Vec<String>,
    sampler_units: Vec<u32>,
}

impl WgpuProgram {
    fn new(id: ProgramId, uniforms: Arc<UniformLayout>, samplers: &[&str]) -> Self {
        Self {
            id,
            block: vec![0; uniforms.size() as usize],
            uniforms,
            sampler_names: samplers.iter().map(|s| s.to_string()).collect(),
            // Unset sampler uniforms read unit 0
            sampler_units: vec![0; samplers.len()],
        }
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn uniform_bytes(&self) -> &[u8] {
        &self.block
    }

    pub fn sampler_unit(&self, name: &str) -> Option<u32> {
        let slot = self.sampler_names.iter().position(|n| n == name)?;
        Some(self.sampler_units[slot])
    }
}

impl ShaderProgram for WgpuProgram {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        if let Some(slot) = self.sampler_names.iter().position(|n| n == name) {
            match value {
                UniformValue::Int(unit) if (0..MAX_TEXTURE_UNITS as i32).contains(&unit) => {
                    self.sampler_units[slot] = unit as u32;
                }
                other => tracing::warn!(name, ?other, "sampler uniform needs a texture unit index"),
            }
            return;
        }

        let Some(field) = self.uniforms.field(name) else {
            tracing::trace!(name, "uniform not declared by program, ignored");
            return;
        };

        let offset = field.offset as usize;
        let mut write = |bytes: &[u8]| self.block[offset..offset + bytes.len()].copy_from_slice(bytes);
        match (field.ty, value) {
            (UniformType::Mat4, UniformValue::Mat4(m)) => write(bytemuck::bytes_of(&m.to_cols_array())),
            (UniformType::Vec3, UniformValue::Vec3(v)) => write(bytemuck::bytes_of(&v.to_array())),
            (UniformType::Vec4, UniformValue::Vec4(v)) => write(bytemuck::bytes_of(&v.to_array())),
            (UniformType::Float, UniformValue::Float(f)) => write(bytemuck::bytes_of(&f)),
            (UniformType::Int, UniformValue::Int(i)) => write(bytemuck::bytes_of(&i)),
            (ty, value) => tracing::warn!(name, ?ty, ?value, "uniform type mismatch, ignored"),
        }
    }
}

/// A texture owned by the context
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

/// Vertex and index buffers of one mesh; dropping them frees the GPU memory
/// once no recorded draw still references them.
pub struct WgpuMeshBuffers {
    vertex: Arc<wgpu::Buffer>,
    index: Arc<wgpu::Buffer>,
    layout: VertexLayout,
}

struct ProgramResources {
    pipeline: wgpu::RenderPipeline,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: Option<wgpu::BindGroupLayout>,
    block_size: u64,
    vertex_layout: VertexLayout,
}

/// Per-frame storage for uniform snapshots, addressed by dynamic offset
struct UniformArena {
    buffer: wgpu::Buffer,
    capacity: u64,
    alignment: u64,
    staging: Vec<u8>,
}

impl UniformArena {
    fn new(device: &wgpu::Device, alignment: u64, capacity: u64) -> Self {
        Self {
            buffer: Self::create_buffer(device, capacity),
            capacity,
            alignment,
            staging: Vec::new(),
        }
    }

    fn create_buffer(device: &wgpu::Device, capacity: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform_arena"),
            size: capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn push(&mut self, block: &[u8]) -> u32 {
        let offset = align_up(self.staging.len() as u64, self.alignment);
        self.staging.resize(offset as usize, 0);
        self.staging.extend_from_slice(block);
        offset as u32
    }

    /// Returns true when the buffer had to be replaced
    fn ensure_capacity(&mut self, device: &wgpu::Device) -> bool {
        let needed = self.staging.len() as u64;
        if needed <= self.capacity {
            return false;
        }
        self.capacity = needed.next_power_of_two();
        self.buffer = Self::create_buffer(device, self.capacity);
        tracing::debug!(capacity = self.capacity, "uniform arena grown");
        true
    }
}

/// Texture units and which one is active.
///
/// Activating a unit past the table leaves no unit active; binds are then
/// dropped instead of landing on whatever unit was active before.
#[derive(Debug, Clone)]
pub struct TextureUnits {
    active: Option<usize>,
    slots: [Option<TextureId>; MAX_TEXTURE_UNITS],
}

impl Default for TextureUnits {
    fn default() -> Self {
        Self { active: Some(0), slots: [None; MAX_TEXTURE_UNITS] }
    }
}

impl TextureUnits {
    pub fn activate(&mut self, unit: u32) {
        let unit = unit as usize;
        if unit < MAX_TEXTURE_UNITS {
            self.active = Some(unit);
        } else {
            tracing::warn!(unit, max = MAX_TEXTURE_UNITS, "texture unit out of range");
            self.active = None;
        }
    }

    pub fn bind(&mut self, texture: TextureId) {
        match self.active {
            Some(unit) => self.slots[unit] = Some(texture),
            None => tracing::warn!(texture = texture.0, "no valid texture unit active, bind dropped"),
        }
    }

    pub fn bound(&self, unit: u32) -> Option<TextureId> {
        self.slots.get(unit as usize).copied().flatten()
    }

    /// Unbind `texture` from every unit holding it
    pub fn forget(&mut self, texture: TextureId) {
        for slot in self.slots.iter_mut().filter(|s| **s == Some(texture)) {
            *slot = None;
        }
    }
}

struct RecordedDraw {
    program: ProgramId,
    uniform_offset: u32,
    textures: Vec<TextureId>,
    vertex: Arc<wgpu::Buffer>,
    index: Arc<wgpu::Buffer>,
    index_count: u32,
}

/// Owns textures, programs and the binding state meshes draw through.
pub struct WgpuContext {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    color_format: wgpu::TextureFormat,
    depth_format: wgpu::TextureFormat,
    programs: Vec<ProgramResources>,
    textures: HashMap<TextureId, GpuTexture>,
    next_texture: u32,
    sampler: wgpu::Sampler,
    fallback: TextureId,
    units: TextureUnits,
    arena: UniformArena,
    uniform_groups: HashMap<ProgramId, Arc<wgpu::BindGroup>>,
    texture_groups: HashMap<(ProgramId, Vec<TextureId>), Arc<wgpu::BindGroup>>,
    draws: Vec<RecordedDraw>,
}

impl WgpuContext {
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("texture_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let arena = UniformArena::new(&device, alignment, alignment * INITIAL_ARENA_SLOTS);

        let mut ctx = Self {
            device,
            queue,
            color_format,
            depth_format,
            programs: Vec::new(),
            textures: HashMap::new(),
            next_texture: 0,
            sampler,
            fallback: TextureId(0),
            units: TextureUnits::default(),
            arena,
            uniform_groups: HashMap::new(),
            texture_groups: HashMap::new(),
            draws: Vec::new(),
        };
        // Sampled by any slot whose unit has nothing bound
        ctx.fallback = ctx.create_texture_rgba8("fallback_white", 1, 1, &[255, 255, 255, 255]);
        ctx
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Upload tightly packed RGBA8 pixels as a new sRGB texture.
    pub fn create_texture_rgba8(&mut self, label: &str, width: u32, height: u32, pixels: &[u8]) -> TextureId {
        let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(id, GpuTexture { texture, view, width, height });
        tracing::debug!(label, width, height, id = id.0, "texture created");
        id
    }

    /// Free a texture. Units still pointing at it fall back to white.
    pub fn release_texture(&mut self, id: TextureId) {
        if id == self.fallback {
            return;
        }
        if self.textures.remove(&id).is_some() {
            self.texture_groups.retain(|(_, ids), _| !ids.contains(&id));
            self.units.forget(id);
        }
    }

    pub fn create_program(&mut self, desc: &ProgramDescriptor) -> WgpuProgram {
        let shader = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(desc.label),
            source: wgpu::ShaderSource::Wgsl(desc.wgsl.into()),
        });

        let block_size = desc.uniforms.size();
        let uniform_layout = self.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("program_uniform_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(block_size),
                },
                count: None,
            }],
        });

        let texture_layout = (!desc.samplers.is_empty()).then(|| {
            let mut entries = vec![wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            }];
            entries.extend((0..desc.samplers.len() as u32).map(|slot| wgpu::BindGroupLayoutEntry {
                binding: slot + 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            }));
            self.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("program_texture_bgl"),
                entries: &entries,
            })
        });

        let mut bind_group_layouts = vec![&uniform_layout];
        if let Some(layout) = &texture_layout {
            bind_group_layouts.push(layout);
        }
        let pipeline_layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(desc.label),
            bind_group_layouts: &bind_group_layouts,
            push_constant_ranges: &[],
        });

        let attributes: Vec<wgpu::VertexAttribute> = desc
            .vertex_layout
            .attributes
            .iter()
            .map(|a| wgpu::VertexAttribute {
                offset: a.offset,
                shader_location: a.location,
                format: vertex_format(a.format),
            })
            .collect();

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(desc.label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: desc.vertex_layout.stride,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &attributes,
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: self.depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
            multiview: None,
            cache: None,
        });

        let id = ProgramId(self.programs.len());
        self.programs.push(ProgramResources {
            pipeline,
            uniform_layout,
            texture_layout,
            block_size,
            vertex_layout: desc.vertex_layout.clone(),
        });
        tracing::info!(label = desc.label, samplers = desc.samplers.len(), "program created");

        WgpuProgram::new(id, Arc::new(desc.uniforms.clone()), desc.samplers)
    }

    fn uniform_group(&mut self, program: ProgramId) -> Arc<wgpu::BindGroup> {
        if let Some(group) = self.uniform_groups.get(&program) {
            return group.clone();
        }
        let resources = &self.programs[program.0];
        let group = Arc::new(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("program_uniform_bg"),
            layout: &resources.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &self.arena.buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(resources.block_size),
                }),
            }],
        }));
        self.uniform_groups.insert(program, group.clone());
        group
    }

    fn texture_group(&mut self, program: ProgramId, textures: &[TextureId]) -> Option<Arc<wgpu::BindGroup>> {
        let layout = self.programs[program.0].texture_layout.as_ref()?;
        // Textures released since the draw was recorded read as white
        let resolved: Vec<TextureId> = textures
            .iter()
            .map(|id| if self.textures.contains_key(id) { *id } else { self.fallback })
            .collect();

        let key = (program, resolved);
        if let Some(group) = self.texture_groups.get(&key) {
            return Some(group.clone());
        }

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Sampler(&self.sampler),
        }];
        for (slot, id) in key.1.iter().enumerate() {
            let texture = &self.textures[id];
            entries.push(wgpu::BindGroupEntry {
                binding: slot as u32 + 1,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            });
        }
        let group = Arc::new(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("program_texture_bg"),
            layout,
            entries: &entries,
        }));
        self.texture_groups.insert(key, group.clone());
        Some(group)
    }

    /// Replay every draw recorded since the last flush into one render pass
    /// that clears `color` and `depth` first.
    pub fn flush(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        color: &wgpu::TextureView,
        depth: &wgpu::TextureView,
        clear: wgpu::Color,
    ) {
        if self.arena.ensure_capacity(&self.device) {
            self.uniform_groups.clear();
        }
        if !self.arena.staging.is_empty() {
            self.queue.write_buffer(&self.arena.buffer, 0, &self.arena.staging);
        }

        let draws = std::mem::take(&mut self.draws);
        let groups: Vec<(Arc<wgpu::BindGroup>, Option<Arc<wgpu::BindGroup>>)> = draws
            .iter()
            .map(|d| (self.uniform_group(d.program), self.texture_group(d.program, &d.textures)))
            .collect();

        {
            let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for (draw, (uniforms, textures)) in draws.iter().zip(&groups) {
                rp.set_pipeline(&self.programs[draw.program.0].pipeline);
                rp.set_bind_group(0, &**uniforms, &[draw.uniform_offset]);
                if let Some(textures) = textures {
                    rp.set_bind_group(1, &**textures, &[]);
                }
                rp.set_vertex_buffer(0, draw.vertex.slice(..));
                rp.set_index_buffer(draw.index.slice(..), wgpu::IndexFormat::Uint32);
                rp.draw_indexed(0..draw.index_count, 0, 0..1);
            }
        }

        self.arena.staging.clear();
    }
}

fn vertex_format(format: AttributeFormat) -> wgpu::VertexFormat {
    match format {
        AttributeFormat::Float32x2 => wgpu::VertexFormat::Float32x2,
        AttributeFormat::Float32x3 => wgpu::VertexFormat::Float32x3,
        AttributeFormat::Float32x4 => wgpu::VertexFormat::Float32x4,
        AttributeFormat::Sint32x4 => wgpu::VertexFormat::Sint32x4,
    }
}

impl GraphicsContext for WgpuContext {
    type Program = WgpuProgram;
    type MeshBuffers = WgpuMeshBuffers;

    fn create_mesh_buffers(&mut self, vertex_bytes: &[u8], indices: &[u32], layout: &VertexLayout) -> WgpuMeshBuffers {
        let vertex = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: vertex_bytes,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        WgpuMeshBuffers { vertex: Arc::new(vertex), index: Arc::new(index), layout: layout.clone() }
    }

    fn set_active_texture_unit(&mut self, unit: u32) {
        self.units.activate(unit);
    }

    fn bind_texture(&mut self, texture: TextureId) {
        self.units.bind(texture);
    }

    fn draw_indexed(&mut self, program: &mut WgpuProgram, buffers: &WgpuMeshBuffers, index_count: u32) {
        if index_count == 0 {
            return;
        }
        debug_assert_eq!(buffers.layout, self.programs[program.id.0].vertex_layout);

        let uniform_offset = self.arena.push(&program.block);
        let textures = program
            .sampler_units
            .iter()
            .map(|&unit| self.units.bound(unit).unwrap_or(self.fallback))
            .collect();

        self.draws.push(RecordedDraw {
            program: program.id,
            uniform_offset,
            textures,
            vertex: buffers.vertex.clone(),
            index: buffers.index.clone(),
            index_count,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3, Vec4};

    fn object_layout() -> UniformLayout {
        UniformLayout::new(&[
            ("model_matrix", UniformType::Mat4),
            ("lightPos", UniformType::Vec3),
            ("ourTime", UniformType::Float),
            ("viewPos", UniformType::Vec3),
            ("ourColor", UniformType::Vec4),
            ("flag", UniformType::Int),
        ])
    }

    #[test]
    fn layout_follows_wgsl_alignment() {
        let layout = object_layout();
        assert_eq!(layout.field("model_matrix").unwrap().offset, 0);
        assert_eq!(layout.field("lightPos").unwrap().offset, 64);
        // A scalar packs into the tail of a vec3
        assert_eq!(layout.field("ourTime").unwrap().offset, 76);
        assert_eq!(layout.field("viewPos").unwrap().offset, 80);
        assert_eq!(layout.field("ourColor").unwrap().offset, 96);
        assert_eq!(layout.field("flag").unwrap().offset, 112);
        assert_eq!(layout.size(), 128);
        assert!(layout.field("missing").is_none());
    }

    #[test]
    fn empty_layout_still_has_a_size() {
        assert_eq!(UniformLayout::new(&[]).size(), 16);
    }

    #[test]
    fn uniform_values_land_at_their_offsets() {
        let mut program = WgpuProgram::new(ProgramId(0), Arc::new(object_layout()), &[]);
        program.set_mat4("model_matrix", Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)));
        program.set_vec3("lightPos", Vec3::new(4.0, 5.0, 6.0));
        program.set_float("ourTime", 7.5);
        program.set_vec4("ourColor", Vec4::new(0.5, 0.0, 0.0, 1.0));
        program.set_int("flag", -3);

        let floats: &[f32] = bytemuck::cast_slice(program.uniform_bytes());
        assert_eq!(&floats[12..15], &[1.0, 2.0, 3.0]);
        assert_eq!(&floats[16..19], &[4.0, 5.0, 6.0]);
        assert_eq!(floats[19], 7.5);
        assert_eq!(&floats[24..28], &[0.5, 0.0, 0.0, 1.0]);
        let ints: &[i32] = bytemuck::cast_slice(program.uniform_bytes());
        assert_eq!(ints[28], -3);
    }

    #[test]
    fn unknown_and_mismatched_uniforms_are_ignored() {
        let mut program = WgpuProgram::new(ProgramId(0), Arc::new(object_layout()), &[]);
        let before = program.uniform_bytes().to_vec();
        program.set_float("not_declared", 1.0);
        program.set_float("lightPos", 1.0);
        assert_eq!(program.uniform_bytes(), &before[..]);
    }

    #[test]
    fn sampler_names_route_to_units() {
        let mut program = WgpuProgram::new(
            ProgramId(1),
            Arc::new(UniformLayout::new(&[])),
            &["texture_diffuse1", "texture_specular1"],
        );
        assert_eq!(program.sampler_unit("texture_diffuse1"), Some(0));
        program.set_int("texture_specular1", 3);
        assert_eq!(program.sampler_unit("texture_specular1"), Some(3));
        // Out-of-range units are rejected
        program.set_int("texture_diffuse1", MAX_TEXTURE_UNITS as i32);
        assert_eq!(program.sampler_unit("texture_diffuse1"), Some(0));
        assert_eq!(program.sampler_unit("texture_height1"), None);
    }

    #[test]
    fn unit_past_the_table_does_not_clobber_the_last_unit() {
        let mut units = TextureUnits::default();
        for unit in 0..MAX_TEXTURE_UNITS as u32 {
            units.activate(unit);
            units.bind(TextureId(100 + unit));
        }
        units.activate(MAX_TEXTURE_UNITS as u32);
        units.bind(TextureId(999));

        let last = MAX_TEXTURE_UNITS as u32 - 1;
        assert_eq!(units.bound(last), Some(TextureId(100 + last)));
        assert_eq!(units.bound(MAX_TEXTURE_UNITS as u32), None);

        // A valid unit works again afterwards
        units.activate(0);
        units.bind(TextureId(7));
        assert_eq!(units.bound(0), Some(TextureId(7)));
    }

    #[test]
    fn forgetting_a_texture_clears_every_unit_holding_it() {
        let mut units = TextureUnits::default();
        for (unit, id) in [(0, 3), (1, 4), (2, 3)] {
            units.activate(unit);
            units.bind(TextureId(id));
        }
        units.forget(TextureId(3));
        assert_eq!(units.bound(0), None);
        assert_eq!(units.bound(1), Some(TextureId(4)));
        assert_eq!(units.bound(2), None);
    }

    #[test]
    fn align_up_rounds_to_multiple() {
        assert_eq!(align_up(0, 256), 0);
        assert_eq!(align_up(1, 256), 256);
        assert_eq!(align_up(256, 256), 256);
        assert_eq!(align_up(257, 256), 512);
    }
}
