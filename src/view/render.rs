use glam::{Mat4, Vec3, Vec4};

use crate::config::ViewerConfig;
use crate::model::{unit_cube, DemoScene, OrientationController, RenderableMesh, TextureKind};

use super::backend::{GraphicsContext, ShaderProgram};
use super::texture::load_texture;
use super::wgpu_backend::{ProgramDescriptor, UniformLayout, UniformType, WgpuContext, WgpuProgram};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

/// Uniform block of `shaders/object.wgsl`
pub fn object_uniforms() -> UniformLayout {
    UniformLayout::new(&[
        ("model_matrix", UniformType::Mat4),
        ("view_matrix", UniformType::Mat4),
        ("projection_matrix", UniformType::Mat4),
        ("transform", UniformType::Mat4),
        ("lightPos", UniformType::Vec3),
        ("ourTime", UniformType::Float),
        ("viewPos", UniformType::Vec3),
        ("ourColor", UniformType::Vec4),
    ])
}

/// Uniform block of `shaders/light.wgsl`
pub fn light_uniforms() -> UniformLayout {
    UniformLayout::new(&[
        ("model_matrix", UniformType::Mat4),
        ("view_matrix", UniformType::Mat4),
        ("projection_matrix", UniformType::Mat4),
    ])
}

/// Per-frame values shared by both programs
#[derive(Debug, Clone, Copy)]
pub struct FrameUniforms {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub light_position: Vec3,
    pub color: Vec4,
    pub time: f32,
}

impl FrameUniforms {
    pub fn new(camera: &OrientationController, config: &ViewerConfig, aspect: f32, color_r: f32, time: f32) -> Self {
        Self {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(aspect, config.projection.z_near, config.projection.z_far),
            camera_position: camera.position(),
            light_position: config.light.position,
            color: Vec4::new(color_r, 0.0, 0.0, 1.0),
            time,
        }
    }

    /// Spins a quarter turn per second about Z
    pub fn transform(&self) -> Mat4 {
        Mat4::from_rotation_z((90.0 * self.time).to_radians())
    }
}

/// Issue the demo scene's draws: every cube with the object program, then
/// the light marker with the light program, reusing the cube mesh.
pub fn draw_scene<C: GraphicsContext>(
    ctx: &mut C,
    object: &mut C::Program,
    light: &mut C::Program,
    cube: &RenderableMesh<C>,
    scene: &DemoScene,
    frame: &FrameUniforms,
) {
    object.set_mat4("view_matrix", frame.view);
    object.set_mat4("projection_matrix", frame.projection);
    object.set_vec4("ourColor", frame.color);
    object.set_float("ourTime", frame.time);
    object.set_mat4("transform", frame.transform());
    object.set_vec3("lightPos", frame.light_position);
    object.set_vec3("viewPos", frame.camera_position);

    for model in scene.cube_transforms() {
        object.set_mat4("model_matrix", model);
        cube.draw(ctx, object);
    }

    light.set_mat4("model_matrix", scene.light_transform());
    light.set_mat4("view_matrix", frame.view);
    light.set_mat4("projection_matrix", frame.projection);
    cube.draw(ctx, light);
}

/// GPU side of the viewer: context, both programs, the textured cube and the depth buffer.
pub struct SceneRenderer {
    context: WgpuContext,
    object: WgpuProgram,
    light: WgpuProgram,
    cube: RenderableMesh<WgpuContext>,
    scene: DemoScene,
    _depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl SceneRenderer {
    pub fn new(
        device: std::sync::Arc<wgpu::Device>,
        queue: std::sync::Arc<wgpu::Queue>,
        format: wgpu::TextureFormat,
        (width, height): (u32, u32),
        config: &ViewerConfig,
    ) -> Self {
        let (depth_texture, depth_view) = create_depth_texture(&device, width, height);
        let mut context = WgpuContext::new(device, queue, format, DEPTH_FORMAT);

        let vertex_layout = crate::model::Vertex::layout();
        let object = context.create_program(&ProgramDescriptor {
            label: "object_program",
            wgsl: include_str!("shaders/object.wgsl"),
            uniforms: object_uniforms(),
            samplers: &["texture_diffuse1"],
            vertex_layout: vertex_layout.clone(),
        });
        let light = context.create_program(&ProgramDescriptor {
            label: "light_program",
            wgsl: include_str!("shaders/light.wgsl"),
            uniforms: light_uniforms(),
            samplers: &[],
            vertex_layout,
        });

        let texture = load_texture(&mut context, &config.texture_path, TextureKind::Diffuse);
        let mesh = unit_cube();
        let cube = RenderableMesh::new(&mut context, mesh.vertices, mesh.indices, vec![texture]);

        Self {
            context,
            object,
            light,
            cube,
            scene: DemoScene::new(config.light),
            _depth_texture: depth_texture,
            depth_view,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let (texture, view) = create_depth_texture(self.context.device(), width, height);
        self._depth_texture = texture;
        self.depth_view = view;
    }

    /// Record the scene pass into `encoder`, clearing to `clear`.
    pub fn render(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        frame: &FrameUniforms,
        clear: [f32; 3],
    ) {
        draw_scene(&mut self.context, &mut self.object, &mut self.light, &self.cube, &self.scene, frame);
        let clear = wgpu::Color { r: clear[0] as f64, g: clear[1] as f64, b: clear[2] as f64, a: 1.0 };
        self.context.flush(encoder, target, &self.depth_view, clear);
    }
}

impl Drop for SceneRenderer {
    fn drop(&mut self) {
        // Textures belong to the renderer, not to the meshes sampling them
        for binding in self.cube.textures() {
            self.context.release_texture(binding.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LightConfig;
    use crate::model::TextureBinding;
    use crate::view::backend::recording::{Call, RecordingContext};
    use crate::view::backend::{TextureId, UniformValue};

    fn frame() -> FrameUniforms {
        let camera = OrientationController::default();
        FrameUniforms::new(&camera, &ViewerConfig::default(), 800.0 / 600.0, 0.25, 1.0)
    }

    #[test]
    fn object_block_offsets() {
        let layout = object_uniforms();
        assert_eq!(layout.field("transform").unwrap().offset, 192);
        assert_eq!(layout.field("lightPos").unwrap().offset, 256);
        assert_eq!(layout.field("ourTime").unwrap().offset, 268);
        assert_eq!(layout.field("viewPos").unwrap().offset, 272);
        assert_eq!(layout.field("ourColor").unwrap().offset, 288);
        assert_eq!(layout.size(), 304);
        assert_eq!(light_uniforms().size(), 192);
    }

    #[test]
    fn frame_uniforms_follow_camera() {
        let f = frame();
        assert_eq!(f.camera_position, Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(f.color, Vec4::new(0.25, 0.0, 0.0, 1.0));
        assert!(f.transform().transform_vector3(Vec3::X).abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn scene_draws_cubes_then_light() {
        let mut ctx = RecordingContext::new();
        let mut object = ctx.program();
        let mut light = ctx.program();
        let mesh = unit_cube();
        let texture = TextureBinding {
            id: TextureId(4),
            kind: TextureKind::Diffuse,
            path: "cube.png".into(),
        };
        let cube = RenderableMesh::new(&mut ctx, mesh.vertices, mesh.indices, vec![texture]);
        let scene = DemoScene::new(LightConfig::default());
        ctx.clear();

        draw_scene(&mut ctx, &mut object, &mut light, &cube, &scene, &frame());

        let calls = ctx.calls();
        let draws: Vec<_> = calls.iter().filter(|c| matches!(c, Call::DrawIndexed { .. })).collect();
        assert_eq!(draws.len(), 11);
        assert!(draws.iter().all(|c| matches!(c, Call::DrawIndexed { index_count: 36, .. })));

        // The light marker's model matrix is the last one set before the last draw
        let last_model = calls
            .iter()
            .rev()
            .find_map(|c| match c {
                Call::SetUniform { name, value: UniformValue::Mat4(m) } if name == "model_matrix" => Some(*m),
                _ => None,
            })
            .unwrap();
        assert_eq!(last_model, scene.light_transform());
    }
}
