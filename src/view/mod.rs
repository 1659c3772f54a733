// VIEW: GPU context, programs and the scene pass
pub mod backend;
pub mod gpu_init;
pub mod render;
pub mod texture;
pub mod wgpu_backend;

pub use backend::{GraphicsContext, ShaderProgram, TextureId, UniformValue, VertexLayout};
pub use gpu_init::GpuContext;
pub use render::{draw_scene, FrameUniforms, SceneRenderer};
pub use wgpu_backend::{WgpuContext, WgpuProgram};
