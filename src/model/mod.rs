// MODEL: camera state and mesh data
pub mod camera;
pub mod mesh;
pub mod primitives;
pub mod sampler;
pub mod scene;

pub use camera::{angles_to_basis, Basis, Movement, OrientationController};
pub use mesh::{RenderableMesh, TextureBinding, Vertex};
pub use primitives::{unit_cube, MeshData};
pub use sampler::{PerKindCounter, SamplerNameResolver, TextureKind};
pub use scene::DemoScene;
