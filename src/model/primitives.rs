use super::mesh::Vertex;

/// CPU-side geometry before it is handed to a [`super::RenderableMesh`]
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

// position, uv, normal
#[rustfmt::skip]
const CUBE: [[f32; 8]; 36] = [
    [-0.5, -0.5, -0.5,  0.0, 0.0,   0.0,  0.0, -1.0],
    [ 0.5, -0.5, -0.5,  1.0, 0.0,   0.0,  0.0, -1.0],
    [ 0.5,  0.5, -0.5,  1.0, 1.0,   0.0,  0.0, -1.0],
    [ 0.5,  0.5, -0.5,  1.0, 1.0,   0.0,  0.0, -1.0],
    [-0.5,  0.5, -0.5,  0.0, 1.0,   0.0,  0.0, -1.0],
    [-0.5, -0.5, -0.5,  0.0, 0.0,   0.0,  0.0, -1.0],

    [-0.5, -0.5,  0.5,  0.0, 0.0,   0.0,  0.0,  1.0],
    [ 0.5, -0.5,  0.5,  1.0, 0.0,   0.0,  0.0,  1.0],
    [ 0.5,  0.5,  0.5,  1.0, 1.0,   0.0,  0.0,  1.0],
    [ 0.5,  0.5,  0.5,  1.0, 1.0,   0.0,  0.0,  1.0],
    [-0.5,  0.5,  0.5,  0.0, 1.0,   0.0,  0.0,  1.0],
    [-0.5, -0.5,  0.5,  0.0, 0.0,   0.0,  0.0,  1.0],

    [-0.5,  0.5,  0.5,  1.0, 0.0,  -1.0,  0.0,  0.0],
    [-0.5,  0.5, -0.5,  1.0, 1.0,  -1.0,  0.0,  0.0],
    [-0.5, -0.5, -0.5,  0.0, 1.0,  -1.0,  0.0,  0.0],
    [-0.5, -0.5, -0.5,  0.0, 1.0,  -1.0,  0.0,  0.0],
    [-0.5, -0.5,  0.5,  0.0, 0.0,  -1.0,  0.0,  0.0],
    [-0.5,  0.5,  0.5,  1.0, 0.0,  -1.0,  0.0,  0.0],

    [ 0.5,  0.5,  0.5,  1.0, 0.0,   1.0,  0.0,  0.0],
    [ 0.5,  0.5, -0.5,  1.0, 1.0,   1.0,  0.0,  0.0],
    [ 0.5, -0.5, -0.5,  0.0, 1.0,   1.0,  0.0,  0.0],
    [ 0.5, -0.5, -0.5,  0.0, 1.0,   1.0,  0.0,  0.0],
    [ 0.5, -0.5,  0.5,  0.0, 0.0,   1.0,  0.0,  0.0],
    [ 0.5,  0.5,  0.5,  1.0, 0.0,   1.0,  0.0,  0.0],

    [-0.5, -0.5, -0.5,  0.0, 1.0,   0.0, -1.0,  0.0],
    [ 0.5, -0.5, -0.5,  1.0, 1.0,   0.0, -1.0,  0.0],
    [ 0.5, -0.5,  0.5,  1.0, 0.0,   0.0, -1.0,  0.0],
    [ 0.5, -0.5,  0.5,  1.0, 0.0,   0.0, -1.0,  0.0],
    [-0.5, -0.5,  0.5,  0.0, 0.0,   0.0, -1.0,  0.0],
    [-0.5, -0.5, -0.5,  0.0, 1.0,   0.0, -1.0,  0.0],

    [-0.5,  0.5, -0.5,  0.0, 1.0,   0.0,  1.0,  0.0],
    [ 0.5,  0.5, -0.5,  1.0, 1.0,   0.0,  1.0,  0.0],
    [ 0.5,  0.5,  0.5,  1.0, 0.0,   0.0,  1.0,  0.0],
    [ 0.5,  0.5,  0.5,  1.0, 0.0,   0.0,  1.0,  0.0],
    [-0.5,  0.5,  0.5,  0.0, 0.0,   0.0,  1.0,  0.0],
    [-0.5,  0.5, -0.5,  0.0, 1.0,   0.0,  1.0,  0.0],
];

/// Unit cube centred on the origin, one quad (two triangles) per face with
/// flat normals.
pub fn unit_cube() -> MeshData {
    let vertices = CUBE
        .iter()
        .map(|v| Vertex::new([v[0], v[1], v[2]], [v[5], v[6], v[7]], [v[3], v[4]]))
        .collect();
    let indices = (0..CUBE.len() as u32).collect();
    MeshData { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn cube_is_a_closed_triangle_list() {
        let cube = unit_cube();
        assert_eq!(cube.vertices.len(), 36);
        assert_eq!(cube.indices.len() % 3, 0);
        assert!(cube.indices.iter().all(|&i| (i as usize) < cube.vertices.len()));
    }

    #[test]
    fn normals_point_away_from_centre() {
        let cube = unit_cube();
        for v in &cube.vertices {
            let p = Vec3::from(v.position);
            let n = Vec3::from(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-6);
            assert!((p.dot(n) - 0.5).abs() < 1e-6, "normal {n:?} at {p:?}");
        }
    }

    #[test]
    fn bone_slots_stay_zero() {
        for v in unit_cube().vertices {
            assert_eq!(v.bone_ids, [0; 4]);
            assert_eq!(v.weights, [0.0; 4]);
        }
    }
}
