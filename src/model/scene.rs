use glam::{Mat4, Vec3};

use crate::config::LightConfig;

/// Where the demo cubes sit
pub const CUBE_POSITIONS: [Vec3; 10] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(2.0, 5.0, -15.0),
    Vec3::new(-1.5, -2.2, -2.5),
    Vec3::new(-3.8, -2.0, -12.3),
    Vec3::new(2.4, -0.4, -3.5),
    Vec3::new(-1.7, 3.0, -7.5),
    Vec3::new(1.3, -2.0, -2.5),
    Vec3::new(1.5, 2.0, -2.5),
    Vec3::new(1.5, 0.2, -1.5),
    Vec3::new(-1.3, 1.0, -1.5),
];

const CUBE_TILT_AXIS: Vec3 = Vec3::new(1.0, 0.3, 0.5);
const CUBE_TILT_STEP_DEG: f32 = 20.0;

/// Fixed placements for the demo: ten tilted cubes and one light marker
#[derive(Debug, Clone)]
pub struct DemoScene {
    pub cube_positions: Vec<Vec3>,
    pub light: LightConfig,
}

impl DemoScene {
    pub fn new(light: LightConfig) -> Self {
        Self { cube_positions: CUBE_POSITIONS.to_vec(), light }
    }

    /// Model matrices of the cubes, cube `i` tilted by `20° * i`
    pub fn cube_transforms(&self) -> impl Iterator<Item = Mat4> + '_ {
        self.cube_positions.iter().enumerate().map(|(i, pos)| {
            let angle = (CUBE_TILT_STEP_DEG * i as f32).to_radians();
            Mat4::from_translation(*pos) * Mat4::from_axis_angle(CUBE_TILT_AXIS.normalize(), angle)
        })
    }

    pub fn light_transform(&self) -> Mat4 {
        Mat4::from_translation(self.light.position) * Mat4::from_scale(Vec3::splat(self.light.marker_scale))
    }
}
