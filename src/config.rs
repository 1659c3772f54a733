use glam::Vec3;
use std::env;
use std::path::PathBuf;

use crate::controller::KeyBindings;
use crate::model::camera::{DEFAULT_PITCH, DEFAULT_SENSITIVITY, DEFAULT_SPEED, DEFAULT_YAW, DEFAULT_ZOOM};

/// Top-level settings for the viewer binary
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub projection: ProjectionConfig,
    pub light: LightConfig,
    pub keys: KeyBindings,
    pub texture_path: PathBuf,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            projection: ProjectionConfig::default(),
            light: LightConfig::default(),
            keys: KeyBindings::default(),
            texture_path: PathBuf::from("assets/textures/splash.png"),
        }
    }
}

impl ViewerConfig {
    /// Defaults, with `VIEWER_TEXTURE` overriding the cube texture path.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = env::var("VIEWER_TEXTURE") {
            config.texture_path = PathBuf::from(path);
        }
        config
    }
}

#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Scene Viewer".to_string(),
            width: 800,
            height: 600,
        }
    }
}

/// Initial pose and tuning of the orientation controller
#[derive(Debug, Clone, Copy)]
pub struct CameraConfig {
    pub position: Vec3,
    pub world_up: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub movement_speed: f32,
    pub look_sensitivity: f32,
    pub zoom: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            world_up: Vec3::Y,
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
            movement_speed: DEFAULT_SPEED,
            look_sensitivity: DEFAULT_SENSITIVITY,
            zoom: DEFAULT_ZOOM,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProjectionConfig {
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self { z_near: 0.1, z_far: 100.0 }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LightConfig {
    pub position: Vec3,
    pub marker_scale: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(2.0, 2.0, 2.0),
            marker_scale: 0.2,
        }
    }
}
