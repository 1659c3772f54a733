use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

pub const DEFAULT_YAW: f32 = -90.0;
pub const DEFAULT_PITCH: f32 = 0.0;
pub const DEFAULT_SPEED: f32 = 2.5;
pub const DEFAULT_SENSITIVITY: f32 = 0.1;
pub const DEFAULT_ZOOM: f32 = 45.0;

/// Pitch is held short of ±90° so `front` never lines up with world up
pub const PITCH_LIMIT: f32 = 89.0;
pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 120.0;

/// Window-independent movement intents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Orthonormal camera frame derived from yaw/pitch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub front: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

/// Derive the camera frame from Euler angles given in degrees.
pub fn angles_to_basis(yaw: f32, pitch: f32, world_up: Vec3) -> Basis {
    let (yaw, pitch) = (yaw.to_radians(), pitch.to_radians());
    let front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize();
    // Normalized because the cross product shrinks as pitch approaches the poles
    let right = front.cross(world_up).normalize();
    let up = right.cross(front).normalize();
    Basis { front, right, up }
}

/// Free-flying viewpoint driven by movement intents and pointer/wheel deltas.
///
/// `front`, `right` and `up` are never written directly: every change to
/// yaw or pitch goes through [`angles_to_basis`].
#[derive(Debug, Clone)]
pub struct OrientationController {
    position: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    basis: Basis,
    movement_speed: f32,
    look_sensitivity: f32,
    zoom: f32,
}

impl Default for OrientationController {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Y, DEFAULT_YAW, DEFAULT_PITCH)
    }
}

impl OrientationController {
    pub fn new(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            world_up,
            yaw,
            pitch,
            basis: angles_to_basis(yaw, pitch, world_up),
            movement_speed: DEFAULT_SPEED,
            look_sensitivity: DEFAULT_SENSITIVITY,
            zoom: DEFAULT_ZOOM,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self::new(config.position, config.world_up, config.yaw, config.pitch);
        camera.movement_speed = config.movement_speed;
        camera.look_sensitivity = config.look_sensitivity;
        camera.zoom = config.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        camera
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn world_up(&self) -> Vec3 {
        self.world_up
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn front(&self) -> Vec3 {
        self.basis.front
    }

    pub fn right(&self) -> Vec3 {
        self.basis.right
    }

    pub fn up(&self) -> Vec3 {
        self.basis.up
    }

    pub fn basis(&self) -> Basis {
        self.basis
    }

    pub fn movement_speed(&self) -> f32 {
        self.movement_speed
    }

    pub fn look_sensitivity(&self) -> f32 {
        self.look_sensitivity
    }

    /// Vertical field of view in degrees
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_movement_speed(&mut self, speed: f32) {
        self.movement_speed = speed;
    }

    pub fn set_look_sensitivity(&mut self, sensitivity: f32) {
        self.look_sensitivity = sensitivity;
    }

    /// Right-handed look-at from the current position along `front`.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.basis.front, self.basis.up)
    }

    /// Right-handed perspective using `zoom` as the vertical field of view.
    pub fn projection_matrix(&self, aspect: f32, z_near: f32, z_far: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), aspect, z_near, z_far)
    }

    pub fn apply_movement(&mut self, direction: Movement, elapsed_seconds: f32) {
        let velocity = self.movement_speed * elapsed_seconds;
        match direction {
            Movement::Forward => self.position += self.basis.front * velocity,
            Movement::Backward => self.position -= self.basis.front * velocity,
            Movement::Left => self.position -= self.basis.right * velocity,
            Movement::Right => self.position += self.basis.right * velocity,
            Movement::Up => self.position += self.world_up * velocity,
            Movement::Down => self.position -= self.world_up * velocity,
        }
    }

    /// Pointer deltas in pixels; positive `dy` looks up.
    ///
    /// With `constrain_pitch` the pitch is saturated at ±89° after the
    /// delta is added, so overshoot past the limit is absorbed rather than
    /// rejected.
    pub fn apply_look_delta(&mut self, dx: f32, dy: f32, constrain_pitch: bool) {
        self.yaw += dx * self.look_sensitivity;
        self.pitch += dy * self.look_sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        self.basis = angles_to_basis(self.yaw, self.pitch, self.world_up);
    }

    pub fn apply_zoom_delta(&mut self, delta_scroll: f32) {
        self.zoom = (self.zoom - delta_scroll).clamp(MIN_ZOOM, MAX_ZOOM);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn assert_orthonormal(b: &Basis) {
        assert!((b.front.length() - 1.0).abs() < EPS, "front not unit: {:?}", b.front);
        assert!((b.right.length() - 1.0).abs() < EPS, "right not unit: {:?}", b.right);
        assert!((b.up.length() - 1.0).abs() < EPS, "up not unit: {:?}", b.up);
        assert!(b.front.dot(b.right).abs() < EPS);
        assert!(b.right.dot(b.up).abs() < EPS);
        assert!(b.front.dot(b.up).abs() < EPS);
    }

    #[test]
    fn default_faces_negative_z() {
        let cam = OrientationController::default();
        assert!(cam.front().abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), EPS));
        assert!(cam.right().abs_diff_eq(Vec3::X, EPS));
        assert!(cam.up().abs_diff_eq(Vec3::Y, EPS));
    }

    #[test]
    fn pitch_saturates_at_limit() {
        let mut cam = OrientationController::default();
        for _ in 0..50 {
            cam.apply_look_delta(3.0, 400.0, true);
            assert!(cam.pitch() <= PITCH_LIMIT && cam.pitch() >= -PITCH_LIMIT);
        }
        assert_eq!(cam.pitch(), PITCH_LIMIT);

        // Saturation at the bound is idempotent
        cam.apply_look_delta(0.0, 10.0, true);
        assert_eq!(cam.pitch(), PITCH_LIMIT);

        for _ in 0..50 {
            cam.apply_look_delta(-7.0, -900.0, true);
            assert!(cam.pitch() <= PITCH_LIMIT && cam.pitch() >= -PITCH_LIMIT);
        }
        assert_eq!(cam.pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn pitch_unconstrained_passes_through() {
        let mut cam = OrientationController::default();
        cam.apply_look_delta(0.0, 1000.0, false);
        assert!((cam.pitch() - 100.0).abs() < EPS);
    }

    #[test]
    fn zoom_stays_in_range() {
        let mut cam = OrientationController::default();
        for delta in [10.0, 30.0, 100.0, -500.0, 3.5, -0.25, 1000.0, -1000.0] {
            cam.apply_zoom_delta(delta);
            assert!(cam.zoom() >= MIN_ZOOM && cam.zoom() <= MAX_ZOOM);
        }
        cam.apply_zoom_delta(-1000.0);
        assert_eq!(cam.zoom(), MAX_ZOOM);
        cam.apply_zoom_delta(1000.0);
        assert_eq!(cam.zoom(), MIN_ZOOM);
        cam.apply_zoom_delta(1000.0);
        assert_eq!(cam.zoom(), MIN_ZOOM);
    }

    #[test]
    fn scroll_up_narrows_fov() {
        let mut cam = OrientationController::default();
        cam.apply_zoom_delta(5.0);
        assert_eq!(cam.zoom(), DEFAULT_ZOOM - 5.0);
    }

    #[test]
    fn basis_orthonormal_across_angles() {
        let mut yaw = -720.0;
        while yaw <= 720.0 {
            let mut pitch = -PITCH_LIMIT;
            while pitch <= PITCH_LIMIT {
                assert_orthonormal(&angles_to_basis(yaw, pitch, Vec3::Y));
                pitch += 8.9;
            }
            yaw += 37.0;
        }
    }

    #[test]
    fn basis_orthonormal_after_look_deltas() {
        let mut cam = OrientationController::default();
        let deltas = [(12.0, 4.0), (-300.0, 77.0), (0.0, 0.0), (5000.0, -2000.0), (1.5, 900.0)];
        for (dx, dy) in deltas {
            cam.apply_look_delta(dx, dy, true);
            assert_orthonormal(&cam.basis());
            assert!(cam.right().abs_diff_eq(cam.front().cross(cam.world_up()).normalize(), EPS));
        }
    }

    #[test]
    fn movement_is_reversible() {
        let mut cam = OrientationController::new(Vec3::new(1.0, -2.0, 3.0), Vec3::Y, 33.0, -12.0);
        let start = cam.position();
        for t in [0.0, 0.016, 0.5, 2.0] {
            for (there, back) in [
                (Movement::Forward, Movement::Backward),
                (Movement::Left, Movement::Right),
                (Movement::Up, Movement::Down),
            ] {
                cam.apply_movement(there, t);
                cam.apply_movement(back, t);
                assert!(cam.position().abs_diff_eq(start, EPS));
            }
        }
    }

    #[test]
    fn movement_axes() {
        let mut cam = OrientationController::default();
        cam.apply_movement(Movement::Forward, 1.0);
        assert!(cam.position().abs_diff_eq(Vec3::new(0.0, 0.0, -DEFAULT_SPEED), EPS));

        let mut cam = OrientationController::default();
        cam.apply_movement(Movement::Right, 2.0);
        assert!(cam.position().abs_diff_eq(Vec3::new(2.0 * DEFAULT_SPEED, 0.0, 0.0), EPS));

        // Up follows world up even when looking down
        let mut cam = OrientationController::default();
        cam.apply_look_delta(0.0, -450.0, true);
        cam.apply_movement(Movement::Up, 1.0);
        assert!(cam.position().abs_diff_eq(Vec3::new(0.0, DEFAULT_SPEED, 0.0), EPS));
    }

    #[test]
    fn look_does_not_move_position() {
        let mut cam = OrientationController::new(Vec3::new(4.0, 5.0, 6.0), Vec3::Y, DEFAULT_YAW, 0.0);
        cam.apply_look_delta(123.0, -45.0, true);
        assert_eq!(cam.position(), Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn view_matrix_is_deterministic() {
        let mut cam = OrientationController::default();
        cam.apply_look_delta(40.0, 10.0, true);
        cam.apply_movement(Movement::Left, 0.3);
        let a = cam.view_matrix();
        let b = cam.view_matrix();
        assert_eq!(a.to_cols_array(), b.to_cols_array());
    }

    #[test]
    fn view_matrix_maps_eye_to_origin() {
        let cam = OrientationController::new(Vec3::new(0.0, 0.0, 3.0), Vec3::Y, DEFAULT_YAW, 0.0);
        let eye = cam.view_matrix().transform_point3(cam.position());
        assert!(eye.abs_diff_eq(Vec3::ZERO, EPS));
        // A point straight ahead lands on the -Z axis in view space
        let ahead = cam.view_matrix().transform_point3(Vec3::ZERO);
        assert!(ahead.abs_diff_eq(Vec3::new(0.0, 0.0, -3.0), EPS));
    }

    #[test]
    fn config_applies_tuning() {
        let config = CameraConfig {
            movement_speed: 7.0,
            look_sensitivity: 0.5,
            zoom: 500.0,
            ..CameraConfig::default()
        };
        let cam = OrientationController::from_config(&config);
        assert_eq!(cam.movement_speed(), 7.0);
        assert_eq!(cam.look_sensitivity(), 0.5);
        assert_eq!(cam.zoom(), MAX_ZOOM);
        assert_eq!(cam.position(), config.position);
    }

    #[test]
    fn movement_speed_scales_distance() {
        let mut cam = OrientationController::default();
        cam.set_movement_speed(10.0);
        assert_eq!(cam.movement_speed(), 10.0);

        let start = cam.position();
        cam.apply_movement(Movement::Right, 0.5);
        assert!(((cam.position() - start).length() - 5.0).abs() < EPS);
    }

    #[test]
    fn look_sensitivity_scales_rotation() {
        let mut cam = OrientationController::default();
        cam.set_look_sensitivity(1.0);
        assert_eq!(cam.look_sensitivity(), 1.0);

        cam.apply_look_delta(30.0, -20.0, true);
        assert!((cam.yaw() - (DEFAULT_YAW + 30.0)).abs() < EPS);
        assert!((cam.pitch() - (DEFAULT_PITCH - 20.0)).abs() < EPS);
        assert_orthonormal(&cam.basis());
    }
}
