use crate::model::OrientationController;

use super::input::InputEvent;

/// Per-window interaction state: the camera plus pointer bookkeeping.
pub struct ViewerSession {
    pub camera: OrientationController,
    last_pointer: Option<(f32, f32)>,
    captured: bool,
}

impl ViewerSession {
    /// Starts with the pointer captured
    pub fn new(camera: OrientationController) -> Self {
        Self { camera, last_pointer: None, captured: true }
    }

    pub fn captured(&self) -> bool {
        self.captured
    }

    pub fn handle(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::Move { direction, elapsed } => self.camera.apply_movement(direction, elapsed),
            InputEvent::PointerMoved { x, y } => {
                if !self.captured {
                    return;
                }
                if let Some((last_x, last_y)) = self.last_pointer {
                    // Screen y grows downward
                    self.camera.apply_look_delta(x - last_x, last_y - y, true);
                }
                self.last_pointer = Some((x, y));
            }
            InputEvent::PointerDelta { dx, dy } => {
                if self.captured {
                    self.camera.apply_look_delta(dx, dy, true);
                }
            }
            InputEvent::Scroll { delta } => self.camera.apply_zoom_delta(delta),
            InputEvent::ToggleCapture => {
                self.captured = !self.captured;
                // The cursor may have moved freely in between
                self.last_pointer = None;
                tracing::debug!(captured = self.captured, "pointer capture toggled");
            }
        }
    }
}
