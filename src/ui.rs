use egui::Context;

use crate::model::OrientationController;

/// Values the overlay edits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UiState {
    /// Red channel of `ourColor`
    pub color_r: f32,
    pub clear_color: [f32; 3],
}

impl Default for UiState {
    fn default() -> Self {
        Self { color_r: 0.5, clear_color: [0.0, 0.0, 0.0] }
    }
}

/// Run one egui frame over `raw_input` and return its output
pub fn build_ui(
    egui_ctx: &Context,
    raw_input: egui::RawInput,
    state: &mut UiState,
    camera: &OrientationController,
    captured: bool,
    dt: f32,
) -> egui::FullOutput {
    egui_ctx.run(raw_input, |ctx| {
        draw_uniform_window(ctx, state);
        draw_camera_window(ctx, camera, captured, dt);
    })
}

fn draw_uniform_window(ctx: &Context, state: &mut UiState) {
    egui::Window::new("Uniform Controller")
        .default_pos([8.0, 8.0])
        .show(ctx, |ui| {
            ui.add(egui::Slider::new(&mut state.color_r, 0.0..=1.0).text("ourColor.r"));
            ui.label(format!("Current value: {:.3}", state.color_r));
            ui.horizontal(|ui| {
                ui.label("Clear colour");
                ui.color_edit_button_rgb(&mut state.clear_color);
            });
        });
}

fn draw_camera_window(ctx: &Context, camera: &OrientationController, captured: bool, dt: f32) {
    let pos = camera.position();
    egui::Window::new("Camera")
        .default_pos([8.0, 140.0])
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(format!("FPS: {:.0}", if dt > 0.0 { 1.0 / dt } else { 0.0 }))
                    .small(),
            );
            ui.label(egui::RichText::new(format!("Pos: x: {:.2} y: {:.2} z: {:.2}", pos.x, pos.y, pos.z)).small());
            ui.label(egui::RichText::new(format!("Yaw: {:.1} Pitch: {:.1}", camera.yaw(), camera.pitch())).small());
            ui.label(egui::RichText::new(format!("Zoom: {:.1}", camera.zoom())).small());
            ui.separator();
            ui.label(egui::RichText::new("WASD - Move, Space/Ctrl - Up/Down").small());
            let alt = if captured { "Alt - Release mouse" } else { "Alt - Capture mouse" };
            ui.label(egui::RichText::new(alt).small());
        });
}
