use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::PhysicalKey,
    window::{CursorGrabMode, Window},
};

use scene_viewer::{
    config::ViewerConfig,
    controller::{HeldKeys, InputEvent, KeyAction, ViewerSession},
    error::ViewerResult,
    logging,
    model::OrientationController,
    ui::{self, UiState},
    view::{FrameUniforms, GpuContext, SceneRenderer},
};

const PIXELS_PER_SCROLL_LINE: f32 = 20.0;

/// How look input arrives while the pointer is captured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PointerSource {
    /// Cursor confined to the window, absolute positions
    Cursor,
    /// Cursor locked in place, raw device motion
    Device,
}

struct App {
    gpu: GpuContext,
    window: Arc<Window>,
    config: ViewerConfig,
    renderer: SceneRenderer,

    // egui
    egui_renderer: egui_wgpu::Renderer,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,
    ui_state: UiState,

    // Input handling
    session: ViewerSession,
    held_keys: HeldKeys,
    pointer_source: PointerSource,
    quit_requested: bool,

    // Frame timing
    start_time: Instant,
    last_frame_time: Instant,
    last_dt: f32,
}

impl App {
    async fn new(window: Arc<Window>, config: ViewerConfig) -> ViewerResult<Self> {
        let gpu = GpuContext::new(window.clone()).await?;
        let size = (gpu.config.width, gpu.config.height);

        let renderer = SceneRenderer::new(gpu.device.clone(), gpu.queue.clone(), gpu.format, size, &config);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&gpu.device, gpu.format, egui_wgpu::RendererOptions::default());

        let session = ViewerSession::new(OrientationController::from_config(&config.camera));
        tracing::info!(width = size.0, height = size.1, "viewer ready");

        let mut app = Self {
            gpu,
            window,
            config,
            renderer,
            egui_renderer,
            egui_state,
            egui_ctx,
            ui_state: UiState::default(),
            session,
            held_keys: HeldKeys::default(),
            pointer_source: PointerSource::Cursor,
            quit_requested: false,
            start_time: Instant::now(),
            last_frame_time: Instant::now(),
            last_dt: 0.0,
        };
        app.apply_capture();
        Ok(app)
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        // Releases always count, even when egui consumes them
        if let WindowEvent::KeyboardInput { event: key, .. } = event {
            self.held_keys.key_released(key.state, key.physical_key);
        }

        // egui gets first look unless the pointer is captured
        if !self.session.captured() && self.egui_state.on_window_event(self.window.as_ref(), event).consumed {
            return true;
        }

        match event {
            WindowEvent::KeyboardInput { event: KeyEvent { state, physical_key, .. }, .. } => {
                if let (ElementState::Pressed, PhysicalKey::Code(code)) = (state, physical_key) {
                    if self.held_keys.press(*code) {
                        match self.config.keys.action(*code) {
                            Some(KeyAction::ToggleCapture) => self.toggle_capture(),
                            Some(KeyAction::Quit) => self.quit_requested = true,
                            _ => {}
                        }
                    }
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.pointer_source == PointerSource::Cursor {
                    self.session.handle(&InputEvent::PointerMoved { x: position.x as f32, y: position.y as f32 });
                }
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_SCROLL_LINE,
                };
                self.session.handle(&InputEvent::Scroll { delta });
                true
            }
            WindowEvent::Focused(false) => {
                self.held_keys.clear();
                false
            }
            _ => false,
        }
    }

    fn toggle_capture(&mut self) {
        self.session.handle(&InputEvent::ToggleCapture);
        self.apply_capture();
    }

    /// Grab or release the cursor to match the session
    fn apply_capture(&mut self) {
        if self.session.captured() {
            let _ = self.window.set_cursor_visible(false);
            // Not every platform supports both modes
            self.pointer_source = match self.window.set_cursor_grab(CursorGrabMode::Confined) {
                Ok(()) => PointerSource::Cursor,
                Err(_) => {
                    let _ = self.window.set_cursor_grab(CursorGrabMode::Locked);
                    PointerSource::Device
                }
            };
        } else {
            let _ = self.window.set_cursor_visible(true);
            let _ = self.window.set_cursor_grab(CursorGrabMode::None);
            self.pointer_source = PointerSource::Cursor;
        }
    }

    fn handle_mouse_motion(&mut self, dx: f64, dy: f64) {
        if self.pointer_source == PointerSource::Device {
            self.session.handle(&InputEvent::PointerDelta { dx: dx as f32, dy: -dy as f32 });
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if self.gpu.resize(new_size.width, new_size.height) {
            self.renderer.resize(new_size.width, new_size.height);
            tracing::debug!(width = new_size.width, height = new_size.height, "resized");
        }
    }

    fn update(&mut self, dt: f32) {
        self.last_dt = dt;
        for event in self.held_keys.movement_events(&self.config.keys, dt) {
            self.session.handle(&event);
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let full_output = ui::build_ui(
            &self.egui_ctx,
            raw_input,
            &mut self.ui_state,
            &self.session.camera,
            self.session.captured(),
            self.last_dt,
        );
        self.egui_state.handle_platform_output(&self.window, full_output.platform_output);

        let output = self.gpu.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.config.width, self.gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };
        let primitives = self.egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        let mut encoder = self.gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        let frame = FrameUniforms::new(
            &self.session.camera,
            &self.config,
            self.gpu.aspect(),
            self.ui_state.color_r,
            self.start_time.elapsed().as_secs_f32(),
        );
        self.renderer.render(&mut encoder, &view, &frame, self.ui_state.clear_color);

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer.update_texture(&self.gpu.device, &self.gpu.queue, *id, image_delta);
        }
        self.egui_renderer
            .update_buffers(&self.gpu.device, &self.gpu.queue, &mut encoder, &primitives, &screen_descriptor);

        // Render egui on top
        {
            let egui_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui_renderer.render(&mut egui_pass.forget_lifetime(), &primitives, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn run() -> ViewerResult<()> {
    let config = ViewerConfig::from_env();

    let event_loop = EventLoop::new()?;
    let window_attributes = Window::default_attributes()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(config.window.width, config.window.height));
    let window = Arc::new(event_loop.create_window(window_attributes)?);

    let mut app = pollster::block_on(App::new(window, config))?;

    event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == app.window.id() => {
                if !app.input(event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(physical_size) => {
                            app.resize(*physical_size);
                        }
                        WindowEvent::RedrawRequested => {
                            let now = Instant::now();
                            let dt = (now - app.last_frame_time).as_secs_f32();
                            app.last_frame_time = now;

                            app.update(dt);

                            match app.render() {
                                Ok(_) => {}
                                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => app.gpu.reconfigure(),
                                Err(wgpu::SurfaceError::OutOfMemory) => {
                                    tracing::error!("surface out of memory");
                                    elwt.exit();
                                }
                                Err(e) => tracing::warn!(error = ?e, "dropped frame"),
                            }
                        }
                        _ => {}
                    }
                }
                if app.quit_requested {
                    elwt.exit();
                }
            }
            Event::DeviceEvent { event: DeviceEvent::MouseMotion { delta }, .. } => {
                app.handle_mouse_motion(delta.0, delta.1);
            }
            Event::AboutToWait => {
                app.window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}

fn main() -> ExitCode {
    logging::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "viewer failed");
            ExitCode::FAILURE
        }
    }
}
