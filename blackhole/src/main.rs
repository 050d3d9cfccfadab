//! Real-Time Black Hole Visualization
//!
//! CPU ray marcher for a Schwarzschild black hole featuring:
//! - Gravitational lensing of the background skybox
//! - Semi-transparent accretion disk with Doppler beaming
//! - HDR bloom, exposure tonemapping and gamma correction
//! - Adjustable march resolution for interactive frame rates
//!
//! Controls:
//! - Left mouse drag: Orbit camera / look around (free-fly)
//! - Scroll: Dolly the orbit / zoom FOV (free-fly)
//! - WASD + Q/E: Move in free-fly mode
//! - Tab: Toggle camera mode
//! - Space: Pause/resume disk animation
//! - R: Reset view
//! - +/-: Adjust black hole mass
//! - Esc: Quit

mod controls_ui;
mod disk;
mod marcher;
mod params;
mod physics;
mod post;
mod render;
mod renderer;
mod sky;

use common::{CameraMode, FrameTexture, GraphicsContext, MoveDirection, OrbitCamera};
use controls_ui::draw_controls_sidebar;
use params::RenderParams;
use physics::BlackHole;
use render::FrameRenderer;
use renderer::BlitRenderer;
use sky::{ColorMap, Cubemap};
use std::path::Path;
use winit::{
    event::{ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::ControlFlow,
    keyboard::{KeyCode, PhysicalKey},
};

const SKYBOX_DIR: &str = "assets/skybox";
const COLOR_MAP_PATH: &str = "assets/color_map.png";
const STARFIELD_SEED: u64 = 42;

struct EguiState {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

#[derive(Default)]
struct KeyState {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
    up: bool,
    down: bool,
}

struct App {
    ctx: GraphicsContext,
    blit: BlitRenderer,
    frame_texture: FrameTexture,
    frame_renderer: FrameRenderer,
    camera: OrbitCamera,
    black_hole: BlackHole,
    params: RenderParams,
    sky: Cubemap,
    ramp: ColorMap,

    // Input state
    keys_pressed: KeyState,
    last_mouse_pos: Option<(f64, f64)>,

    // Simulation state
    time: f32,
    paused: bool,
    fps: f32,
    egui: EguiState,
}

impl App {
    fn new(ctx: GraphicsContext) -> Self {
        let params = RenderParams::default();
        let width = (ctx.size.width / params.render_scale).max(1);
        let height = (ctx.size.height / params.render_scale).max(1);

        let frame_texture = FrameTexture::new(&ctx.device, width, height);
        let blit = BlitRenderer::new(&ctx, &frame_texture);
        let frame_renderer = FrameRenderer::new(width as usize, height as usize);

        let sky = Cubemap::load_or_fallback(Path::new(SKYBOX_DIR), STARFIELD_SEED);
        let ramp = ColorMap::load_or_fallback(Path::new(COLOR_MAP_PATH));

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &ctx.window,
            Some(ctx.window.scale_factor() as f32),
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&ctx.device, ctx.config.format, None, 1);

        Self {
            ctx,
            blit,
            frame_texture,
            frame_renderer,
            camera: OrbitCamera::default(),
            black_hole: BlackHole::default(),
            params,
            sky,
            ramp,
            keys_pressed: KeyState::default(),
            last_mouse_pos: None,
            time: 0.0,
            paused: false,
            fps: 0.0,
            egui: EguiState {
                ctx: egui_ctx,
                state: egui_state,
                renderer: egui_renderer,
            },
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        // March buffers follow the window in render(), once per frame.
        self.ctx.resize(new_size);
    }

    fn update(&mut self, dt: f32) {
        if !self.paused {
            self.time += dt * self.params.time_scale.max(0.0);
        }
        if dt > 0.0 {
            self.fps = 0.95 * self.fps + 0.05 / dt;
        }

        if self.keys_pressed.forward {
            self.camera.process_movement(MoveDirection::Forward, dt);
        }
        if self.keys_pressed.backward {
            self.camera.process_movement(MoveDirection::Backward, dt);
        }
        if self.keys_pressed.left {
            self.camera.process_movement(MoveDirection::Left, dt);
        }
        if self.keys_pressed.right {
            self.camera.process_movement(MoveDirection::Right, dt);
        }
        if self.keys_pressed.up {
            self.camera.process_movement(MoveDirection::Up, dt);
        }
        if self.keys_pressed.down {
            self.camera.process_movement(MoveDirection::Down, dt);
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // March at the window resolution divided by the render scale.
        let scale = self.params.sanitized().render_scale;
        let width = (self.ctx.size.width / scale).max(1);
        let height = (self.ctx.size.height / scale).max(1);
        self.frame_renderer.resize(width as usize, height as usize);

        let frame = self.frame_renderer.render(
            &self.camera,
            &self.black_hole,
            &self.params,
            &self.sky,
            &self.ramp,
            self.time,
            1,
        );

        if self.frame_texture.resize(&self.ctx.device, width, height) {
            self.blit.rebind(&self.ctx, &self.frame_texture);
        }
        self.frame_texture.upload(&self.ctx.queue, frame);

        let stats = self.frame_renderer.stats();
        let march_size = (self.frame_renderer.width(), self.frame_renderer.height());

        // Build egui UI
        let raw_input = self.egui.state.take_egui_input(&self.ctx.window);
        let fps = self.fps;
        let full_output = self.egui.ctx.run(raw_input, |ctx| {
            draw_controls_sidebar(
                ctx,
                &mut self.params,
                &mut self.black_hole,
                &mut self.camera,
                stats,
                fps,
                march_size,
            );
        });

        self.egui
            .state
            .handle_platform_output(&self.ctx.window, full_output.platform_output);
        let tris = self
            .egui
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui
                .renderer
                .update_texture(&self.ctx.device, &self.ctx.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.ctx.size.width, self.ctx.size.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.blit.render(&mut encoder, &view);

        self.egui.renderer.update_buffers(
            &self.ctx.device,
            &self.ctx.queue,
            &mut encoder,
            &tris,
            &screen_descriptor,
        );
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui
                .renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui.renderer.free_texture(id);
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        match key {
            // Free-fly movement
            KeyCode::KeyW => self.keys_pressed.forward = pressed,
            KeyCode::KeyS => self.keys_pressed.backward = pressed,
            KeyCode::KeyA => self.keys_pressed.left = pressed,
            KeyCode::KeyD => self.keys_pressed.right = pressed,
            KeyCode::KeyE => self.keys_pressed.up = pressed,
            KeyCode::KeyQ => self.keys_pressed.down = pressed,

            _ if pressed => {
                // Only handle on press
                match key {
                    KeyCode::Space => self.paused = !self.paused,
                    KeyCode::Tab => {
                        let mode = match self.camera.mode {
                            CameraMode::Orbit => CameraMode::FreeFly,
                            CameraMode::FreeFly => CameraMode::Orbit,
                        };
                        self.camera.set_mode(mode);
                        log::info!("camera mode: {:?}", mode);
                    }
                    KeyCode::KeyR => {
                        self.camera = OrbitCamera::default();
                    }
                    KeyCode::Equal | KeyCode::NumpadAdd => {
                        self.black_hole.set_mass(self.black_hole.mass * 1.2);
                    }
                    KeyCode::Minus | KeyCode::NumpadSubtract => {
                        self.black_hole.set_mass(self.black_hole.mass / 1.2);
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn handle_mouse_move(&mut self, x: f64, y: f64) {
        if self.camera.is_dragging() {
            if let Some((last_x, last_y)) = self.last_mouse_pos {
                let dx = (x - last_x) as f32;
                let dy = (y - last_y) as f32;
                // Screen y grows downward; positive pitch looks up.
                self.camera.rotate(dx, -dy);
            }
            self.last_mouse_pos = Some((x, y));
        }
    }

    fn handle_scroll(&mut self, delta: f32) {
        self.camera.process_scroll(delta * 2.0);
    }

    fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.egui
            .state
            .on_window_event(&self.ctx.window, event)
            .consumed
    }
}

fn main() {
    let (ctx, event_loop) = pollster::block_on(GraphicsContext::new(
        "Black Hole - Gravitational Lensing",
        1280,
        720,
    ));

    let mut app = App::new(ctx);
    let mut last_time = std::time::Instant::now();

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { ref event, .. } => {
                    let consumed = app.handle_window_event(event);

                    if !consumed {
                        match event {
                            WindowEvent::CloseRequested => elwt.exit(),
                            WindowEvent::Resized(size) => app.resize(*size),
                            WindowEvent::MouseInput { state, button, .. } => {
                                if *button == MouseButton::Left {
                                    if *state == ElementState::Pressed {
                                        app.camera.begin_drag();
                                    } else {
                                        app.camera.end_drag();
                                        app.last_mouse_pos = None;
                                    }
                                }
                            }
                            WindowEvent::CursorMoved { position, .. } => {
                                app.handle_mouse_move(position.x, position.y);
                            }
                            WindowEvent::KeyboardInput {
                                event:
                                    KeyEvent {
                                        physical_key: PhysicalKey::Code(key),
                                        state,
                                        ..
                                    },
                                ..
                            } => {
                                if *key == KeyCode::Escape && *state == ElementState::Pressed {
                                    elwt.exit();
                                } else {
                                    app.handle_key(*key, *state == ElementState::Pressed);
                                }
                            }
                            WindowEvent::MouseWheel { delta, .. } => {
                                let scroll = match delta {
                                    MouseScrollDelta::LineDelta(_, y) => *y,
                                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                                };
                                app.handle_scroll(scroll);
                            }
                            WindowEvent::RedrawRequested => {
                                let now = std::time::Instant::now();
                                let dt = (now - last_time).as_secs_f32().min(0.1);
                                last_time = now;

                                app.update(dt);
                                match app.render() {
                                    Ok(_) => {}
                                    Err(wgpu::SurfaceError::Lost) => app.resize(app.ctx.size),
                                    Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                                    Err(e) => eprintln!("Render error: {:?}", e),
                                }
                            }
                            _ => {}
                        }
                    }
                }
                Event::AboutToWait => {
                    app.ctx.window.request_redraw();
                }
                _ => {}
            }
        })
        .expect("Event loop error");
}
