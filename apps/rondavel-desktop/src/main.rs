use anyhow::Result;
use clap::Parser;
use egui::Context as EguiContext;
use rondavel_common::ViewportSize;
use rondavel_controls::{ControlAction, OrbitControls};
use rondavel_render::{RenderSettings, SceneRenderer};
use rondavel_render_wgpu::{GpuContext, UiFrame, WgpuRenderer};
use rondavel_runtime::{AppContext, FrameLoop, FrameSource, HostViewport, reconcile_resize};
use rondavel_scene::SceneConfig;
use rondavel_tools::{DebugPanel, SceneInspector};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "rondavel-desktop", about = "Rondavel desktop viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Initial window width in logical pixels
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value = "720")]
    height: u32,
}

type Context = AppContext<WgpuRenderer, OrbitControls>;

/// The window as the frame loop and resize handler see it.
struct WindowHost<'a>(&'a Window);

impl HostViewport for WindowHost<'_> {
    fn viewport_size(&self) -> ViewportSize {
        let logical: LogicalSize<f64> = self.0.inner_size().to_logical(self.0.scale_factor());
        ViewportSize::new(logical.width.round() as u32, logical.height.round() as u32)
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.0.scale_factor()
    }
}

impl FrameSource for WindowHost<'_> {
    fn request_frame(&mut self) {
        self.0.request_redraw();
    }
}

#[derive(Default)]
struct Pointer {
    rotating: bool,
    panning: bool,
    last: Option<PhysicalPosition<f64>>,
}

impl Pointer {
    /// Record the cursor position and return the move since the last one.
    fn moved_to(&mut self, position: PhysicalPosition<f64>) -> Option<(f64, f64)> {
        let last = self.last.replace(position)?;
        Some((position.x - last.x, position.y - last.y))
    }
}

struct DesktopApp {
    config: SceneConfig,
    initial_size: LogicalSize<u32>,
    window: Option<Arc<Window>>,
    ctx: Option<Context>,
    panel: Option<DebugPanel>,
    frame_loop: FrameLoop,
    started: bool,
    stopped: bool,
    pointer: Pointer,
    show_panel: bool,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
}

impl DesktopApp {
    fn new(config: SceneConfig, initial_size: LogicalSize<u32>) -> Self {
        Self {
            config,
            initial_size,
            window: None,
            ctx: None,
            panel: None,
            frame_loop: FrameLoop::new(),
            started: false,
            stopped: false,
            pointer: Pointer::default(),
            show_panel: true,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Rondavel")
            .with_inner_size(self.initial_size);
        let window = Arc::new(event_loop.create_window(attrs)?);

        let physical = window.inner_size();
        let gpu = pollster::block_on(GpuContext::new(
            window.clone(),
            ViewportSize::new(physical.width, physical.height),
        ))?;
        let renderer = WgpuRenderer::new(gpu, RenderSettings::from_config(&self.config.renderer));
        let ctx = AppContext::from_config(&self.config, renderer, &WindowHost(&window))?;

        self.egui_winit = Some(egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        ));
        self.panel = Some(DebugPanel::with_defaults(&ctx.handles));
        self.ctx = Some(ctx);

        // The first redraw starts the frame loop.
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn resize(&mut self) {
        let (Some(window), Some(ctx)) = (&self.window, &mut self.ctx) else {
            return;
        };
        let physical = window.inner_size();
        ctx.renderer
            .resize_surface(ViewportSize::new(physical.width, physical.height));
        reconcile_resize(ctx, &WindowHost(window));
    }

    fn pointer_moved(&mut self, position: PhysicalPosition<f64>) {
        let delta = self.pointer.moved_to(position);
        let (Some((dx, dy)), Some(window), Some(ctx)) = (delta, &self.window, &mut self.ctx) else {
            return;
        };
        let scale = window.scale_factor();
        let dx = (dx / scale) as f32;
        let dy = (dy / scale) as f32;
        if self.pointer.rotating {
            ctx.handle_input(ControlAction::Rotate { dx, dy });
        } else if self.pointer.panning {
            ctx.handle_input(ControlAction::Pan { dx, dy });
        }
    }

    fn redraw(&mut self) {
        let Self {
            window: Some(window),
            ctx: Some(ctx),
            panel: Some(panel),
            egui_winit: Some(egui_winit),
            egui_ctx,
            frame_loop,
            started,
            stopped,
            show_panel,
            ..
        } = self
        else {
            return;
        };
        if *stopped {
            return;
        }

        let raw_input = egui_winit.take_egui_input(window);
        let full_output = egui_ctx.run(raw_input, |ui_ctx| {
            if *show_panel {
                draw_panel(ui_ctx, panel, ctx);
            }
        });
        egui_winit.handle_platform_output(window, full_output.platform_output);
        let primitives = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        ctx.renderer.queue_ui(UiFrame {
            primitives,
            textures_delta: full_output.textures_delta,
            pixels_per_point: full_output.pixels_per_point,
        });

        let mut source = WindowHost(window);
        let result = if *started {
            frame_loop.tick(ctx, &mut source)
        } else {
            *started = true;
            frame_loop.start(ctx, &mut source)
        };
        if let Err(e) = result {
            tracing::error!("render failed, frame loop stopped: {e}");
            *stopped = true;
        }
    }
}

fn draw_panel(ui_ctx: &EguiContext, panel: &DebugPanel, ctx: &mut Context) {
    egui::Window::new("Debug")
        .default_width(280.0)
        .show(ui_ctx, |ui| {
            for slider in panel.sliders() {
                let Ok(mut value) = slider.get(&ctx.scene) else {
                    continue;
                };
                let response = ui.add(
                    egui::Slider::new(&mut value, slider.min..=slider.max)
                        .step_by(slider.step as f64)
                        .text(slider.name.as_str()),
                );
                if response.changed() {
                    if let Err(e) = slider.set(&mut ctx.scene, value) {
                        tracing::warn!("slider {}: {e}", slider.name);
                    }
                }
            }

            ui.separator();
            let summary =
                SceneInspector::summary(&ctx.scene, &ctx.camera, ctx.viewport(), ctx.pixel_ratio());
            ui.label(format!("Nodes: {}", summary.node_count));
            let [x, y, z] = summary.camera_position;
            ui.label(format!("Camera: ({x:.1}, {y:.1}, {z:.1})"));
            ui.label(format!(
                "Viewport: {} @{:.2} (buffer {})",
                summary.viewport,
                summary.pixel_ratio,
                ctx.renderer.drawing_buffer_size()
            ));
            ui.separator();
            ui.small("F1: Toggle Panel | LMB: Orbit | RMB: Pan | Wheel: Zoom");
        });
}

impl ApplicationHandler for DesktopApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            tracing::error!("failed to start: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                // Keep tracking under the panel so the next drag starts from here.
                if let WindowEvent::CursorMoved { position, .. } = event {
                    self.pointer.moved_to(position);
                }
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.resize();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::F1),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                self.show_panel = !self.show_panel;
            }
            WindowEvent::MouseInput { button, state, .. } => {
                let pressed = state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.pointer.rotating = pressed,
                    MouseButton::Right => self.pointer.panning = pressed,
                    _ => {}
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_moved(position);
            }
            WindowEvent::CursorLeft { .. } => {
                self.pointer.last = None;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // Scrolling up zooms in.
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y,
                    MouseScrollDelta::PixelDelta(p) => -p.y as f32,
                };
                if let Some(ctx) = &mut self.ctx {
                    ctx.handle_input(ControlAction::Zoom { delta_y });
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("rondavel-desktop starting");

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = DesktopApp::new(config, LogicalSize::new(cli.width, cli.height));
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_reports_moves_since_last_position() {
        let mut pointer = Pointer::default();
        assert_eq!(pointer.moved_to(PhysicalPosition::new(10.0, 10.0)), None);
        assert_eq!(
            pointer.moved_to(PhysicalPosition::new(14.0, 7.0)),
            Some((4.0, -3.0))
        );
    }

    #[test]
    fn moves_swallowed_by_the_panel_are_not_replayed() {
        let mut pointer = Pointer::default();
        pointer.moved_to(PhysicalPosition::new(0.0, 0.0));
        // cursor travels across the panel
        pointer.moved_to(PhysicalPosition::new(300.0, 200.0));
        assert_eq!(
            pointer.moved_to(PhysicalPosition::new(302.0, 201.0)),
            Some((2.0, 1.0))
        );
    }
}
