//! glyphquad demo: draws the configured strings every frame.
//!
//! Uses `winit` 0.30 for windowing and `glyphquad-render` for the wgpu
//! text pipeline.  ESC or closing the window exits.

mod config;
mod state;

use std::sync::Arc;

use log::{error, info};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowAttributes, WindowId},
};

use config::DemoConfig;
use glyphquad_render::context::GpuContext;
use glyphquad_render::renderer::RenderError;
use state::AppState;

/// Winit 0.30 application handler.
struct App {
    config: DemoConfig,
    window: Option<Arc<Window>>,
    state: Option<AppState>,
    frame_count: u64,
    /// Set when startup failed; the process exits non-zero.
    failed: bool,
}

impl App {
    fn new(config: DemoConfig) -> Self {
        Self {
            config,
            window: None,
            state: None,
            frame_count: 0,
            failed: false,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), String> {
        let attrs = WindowAttributes::default()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(self.config.window.width, self.config.window.height));

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| format!("failed to create window: {e}"))?,
        );

        let size = window.inner_size();
        let (width, height) = (size.width.max(1), size.height.max(1));

        let gpu = pollster::block_on(GpuContext::new_with_surface(window.clone(), width, height))
            .map_err(|e| format!("failed to initialize GPU: {e}"))?;
        let adapter = gpu.adapter.get_info().name;

        let state = AppState::new(gpu, &self.config, width, height)
            .map_err(|e| format!("failed to load font: {e}"))?;

        info!("glyphquad initialized: {width}×{height}, GPU: {adapter:?}");

        window.request_redraw();
        self.state = Some(state);
        self.window = Some(window);
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            error!("{e}");
            self.failed = true;
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let (Some(window), Some(state)) = (self.window.as_ref(), self.state.as_mut()) else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                info!("Window closed after {} frames", self.frame_count);
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.logical_key == Key::Named(NamedKey::Escape) =>
            {
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                state.resize(new_size.width, new_size.height);
                window.request_redraw();
            }

            WindowEvent::RedrawRequested => {
                match state.render_frame() {
                    Ok(stats) => {
                        self.frame_count += 1;
                        if self.frame_count % 300 == 0 {
                            info!("Frame {}: {} draw call(s)", self.frame_count, stats.draw_calls);
                        }
                    }
                    Err(RenderError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                        let size = window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        error!("Render error: {e}");
                    }
                }
                window.request_redraw();
            }

            _ => {}
        }
    }
}

fn main() {
    env_logger::init();

    let config = match DemoConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    if config.uses_system_font() {
        info!("Starting glyphquad (system monospace)");
    } else {
        info!("Starting glyphquad ({})", config.font_path.display());
    }

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            error!("Failed to create event loop: {e}");
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    if let Err(e) = event_loop.run_app(&mut app) {
        error!("Event loop error: {e}");
        std::process::exit(1);
    }
    if app.failed {
        std::process::exit(1);
    }
}
