//! Application state: GPU context, frame renderer and the demo text.

use glyphquad_render::context::GpuContext;
use glyphquad_render::renderer::{FrameStats, RenderError, Renderer, WgpuTextRenderer};
use glyphquad_text::{AtlasError, SwashRasterizer};
use log::{info, warn};

use crate::config::{DemoConfig, TextLine};

pub struct AppState {
    pub gpu: GpuContext,
    renderer: Renderer,
    text: WgpuTextRenderer,
    lines: Vec<TextLine>,
}

impl AppState {
    /// Build the glyph atlas and set up the projection.  Font errors are
    /// returned to the caller, which treats them as fatal.
    pub fn new(gpu: GpuContext, config: &DemoConfig, width: u32, height: u32) -> Result<Self, AtlasError> {
        let mut renderer = Renderer::new(&gpu);
        let [r, g, b] = config.clear_color;
        renderer.set_clear_color(r as f64, g as f64, b as f64, 1.0);

        let text = if config.uses_system_font() {
            let rasterizer = SwashRasterizer::from_system_monospace(config.pixel_height)?;
            renderer.load_rasterizer(&gpu, rasterizer)
        } else {
            renderer.load_font(&gpu, &config.font_path, config.pixel_height)?
        };

        if !text.atlas().skipped().is_empty() {
            warn!("{} glyphs could not be loaded", text.atlas().skipped().len());
        }

        renderer.set_viewport(width, height);
        for line in &config.lines {
            info!(
                "\"{}\" at {:?} measures {:.1}px",
                line.text,
                line.origin,
                text.measure(line.text.as_bytes(), line.scale)
            );
        }

        Ok(Self {
            gpu,
            renderer,
            text,
            lines: config.lines.clone(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.gpu.resize(width, height);
        self.renderer.set_viewport(width, height);
    }

    /// Clear, draw every configured line, present.
    pub fn render_frame(&mut self) -> Result<FrameStats, RenderError> {
        let text = &mut self.text;
        let lines = &self.lines;
        self.renderer.render_to_surface(&self.gpu, |device, shader| {
            for line in lines {
                text.draw_text(
                    device,
                    shader,
                    line.text.as_bytes(),
                    (line.origin[0], line.origin[1]),
                    line.scale,
                    line.color,
                );
            }
        })
    }
}
