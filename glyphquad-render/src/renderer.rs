//! Frame orchestration: clear, hand a drawing device to the caller,
//! submit, present.

use std::path::Path;

use glyphquad_text::{set_projection, AtlasError, GlyphAtlas, GlyphRasterizer, TextRenderer};
use log::info;
use thiserror::Error;
use wgpu::{
    Color, CommandEncoderDescriptor, LoadOp, Operations, RenderPassColorAttachment,
    RenderPassDescriptor, StoreOp, TextureView, TextureViewDescriptor,
};

use crate::context::GpuContext;
use crate::pipelines::text::{GlyphResources, GlyphTexture, QuadBuffer, TextShader, WgpuTextDevice};
use crate::vertex::screen_projection;

/// Text renderer specialised to the wgpu backend.
pub type WgpuTextRenderer = TextRenderer<GlyphTexture, QuadBuffer>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("No surface configured (headless mode)")]
    NoSurface,
}

/// Frame statistics returned after each render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Glyph draw calls submitted during the frame.
    pub draw_calls: u32,
}

/// Owns the text shader and glyph resources for one window.
///
/// # Usage
///
/// ```ignore
/// let mut renderer = Renderer::new(&gpu);
/// let mut text = renderer.load_font(&gpu, "fonts/DejaVuSansMono.ttf", 48)?;
/// renderer.set_viewport(800, 600);
/// let stats = renderer.render_to_surface(&gpu, |device, shader| {
///     text.draw_text(device, shader, b"Hello", (25.0, 25.0), 1.0, [1.0, 1.0, 1.0]);
/// })?;
/// ```
pub struct Renderer {
    resources: GlyphResources,
    shader: TextShader,
    clear_color: Color,
}

impl Renderer {
    /// Create a new renderer for the given GPU context.
    pub fn new(gpu: &GpuContext) -> Self {
        let resources = GlyphResources::new(&gpu.device);
        let shader = TextShader::new(&gpu.device, gpu.target_format, &resources);

        Self {
            resources,
            shader,
            clear_color: Color {
                r: 0.2,
                g: 0.3,
                b: 0.3,
                a: 1.0,
            },
        }
    }

    /// Set the background clear color.
    pub fn set_clear_color(&mut self, r: f64, g: f64, b: f64, a: f64) {
        self.clear_color = Color { r, g, b, a };
    }

    /// Upload a screen-space projection for a `width × height` viewport.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        set_projection(&mut self.shader, &screen_projection(width, height));
    }

    pub fn shader(&self) -> &TextShader {
        &self.shader
    }

    /// Device for uploading glyph textures outside of a frame.
    pub fn upload_device<'a>(&'a self, gpu: &'a GpuContext) -> WgpuTextDevice<'a> {
        WgpuTextDevice::for_upload(gpu, &self.resources)
    }

    /// Build the ASCII atlas for `font_path` and wrap it in a text renderer.
    pub fn load_font(
        &self,
        gpu: &GpuContext,
        font_path: impl AsRef<Path>,
        pixel_height: u32,
    ) -> Result<WgpuTextRenderer, AtlasError> {
        let font_path = font_path.as_ref();
        let mut device = self.upload_device(gpu);
        let atlas = GlyphAtlas::from_font(font_path, pixel_height, &mut device)?;
        info!(
            "loaded {} at {pixel_height}px ({} glyphs)",
            font_path.display(),
            atlas.len()
        );
        Ok(TextRenderer::new(atlas, &mut device))
    }

    /// Build the ASCII atlas from an already-initialised rasterizer.
    pub fn load_rasterizer<R: GlyphRasterizer>(&self, gpu: &GpuContext, rasterizer: R) -> WgpuTextRenderer {
        let mut device = self.upload_device(gpu);
        let atlas = GlyphAtlas::build(rasterizer, &mut device);
        TextRenderer::new(atlas, &mut device)
    }

    /// Render to the window surface.  `draw` receives a device bound to
    /// the frame and the text shader.
    pub fn render_to_surface<F>(&mut self, gpu: &GpuContext, draw: F) -> Result<FrameStats, RenderError>
    where
        F: FnOnce(&mut WgpuTextDevice<'_>, &mut TextShader),
    {
        let surface = gpu.surface.as_ref().ok_or(RenderError::NoSurface)?;
        let output = surface.get_current_texture()?;
        let view = output.texture.create_view(&TextureViewDescriptor::default());

        let stats = self.render_to_texture(gpu, &view, draw);
        output.present();

        Ok(stats)
    }

    /// Render to an off-screen texture (headless mode).
    pub fn render_to_texture<F>(&mut self, gpu: &GpuContext, target_view: &TextureView, draw: F) -> FrameStats
    where
        F: FnOnce(&mut WgpuTextDevice<'_>, &mut TextShader),
    {
        self.clear(gpu, target_view);

        let mut device = WgpuTextDevice::for_frame(gpu, &self.resources, target_view);
        draw(&mut device, &mut self.shader);

        FrameStats {
            draw_calls: device.draw_calls(),
        }
    }

    fn clear(&self, gpu: &GpuContext, target_view: &TextureView) {
        let mut encoder = gpu.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("glyphquad_clear_encoder"),
        });

        {
            let _pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("glyphquad_clear_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: target_view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(self.clear_color),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use glyphquad_text::{
        GlyphBitmap, GlyphError, GlyphRasterizer, GlyphRecord, GlyphUploader, RasterizedGlyph,
        ShaderService,
    };

    /// Solid 4×8 bars: 'I' sits on the baseline, 'p' drops 3 px below it.
    struct BarRasterizer;

    impl GlyphRasterizer for BarRasterizer {
        fn pixel_height(&self) -> u32 {
            8
        }

        fn rasterize(&mut self, code: u8) -> Result<RasterizedGlyph, GlyphError> {
            let top = match code {
                b'I' => 8,
                b'p' => 5,
                _ => return Err(GlyphError::Missing(code)),
            };
            Ok(RasterizedGlyph {
                bitmap: GlyphBitmap::new(4, 8, vec![255; 32]),
                bearing: (0, top),
                advance: 6 * 64,
            })
        }
    }

    /// Copy an RGBA8 target back to the CPU. `width * 4` must be a
    /// multiple of 256.
    fn read_pixels(gpu: &GpuContext, target: &wgpu::Texture) -> Vec<u8> {
        let (width, height) = (target.width(), target.height());
        let bytes_per_row = width * 4;
        let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("test_readback"),
            size: u64::from(bytes_per_row * height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = gpu.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("test_readback_encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            target.size(),
        );
        gpu.queue.submit(std::iter::once(encoder.finish()));

        let slice = buffer.slice(..);
        slice.map_async(wgpu::MapMode::Read, |_| {});
        let _ = gpu.device.poll(wgpu::Maintain::Wait);
        let pixels = slice.get_mapped_range().to_vec();
        pixels
    }

    fn offscreen_target(gpu: &GpuContext, width: u32, height: u32) -> wgpu::Texture {
        gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("test_target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: gpu.target_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        })
    }

    #[test]
    fn test_frame_stats_default() {
        assert_eq!(FrameStats::default().draw_calls, 0);
    }

    #[test]
    fn test_render_to_surface_headless_fails() {
        let Ok(gpu) = pollster::block_on(GpuContext::new_headless()) else {
            return;
        };
        let mut renderer = Renderer::new(&gpu);
        let result = renderer.render_to_surface(&gpu, |_, _| {});
        assert!(matches!(result, Err(RenderError::NoSurface)));
    }

    #[test]
    fn test_set_viewport_updates_projection() {
        let Ok(gpu) = pollster::block_on(GpuContext::new_headless()) else {
            return;
        };
        let mut renderer = Renderer::new(&gpu);
        renderer.set_viewport(800, 600);
        assert_eq!(renderer.shader().uniform().projection, screen_projection(800, 600));
    }

    #[test]
    fn test_missing_font_is_fatal() {
        let Ok(gpu) = pollster::block_on(GpuContext::new_headless()) else {
            return;
        };
        let renderer = Renderer::new(&gpu);
        let result = renderer.load_font(&gpu, "/no/such/font.ttf", 48);
        assert!(matches!(result, Err(AtlasError::FontLoad { .. })));
    }

    #[test]
    fn test_offscreen_frame_counts_glyph_draws() {
        let Ok(gpu) = pollster::block_on(GpuContext::new_headless()) else {
            return;
        };
        let mut renderer = Renderer::new(&gpu);
        renderer.set_viewport(64, 64);

        let mut upload = renderer.upload_device(&gpu);
        let bitmap = GlyphBitmap::new(5, 7, vec![255; 35]);
        let record = GlyphRecord {
            texture: upload.upload_glyph(b'I', &bitmap).expect("upload"),
            size: (5, 7),
            bearing: (1, 7),
            advance: 7 * 64,
        };

        let target = offscreen_target(&gpu, 64, 64);
        let view = target.create_view(&TextureViewDescriptor::default());
        let stats = renderer.render_to_texture(&gpu, &view, |device, shader| {
            use glyphquad_text::layout::{glyph_quad, Pen};
            use glyphquad_text::TextDevice;

            let mut quad = device.create_quad_buffer();
            shader.use_program();
            device.bind_quad_buffer(Some(&quad));
            for x in [2.0, 10.0, 18.0] {
                device.bind_texture(Some(&record.texture));
                let vertices = glyph_quad(Pen::new(x, 4.0), &record, 1.0).vertices();
                device.write_quad(&mut quad, &vertices);
                device.draw_triangles(shader, 6);
            }
        });

        assert_eq!(stats.draw_calls, 3);
    }

    #[test]
    fn test_glyphs_land_on_the_baseline() {
        let Ok(gpu) = pollster::block_on(GpuContext::new_headless()) else {
            return;
        };
        let mut renderer = Renderer::new(&gpu);
        renderer.set_clear_color(0.0, 0.0, 0.0, 1.0);
        renderer.set_viewport(64, 32);
        let mut text = renderer.load_rasterizer(&gpu, BarRasterizer);
        assert_eq!(text.atlas().len(), 2);

        let target = offscreen_target(&gpu, 64, 32);
        let view = target.create_view(&TextureViewDescriptor::default());
        let stats = renderer.render_to_texture(&gpu, &view, |device, shader| {
            text.draw_text(device, shader, b"Ip", (8.0, 16.0), 1.0, [1.0, 1.0, 1.0]);
        });
        assert_eq!(stats.draw_calls, 2);

        let pixels = read_pixels(&gpu, &target);
        // Rows count down from the top; the baseline y = 16 sits above row 16.
        let red = |x: u32, row: u32| pixels[((row * 64 + x) * 4) as usize];

        // 'I' covers x 8..12, y 16..24.
        assert!(red(10, 12) > 200, "'I' above the baseline");
        assert!(red(10, 17) < 50, "'I' stops at the baseline");
        // 'p' covers x 14..18, y 13..21.
        assert!(red(16, 12) > 200, "'p' above the baseline");
        assert!(red(16, 17) > 200, "'p' descends below the baseline");
        assert!(red(16, 20) < 50, "'p' ends 3 px down");
        // Gap between the glyphs stays clear.
        assert!(red(13, 12) < 50);
    }
}
