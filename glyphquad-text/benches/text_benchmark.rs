use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use glyphquad_text::layout::glyph_quad;
use glyphquad_text::{
    GlyphAtlas, GlyphBitmap, GlyphError, GlyphRasterizer, GlyphUploader, Pen, QuadVertices,
    RasterizedGlyph, ShaderService, TextDevice, TextRenderer,
};

/// Solid boxes with a fixed advance.
struct BoxRasterizer;

impl GlyphRasterizer for BoxRasterizer {
    fn pixel_height(&self) -> u32 {
        48
    }

    fn rasterize(&mut self, _code: u8) -> Result<RasterizedGlyph, GlyphError> {
        Ok(RasterizedGlyph {
            bitmap: GlyphBitmap::new(27, 48, vec![255; 27 * 48]),
            bearing: (2, 38),
            advance: 30 * 64,
        })
    }
}

/// Backend that discards everything.
struct NullDevice;

struct NullShader;

impl ShaderService for NullShader {
    fn use_program(&mut self) {}
    fn set_mat4(&mut self, _name: &str, _value: &[[f32; 4]; 4]) {}
    fn set_vec3(&mut self, _name: &str, _value: [f32; 3]) {}
    fn set_int(&mut self, _name: &str, _value: i32) {}
}

impl GlyphUploader for NullDevice {
    type Texture = ();

    fn upload_glyph(&mut self, _code: u8, _bitmap: &GlyphBitmap) -> Result<(), GlyphError> {
        Ok(())
    }
}

impl TextDevice for NullDevice {
    type QuadBuffer = QuadVertices;
    type Shader = NullShader;

    fn create_quad_buffer(&mut self) -> QuadVertices {
        bytemuck::Zeroable::zeroed()
    }
    fn active_texture(&mut self, _unit: u32) {}
    fn bind_texture(&mut self, _texture: Option<&()>) {}
    fn bind_quad_buffer(&mut self, _buffer: Option<&QuadVertices>) {}
    fn write_quad(&mut self, buffer: &mut QuadVertices, vertices: &QuadVertices) {
        *buffer = *vertices;
    }
    fn draw_triangles(&mut self, _shader: &mut NullShader, vertex_count: u32) {
        black_box(vertex_count);
    }
}

fn bench_atlas_build(c: &mut Criterion) {
    c.bench_function("atlas_build_ascii", |b| {
        b.iter(|| GlyphAtlas::build(BoxRasterizer, &mut NullDevice));
    });
}

fn bench_glyph_quad(c: &mut Criterion) {
    let atlas = GlyphAtlas::build(BoxRasterizer, &mut NullDevice);
    let glyph = atlas.get(b'A').expect("box atlas covers ASCII");

    c.bench_function("glyph_quad_vertices", |b| {
        b.iter(|| glyph_quad(black_box(Pen::new(25.0, 25.0)), glyph, black_box(1.0)).vertices());
    });
}

fn bench_draw_text(c: &mut Criterion) {
    let mut device = NullDevice;
    let mut shader = NullShader;
    let atlas = GlyphAtlas::build(BoxRasterizer, &mut device);
    let mut renderer = TextRenderer::new(atlas, &mut device);

    c.bench_function("draw_text_sample", |b| {
        b.iter(|| {
            renderer.draw_text(
                &mut device,
                &mut shader,
                black_box(b"This is sample text"),
                (25.0, 25.0),
                1.0,
                [0.5, 0.8, 0.2],
            )
        });
    });
}

fn bench_measure(c: &mut Criterion) {
    let mut device = NullDevice;
    let atlas = GlyphAtlas::build(BoxRasterizer, &mut device);
    let renderer = TextRenderer::new(atlas, &mut device);
    let paragraph = b"The quick brown fox jumps over the lazy dog. \
        Lorem ipsum dolor sit amet, consectetur adipiscing elit.";

    c.bench_function("measure_paragraph", |b| {
        b.iter(|| renderer.measure(black_box(paragraph), 0.5));
    });
}

criterion_group!(
    benches,
    bench_atlas_build,
    bench_glyph_quad,
    bench_draw_text,
    bench_measure,
);
criterion_main!(benches);
