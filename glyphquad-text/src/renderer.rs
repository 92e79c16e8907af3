//! Text draw engine — walks a byte string and draws one textured quad
//! per character.
//!
//! `TextRenderer` owns the glyph atlas and the single quad buffer every
//! glyph is drawn through. Drawing takes `&mut self`, so the buffer's
//! overwrite-then-draw sequence cannot interleave with another draw.

use log::trace;

use crate::atlas::GlyphAtlas;
use crate::device::{ShaderService, TextDevice};
use crate::layout::{glyph_quad, Pen, QUAD_VERTEX_COUNT};

/// Uniform receiving the text color.
pub const COLOR_UNIFORM: &str = "textColor";
/// Sampler uniform for the glyph texture.
pub const SAMPLER_UNIFORM: &str = "text";
/// Uniform receiving the orthographic projection.
pub const PROJECTION_UNIFORM: &str = "projection";
/// Texture unit glyphs are bound to.
pub const GLYPH_TEXTURE_UNIT: u32 = 0;

/// Outcome of one [`TextRenderer::draw_text`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DrawStats {
    /// Draw calls issued, one per drawn character.
    pub draw_calls: u32,
    /// Characters with no atlas entry.
    pub skipped: u32,
    /// Pen position after the last character.
    pub pen: Pen,
}

pub struct TextRenderer<T, Q> {
    atlas: GlyphAtlas<T>,
    quad_buffer: Q,
}

impl<T, Q> TextRenderer<T, Q> {
    /// Take ownership of `atlas` and allocate the quad buffer on `device`.
    pub fn new<D>(atlas: GlyphAtlas<T>, device: &mut D) -> Self
    where
        D: TextDevice<Texture = T, QuadBuffer = Q>,
    {
        let quad_buffer = device.create_quad_buffer();
        Self { atlas, quad_buffer }
    }

    pub fn atlas(&self) -> &GlyphAtlas<T> {
        &self.atlas
    }

    /// Draw `text` with its baseline starting at `origin` (pixels, y-up).
    ///
    /// Codes missing from the atlas draw nothing and do not move the pen.
    pub fn draw_text<D>(
        &mut self,
        device: &mut D,
        shader: &mut D::Shader,
        text: &[u8],
        origin: (f32, f32),
        scale: f32,
        color: [f32; 3],
    ) -> DrawStats
    where
        D: TextDevice<Texture = T, QuadBuffer = Q>,
    {
        shader.use_program();
        shader.set_vec3(COLOR_UNIFORM, color);
        device.active_texture(GLYPH_TEXTURE_UNIT);
        shader.set_int(SAMPLER_UNIFORM, GLYPH_TEXTURE_UNIT as i32);
        device.bind_quad_buffer(Some(&self.quad_buffer));

        let mut stats = DrawStats {
            pen: Pen::new(origin.0, origin.1),
            ..DrawStats::default()
        };

        for &code in text {
            let Some(glyph) = self.atlas.get(code) else {
                trace!("no glyph for code {code}");
                stats.skipped += 1;
                continue;
            };

            let vertices = glyph_quad(stats.pen, glyph, scale).vertices();

            device.bind_texture(Some(&glyph.texture));
            device.write_quad(&mut self.quad_buffer, &vertices);
            device.draw_triangles(shader, QUAD_VERTEX_COUNT as u32);
            stats.draw_calls += 1;

            stats.pen.advance(glyph.advance, scale);
        }

        device.bind_quad_buffer(None);
        device.bind_texture(None);

        stats
    }

    /// Horizontal distance the pen would travel drawing `text`.
    pub fn measure(&self, text: &[u8], scale: f32) -> f32 {
        let mut pen = Pen::default();
        for glyph in text.iter().filter_map(|&code| self.atlas.get(code)) {
            pen.advance(glyph.advance, scale);
        }
        pen.x
    }
}

/// Upload an orthographic projection through the shader service.
pub fn set_projection<S: ShaderService>(shader: &mut S, projection: &[[f32; 4]; 4]) {
    shader.use_program();
    shader.set_mat4(PROJECTION_UNIFORM, projection);
}
