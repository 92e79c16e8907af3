//! Seams between the text core and a graphics backend.
//!
//! The core never talks to a GPU API directly. A backend provides glyph
//! textures, one reusable quad buffer, draw calls, and a shader service
//! that accepts named uniforms.

use crate::bitmap::GlyphBitmap;
use crate::error::GlyphError;
use crate::layout::QuadVertices;

/// Creates one single-channel texture per glyph bitmap.
///
/// Implementations upload with a 1-byte row alignment and configure
/// clamp-to-edge wrapping with linear filtering.
pub trait GlyphUploader {
    type Texture;

    fn upload_glyph(&mut self, code: u8, bitmap: &GlyphBitmap) -> Result<Self::Texture, GlyphError>;
}

/// Shader program with named uniforms.
pub trait ShaderService {
    /// Make this program current for subsequent draws.
    fn use_program(&mut self);
    fn set_mat4(&mut self, name: &str, value: &[[f32; 4]; 4]);
    fn set_vec3(&mut self, name: &str, value: [f32; 3]);
    fn set_int(&mut self, name: &str, value: i32);
}

/// Immediate-mode drawing surface for glyph quads.
pub trait TextDevice: GlyphUploader {
    type QuadBuffer;
    type Shader: ShaderService;

    /// Allocate a buffer holding exactly one quad (6 vertices).
    fn create_quad_buffer(&mut self) -> Self::QuadBuffer;

    /// Select texture unit `unit` for the next [`bind_texture`](Self::bind_texture).
    fn active_texture(&mut self, unit: u32);

    /// Bind a glyph texture, or unbind with `None`.
    fn bind_texture(&mut self, texture: Option<&Self::Texture>);

    /// Bind the quad buffer as the vertex source, or unbind with `None`.
    fn bind_quad_buffer(&mut self, buffer: Option<&Self::QuadBuffer>);

    /// Overwrite the whole quad buffer in place.
    fn write_quad(&mut self, buffer: &mut Self::QuadBuffer, vertices: &QuadVertices);

    /// Draw `vertex_count` vertices from the bound buffer as triangles.
    fn draw_triangles(&mut self, shader: &mut Self::Shader, vertex_count: u32);
}
