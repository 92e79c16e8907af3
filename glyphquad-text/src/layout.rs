//! Per-character quad layout.
//!
//! Screen space is y-up: the pen sits on the baseline and a glyph's
//! bitmap top is `bearing.1` pixels above it. Glyphs that reach below
//! the baseline (descenders) have `bearing.1 < size.1`.

use bytemuck::{Pod, Zeroable};

use crate::atlas::GlyphRecord;

/// Vertices per glyph quad: two triangles.
pub const QUAD_VERTEX_COUNT: usize = 6;

/// One vertex of a glyph quad: screen position + texture coordinate.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

impl QuadVertex {
    pub const fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y],
            uv: [u, v],
        }
    }
}

pub type QuadVertices = [QuadVertex; QUAD_VERTEX_COUNT];

/// Pen position, local to one draw call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pen {
    pub x: f32,
    pub y: f32,
}

impl Pen {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Move right by a 26.6 fixed-point advance, scaled.
    pub fn advance(&mut self, advance: u32, scale: f32) {
        self.x += advance_px(advance) as f32 * scale;
    }
}

/// Whole pixels in a 26.6 fixed-point advance.
pub fn advance_px(advance: u32) -> u32 {
    advance >> 6
}

/// Screen rectangle covered by one glyph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphQuad {
    /// Lower-left corner.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl GlyphQuad {
    /// Two triangles covering the rectangle. Bitmap top-left maps to
    /// uv (0, 0), bottom-right to (1, 1).
    pub fn vertices(&self) -> QuadVertices {
        let (x, y, w, h) = (self.x, self.y, self.width, self.height);
        [
            QuadVertex::new(x, y + h, 0.0, 0.0),
            QuadVertex::new(x, y, 0.0, 1.0),
            QuadVertex::new(x + w, y, 1.0, 1.0),
            QuadVertex::new(x, y + h, 0.0, 0.0),
            QuadVertex::new(x + w, y, 1.0, 1.0),
            QuadVertex::new(x + w, y + h, 1.0, 0.0),
        ]
    }
}

/// Place `glyph` relative to `pen`.
pub fn glyph_quad<T>(pen: Pen, glyph: &GlyphRecord<T>, scale: f32) -> GlyphQuad {
    let (width, height) = glyph.size;
    let (bearing_x, bearing_y) = glyph.bearing;
    GlyphQuad {
        x: pen.x + bearing_x as f32 * scale,
        y: pen.y - (height as f32 - bearing_y as f32) * scale,
        width: width as f32 * scale,
        height: height as f32 * scale,
    }
}
