//! GPU-facing layouts for glyph quads and the text uniform block.
//!
//! All uploaded types are `bytemuck::Pod` for zero-copy writes.

use bytemuck::{Pod, Zeroable};
use glyphquad_text::QuadVertex;
use wgpu::{BufferAddress, VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

// ───────────────────────────────────────────────────────────────────
// Quad vertex
// ───────────────────────────────────────────────────────────────────

/// Vertex layout for [`QuadVertex`]: location 0 = position, 1 = uv.
pub fn quad_vertex_layout() -> VertexBufferLayout<'static> {
    static ATTRS: &[VertexAttribute] = &[
        // location(0) = position
        VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: VertexFormat::Float32x2,
        },
        // location(1) = uv
        VertexAttribute {
            offset: 8,
            shader_location: 1,
            format: VertexFormat::Float32x2,
        },
    ];
    VertexBufferLayout {
        array_stride: std::mem::size_of::<QuadVertex>() as BufferAddress,
        step_mode: VertexStepMode::Vertex,
        attributes: ATTRS,
    }
}

// ───────────────────────────────────────────────────────────────────
// Text uniform
// ───────────────────────────────────────────────────────────────────

/// Uniform block shared by the text vertex and fragment stages.
///
/// 80 bytes. `text_color` is a vec3 padded to 16 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TextUniform {
    /// Column-major orthographic projection.
    pub projection: [[f32; 4]; 4],
    pub text_color: [f32; 4],
}

impl Default for TextUniform {
    fn default() -> Self {
        Self {
            projection: IDENTITY,
            text_color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

const IDENTITY: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Column-major orthographic projection mapping `[left, right] × [bottom, top]`
/// to NDC, y-up. Depth `[-1, 1]` maps to wgpu's `[0, 1]`.
pub fn ortho(left: f32, right: f32, bottom: f32, top: f32) -> [[f32; 4]; 4] {
    let sx = 2.0 / (right - left);
    let sy = 2.0 / (top - bottom);
    let tx = -(right + left) / (right - left);
    let ty = -(top + bottom) / (top - bottom);

    [
        [sx, 0.0, 0.0, 0.0],
        [0.0, sy, 0.0, 0.0],
        [0.0, 0.0, -0.5, 0.0],
        [tx, ty, 0.5, 1.0],
    ]
}

/// Screen-space projection for a `width × height` viewport, origin at
/// the bottom-left corner.
pub fn screen_projection(width: u32, height: u32) -> [[f32; 4]; 4] {
    ortho(0.0, width.max(1) as f32, 0.0, height.max(1) as f32)
}

// ===================================================================
// Tests
// ===================================================================
