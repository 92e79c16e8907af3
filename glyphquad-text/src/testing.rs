//! Deterministic stand-ins for a font rasterizer and a graphics backend.

use std::collections::HashSet;

use crate::bitmap::GlyphBitmap;
use crate::device::{GlyphUploader, ShaderService, TextDevice};
use crate::error::GlyphError;
use crate::layout::QuadVertices;
use crate::raster::{GlyphRasterizer, RasterizedGlyph};

/// Synthetic glyphs whose metrics are a pure function of the code.
///
/// Widths run 3..=9 so most rows are not 4-byte multiples; every third
/// code hangs below the baseline; space is an empty bitmap.
pub struct FakeRasterizer {
    pixel_height: u32,
    failing: HashSet<u8>,
    truncated: HashSet<u8>,
}

impl FakeRasterizer {
    pub fn new(pixel_height: u32) -> Self {
        Self {
            pixel_height,
            failing: HashSet::new(),
            truncated: HashSet::new(),
        }
    }

    pub fn failing(mut self, codes: &[u8]) -> Self {
        self.failing.extend(codes.iter().copied());
        self
    }

    /// Hand back a bitmap one byte shorter than its dimensions claim.
    pub fn truncating(mut self, code: u8) -> Self {
        self.truncated.insert(code);
        self
    }

    pub fn width_of(code: u8) -> u32 {
        u32::from(code % 7) + 3
    }

    pub fn descent_of(code: u8) -> i32 {
        i32::from(code % 3)
    }

    pub fn advance_of(code: u8) -> u32 {
        (Self::width_of(code) + 2) * 64 + u32::from(code % 64)
    }
}

impl GlyphRasterizer for FakeRasterizer {
    fn pixel_height(&self) -> u32 {
        self.pixel_height
    }

    fn rasterize(&mut self, code: u8) -> Result<RasterizedGlyph, GlyphError> {
        if self.failing.contains(&code) {
            return Err(GlyphError::Rasterize(code));
        }
        if code == b' ' {
            return Ok(RasterizedGlyph {
                bitmap: GlyphBitmap::empty(),
                bearing: (0, 0),
                advance: 5 * 64,
            });
        }

        let width = Self::width_of(code);
        let height = self.pixel_height;
        let mut data = vec![code; (width * height) as usize];
        if self.truncated.contains(&code) {
            data.pop();
        }

        Ok(RasterizedGlyph {
            bitmap: GlyphBitmap::new(width, height, data),
            bearing: (1, height as i32 - Self::descent_of(code)),
            advance: Self::advance_of(code),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DeviceEvent {
    ActiveTexture(u32),
    BindTexture(Option<u32>),
    BindQuad(Option<u32>),
    WriteQuad(u32, QuadVertices),
    Draw {
        vertex_count: u32,
        texture: Option<u32>,
        shader_active: bool,
    },
}

/// Records every call; textures are numbered in upload order.
#[derive(Default)]
pub struct RecordingDevice {
    pub uploads: Vec<(u8, GlyphBitmap)>,
    pub events: Vec<DeviceEvent>,
    pub reject_upload: Option<u8>,
    bound_texture: Option<u32>,
    next_buffer: u32,
}

impl RecordingDevice {
    pub fn draws(&self) -> Vec<&DeviceEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, DeviceEvent::Draw { .. }))
            .collect()
    }

    pub fn quad_writes(&self) -> Vec<&QuadVertices> {
        self.events
            .iter()
            .filter_map(|e| match e {
                DeviceEvent::WriteQuad(_, v) => Some(v),
                _ => None,
            })
            .collect()
    }
}

impl GlyphUploader for RecordingDevice {
    type Texture = u32;

    fn upload_glyph(&mut self, code: u8, bitmap: &GlyphBitmap) -> Result<u32, GlyphError> {
        if self.reject_upload == Some(code) {
            return Err(GlyphError::Upload {
                code,
                reason: String::from("rejected"),
            });
        }
        self.uploads.push((code, bitmap.clone()));
        Ok(u32::from(code))
    }
}

impl TextDevice for RecordingDevice {
    type QuadBuffer = u32;
    type Shader = RecordingShader;

    fn create_quad_buffer(&mut self) -> u32 {
        self.next_buffer += 1;
        self.next_buffer
    }

    fn active_texture(&mut self, unit: u32) {
        self.events.push(DeviceEvent::ActiveTexture(unit));
    }

    fn bind_texture(&mut self, texture: Option<&u32>) {
        self.bound_texture = texture.copied();
        self.events.push(DeviceEvent::BindTexture(texture.copied()));
    }

    fn bind_quad_buffer(&mut self, buffer: Option<&u32>) {
        self.events.push(DeviceEvent::BindQuad(buffer.copied()));
    }

    fn write_quad(&mut self, buffer: &mut u32, vertices: &QuadVertices) {
        self.events.push(DeviceEvent::WriteQuad(*buffer, *vertices));
    }

    fn draw_triangles(&mut self, shader: &mut RecordingShader, vertex_count: u32) {
        self.events.push(DeviceEvent::Draw {
            vertex_count,
            texture: self.bound_texture,
            shader_active: shader.active,
        });
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ShaderCall {
    Use,
    Mat4(String, [[f32; 4]; 4]),
    Vec3(String, [f32; 3]),
    Int(String, i32),
}

#[derive(Default)]
pub struct RecordingShader {
    pub calls: Vec<ShaderCall>,
    pub active: bool,
}

impl ShaderService for RecordingShader {
    fn use_program(&mut self) {
        self.active = true;
        self.calls.push(ShaderCall::Use);
    }

    fn set_mat4(&mut self, name: &str, value: &[[f32; 4]; 4]) {
        self.calls.push(ShaderCall::Mat4(name.to_owned(), *value));
    }

    fn set_vec3(&mut self, name: &str, value: [f32; 3]) {
        self.calls.push(ShaderCall::Vec3(name.to_owned(), value));
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.calls.push(ShaderCall::Int(name.to_owned(), value));
    }
}
