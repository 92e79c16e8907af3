//! CPU-side glyph bitmaps — tightly packed 8-bit coverage rows.
//!
//! Single-channel rows are `width` bytes long, which is usually not a
//! multiple of 4. Uploads therefore describe the data with a row
//! alignment of 1 byte; describing it with the common 4-byte alignment
//! makes the reader step past the end of the buffer.

use crate::error::GlyphError;

/// Row alignment (in bytes) used for every glyph upload.
pub const UPLOAD_ROW_ALIGNMENT: usize = 1;

/// A rasterized glyph image: one coverage byte per pixel, rows top-down.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphBitmap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl GlyphBitmap {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// An empty bitmap (e.g. the space character).
    pub fn empty() -> Self {
        Self::new(0, 0, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Distance in bytes between the starts of two consecutive rows when
    /// rows are padded to `alignment`.
    pub fn stride(&self, alignment: usize) -> usize {
        let width = self.width as usize;
        let alignment = alignment.max(1);
        width.div_ceil(alignment) * alignment
    }

    /// Number of bytes an upload reads from `data` when rows are assumed
    /// to be padded to `alignment`. The last row is read without padding.
    pub fn required_len(&self, alignment: usize) -> usize {
        if self.is_empty() {
            return 0;
        }
        let rows = self.height as usize;
        (rows - 1) * self.stride(alignment) + self.width as usize
    }

    /// Check that an upload with [`UPLOAD_ROW_ALIGNMENT`] stays inside the
    /// buffer.
    pub fn check_upload(&self, code: u8) -> Result<(), GlyphError> {
        let required = self.required_len(UPLOAD_ROW_ALIGNMENT);
        if self.data.len() < required {
            return Err(GlyphError::ShortBuffer {
                code,
                required,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    /// Bytes to hand to the device: exactly `width * height`, tightly packed.
    pub fn upload_bytes(&self) -> &[u8] {
        let len = self.required_len(UPLOAD_ROW_ALIGNMENT);
        &self.data[..len.min(self.data.len())]
    }
}
