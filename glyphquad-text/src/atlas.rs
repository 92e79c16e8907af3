//! Glyph atlas — one device texture plus placement metrics per ASCII code.
//!
//! Glyphs are not packed into a shared image: every code owns its own
//! single-channel texture. The atlas is built once and is read-only
//! afterwards. Codes that fail to rasterize or upload are logged and
//! left out, so lookups must tolerate gaps.

use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;

use log::{info, warn};

use crate::device::GlyphUploader;
use crate::error::{AtlasError, GlyphError};
use crate::raster::{GlyphRasterizer, SwashRasterizer};

/// Character codes covered by [`GlyphAtlas::build`].
pub const ASCII_CODES: Range<u8> = 0..128;

/// Metrics and texture for one character code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphRecord<T> {
    /// Backend handle to the glyph's single-channel texture.
    pub texture: T,
    /// Bitmap width and height in pixels.
    pub size: (u32, u32),
    /// Offset from the pen origin to the bitmap's top-left (y-up).
    pub bearing: (i32, i32),
    /// Advance to the next pen origin, in 1/64 px.
    pub advance: u32,
}

/// Glyph records keyed by character code.
#[derive(Debug)]
pub struct GlyphAtlas<T> {
    glyphs: HashMap<u8, GlyphRecord<T>>,
    skipped: Vec<(u8, GlyphError)>,
    pixel_height: u32,
}

impl<T> GlyphAtlas<T> {
    /// Load `font_path` at `pixel_height` px and build the 0..128 atlas.
    ///
    /// The rasterizer lives only for the duration of the build.
    pub fn from_font<U>(
        font_path: impl AsRef<Path>,
        pixel_height: u32,
        uploader: &mut U,
    ) -> Result<Self, AtlasError>
    where
        U: GlyphUploader<Texture = T>,
    {
        let rasterizer = SwashRasterizer::from_path(font_path, pixel_height)?;
        Ok(Self::build(rasterizer, uploader))
    }

    /// Build records for every code in 0..128.
    pub fn build<R, U>(rasterizer: R, uploader: &mut U) -> Self
    where
        R: GlyphRasterizer,
        U: GlyphUploader<Texture = T>,
    {
        Self::build_range(rasterizer, uploader, ASCII_CODES)
    }

    /// Build records for the codes in `codes`. Failures are per code.
    pub fn build_range<R, U>(mut rasterizer: R, uploader: &mut U, codes: Range<u8>) -> Self
    where
        R: GlyphRasterizer,
        U: GlyphUploader<Texture = T>,
    {
        let pixel_height = rasterizer.pixel_height();
        let mut glyphs = HashMap::with_capacity(codes.len());
        let mut skipped = Vec::new();

        for code in codes {
            match Self::build_one(&mut rasterizer, uploader, code) {
                Ok(record) => {
                    glyphs.insert(code, record);
                }
                Err(e) => {
                    warn!("skipping glyph {code}: {e}");
                    skipped.push((code, e));
                }
            }
        }

        info!(
            "glyph atlas built at {pixel_height}px: {} glyphs, {} skipped",
            glyphs.len(),
            skipped.len()
        );

        Self {
            glyphs,
            skipped,
            pixel_height,
        }
    }

    fn build_one<R, U>(rasterizer: &mut R, uploader: &mut U, code: u8) -> Result<GlyphRecord<T>, GlyphError>
    where
        R: GlyphRasterizer,
        U: GlyphUploader<Texture = T>,
    {
        let glyph = rasterizer.rasterize(code)?;
        glyph.bitmap.check_upload(code)?;
        let texture = uploader.upload_glyph(code, &glyph.bitmap)?;

        Ok(GlyphRecord {
            texture,
            size: (glyph.bitmap.width, glyph.bitmap.height),
            bearing: glyph.bearing,
            advance: glyph.advance,
        })
    }

    pub fn get(&self, code: u8) -> Option<&GlyphRecord<T>> {
        self.glyphs.get(&code)
    }

    pub fn contains(&self, code: u8) -> bool {
        self.glyphs.contains_key(&code)
    }

    /// Number of glyphs in the atlas.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Codes left out during the build, with the reason.
    pub fn skipped(&self) -> &[(u8, GlyphError)] {
        &self.skipped
    }

    pub fn pixel_height(&self) -> u32 {
        self.pixel_height
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &GlyphRecord<T>)> {
        self.glyphs.iter().map(|(code, record)| (*code, record))
    }
}
