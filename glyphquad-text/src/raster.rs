//! Glyph rasterization — turns single-byte character codes into coverage
//! bitmaps plus placement metrics using `cosmic-text`'s swash backend.
//!
//! The rasterizer owns a private `FontSystem` holding exactly one face,
//! so nothing depends on system font discovery unless
//! [`SwashRasterizer::from_system_monospace`] is asked for it.

use std::path::{Path, PathBuf};

use cosmic_text::{fontdb, CacheKey, CacheKeyFlags, FontSystem, SwashCache, SwashContent};
use font_kit::family_name::FamilyName;
use font_kit::handle::Handle;
use font_kit::properties::Properties;
use font_kit::source::SystemSource;
use log::debug;

use crate::bitmap::GlyphBitmap;
use crate::error::{AtlasError, GlyphError};

/// One rasterized glyph, ready for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterizedGlyph {
    pub bitmap: GlyphBitmap,
    /// Offset from the pen origin to the bitmap's top-left, y-up.
    pub bearing: (i32, i32),
    /// Horizontal advance in 1/64 px.
    pub advance: u32,
}

/// Anything that can turn a character code into a [`RasterizedGlyph`].
pub trait GlyphRasterizer {
    /// Em height in pixels the glyphs are rendered at.
    fn pixel_height(&self) -> u32;

    fn rasterize(&mut self, code: u8) -> Result<RasterizedGlyph, GlyphError>;
}

/// Grid-fit a pixel advance and express it in 26.6 fixed point.
///
/// Hinted rasterizers round advances to whole pixels, so the fractional
/// bits are always zero and `>> 6` never loses width.
pub fn to_fixed_26_6(px: f32) -> u32 {
    px.max(0.0).round() as u32 * 64
}

/// Rasterizer over a single font face, backed by swash.
pub struct SwashRasterizer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    face_id: fontdb::ID,
    pixel_height: u32,
}

impl SwashRasterizer {
    /// Load the first face of the font file at `path`.
    pub fn from_path(path: impl AsRef<Path>, pixel_height: u32) -> Result<Self, AtlasError> {
        Self::from_path_index(path.as_ref(), 0, pixel_height)
    }

    /// Load face `face_index` of a font file (collections hold several).
    pub fn from_path_index(
        path: &Path,
        face_index: u32,
        pixel_height: u32,
    ) -> Result<Self, AtlasError> {
        check_pixel_height(pixel_height)?;
        let data = std::fs::read(path).map_err(|e| AtlasError::FontLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::load(data, face_index, path.to_path_buf(), pixel_height)
    }

    /// Build from in-memory font data.
    pub fn from_bytes(data: Vec<u8>, face_index: u32, pixel_height: u32) -> Result<Self, AtlasError> {
        check_pixel_height(pixel_height)?;
        Self::load(data, face_index, PathBuf::from("<memory>"), pixel_height)
    }

    /// Resolve the system's preferred monospace face through `font-kit`.
    pub fn from_system_monospace(pixel_height: u32) -> Result<Self, AtlasError> {
        check_pixel_height(pixel_height)?;
        let handle = SystemSource::new()
            .select_best_match(&[FamilyName::Monospace], &Properties::new())
            .map_err(|e| AtlasError::FontLoad {
                path: PathBuf::from("<system monospace>"),
                reason: e.to_string(),
            })?;

        match handle {
            Handle::Path { path, font_index } => {
                debug!("system monospace resolved to {}", path.display());
                Self::from_path_index(&path, font_index, pixel_height)
            }
            Handle::Memory { bytes, font_index } => {
                Self::from_bytes(bytes.to_vec(), font_index, pixel_height)
            }
        }
    }

    fn load(
        data: Vec<u8>,
        face_index: u32,
        origin: PathBuf,
        pixel_height: u32,
    ) -> Result<Self, AtlasError> {
        let mut db = fontdb::Database::new();
        // fontdb silently drops data it cannot parse.
        db.load_font_data(data);

        let face_id = db
            .faces()
            .find(|face| face.index == face_index)
            .map(|face| face.id)
            .ok_or_else(|| AtlasError::FontLoad {
                path: origin.clone(),
                reason: format!("no parsable face at index {face_index}"),
            })?;

        let mut font_system = FontSystem::new_with_locale_and_db(String::from("en-US"), db);
        if font_system.get_font(face_id).is_none() {
            return Err(AtlasError::RasterizerInit(format!(
                "font system rejected face {face_index} of {}",
                origin.display()
            )));
        }

        debug!(
            "rasterizer ready: {} face {face_index} at {pixel_height}px",
            origin.display()
        );

        Ok(Self {
            font_system,
            swash_cache: SwashCache::new(),
            face_id,
            pixel_height,
        })
    }
}

impl GlyphRasterizer for SwashRasterizer {
    fn pixel_height(&self) -> u32 {
        self.pixel_height
    }

    fn rasterize(&mut self, code: u8) -> Result<RasterizedGlyph, GlyphError> {
        let font = self
            .font_system
            .get_font(self.face_id)
            .ok_or(GlyphError::Rasterize(code))?;
        let size = self.pixel_height as f32;

        let swash = font.as_swash();
        let glyph_id = swash.charmap().map(u32::from(code));
        let advance = swash.glyph_metrics(&[]).scale(size).advance_width(glyph_id);

        let (cache_key, _, _) = CacheKey::new(
            self.face_id,
            glyph_id,
            size,
            (0.0, 0.0),
            CacheKeyFlags::empty(),
        );
        let image = self
            .swash_cache
            .get_image_uncached(&mut self.font_system, cache_key)
            .ok_or(GlyphError::Rasterize(code))?;

        if !matches!(image.content, SwashContent::Mask) {
            return Err(GlyphError::UnsupportedContent(code));
        }

        let placement = image.placement;
        Ok(RasterizedGlyph {
            bitmap: GlyphBitmap::new(placement.width, placement.height, image.data),
            bearing: (placement.left, placement.top),
            advance: to_fixed_26_6(advance),
        })
    }
}

fn check_pixel_height(pixel_height: u32) -> Result<(), AtlasError> {
    if pixel_height == 0 {
        return Err(AtlasError::RasterizerInit(String::from(
            "pixel height must be non-zero",
        )));
    }
    Ok(())
}
