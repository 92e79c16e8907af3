//! Error types for atlas construction and per-glyph failures.
//!
//! [`AtlasError`] is fatal: the atlas cannot be built at all.
//! [`GlyphError`] is scoped to one character code; the builder logs it
//! and leaves a gap in the atlas.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AtlasError {
    #[error("Failed to load font {path:?}: {reason}")]
    FontLoad { path: PathBuf, reason: String },
    #[error("Could not initialise glyph rasterizer: {0}")]
    RasterizerInit(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GlyphError {
    #[error("no glyph mapped for code {0}")]
    Missing(u8),
    #[error("rasterizer produced no image for code {0}")]
    Rasterize(u8),
    #[error("code {0} rasterized to non-coverage content")]
    UnsupportedContent(u8),
    #[error("bitmap for code {code} holds {actual} bytes, upload needs {required}")]
    ShortBuffer {
        code: u8,
        required: usize,
        actual: usize,
    },
    #[error("texture upload failed for code {code}: {reason}")]
    Upload { code: u8, reason: String },
}
