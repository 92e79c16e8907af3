//! # glyphquad-text
//!
//! Glyph atlas construction and immediate-mode text drawing. Backend
//! agnostic: GPU work goes through the traits in [`device`].
//!
//! ## Architecture
//!
//! ```text
//! SwashRasterizer (cosmic-text FontSystem + SwashCache)
//!     │  rasterize(code) ──► GlyphBitmap + bearing + advance
//!     ▼
//! GlyphAtlas::build ──► GlyphUploader::upload_glyph (one texture per code)
//!     │
//!     ▼
//! TextRenderer::draw_text(bytes) ──► per char: bind texture,
//!                                    overwrite quad buffer, draw 6 verts
//! ```
//!
//! - **`raster`** — font loading and per-code rasterization.
//! - **`bitmap`** — coverage bitmaps and upload row alignment.
//! - **`atlas`** — code → `GlyphRecord` map, built once.
//! - **`layout`** — pen movement and quad geometry.
//! - **`renderer`** — the per-string draw loop.

pub mod atlas;
pub mod bitmap;
pub mod device;
pub mod error;
pub mod layout;
pub mod raster;
pub mod renderer;

#[cfg(test)]
mod testing;

// Re-exports for ergonomic use.
pub use atlas::{GlyphAtlas, GlyphRecord, ASCII_CODES};
pub use bitmap::GlyphBitmap;
pub use device::{GlyphUploader, ShaderService, TextDevice};
pub use error::{AtlasError, GlyphError};
pub use layout::{GlyphQuad, Pen, QuadVertex, QuadVertices, QUAD_VERTEX_COUNT};
pub use raster::{GlyphRasterizer, RasterizedGlyph, SwashRasterizer};
pub use renderer::{set_projection, DrawStats, TextRenderer};
