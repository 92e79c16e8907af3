//! # glyphquad-render
//!
//! wgpu backend for `glyphquad-text`.
//!
//! ## Architecture
//!
//! ```text
//!  Renderer::load_font()         ◀─── atlas build, one R8 texture per glyph
//!       │
//!       ▼
//!  Renderer.render_to_surface()  ◀─── clear pass
//!       │
//!       ▼
//!  TextRenderer::draw_text()     ◀─── per glyph: write quad buffer,
//!       │                              one pass + submit
//!       ▼
//!  present
//! ```
//!
//! ## Crate modules
//!
//! - [`context`] — GPU device/queue/surface initialisation
//! - [`vertex`] — vertex layout, uniform block, projection
//! - [`pipelines`] — the text pipeline, shader service and device
//! - [`renderer`] — high-level frame orchestration

pub mod context;
pub mod pipelines;
pub mod renderer;
pub mod vertex;

// Re-exports for convenience
pub use context::{GpuContext, GpuError};
pub use pipelines::text::{GlyphResources, GlyphTexture, QuadBuffer, TextShader, WgpuTextDevice};
pub use renderer::{FrameStats, RenderError, Renderer, WgpuTextRenderer};
pub use vertex::{ortho, screen_projection, TextUniform};
