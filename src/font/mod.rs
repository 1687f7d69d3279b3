//! Font loading and glyph probing
//!
//! Handles:
//! - Locating font files in the search directories
//! - TTF/OTF loading (fontdue)
//! - The fixed slot <-> character mapping
//! - Per-glyph rasterization and support probing

pub mod charset;
pub mod locate;
pub mod raster;

pub use locate::FontLoadError;
