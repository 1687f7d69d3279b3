//! Global constants for fontbake
//!
//! Grid layout, artifact names and generator defaults.

// ============================================================================
// Grid Layout
// ============================================================================

/// Number of cells per atlas row
pub const CHARS_PER_ROW: u32 = 16;

/// Number of atlas rows
pub const TOTAL_ROWS: u32 = 16;

/// Total number of slots (16x16)
pub const TOTAL_SLOTS: usize = (CHARS_PER_ROW * TOTAL_ROWS) as usize;

// ============================================================================
// Atlas Defaults
// ============================================================================

/// Default cell width (pixels)
pub const DEFAULT_CHAR_WIDTH: u32 = 70;

/// Default cell height (pixels)
pub const DEFAULT_CHAR_HEIGHT: u32 = 128;

/// Default rasterization size (pixels per em)
pub const DEFAULT_FONT_SIZE: f32 = 92.0;

/// Default top/bottom margin inside a cell (keeps descenders off the cell edge)
pub const DEFAULT_CELL_PADDING: u32 = 4;

// ============================================================================
// Preview Defaults
// ============================================================================

/// Fixed preview banner height (pixels)
pub const DEFAULT_PREVIEW_HEIGHT: u32 = 48;

/// Preview rasterization size
pub const DEFAULT_PREVIEW_FONT_SIZE: f32 = 32.0;

/// Horizontal padding on each side of the preview text
pub const DEFAULT_PREVIEW_PADDING: u32 = 8;

// ============================================================================
// Output
// ============================================================================

/// Atlas bitmap file name
pub const FONT_TEXTURE_FILE: &str = "Font.png";

/// Atlas descriptor file name
pub const ATLAS_JSON_FILE: &str = "Atlas.json";

/// Preview banner file name
pub const PREVIEW_FILE: &str = "Preview.png";

/// Suffix of the staging directory used while a font's artifacts are written
pub const STAGING_SUFFIX: &str = ".partial";

/// Default fonts directory
pub const DEFAULT_FONTS_DIR: &str = "fonts";

/// Default output root
pub const DEFAULT_OUTPUT_DIR: &str = "mod-structure/Textures/Fonts";

/// Glyph color (alpha carries coverage)
pub const GLYPH_RGB: [u8; 3] = [255, 255, 255];
