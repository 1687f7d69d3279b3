//! Glyph rasterization and support probing
//!
//! A glyph counts as supported only if rasterizing it actually produces ink.
//! Font coverage tables are not trusted: many fonts map characters to an
//! empty outline or fall back to a "missing glyph" box.
//!
//! Every glyph in an atlas shares one baseline: the font's line box
//! (ascent to descent) centered in the cell's padded band. A glyph whose ink
//! would still cross the band is slid back inside it.

use fontdue::{Font, FontSettings};
use image::{Rgba, RgbaImage};
use log::debug;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

use crate::constants::GLYPH_RGB;

/// Fault while rasterizing a single glyph (never fatal to a job)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GlyphRenderFault {
    #[error("no glyph for {0:?}")]
    MissingGlyph(char),

    #[error("rasterizer panicked on {0:?}")]
    EnginePanic(char),
}

/// Coverage bitmap and placement metrics for one glyph
#[derive(Debug, Clone, Default)]
pub struct RasterGlyph {
    /// Left edge of the ink relative to the pen position
    pub xmin: i32,
    /// Bottom edge of the ink relative to the baseline (y up)
    pub ymin: i32,
    /// Bitmap width (pixels)
    pub width: usize,
    /// Bitmap height (pixels)
    pub height: usize,
    /// Horizontal advance to next character
    pub advance: f32,
    /// Row-major coverage, top row first
    pub coverage: Vec<u8>,
}

impl RasterGlyph {
    /// Distance from the ascender line down to the top of the ink.
    /// Negative when the glyph overshoots the ascender.
    pub fn top_below_ascent(&self, ascent: f32) -> i32 {
        ascent.round() as i32 - (self.ymin + self.height as i32)
    }
}

/// Anything that can turn characters into coverage bitmaps
pub trait GlyphSource {
    /// Ascender height above the baseline at `px`
    fn ascent(&self, px: f32) -> f32;

    /// Descender offset from the baseline at `px` (negative, y up)
    fn descent(&self, px: f32) -> f32;

    /// Rasterize `ch` at `px`
    fn rasterize(&self, ch: char, px: f32) -> Result<RasterGlyph, GlyphRenderFault>;
}

/// Parsed outline font
pub struct LoadedFont {
    font: Font,
}

impl LoadedFont {
    /// Parse TTF/OTF bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self, String> {
        let font = Font::from_bytes(data, FontSettings::default()).map_err(|e| e.to_string())?;
        Ok(Self { font })
    }

    /// Read and parse a font file
    #[cfg(test)]
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        let data = std::fs::read(path).ok()?;
        Self::from_bytes(&data).ok()
    }
}

impl GlyphSource for LoadedFont {
    fn ascent(&self, px: f32) -> f32 {
        self.font
            .horizontal_line_metrics(px)
            .map(|m| m.ascent)
            .unwrap_or(px * 0.8)
    }

    fn descent(&self, px: f32) -> f32 {
        self.font
            .horizontal_line_metrics(px)
            .map(|m| m.descent)
            .unwrap_or(px * -0.2)
    }

    fn rasterize(&self, ch: char, px: f32) -> Result<RasterGlyph, GlyphRenderFault> {
        // Glyph 0 is .notdef; its box must not count as support
        if self.font.lookup_glyph_index(ch) == 0 {
            return Err(GlyphRenderFault::MissingGlyph(ch));
        }

        let (metrics, coverage) =
            panic::catch_unwind(AssertUnwindSafe(|| self.font.rasterize(ch, px)))
                .map_err(|_| GlyphRenderFault::EnginePanic(ch))?;

        Ok(RasterGlyph {
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            width: metrics.width,
            height: metrics.height,
            advance: metrics.advance_width,
            coverage,
        })
    }
}

/// Cell dimensions and vertical margin used for placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSize {
    pub width: u32,
    pub height: u32,
    /// Top/bottom margin excluded from vertical centering
    pub padding: u32,
}

/// Result of probing one character
#[derive(Debug, Clone)]
pub struct CellRender {
    /// Cell-sized RGBA buffer, transparent where nothing was drawn
    pub pixels: RgbaImage,
    pub supported: bool,
}

impl CellRender {
    fn empty(cell: CellSize, supported: bool) -> Self {
        Self {
            pixels: RgbaImage::new(cell.width, cell.height),
            supported,
        }
    }
}

/// Baseline row inside a cell: the line box centered in the padded band
pub fn cell_baseline(ascent: f32, descent: f32, cell: CellSize) -> i64 {
    let line_h = (ascent - descent).round() as i64;
    let available = cell.height as i64 - 2 * cell.padding as i64;
    cell.padding as i64 + (available - line_h).div_euclid(2) + ascent.round() as i64
}

/// Top-left position (inside the cell) where the glyph's ink starts.
///
/// Horizontally centered. Vertically the ink hangs off the shared baseline,
/// clamped into the padded band; ink taller than the band is centered.
pub fn glyph_origin(glyph: &RasterGlyph, baseline: i64, cell: CellSize) -> (i64, i64) {
    let ink_w = glyph.width as i64;
    let ink_h = glyph.height as i64;

    let draw_x = (cell.width as i64 - ink_w).div_euclid(2);

    let top = baseline - (glyph.ymin as i64 + ink_h);
    let band_top = cell.padding as i64;
    let band_last = cell.height as i64 - cell.padding as i64 - ink_h;
    let draw_y = if band_last >= band_top {
        top.clamp(band_top, band_last)
    } else {
        (cell.height as i64 - ink_h).div_euclid(2)
    };

    (draw_x, draw_y)
}

/// Render `ch` into an isolated cell buffer and decide support from its coverage.
///
/// Whitespace is supported when the font maps it to a real glyph, since it
/// is expected to draw nothing. Faults are absorbed as unsupported.
pub fn probe_and_render<S: GlyphSource + ?Sized>(
    source: &S,
    ch: char,
    px: f32,
    cell: CellSize,
) -> CellRender {
    let glyph = match source.rasterize(ch, px) {
        Ok(g) => g,
        Err(e) => {
            debug!("Probe failed: {}", e);
            return CellRender::empty(cell, false);
        }
    };

    if ch.is_whitespace() {
        return CellRender::empty(cell, true);
    }

    // Support is a property of the glyph, not of where it lands
    if !glyph.coverage.iter().any(|&a| a > 0) {
        return CellRender::empty(cell, false);
    }

    let baseline = cell_baseline(source.ascent(px), source.descent(px), cell);
    let (x0, y0) = glyph_origin(&glyph, baseline, cell);
    let mut pixels = RgbaImage::new(cell.width, cell.height);
    blit_coverage(&mut pixels, &glyph, x0, y0);

    CellRender {
        pixels,
        supported: true,
    }
}

/// Alpha-composite a coverage bitmap into `target` at (x0, y0), clipped.
///
/// Returns true if at least one pixel with alpha > 0 landed in the target.
pub fn blit_coverage(target: &mut RgbaImage, glyph: &RasterGlyph, x0: i64, y0: i64) -> bool {
    let (tw, th) = (target.width() as i64, target.height() as i64);
    let mut inked = false;

    for gy in 0..glyph.height {
        let py = y0 + gy as i64;
        if py < 0 || py >= th {
            continue;
        }
        for gx in 0..glyph.width {
            let px = x0 + gx as i64;
            if px < 0 || px >= tw {
                continue;
            }
            let alpha = glyph.coverage.get(gy * glyph.width + gx).copied().unwrap_or(0);
            if alpha == 0 {
                continue;
            }
            let dst = target.get_pixel_mut(px as u32, py as u32);
            let a = dst.0[3].max(alpha);
            *dst = Rgba([GLYPH_RGB[0], GLYPH_RGB[1], GLYPH_RGB[2], a]);
            inked = true;
        }
    }

    inked
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;

    /// Synthetic glyph source: solid blocks for known characters
    #[derive(Default)]
    pub struct BlockSource {
        /// width, height, alpha, ymin
        glyphs: HashMap<char, (usize, usize, u8, i32)>,
        blank: Vec<char>,
        panics: Vec<char>,
    }

    impl BlockSource {
        pub fn new() -> Self {
            Self::default()
        }

        /// `ch` draws a `w`x`h` block with the given alpha
        pub fn with_block(mut self, ch: char, w: usize, h: usize, alpha: u8) -> Self {
            self.glyphs.insert(ch, (w, h, alpha, 0));
            self
        }

        /// Opaque `w`x`h` block whose bottom sits `ymin` from the baseline
        pub fn with_offset_block(mut self, ch: char, w: usize, h: usize, ymin: i32) -> Self {
            self.glyphs.insert(ch, (w, h, 255, ymin));
            self
        }

        pub fn with_chars<I: IntoIterator<Item = char>>(mut self, chars: I) -> Self {
            for ch in chars {
                if ch.is_whitespace() {
                    self.blank.push(ch);
                } else {
                    self.glyphs.insert(ch, (10, 20, 255, 0));
                }
            }
            self
        }

        /// `ch` is mapped but draws nothing
        pub fn with_blank(mut self, ch: char) -> Self {
            self.blank.push(ch);
            self
        }

        pub fn with_panic(mut self, ch: char) -> Self {
            self.panics.push(ch);
            self
        }
    }

    impl GlyphSource for BlockSource {
        fn ascent(&self, px: f32) -> f32 {
            px * 0.75
        }

        fn descent(&self, px: f32) -> f32 {
            px * -0.25
        }

        fn rasterize(&self, ch: char, px: f32) -> Result<RasterGlyph, GlyphRenderFault> {
            if self.panics.contains(&ch) {
                return Err(GlyphRenderFault::EnginePanic(ch));
            }
            if self.blank.contains(&ch) {
                return Ok(RasterGlyph {
                    advance: px * 0.5,
                    ..RasterGlyph::default()
                });
            }
            let &(w, h, alpha, ymin) =
                self.glyphs.get(&ch).ok_or(GlyphRenderFault::MissingGlyph(ch))?;
            Ok(RasterGlyph {
                xmin: 1,
                ymin,
                width: w,
                height: h,
                advance: w as f32 + 2.0,
                coverage: vec![alpha; w * h],
            })
        }
    }

    /// First stock monospace font installed on this machine
    pub fn system_font() -> Option<LoadedFont> {
        let candidates = [
            "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
            "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
            "/System/Library/Fonts/Monaco.ttf",
        ];
        candidates
            .iter()
            .find_map(|p| LoadedFont::from_path(std::path::Path::new(p)))
    }
}
