//! Preview banner
//!
//! The font's output name in upper case, drawn in the font itself.
//! Fixed height, width follows the text.

use image::RgbaImage;

use crate::font::raster::{blit_coverage, GlyphSource, RasterGlyph};

/// Banner layout parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewStyle {
    pub height: u32,
    pub font_size: f32,
    pub padding: u32,
}

/// Laid-out glyph: pen position plus bitmap
struct PlacedGlyph {
    pen_x: f32,
    glyph: RasterGlyph,
}

/// Ink extent of a line relative to the pen origin (y down from the ascender line)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InkBox {
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
}

fn layout<S: GlyphSource + ?Sized>(source: &S, text: &str, px: f32) -> Vec<PlacedGlyph> {
    let mut pen_x = 0.0f32;
    let mut placed = Vec::new();
    for ch in text.chars() {
        // Missing characters are skipped, not drawn as boxes
        let Ok(glyph) = source.rasterize(ch, px) else {
            continue;
        };
        let advance = glyph.advance;
        placed.push(PlacedGlyph { pen_x, glyph });
        pen_x += advance;
    }
    placed
}

fn ink_box(placed: &[PlacedGlyph], ascent: f32) -> Option<InkBox> {
    placed
        .iter()
        .filter(|p| p.glyph.width > 0 && p.glyph.height > 0)
        .map(|p| {
            let left = p.pen_x.round() as i64 + p.glyph.xmin as i64;
            let top = p.glyph.top_below_ascent(ascent) as i64;
            InkBox {
                left,
                top,
                right: left + p.glyph.width as i64,
                bottom: top + p.glyph.height as i64,
            }
        })
        .reduce(|a, b| InkBox {
            left: a.left.min(b.left),
            top: a.top.min(b.top),
            right: a.right.max(b.right),
            bottom: a.bottom.max(b.bottom),
        })
}

/// Render `name.to_uppercase()` into a transparent banner
pub fn render_preview<S: GlyphSource + ?Sized>(
    source: &S,
    name: &str,
    style: PreviewStyle,
) -> RgbaImage {
    let text = name.to_uppercase();
    let ascent = source.ascent(style.font_size);
    let placed = layout(source, &text, style.font_size);

    let Some(ink) = ink_box(&placed, ascent) else {
        return RgbaImage::new((style.padding * 2).max(1), style.height);
    };

    let text_w = (ink.right - ink.left) as u32;
    let text_h = ink.bottom - ink.top;
    let width = text_w + style.padding * 2;
    let mut image = RgbaImage::new(width, style.height);

    // Pen origin so the ink starts at `padding` and is centered vertically
    let origin_x = style.padding as i64 - ink.left;
    let origin_y = (style.height as i64 - text_h).div_euclid(2) - ink.top;

    for p in &placed {
        let x = origin_x + p.pen_x.round() as i64 + p.glyph.xmin as i64;
        let y = origin_y + p.glyph.top_below_ascent(ascent) as i64;
        blit_coverage(&mut image, &p.glyph, x, y);
    }

    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::raster::testing::BlockSource;

    const STYLE: PreviewStyle = PreviewStyle {
        height: 48,
        font_size: 32.0,
        padding: 8,
    };

    #[test]
    fn test_width_follows_text() {
        // Each block: xmin 1, width 10, advance 12 -> ink from 1 to 12 + 1 + 10
        let src = BlockSource::new().with_block('A', 10, 20, 255).with_block('B', 10, 20, 255);
        let img = render_preview(&src, "ab", STYLE);
        assert_eq!(img.height(), 48);
        assert_eq!(img.width(), 22 + 16);
    }

    #[test]
    fn test_text_is_padded_and_centered() {
        let src = BlockSource::new().with_block('A', 10, 20, 255);
        let img = render_preview(&src, "a", STYLE);
        assert_eq!(img.width(), 26);

        let inked: Vec<(u32, u32)> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[3] > 0)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert_eq!(inked.len(), 200);
        assert_eq!(inked.iter().map(|p| p.0).min(), Some(8));
        assert_eq!(inked.iter().map(|p| p.1).min(), Some(14));
        assert_eq!(inked.iter().map(|p| p.1).max(), Some(33));
    }

    #[test]
    fn test_no_drawable_glyphs() {
        let img = render_preview(&BlockSource::new(), "missing", STYLE);
        assert_eq!(img.dimensions(), (16, 48));
        assert!(img.pixels().all(|p| p.0[3] == 0));
    }
}
