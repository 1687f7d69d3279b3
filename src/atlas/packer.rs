//! Fixed-grid atlas packing
//!
//! Every slot owns one `char_width x char_height` cell at
//! `(col * char_width, row * char_height)` where `col = index % 16` and
//! `row = index / 16`. The bitmap size never depends on glyph coverage.

use image::RgbaImage;
use log::{debug, info};
use std::collections::BTreeMap;

use crate::constants::{CHARS_PER_ROW, TOTAL_ROWS, TOTAL_SLOTS};
use crate::font::charset;
use crate::font::raster::{probe_and_render, CellSize, GlyphSource};

/// Normalized texture rectangle of one slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

/// Atlas layout: cell size plus the fixed 16x16 grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    pub char_width: u32,
    pub char_height: u32,
    pub chars_per_row: u32,
    pub total_rows: u32,
}

impl GridGeometry {
    pub fn new(char_width: u32, char_height: u32) -> Self {
        Self {
            char_width,
            char_height,
            chars_per_row: CHARS_PER_ROW,
            total_rows: TOTAL_ROWS,
        }
    }

    /// Saturates instead of wrapping; `Config::validate` rejects such cells
    pub fn texture_width(&self) -> u32 {
        self.chars_per_row.saturating_mul(self.char_width)
    }

    pub fn texture_height(&self) -> u32 {
        self.total_rows.saturating_mul(self.char_height)
    }

    /// (gridX, gridY) of a slot
    pub fn cell_of(&self, index: usize) -> (u32, u32) {
        let i = index as u32;
        (i % self.chars_per_row, i / self.chars_per_row)
    }

    /// Pixel origin of a slot's cell
    pub fn cell_origin(&self, index: usize) -> (u32, u32) {
        let (col, row) = self.cell_of(index);
        (col * self.char_width, row * self.char_height)
    }

    /// UV rectangle of a slot; pure grid arithmetic, defined for every slot
    pub fn uv_for(&self, index: usize) -> UvRect {
        let (col, row) = self.cell_of(index);
        let cols = self.chars_per_row as f64;
        let rows = self.total_rows as f64;
        UvRect {
            left: col as f64 / cols,
            right: (col + 1) as f64 / cols,
            top: row as f64 / rows,
            bottom: (row + 1) as f64 / rows,
        }
    }
}

/// One atlas cell after probing
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphSlot {
    pub index: usize,
    pub character: char,
    pub grid_x: u32,
    pub grid_y: u32,
    pub supported: bool,
    pub uv: UvRect,
}

impl GlyphSlot {
    pub fn codepoint(&self) -> u32 {
        self.character as u32
    }
}

/// Character -> supported, frozen once packing finishes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupportMap {
    entries: BTreeMap<char, bool>,
}

impl SupportMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a probe result. A character seen twice (slot 255 repeats '?')
    /// keeps the later probe, which is identical for a deterministic font.
    pub fn insert(&mut self, ch: char, supported: bool) {
        self.entries.insert(ch, supported);
    }

    /// Unknown characters count as unsupported
    pub fn is_supported(&self, ch: char) -> bool {
        self.entries.get(&ch).copied().unwrap_or(false)
    }

    /// Number of distinct supported characters
    pub fn supported_count(&self) -> usize {
        self.entries.values().filter(|&&v| v).count()
    }
}

impl FromIterator<(char, bool)> for SupportMap {
    fn from_iter<I: IntoIterator<Item = (char, bool)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Finished atlas: bitmap, per-slot records and support map
#[derive(Debug, Clone)]
pub struct PackedAtlas {
    pub geometry: GridGeometry,
    pub image: RgbaImage,
    pub slots: Vec<GlyphSlot>,
    pub support: SupportMap,
}

impl PackedAtlas {
    /// Slots that received a glyph
    pub fn supported_slots(&self) -> impl Iterator<Item = &GlyphSlot> {
        self.slots.iter().filter(|s| s.supported)
    }
}

/// Probe every slot in index order and draw supported glyphs into one bitmap
pub fn pack<S: GlyphSource + ?Sized>(
    source: &S,
    geometry: GridGeometry,
    font_size: f32,
    padding: u32,
) -> PackedAtlas {
    let cell = CellSize {
        width: geometry.char_width,
        height: geometry.char_height,
        padding,
    };

    let mut image = RgbaImage::new(geometry.texture_width(), geometry.texture_height());
    let mut slots = Vec::with_capacity(TOTAL_SLOTS);
    let mut support = SupportMap::new();

    for (index, ch) in charset::slots() {
        let render = probe_and_render(source, ch, font_size, cell);
        let (grid_x, grid_y) = geometry.cell_of(index);

        if render.supported {
            let (ox, oy) = geometry.cell_origin(index);
            copy_cell(&mut image, &render.pixels, ox, oy);
        } else {
            debug!("Slot {} U+{:04X} unsupported", index, ch as u32);
        }

        support.insert(ch, render.supported);
        slots.push(GlyphSlot {
            index,
            character: ch,
            grid_x,
            grid_y,
            supported: render.supported,
            uv: geometry.uv_for(index),
        });
    }

    info!(
        "Atlas packed: {}x{}, {}/{} slots drawn",
        geometry.texture_width(),
        geometry.texture_height(),
        slots.iter().filter(|s| s.supported).count(),
        slots.len()
    );

    PackedAtlas {
        geometry,
        image,
        slots,
        support,
    }
}

/// Copy a cell buffer into the atlas; cells never overlap so plain copy is enough
fn copy_cell(atlas: &mut RgbaImage, cell: &RgbaImage, ox: u32, oy: u32) {
    for (x, y, pixel) in cell.enumerate_pixels() {
        if pixel.0[3] == 0 {
            continue;
        }
        let (ax, ay) = (ox + x, oy + y);
        if ax < atlas.width() && ay < atlas.height() {
            atlas.put_pixel(ax, ay, *pixel);
        }
    }
}
