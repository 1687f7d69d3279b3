//! Atlas.json descriptor
//!
//! Geometry constants, script flags and a sparse per-character table.
//! Only supported slots get an entry; keys are decimal codepoints.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::language::LanguageSupportProfile;
use super::packer::{GridGeometry, PackedAtlas};
use crate::font::charset;

/// Boolean summaries consumed by the font picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlasSummary {
    pub has_latin_support: bool,
    pub has_accent_support: bool,
    pub has_cyrillic_support: bool,
    pub has_greek_support: bool,
    pub total_supported_characters: usize,
}

/// One drawable character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterEntry {
    pub char: char,
    pub index: usize,
    pub grid_x: u32,
    pub grid_y: u32,
    pub uv_left: f64,
    pub uv_right: f64,
    pub uv_top: f64,
    pub uv_bottom: f64,
    pub supported: bool,
}

/// Complete descriptor written next to Font.png
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlasDescriptor {
    pub font_name: String,
    pub texture_width: u32,
    pub texture_height: u32,
    pub char_width: u32,
    pub char_height: u32,
    pub chars_per_row: u32,
    pub total_rows: u32,
    pub language_support: LanguageSupportProfile,
    pub metadata: AtlasSummary,
    /// Codepoint -> entry; serde_json writes integer keys as strings
    pub characters: BTreeMap<u32, CharacterEntry>,
}

impl AtlasDescriptor {
    /// Assemble the descriptor for a packed atlas
    pub fn build(font_name: &str, atlas: &PackedAtlas, profile: LanguageSupportProfile) -> Self {
        let geometry: GridGeometry = atlas.geometry;
        let mut characters = BTreeMap::new();

        for slot in atlas.supported_slots() {
            // Slot 255 repeats '?'; entries point at the canonical slot 31
            if charset::char_to_slot(slot.character) != Some(slot.index) {
                continue;
            }
            characters.insert(slot.codepoint(), CharacterEntry {
                char: slot.character,
                index: slot.index,
                grid_x: slot.grid_x,
                grid_y: slot.grid_y,
                uv_left: slot.uv.left,
                uv_right: slot.uv.right,
                uv_top: slot.uv.top,
                uv_bottom: slot.uv.bottom,
                supported: true,
            });
        }

        Self {
            font_name: font_name.to_string(),
            texture_width: geometry.texture_width(),
            texture_height: geometry.texture_height(),
            char_width: geometry.char_width,
            char_height: geometry.char_height,
            chars_per_row: geometry.chars_per_row,
            total_rows: geometry.total_rows,
            language_support: profile,
            metadata: AtlasSummary {
                has_latin_support: profile.latin,
                has_accent_support: profile.latin_extended,
                has_cyrillic_support: profile.cyrillic,
                has_greek_support: profile.greek,
                total_supported_characters: atlas.support.supported_count(),
            },
            characters,
        }
    }

    /// Pretty JSON (2-space indent, non-ASCII kept as-is)
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::{language, packer};
    use crate::font::raster::testing::BlockSource;

    fn build_for(src: &BlockSource) -> AtlasDescriptor {
        let atlas = packer::pack(src, GridGeometry::new(16, 24), 16.0, 2);
        let profile = language::detect(&atlas.support);
        AtlasDescriptor::build("Test", &atlas, profile)
    }

    fn ascii_only() -> BlockSource {
        BlockSource::new().with_chars((0x20u8..=0x7Eu8).map(|b| b as char))
    }

    #[test]
    fn test_ascii_only_font() {
        let d = build_for(&ascii_only());
        assert!(d.metadata.has_latin_support);
        assert!(!d.metadata.has_cyrillic_support);
        assert!(!d.metadata.has_accent_support);
        assert_eq!(d.metadata.total_supported_characters, 95);
        assert_eq!(d.characters.len(), 95);

        let mut indices: Vec<usize> = d.characters.values().map(|e| e.index).collect();
        indices.sort();
        assert_eq!(indices, (0..95).collect::<Vec<_>>());
        assert_eq!(d.characters[&('?' as u32)].index, 31);
    }

    #[test]
    fn test_sparse_entries_are_all_supported() {
        let src = ascii_only().with_chars("АБВГДЕЖЗИЙКЛМНОПРСТУФ".chars());
        let d = build_for(&src);
        assert!(d.language_support.cyrillic);
        assert_eq!(d.characters.len(), d.metadata.total_supported_characters);
        assert!(d.characters.values().all(|e| e.supported));
        assert!(!d.characters.contains_key(&('я' as u32)));
    }

    #[test]
    fn test_geometry_fields() {
        let d = build_for(&BlockSource::new());
        assert_eq!((d.texture_width, d.texture_height), (256, 384));
        assert_eq!((d.chars_per_row, d.total_rows), (16, 16));
        assert!(d.characters.is_empty());
        assert_eq!(d.metadata.total_supported_characters, 0);
    }

    #[test]
    fn test_json_shape() {
        let src = BlockSource::new().with_block('1', 3, 3, 255).with_block('é', 3, 3, 255);
        let json = build_for(&src).to_json().unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(v["fontName"], "Test");
        assert_eq!(v["textureWidth"], 256);
        assert_eq!(v["languageSupport"]["latinExtended"], false);
        assert_eq!(v["metadata"]["totalSupportedCharacters"], 2);

        let one = &v["characters"]["49"];
        assert_eq!(one["char"], "1");
        assert_eq!(one["index"], 17);
        assert_eq!(one["gridX"], 1);
        assert_eq!(one["uvLeft"], 0.0625);
        assert_eq!(one["uvBottom"], 0.125);
        assert_eq!(one["supported"], true);

        // non-ASCII written verbatim
        assert!(json.contains("\"char\": \"é\""));

        let back: AtlasDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back.characters.len(), 2);
    }
}
