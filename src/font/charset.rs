//! Slot <-> character mapping
//!
//! Defines which 256 characters the atlas can hold:
//!
//! | slots    | characters                          |
//! |----------|-------------------------------------|
//! | 0        | space                               |
//! | 1-94     | U+0021..U+007E (printable ASCII)    |
//! | 95-190   | U+00A0..U+00FF (Latin-1 Supplement) |
//! | 191-254  | U+0410..U+044F (Cyrillic А..я)      |
//! | 255      | '?' fallback (also reachable at 31) |
//!
//! The reverse mapping is partial: slot 255 is forward-only.

use crate::constants::TOTAL_SLOTS;

/// Last slot, reserved for the fallback glyph
pub const FALLBACK_SLOT: usize = 255;

/// Character drawn into the fallback slot
pub const FALLBACK_CHAR: char = '?';

const ASCII_FIRST_SLOT: usize = 1;
const LATIN1_FIRST_SLOT: usize = 95;
const CYRILLIC_FIRST_SLOT: usize = 191;

const ASCII_START: u32 = 0x20;
const LATIN1_START: u32 = 0xA0;
const CYRILLIC_START: u32 = 0x410; // 'А'

/// Character stored at a slot.
///
/// Returns None only for slots outside 0..=255.
pub fn slot_to_char(index: usize) -> Option<char> {
    let cp = match index {
        0 => ASCII_START,
        ASCII_FIRST_SLOT..=94 => ASCII_START + index as u32,
        LATIN1_FIRST_SLOT..=190 => LATIN1_START + (index - LATIN1_FIRST_SLOT) as u32,
        CYRILLIC_FIRST_SLOT..=254 => CYRILLIC_START + (index - CYRILLIC_FIRST_SLOT) as u32,
        FALLBACK_SLOT => FALLBACK_CHAR as u32,
        _ => return None,
    };
    char::from_u32(cp)
}

/// Codepoint stored at a slot
#[cfg(test)]
pub fn slot_to_codepoint(index: usize) -> Option<u32> {
    slot_to_char(index).map(|c| c as u32)
}

/// Canonical slot for a codepoint, None if the atlas does not hold it
pub fn codepoint_to_slot(codepoint: u32) -> Option<usize> {
    match codepoint {
        0x20 => Some(0),
        0x21..=0x7E => Some((codepoint - ASCII_START) as usize),
        0xA0..=0xFF => Some(LATIN1_FIRST_SLOT + (codepoint - LATIN1_START) as usize),
        0x410..=0x44F => Some(CYRILLIC_FIRST_SLOT + (codepoint - CYRILLIC_START) as usize),
        _ => None,
    }
}

/// Canonical slot for a character
pub fn char_to_slot(ch: char) -> Option<usize> {
    codepoint_to_slot(ch as u32)
}

/// All slots in index order with their characters
pub fn slots() -> impl Iterator<Item = (usize, char)> {
    (0..TOTAL_SLOTS).filter_map(|i| slot_to_char(i).map(|c| (i, c)))
}
