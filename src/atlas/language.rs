//! Script support detection
//!
//! Thresholds differ per script and are kept as-is:
//! Latin needs all 52 letters, accented Latin at least 10,
//! Cyrillic at least 20, Greek any single letter.
//! CJK and Arabic are reserved and always false.

use serde::{Deserialize, Serialize};

use super::packer::SupportMap;

const LATIN_CHARS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

const ACCENT_CHARS: &str =
    "àáâãäåèéêëìíîïòóôõöùúûüýÿÀÁÂÃÄÅÈÉÊËÌÍÎÏÒÓÔÕÖÙÚÛÜÝŸñÑçÇæÆœŒ";
const ACCENT_THRESHOLD: usize = 10;

const CYRILLIC_CHARS: &str =
    "АБВГДЕЁЖЗИЙКЛМНОПРСТУФХЦЧШЩЪЫЬЭЮЯабвгдеёжзийклмнопрстуфхцчшщъыьэюя";
const CYRILLIC_THRESHOLD: usize = 20;

const GREEK_CHARS: &str = "ΑΒΓΔΕΖΗΘΙΚΛΜΝΞΟΠΡΣΤΥΦΧΨΩαβγδεζηθικλμνξοπρστυφχψω";

/// Per-script support flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageSupportProfile {
    pub latin: bool,
    pub latin_extended: bool,
    pub cyrillic: bool,
    pub greek: bool,
    pub chinese: bool,
    pub japanese: bool,
    pub korean: bool,
    pub arabic: bool,
}

fn count_supported(support: &SupportMap, chars: &str) -> usize {
    chars.chars().filter(|&c| support.is_supported(c)).count()
}

/// Derive script flags from a finished support map
pub fn detect(support: &SupportMap) -> LanguageSupportProfile {
    LanguageSupportProfile {
        latin: LATIN_CHARS.chars().all(|c| support.is_supported(c)),
        latin_extended: count_supported(support, ACCENT_CHARS) >= ACCENT_THRESHOLD,
        cyrillic: count_supported(support, CYRILLIC_CHARS) >= CYRILLIC_THRESHOLD,
        greek: GREEK_CHARS.chars().any(|c| support.is_supported(c)),
        ..LanguageSupportProfile::default()
    }
}
