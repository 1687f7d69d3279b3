//! Font file search and loading
//!
//! Search order for a target font file:
//! 1. <fonts_dir>/<file>
//! 2. <fonts_dir>/ttf/<file>
//! 3. <fonts_dir>/otf/<file>
//! 4. ./<file>
//! 5. <file> as given

use log::{debug, info};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::raster::LoadedFont;

/// Suffixes stripped, in this order, from file stems when deriving a display name
const NAME_SUFFIXES: [&str; 5] = ["-Regular", "-Bold", "-Medium", "-Light", "NL-Regular"];

/// Font file extensions accepted by directory discovery
const FONT_EXTENSIONS: [&str; 2] = ["ttf", "otf"];

/// Font could not be found or parsed (fatal to that font's job)
#[derive(Error, Debug)]
pub enum FontLoadError {
    #[error("font file '{file}' not found (searched: {})", display_paths(.searched))]
    NotFound { file: String, searched: Vec<PathBuf> },

    #[error("failed to read font {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse font {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Candidate locations for `file`, in search order
pub fn search_paths(file: &str, fonts_dir: &Path) -> Vec<PathBuf> {
    vec![
        fonts_dir.join(file),
        fonts_dir.join("ttf").join(file),
        fonts_dir.join("otf").join(file),
        Path::new(".").join(file),
        PathBuf::from(file),
    ]
}

/// Find the first existing candidate for `file`
pub fn locate(file: &str, fonts_dir: &Path) -> Result<PathBuf, FontLoadError> {
    let searched = search_paths(file, fonts_dir);
    for path in &searched {
        if path.is_file() {
            debug!("Font found: {}", path.display());
            return Ok(path.clone());
        }
    }
    Err(FontLoadError::NotFound {
        file: file.to_string(),
        searched,
    })
}

/// Read and parse a font file
pub fn load(path: &Path) -> Result<LoadedFont, FontLoadError> {
    let data = std::fs::read(path).map_err(|source| FontLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let font = LoadedFont::from_bytes(&data).map_err(|reason| FontLoadError::Parse {
        path: path.to_path_buf(),
        reason,
    })?;
    info!("Font loaded: {}", path.display());
    Ok(font)
}

/// Every TTF/OTF file in `fonts_dir` and its immediate subdirectories
pub fn discover(fonts_dir: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    collect_fonts(fonts_dir, &mut found);

    if let Ok(entries) = std::fs::read_dir(fonts_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                collect_fonts(&path, &mut found);
            }
        }
    }

    found.sort();
    found.dedup();
    found
}

fn collect_fonts(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() && has_font_extension(&path) {
            out.push(path);
        }
    }
}

fn has_font_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| FONT_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

/// Output name for a font file: its stem with weight suffixes stripped.
///
/// Each suffix is tried once in `NAME_SUFFIXES` order, so stacked suffixes
/// ("X-Bold-Regular") all come off. A suffix that is the whole stem stays.
pub fn display_name_from_path(path: &Path) -> String {
    let mut name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    for suffix in NAME_SUFFIXES {
        let keep = name.strip_suffix(suffix).map_or(0, str::len);
        if keep > 0 {
            name.truncate(keep);
        }
    }
    name
}
