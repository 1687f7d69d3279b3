//! Configuration file management
//!
//! Loads TOML configuration files and provides generator settings.
//! Default config path: ~/.config/fontbake/config.toml

use anyhow::{bail, Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::atlas::packer::GridGeometry;
use crate::atlas::preview::PreviewStyle;
use crate::constants::*;

/// Generator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Atlas cell and rasterization settings
    pub atlas: AtlasConfig,
    /// Preview banner settings
    pub preview: PreviewConfig,
    /// Input/output directories
    pub paths: PathConfig,
    /// Batch settings
    pub batch: BatchConfig,
}

/// Atlas settings (the 16x16 grid itself is fixed)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    /// Cell width (pixels)
    pub char_width: u32,
    /// Cell height (pixels)
    pub char_height: u32,
    /// Rasterization size (pixels per em)
    pub font_size: f32,
    /// Top/bottom margin inside each cell
    pub cell_padding: u32,
}

/// Preview settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Banner height (pixels)
    pub height: u32,
    /// Banner font size
    pub font_size: f32,
    /// Horizontal padding on each side
    pub padding: u32,
}

/// Path settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Directory searched for target fonts
    pub fonts_dir: PathBuf,
    /// Output root; each font gets `<output_dir>/<name>/`
    pub output_dir: PathBuf,
}

/// One font to generate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontTarget {
    /// Font file name (searched in fonts_dir, fonts_dir/ttf, fonts_dir/otf, cwd)
    pub file: String,
    /// Output directory name
    pub name: String,
}

impl FontTarget {
    pub fn new(file: &str, name: &str) -> Self {
        Self {
            file: file.to_string(),
            name: name.to_string(),
        }
    }
}

/// Batch settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Worker threads (0 = one per CPU)
    pub workers: usize,
    /// Fonts processed by default
    pub targets: Vec<FontTarget>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            atlas: AtlasConfig::default(),
            preview: PreviewConfig::default(),
            paths: PathConfig::default(),
            batch: BatchConfig::default(),
        }
    }
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            char_width: DEFAULT_CHAR_WIDTH,
            char_height: DEFAULT_CHAR_HEIGHT,
            font_size: DEFAULT_FONT_SIZE,
            cell_padding: DEFAULT_CELL_PADDING,
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            height: DEFAULT_PREVIEW_HEIGHT,
            font_size: DEFAULT_PREVIEW_FONT_SIZE,
            padding: DEFAULT_PREVIEW_PADDING,
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            fonts_dir: PathBuf::from(DEFAULT_FONTS_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            targets: vec![
                FontTarget::new("JetBrainsMono-Regular.ttf", "JetBrainsMono"),
                FontTarget::new("JetBrainsMono-Bold.ttf", "JetBrainsMonoBold"),
                FontTarget::new("JetBrainsMono-Light.ttf", "JetBrainsMonoLight"),
                FontTarget::new("F25_BlackletterTypewriter.ttf", "Medieval"),
            ],
        }
    }
}

impl AtlasConfig {
    pub fn geometry(&self) -> GridGeometry {
        GridGeometry::new(self.char_width, self.char_height)
    }
}

impl PreviewConfig {
    pub fn style(&self) -> PreviewStyle {
        PreviewStyle {
            height: self.height,
            font_size: self.font_size,
            padding: self.padding,
        }
    }
}

impl BatchConfig {
    /// Effective worker count
    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

/// Command-line overrides applied on top of the loaded file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub font_size: Option<f32>,
    pub fonts_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub workers: Option<usize>,
}

impl Config {
    /// Load configuration
    ///
    /// Get the path that would be used for loading config
    /// Returns None if using built-in defaults
    pub fn config_path() -> Option<PathBuf> {
        // 1. FONTBAKE_CONFIG environment variable
        if let Ok(path) = std::env::var("FONTBAKE_CONFIG") {
            let p = Path::new(&path);
            if p.exists() {
                return Some(p.to_path_buf());
            }
        }

        // 2. User config: ~/.config/fontbake/config.toml
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("fontbake").join("config.toml");
            if config_path.exists() {
                return Some(config_path);
            }
        }

        None
    }

    /// Load configuration with priority:
    /// 1. FONTBAKE_CONFIG environment variable
    /// 2. ~/.config/fontbake/config.toml (user config)
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            match Self::load_from_file(&path) {
                Ok(config) => {
                    info!("Loaded config: {}", path.display());
                    return config;
                }
                Err(e) => {
                    warn!("Failed to load config {}: {:#}", path.display(), e);
                }
            }
        }
        info!("Using built-in default config");
        Self::default()
    }

    /// Load settings from specified path
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// New config with command-line overrides applied
    pub fn with_overrides(&self, overrides: &Overrides) -> Self {
        let mut cfg = self.clone();
        if let Some(size) = overrides.font_size {
            cfg.atlas.font_size = size;
        }
        if let Some(dir) = &overrides.fonts_dir {
            cfg.paths.fonts_dir = dir.clone();
        }
        if let Some(dir) = &overrides.output_dir {
            cfg.paths.output_dir = dir.clone();
        }
        if let Some(n) = overrides.workers {
            cfg.batch.workers = n;
        }
        cfg
    }

    /// Reject settings that cannot produce an atlas
    pub fn validate(&self) -> Result<()> {
        let a = &self.atlas;
        if a.char_width == 0 || a.char_height == 0 {
            bail!("atlas cell size must be non-zero ({}x{})", a.char_width, a.char_height);
        }
        if !(a.font_size.is_finite() && a.font_size > 0.0) {
            bail!("atlas font_size must be positive (got {})", a.font_size);
        }
        let atlas_w = u64::from(a.char_width) * u64::from(CHARS_PER_ROW);
        let atlas_h = u64::from(a.char_height) * u64::from(TOTAL_ROWS);
        if atlas_w > u64::from(u32::MAX) || atlas_h > u64::from(u32::MAX) {
            bail!("atlas cell size {}x{} is too large", a.char_width, a.char_height);
        }
        if u64::from(a.cell_padding) * 2 >= u64::from(a.char_height) {
            bail!(
                "cell_padding {} leaves no room in a {}px cell",
                a.cell_padding,
                a.char_height
            );
        }
        let p = &self.preview;
        if p.height == 0 || !(p.font_size.is_finite() && p.font_size > 0.0) {
            bail!("preview height and font_size must be positive");
        }
        Ok(())
    }
}
