//! Artifact writing
//!
//! A font's three files are written into `.<name>.partial` under the output
//! root and the directory is renamed into place only when all succeed.
//! Readers therefore see either a complete artifact set or none.

use image::RgbaImage;
use log::{info, warn};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::{ATLAS_JSON_FILE, FONT_TEXTURE_FILE, PREVIEW_FILE, STAGING_SUFFIX};

/// Filesystem failure while writing a font's artifacts
#[derive(Error, Debug)]
pub enum ArtifactWriteError {
    #[error("cannot create {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode {}: {reason}", .path.display())]
    Encode { path: PathBuf, reason: String },

    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot move {} into place: {source}", .path.display())]
    Commit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything produced for one font
pub struct ArtifactSet<'a> {
    pub atlas: &'a RgbaImage,
    pub atlas_json: &'a str,
    pub preview: &'a RgbaImage,
}

/// Encode an RGBA image as 8-bit PNG
pub fn write_png(path: &Path, image: &RgbaImage) -> Result<(), ArtifactWriteError> {
    let file = File::create(path).map_err(|source| ArtifactWriteError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    let encode_err = |e: png::EncodingError| ArtifactWriteError::Encode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut encoder = png::Encoder::new(BufWriter::new(file), image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().map_err(encode_err)?;
    writer.write_image_data(image.as_raw()).map_err(encode_err)?;
    writer.finish().map_err(encode_err)?;
    Ok(())
}

fn write_text(path: &Path, content: &str) -> Result<(), ArtifactWriteError> {
    std::fs::write(path, content).map_err(|source| ArtifactWriteError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Final directory for a font
pub fn font_dir(output_root: &Path, name: &str) -> PathBuf {
    output_root.join(name)
}

fn staging_dir(output_root: &Path, name: &str) -> PathBuf {
    output_root.join(format!(".{}{}", name, STAGING_SUFFIX))
}

/// Write all artifacts for `name`, replacing any previous output
pub fn write_artifacts(
    output_root: &Path,
    name: &str,
    artifacts: &ArtifactSet<'_>,
) -> Result<PathBuf, ArtifactWriteError> {
    let staging = staging_dir(output_root, name);
    let target = font_dir(output_root, name);

    // Leftover from an interrupted run; its files must not leak into this set
    if staging.exists() {
        std::fs::remove_dir_all(&staging).map_err(|source| ArtifactWriteError::CreateDir {
            path: staging.clone(),
            source,
        })?;
    }

    std::fs::create_dir_all(&staging).map_err(|source| ArtifactWriteError::CreateDir {
        path: staging.clone(),
        source,
    })?;

    let result = write_into(&staging, artifacts).and_then(|_| commit(&staging, &target));
    if result.is_err() {
        if let Err(e) = std::fs::remove_dir_all(&staging) {
            warn!("Failed to clean up {}: {}", staging.display(), e);
        }
    }
    result?;

    info!("Artifacts written: {}", target.display());
    Ok(target)
}

fn write_into(dir: &Path, artifacts: &ArtifactSet<'_>) -> Result<(), ArtifactWriteError> {
    let atlas_path = dir.join(FONT_TEXTURE_FILE);
    write_png(&atlas_path, artifacts.atlas)?;
    info!(
        "  Generated {} ({}x{} pixels)",
        FONT_TEXTURE_FILE,
        artifacts.atlas.width(),
        artifacts.atlas.height()
    );

    write_text(&dir.join(ATLAS_JSON_FILE), artifacts.atlas_json)?;
    info!("  Generated {}", ATLAS_JSON_FILE);

    write_png(&dir.join(PREVIEW_FILE), artifacts.preview)?;
    info!(
        "  Generated {} ({}x{} pixels)",
        PREVIEW_FILE,
        artifacts.preview.width(),
        artifacts.preview.height()
    );
    Ok(())
}

fn commit(staging: &Path, target: &Path) -> Result<(), ArtifactWriteError> {
    let commit_err = |source| ArtifactWriteError::Commit {
        path: target.to_path_buf(),
        source,
    };
    if target.exists() {
        std::fs::remove_dir_all(target).map_err(commit_err)?;
    }
    std::fs::rename(staging, target).map_err(commit_err)
}
