//! Per-font pipeline and batch driver
//!
//! locate -> load -> pack -> detect -> describe -> preview -> write.
//! A font either ends with all three artifacts written or with nothing
//! written at all. Fonts share no state and run on a small worker pool.

use log::{error, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use thiserror::Error;

use crate::atlas::metadata::AtlasDescriptor;
use crate::atlas::{language, packer, preview};
use crate::config::{Config, FontTarget};
use crate::font::{locate, FontLoadError};
use crate::output::{self, ArtifactSet, ArtifactWriteError};

/// Reason a single font's job failed
#[derive(Error, Debug)]
pub enum JobError {
    #[error(transparent)]
    FontLoad(#[from] FontLoadError),

    #[error(transparent)]
    ArtifactWrite(#[from] ArtifactWriteError),

    #[error("atlas JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Where a job's font comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// File name resolved through the search locations
    Search(String),
    /// Exact path
    Path(PathBuf),
}

/// One font to process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub source: FontSource,
    /// Output directory name, also the atlas `fontName`
    pub name: String,
}

impl JobRequest {
    pub fn from_target(target: &FontTarget) -> Self {
        Self {
            source: FontSource::Search(target.file.clone()),
            name: target.name.clone(),
        }
    }

    /// Exact path; name defaults to the file stem without weight suffix
    pub fn from_path(path: &Path, name: Option<&str>) -> Self {
        Self {
            source: FontSource::Path(path.to_path_buf()),
            name: name
                .map(str::to_string)
                .unwrap_or_else(|| locate::display_name_from_path(path)),
        }
    }

    /// File label used in reports
    pub fn file_label(&self) -> String {
        match &self.source {
            FontSource::Search(file) => file.clone(),
            FontSource::Path(path) => path
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }

    fn file_stem(&self) -> String {
        let path = match &self.source {
            FontSource::Search(file) => Path::new(file),
            FontSource::Path(path) => path.as_path(),
        };
        path.file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.name.clone())
    }
}

/// Give every request its own output directory.
///
/// Two jobs with the same name would share a staging directory, so later
/// duplicates fall back to their file stem, then to a numbered name.
/// Names are compared case-insensitively.
pub fn make_names_unique(requests: &mut [JobRequest]) {
    let mut taken = HashSet::new();
    for request in requests.iter_mut() {
        if taken.insert(request.name.to_lowercase()) {
            continue;
        }

        let stem = request.file_stem();
        let mut candidate = stem.clone();
        let mut n = 2;
        while !taken.insert(candidate.to_lowercase()) {
            candidate = format!("{}-{}", stem, n);
            n += 1;
        }
        warn!(
            "Output name {} already used, writing {} as {}",
            request.name,
            request.file_label(),
            candidate
        );
        request.name = candidate;
    }
}

/// Successful job
#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub name: String,
    pub source_path: PathBuf,
    pub output_dir: PathBuf,
    pub supported_characters: usize,
    pub character_entries: usize,
}

/// Failed job
#[derive(Debug)]
pub struct FailedJob {
    pub name: String,
    pub file: String,
    pub error: JobError,
}

fn resolve(request: &JobRequest, fonts_dir: &Path) -> Result<PathBuf, FontLoadError> {
    match &request.source {
        FontSource::Search(file) => locate::locate(file, fonts_dir),
        FontSource::Path(path) if path.is_file() => Ok(path.clone()),
        FontSource::Path(path) => Err(FontLoadError::NotFound {
            file: path.display().to_string(),
            searched: vec![path.clone()],
        }),
    }
}

/// Run the full pipeline for one font
pub fn process_font(request: &JobRequest, config: &Config) -> Result<JobReport, JobError> {
    let path = resolve(request, &config.paths.fonts_dir)?;
    info!("Processing font: {}", request.name);
    info!("  Source: {}", path.display());

    let font = locate::load(&path)?;

    let atlas = packer::pack(
        &font,
        config.atlas.geometry(),
        config.atlas.font_size,
        config.atlas.cell_padding,
    );
    let profile = language::detect(&atlas.support);
    let descriptor = AtlasDescriptor::build(&request.name, &atlas, profile);
    let atlas_json = descriptor.to_json()?;
    info!(
        "  Atlas.json: {} character mappings",
        descriptor.characters.len()
    );

    let banner = preview::render_preview(&font, &request.name, config.preview.style());

    let output_dir = output::write_artifacts(
        &config.paths.output_dir,
        &request.name,
        &ArtifactSet {
            atlas: &atlas.image,
            atlas_json: &atlas_json,
            preview: &banner,
        },
    )?;

    info!("  Font {} processed successfully!", request.name);
    Ok(JobReport {
        name: request.name.clone(),
        source_path: path,
        output_dir,
        supported_characters: descriptor.metadata.total_supported_characters,
        character_entries: descriptor.characters.len(),
    })
}

/// Outcome of a whole batch, in request order
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: Vec<JobReport>,
    pub failed: Vec<FailedJob>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// "<ok>/<total> processed successfully"
    pub fn headline(&self) -> String {
        format!("{}/{} processed successfully", self.succeeded.len(), self.total)
    }

    /// One line per failed font
    pub fn failure_lines(&self) -> Vec<String> {
        self.failed
            .iter()
            .map(|f| format!("{} ({}): {}", f.name, f.file, f.error))
            .collect()
    }
}

/// Process every request on `workers` threads
pub fn run_batch(requests: &[JobRequest], config: &Config, workers: usize) -> BatchSummary {
    let workers = workers.clamp(1, requests.len().max(1));
    info!("Processing {} fonts on {} worker(s)", requests.len(), workers);

    let next = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel();

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let next = &next;
            scope.spawn(move || loop {
                let i = next.fetch_add(1, Ordering::Relaxed);
                let Some(request) = requests.get(i) else {
                    break;
                };
                let result = process_font(request, config);
                if tx.send((i, result)).is_err() {
                    break;
                }
            });
        }
    });
    drop(tx);

    let mut results: Vec<_> = rx.into_iter().collect();
    results.sort_by_key(|(i, _)| *i);

    let mut summary = BatchSummary {
        total: requests.len(),
        ..BatchSummary::default()
    };
    for (i, result) in results {
        let request = &requests[i];
        match result {
            Ok(report) => summary.succeeded.push(report),
            Err(e) => {
                error!("Font {} failed: {}", request.name, e);
                summary.failed.push(FailedJob {
                    name: request.name.clone(),
                    file: request.file_label(),
                    error: e,
                });
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(root: &Path) -> Config {
        let mut cfg = Config::default();
        cfg.paths.fonts_dir = root.join("fonts");
        cfg.paths.output_dir = root.join("out");
        cfg
    }

    /// First installed system font, copied into the test fonts dir
    fn install_system_font(fonts_dir: &Path, as_name: &str) -> bool {
        let candidates = [
            "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
            "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
        ];
        std::fs::create_dir_all(fonts_dir).unwrap();
        candidates
            .iter()
            .any(|p| std::fs::copy(p, fonts_dir.join(as_name)).is_ok())
    }

    #[test]
    fn test_missing_font_fails_without_output() {
        let root = tempfile::tempdir().unwrap();
        let cfg = config_in(root.path());
        let request = JobRequest::from_target(&FontTarget::new("Missing-Regular.ttf", "Missing"));

        let err = process_font(&request, &cfg).unwrap_err();
        assert!(matches!(err, JobError::FontLoad(FontLoadError::NotFound { .. })));
        assert!(!cfg.paths.output_dir.join("Missing").exists());
        assert!(!cfg.paths.output_dir.exists());
    }

    #[test]
    fn test_corrupt_font_fails_without_output() {
        let root = tempfile::tempdir().unwrap();
        let cfg = config_in(root.path());
        std::fs::create_dir_all(&cfg.paths.fonts_dir).unwrap();
        std::fs::write(cfg.paths.fonts_dir.join("Bad.ttf"), b"nope").unwrap();

        let request = JobRequest::from_target(&FontTarget::new("Bad.ttf", "Bad"));
        let err = process_font(&request, &cfg).unwrap_err();
        assert!(matches!(err, JobError::FontLoad(FontLoadError::Parse { .. })));
        assert!(!cfg.paths.output_dir.exists());
    }

    #[test]
    fn test_batch_reports_every_failure() {
        let root = tempfile::tempdir().unwrap();
        let cfg = config_in(root.path());
        let requests: Vec<JobRequest> = ["A", "B", "C"]
            .iter()
            .map(|n| JobRequest::from_target(&FontTarget::new(&format!("{}.ttf", n), n)))
            .collect();

        let summary = run_batch(&requests, &cfg, 2);
        assert_eq!(summary.headline(), "0/3 processed successfully");
        let names: Vec<_> = summary.failed.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert!(summary.failure_lines()[1].starts_with("B (B.ttf): font file"));
    }

    #[test]
    fn test_batch_with_one_missing_font() {
        let root = tempfile::tempdir().unwrap();
        let cfg = config_in(root.path());
        let present = ["One.ttf", "Two.ttf", "Three.ttf"];
        for f in present {
            if !install_system_font(&cfg.paths.fonts_dir, f) {
                eprintln!("no system font found, skipping");
                return;
            }
        }

        let requests = vec![
            JobRequest::from_target(&FontTarget::new("One.ttf", "One")),
            JobRequest::from_target(&FontTarget::new("Gone.ttf", "Gone")),
            JobRequest::from_target(&FontTarget::new("Two.ttf", "Two")),
            JobRequest::from_target(&FontTarget::new("Three.ttf", "Three")),
        ];
        let summary = run_batch(&requests, &cfg, 4);

        assert_eq!(summary.headline(), "3/4 processed successfully");
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].name, "Gone");
        assert!(!cfg.paths.output_dir.join("Gone").exists());

        for name in ["One", "Two", "Three"] {
            let dir = cfg.paths.output_dir.join(name);
            let json = std::fs::read_to_string(dir.join("Atlas.json")).unwrap();
            let d: AtlasDescriptor = serde_json::from_str(&json).unwrap();
            assert_eq!(d.font_name, name);
            assert!(d.language_support.latin);
            assert_eq!(d.characters.len(), d.metadata.total_supported_characters);

            let atlas = image::open(dir.join("Font.png")).unwrap();
            assert_eq!((atlas.width(), atlas.height()), (1120, 2048));
            let banner = image::open(dir.join("Preview.png")).unwrap();
            assert_eq!(banner.height(), 48);
        }
    }

    #[test]
    fn test_colliding_names_are_made_unique() {
        let mut requests: Vec<JobRequest> = [
            "fonts/Inter-Bold.ttf",
            "fonts/Inter-Light.ttf",
            "fonts/JetBrainsMono-Regular.ttf",
            "fonts/otf/Inter-Light.otf",
        ]
        .iter()
        .map(|p| JobRequest::from_path(Path::new(p), None))
        .collect();
        requests.push(JobRequest::from_target(&FontTarget::new("Other.ttf", "inter")));

        make_names_unique(&mut requests);
        let names: Vec<_> = requests.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Inter", "Inter-Light", "JetBrainsMono", "Inter-Light-2", "Other"]
        );
    }

    #[test]
    fn test_colliding_requests_both_write_output() {
        let root = tempfile::tempdir().unwrap();
        let cfg = config_in(root.path());
        if !install_system_font(&cfg.paths.fonts_dir, "Inter-Bold.ttf")
            || !install_system_font(&cfg.paths.fonts_dir, "Inter-Light.ttf")
        {
            eprintln!("no system font found, skipping");
            return;
        }

        let mut requests: Vec<JobRequest> = ["Inter-Bold.ttf", "Inter-Light.ttf"]
            .iter()
            .map(|f| JobRequest::from_path(&cfg.paths.fonts_dir.join(f), None))
            .collect();
        make_names_unique(&mut requests);

        let summary = run_batch(&requests, &cfg, 2);
        assert_eq!(summary.headline(), "2/2 processed successfully");
        for name in ["Inter", "Inter-Light"] {
            let dir = cfg.paths.output_dir.join(name);
            for f in ["Font.png", "Atlas.json", "Preview.png"] {
                assert!(dir.join(f).is_file(), "{}/{} missing", name, f);
            }
        }
        let leftovers: Vec<_> = std::fs::read_dir(&cfg.paths.output_dir)
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().starts_with('.'))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_request_from_path_derives_name() {
        let r = JobRequest::from_path(Path::new("fonts/Inter-Bold.ttf"), None);
        assert_eq!(r.name, "Inter");
        assert_eq!(r.file_label(), "Inter-Bold.ttf");

        let r = JobRequest::from_path(Path::new("fonts/Inter-Bold.ttf"), Some("Heavy"));
        assert_eq!(r.name, "Heavy");
    }
}
