//! fontbake - fixed-grid bitmap font atlas generator
//!
//! # Pipeline
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  locate font  →  load (fontdue)          │
//! │                     ↓                    │
//! │  probe + pack 256 slots (16x16 grid)     │
//! │                     ↓                    │
//! │  script detection  →  Atlas.json         │
//! │                     ↓                    │
//! │  Font.png + Atlas.json + Preview.png     │
//! └──────────────────────────────────────────┘
//! ```

mod atlas;
mod config;
mod constants;
mod font;
mod job;
mod output;

use anyhow::{anyhow, bail, Context, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};

use config::{Config, Overrides};
use job::JobRequest;

/// Print help message
fn print_help() {
    println!(
        r#"fontbake {} - bitmap font atlas generator

USAGE:
    fontbake [OPTIONS]

OPTIONS:
    -h, --help              Print this help message
    -V, --version           Print version information
    --config <PATH>         Use this config file
    --fonts-dir <DIR>       Directory containing font files
    --output <DIR>          Output root (one directory per font)
    --font <PATH>           Process a specific font file
    --font-name <NAME>      Override the output name for --font
    --font-size <PX>        Font size for texture generation
    --workers <N>           Fonts processed in parallel (0 = per CPU)
    --all                   Process every font in --fonts-dir instead of the target list

OUTPUT (per font):
    <output>/<name>/Font.png      16x16 glyph grid
    <output>/<name>/Atlas.json    UV coordinates and script support
    <output>/<name>/Preview.png   Font name banner

CONFIG FILE:
    ~/.config/fontbake/config.toml (or FONTBAKE_CONFIG)
"#,
        env!("CARGO_PKG_VERSION")
    );
}

/// Value of `--flag VALUE` or `--flag=VALUE`
fn arg_value<'a>(args: &'a [String], flag: &str) -> Result<Option<&'a str>> {
    for (i, a) in args.iter().enumerate() {
        if a == flag {
            return args
                .get(i + 1)
                .map(|v| Some(v.as_str()))
                .ok_or_else(|| anyhow!("{} requires a value", flag));
        }
        if let Some(v) = a.strip_prefix(flag).and_then(|rest| rest.strip_prefix('=')) {
            return Ok(Some(v));
        }
    }
    Ok(None)
}

fn parse_overrides(args: &[String]) -> Result<Overrides> {
    let font_size = arg_value(args, "--font-size")?
        .map(|v| v.parse::<f32>().with_context(|| format!("Invalid --font-size: {}", v)))
        .transpose()?;
    let workers = arg_value(args, "--workers")?
        .map(|v| v.parse::<usize>().with_context(|| format!("Invalid --workers: {}", v)))
        .transpose()?;

    Ok(Overrides {
        font_size,
        fonts_dir: arg_value(args, "--fonts-dir")?.map(PathBuf::from),
        output_dir: arg_value(args, "--output")?.map(PathBuf::from),
        workers,
    })
}

fn load_config(args: &[String]) -> Result<Config> {
    match arg_value(args, "--config")? {
        Some(path) => Config::load_from_file(Path::new(path)),
        None => Ok(Config::load()),
    }
}

/// Requests for this run: one explicit font, a directory scan, or the target list
fn build_requests(args: &[String], cfg: &Config) -> Result<Vec<JobRequest>> {
    if let Some(font) = arg_value(args, "--font")? {
        let name = arg_value(args, "--font-name")?;
        return Ok(vec![JobRequest::from_path(Path::new(font), name)]);
    }

    if args.iter().any(|a| a == "--all") {
        let files = font::locate::discover(&cfg.paths.fonts_dir);
        if files.is_empty() {
            bail!("No font files found in {}", cfg.paths.fonts_dir.display());
        }
        info!("Found {} font files to process", files.len());
        let mut requests: Vec<JobRequest> =
            files.iter().map(|p| JobRequest::from_path(p, None)).collect();
        job::make_names_unique(&mut requests);
        return Ok(requests);
    }

    let mut requests: Vec<JobRequest> =
        cfg.batch.targets.iter().map(JobRequest::from_target).collect();
    job::make_names_unique(&mut requests);
    Ok(requests)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Check command line arguments
    let args: Vec<String> = std::env::args().skip(1).collect();

    // --help
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    // --version
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("fontbake {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let overrides = parse_overrides(&args)?;
    let cfg = load_config(&args)?.with_overrides(&overrides);
    cfg.validate().context("Invalid configuration")?;

    let requests = build_requests(&args, &cfg)?;
    if requests.is_empty() {
        warn!("Nothing to process");
        return Ok(());
    }

    let summary = job::run_batch(&requests, &cfg, cfg.batch.worker_count());

    for report in &summary.succeeded {
        info!(
            "{}: {} supported characters, {} entries ({} -> {})",
            report.name,
            report.supported_characters,
            report.character_entries,
            report.source_path.display(),
            report.output_dir.display()
        );
    }

    println!("\nProcessed {}", summary.headline());
    if !summary.is_success() {
        println!("Failed to process:");
        for line in summary.failure_lines() {
            println!("  - {}", line);
        }
        bail!("{} font(s) failed", summary.failed.len());
    }

    println!("Output directory: {}", cfg.paths.output_dir.display());
    Ok(())
}
