//! Common utility functions shared across CLI commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use lumen_core::{fingerprint, FingerprintRecord, LumenError};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use crate::Output;

/// Extensions picked up by directory scans.
pub const SCAN_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "jpe", "png", "gif", "webp", "bmp", "ico", "tif", "tiff",
];

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
pub fn init_tracing(verbose: bool) {
    let default = if verbose {
        "lumen_core=debug,lumen_cli=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(colored::control::SHOULD_COLORIZE.should_colorize())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Pretty-print a value as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// First 16 characters of a fingerprint, for compact text output.
pub fn short_hash(hash: &str) -> &str {
    hash.get(..16).unwrap_or(hash)
}

/// Current time for report headers.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339()
}

/// A file that was skipped during a batch.
#[derive(Debug, Serialize)]
pub struct Skipped {
    pub path: PathBuf,
    pub error: String,
}

/// Fingerprinted files of a scan, in path order, plus the files that failed.
pub struct ScanResult {
    pub records: Vec<FingerprintRecord<PathBuf>>,
    pub skipped: Vec<Skipped>,
}

/// Recursively collect image files under `dir`, sorted by path.
pub fn collect_images(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(LumenError::NotFound(dir.to_path_buf()))
            .with_context(|| format!("Failed to scan directory: {}", dir.display()));
    }

    let mut images = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to scan directory: {}", dir.display()))?;
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
            if SCAN_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
                images.push(path.to_path_buf());
            }
        }
    }

    debug!(dir = %dir.display(), images = images.len(), "Scanned directory");
    Ok(images)
}

/// Fingerprint every path in parallel.
///
/// Failures are logged, reported on stderr in text mode and left out of the
/// records.
pub fn fingerprint_all(paths: Vec<PathBuf>, output: Output) -> ScanResult {
    let results: Vec<_> = paths
        .into_par_iter()
        .map(|path| {
            let result = fingerprint(&path);
            (path, result)
        })
        .collect();

    let mut records = Vec::with_capacity(results.len());
    let mut skipped = Vec::new();
    for (path, result) in results {
        match result {
            Ok(fingerprints) => {
                records.push(FingerprintRecord::from_fingerprints(path, &fingerprints))
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Skipping file");
                if !output.quiet && !output.is_json() {
                    eprintln!("{} {}: {}", "Skipped".yellow(), path.display(), err);
                }
                skipped.push(Skipped {
                    error: err.to_string(),
                    path,
                });
            }
        }
    }

    info!(
        fingerprinted = records.len(),
        skipped = skipped.len(),
        "Fingerprinted scan"
    );
    ScanResult {
        records,
        skipped,
    }
}
