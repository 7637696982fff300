//! Hash command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use lumen_core::{fingerprint, FingerprintReport};
use serde::Serialize;
use tracing::info;

use crate::exit_codes::PartialFailure;
use crate::utils::print_json;
use crate::Output;

#[derive(Serialize)]
struct HashEntry {
    path: PathBuf,
    #[serde(flatten)]
    report: FingerprintReport,
}

/// Execute the hash command.
pub fn execute(files: Vec<PathBuf>, output: Output) -> Result<()> {
    let total = files.len();
    let mut entries = Vec::with_capacity(total);
    let mut first_error = None;

    for path in files {
        let result = fingerprint(&path);
        match &result {
            Ok(fps) => info!(
                path = %path.display(),
                content_hash = %fps.content_hash,
                perceptual_hash = %fps.perceptual_hash,
                "Fingerprinted file"
            ),
            Err(err) => {
                if !output.quiet && !output.is_json() {
                    eprintln!("{} {}: {}", "Failed".red(), path.display(), err);
                }
            }
        }
        let report = FingerprintReport::from_result(&result);
        if let Err(err) = result {
            first_error.get_or_insert((path.clone(), err));
        }
        entries.push(HashEntry { path, report });
    }

    if output.is_json() {
        if !output.quiet {
            print_json(&entries)?;
        }
    } else if !output.quiet {
        for entry in entries.iter().filter(|e| e.report.ok) {
            println!("{}", entry.path.display().to_string().bold());
            println!(
                "   {} {}",
                "Content:".dimmed(),
                entry.report.content_hash.as_deref().unwrap_or_default()
            );
            println!(
                "   {} {}",
                "Perceptual:".dimmed(),
                entry.report.perceptual_hash.as_deref().unwrap_or_default()
            );
        }
    }

    let failed = entries.iter().filter(|e| !e.report.ok).count();
    match first_error {
        None => Ok(()),
        Some((path, err)) if total == 1 => {
            Err(err).with_context(|| format!("Failed to fingerprint {}", path.display()))
        }
        Some((_, err)) => Err(PartialFailure {
            failed,
            total,
            kind: err.kind(),
        }
        .into()),
    }
}
