//! Duplicates command implementation.

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use lumen_core::{group_duplicates, DuplicateGroup};
use serde::Serialize;
use tracing::info;

use crate::utils::{collect_images, fingerprint_all, print_json, short_hash, timestamp, Skipped};
use crate::Output;

#[derive(Serialize)]
struct DuplicatesReport {
    generated_at: String,
    directory: PathBuf,
    scanned: usize,
    skipped: Vec<Skipped>,
    groups: Vec<DuplicateGroup<PathBuf>>,
}

/// Execute the duplicates command.
pub fn execute(dir: PathBuf, output: Output) -> Result<()> {
    let images = collect_images(&dir)?;
    let scanned = images.len();
    let scan = fingerprint_all(images, output);

    let groups = group_duplicates(&scan.records);
    info!(scanned, groups = groups.len(), "Found exact duplicates");

    if output.quiet {
        return Ok(());
    }

    if output.is_json() {
        return print_json(&DuplicatesReport {
            generated_at: timestamp(),
            directory: dir,
            scanned,
            skipped: scan.skipped,
            groups,
        });
    }

    if groups.is_empty() {
        println!("{}", "No exact duplicates found".green());
    } else {
        println!(
            "Found {} duplicate group(s) among {} image(s)",
            groups.len().to_string().bold(),
            scanned
        );
        for group in &groups {
            println!();
            println!(
                "{} {} ({} files)",
                "Content:".dimmed(),
                short_hash(&group.fingerprint),
                group.len()
            );
            for member in &group.members {
                println!("   {}", member.display());
            }
        }
    }
    if !scan.skipped.is_empty() {
        println!();
        println!("{} {} file(s)", "Skipped".yellow(), scan.skipped.len());
    }
    Ok(())
}
