//! Similar command implementation.

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use lumen_core::{group_similar_with, EngineConfig, SimilarityGroup, SimilarityOptions};
use serde::Serialize;
use tracing::info;

use crate::utils::{collect_images, fingerprint_all, print_json, timestamp, Skipped};
use crate::Output;

#[derive(Serialize)]
struct SimilarReport {
    generated_at: String,
    directory: PathBuf,
    options: SimilarityOptions,
    scanned: usize,
    skipped: Vec<Skipped>,
    groups: Vec<SimilarityGroup<PathBuf>>,
}

/// Execute the similar command.
pub fn execute(dir: PathBuf, config: EngineConfig, output: Output) -> Result<()> {
    let options = config.similarity_options();
    let images = collect_images(&dir)?;
    let scanned = images.len();
    let scan = fingerprint_all(images, output);

    let groups = group_similar_with(&scan.records, &options);
    info!(
        scanned,
        threshold = options.threshold,
        groups = groups.len(),
        "Found similar images"
    );

    if output.quiet {
        return Ok(());
    }

    if output.is_json() {
        return print_json(&SimilarReport {
            generated_at: timestamp(),
            directory: dir,
            options,
            scanned,
            skipped: scan.skipped,
            groups,
        });
    }

    if groups.is_empty() {
        println!(
            "{} (threshold {})",
            "No similar images found".green(),
            options.threshold
        );
    } else {
        println!(
            "Found {} similar group(s) among {} image(s) (threshold {}, {:?})",
            groups.len().to_string().bold(),
            scanned,
            options.threshold,
            options.metric
        );
        for group in &groups {
            println!();
            println!("{} {}", "Anchor:".dimmed(), group.anchor.display());
            for member in group.members.iter().skip(1) {
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
