//! Info command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use lumen_core::{describe, file_checksum, file_info, FileInfo, ImageDescription};
use serde::Serialize;
use tracing::{info, warn};

use crate::utils::print_json;
use crate::Output;

#[derive(Serialize)]
struct InfoReport {
    path: PathBuf,
    #[serde(flatten)]
    file: FileInfo,
    checksum: String,
    /// Absent when the file is not a decodable image.
    image: Option<ImageDescription>,
}

/// Execute the info command.
pub fn execute(file: PathBuf, output: Output) -> Result<()> {
    let checksum = file_checksum(&file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;
    let file_meta = file_info(&file);

    let image = match describe(&file) {
        Ok(description) => Some(description),
        Err(err) => {
            warn!(path = %file.display(), error = %err, "Not a decodable image");
            None
        }
    };
    info!(path = %file.display(), size = ?file_meta.size, "Inspected file");

    if output.quiet {
        return Ok(());
    }

    let report = InfoReport {
        path: file,
        file: file_meta,
        checksum,
        image,
    };

    if output.is_json() {
        return print_json(&report);
    }

    println!("{}", report.path.display().to_string().bold());
    println!(
        "   {} {}",
        "Size:".dimmed(),
        report
            .file
            .size
            .map(|s| format!("{} bytes", s))
            .unwrap_or_else(|| "unknown".into())
    );
    println!(
        "   {} {}",
        "MIME type:".dimmed(),
        report.file.mime_type.as_deref().unwrap_or("unknown")
    );
    println!("   {} {}", "Checksum:".dimmed(), report.checksum);
    match &report.image {
        Some(img) => {
            println!("   {} {}x{}", "Dimensions:".dimmed(), img.width, img.height);
            println!(
                "   {} {:?}, {}-bit{}",
                "Color:".dimmed(),
                img.mode,
                img.bit_depth,
                if img.has_alpha { ", alpha" } else { "" }
            );
            if let Some(format) = &img.format {
                println!("   {} {}", "Format:".dimmed(), format);
            }
        }
        None => println!("   {} {}", "Image:".dimmed(), "not decodable".yellow()),
    }
    Ok(())
}
