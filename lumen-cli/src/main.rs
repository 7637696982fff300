//! Lumen CLI - image identity and near-duplicate detection tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use lumen_core::{ClusterMode, DistanceMetric, EngineConfig};

mod commands;
mod exit_codes;
mod utils;

use exit_codes::ExitCode;

const EXIT_CODES_HELP: &str = "\
Exit codes:
  0   Success
  1   General error
  65  Data error (undecodable image, incomparable fingerprints)
  66  Input not found
  74  I/O error";

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// When to colorize terminal output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

/// Output settings shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub format: OutputFormat,
    pub quiet: bool,
}

impl Output {
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}

#[derive(Parser)]
#[command(name = "lumen")]
#[command(author, version, about = "Image identity and near-duplicate detection", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    /// Suppress everything except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Colorize output
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute content and perceptual fingerprints
    Hash {
        /// Image files to fingerprint
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },

    /// Show size, MIME type, checksum and image properties of a file
    Info {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Compare two perceptual fingerprints
    Distance {
        #[arg(value_name = "A")]
        a: String,

        #[arg(value_name = "B")]
        b: String,

        /// Count differing bits instead of differing hex characters
        #[arg(long)]
        bits: bool,
    },

    /// Find exact duplicates under a directory
    Duplicates {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Find near-duplicates under a directory
    Similar {
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Maximum distance for two images to count as similar
        #[arg(short, long)]
        threshold: Option<u32>,

        /// Count differing bits instead of differing hex characters
        #[arg(long)]
        bits: bool,

        /// Merge overlapping groups into disjoint ones
        #[arg(long)]
        partition: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => {}
    }
    utils::init_tracing(cli.verbose);

    let output = Output {
        format: cli.format,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Commands::Hash { files } => commands::hash::execute(files, output),
        Commands::Info { file } => commands::info::execute(file, output),
        Commands::Distance { a, b, bits } => {
            let metric = if bits {
                DistanceMetric::Bit
            } else {
                DistanceMetric::HexChar
            };
            commands::distance::execute(a, b, metric, output)
        }
        Commands::Duplicates { dir } => commands::duplicates::execute(dir, output),
        Commands::Similar {
            dir,
            threshold,
            bits,
            partition,
        } => {
            let mut config = EngineConfig::from_env();
            if let Some(threshold) = threshold {
                config.similarity_threshold = threshold;
            }
            if bits {
                config.metric = DistanceMetric::Bit;
            }
            if partition {
                config.cluster_mode = ClusterMode::Partition;
            }
            commands::similar::execute(dir, config, output)
        }
    };

    let exit = match result {
        Ok(()) => ExitCode::success(),
        Err(err) => ExitCode::from_anyhow(&err),
    };
    if let Some(message) = &exit.message {
        eprintln!("{} {}", "Error:".red().bold(), message);
    }
    std::process::exit(exit.code);
}
