//! Distance command implementation.

use anyhow::Result;
use colored::Colorize;
use lumen_core::{hamming_distance_with, Distance, DistanceMetric};
use serde::Serialize;
use tracing::debug;

use crate::exit_codes::IncomparableFingerprints;
use crate::utils::print_json;
use crate::Output;

#[derive(Serialize)]
struct DistanceReport<'a> {
    a: &'a str,
    b: &'a str,
    metric: DistanceMetric,
    distance: Option<u32>,
    comparable: bool,
}

/// Execute the distance command.
pub fn execute(a: String, b: String, metric: DistanceMetric, output: Output) -> Result<()> {
    let distance = hamming_distance_with(a.trim(), b.trim(), metric);
    debug!(metric = ?metric, distance = %distance, "Compared fingerprints");

    if !output.quiet {
        if output.is_json() {
            print_json(&DistanceReport {
                a: a.trim(),
                b: b.trim(),
                metric,
                distance: distance.value(),
                comparable: distance.is_comparable(),
            })?;
        } else {
            match distance {
                Distance::Finite(d) => println!("{}", d),
                Distance::Incomparable => println!("{}", "incomparable".yellow()),
            }
        }
    }

    if distance.is_comparable() {
        Ok(())
    } else {
        Err(IncomparableFingerprints {
            a_len: a.trim().chars().count(),
            b_len: b.trim().chars().count(),
        }
        .into())
    }
}
