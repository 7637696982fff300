//! Near-duplicate grouping by perceptual fingerprint.
//!
//! The default [`ClusterMode::AnchorScan`] makes every fingerprinted record
//! an anchor and gathers all *later* records within the threshold. Matched
//! records are not consumed, so one image can appear in several groups.
//! [`ClusterMode::Partition`] merges the same pair relation into connected
//! components instead.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{present, Fingerprinted};
use crate::distance::{hamming_distance_with, DistanceMetric};

/// Threshold used when callers do not pick one.
pub const DEFAULT_SIMILARITY_THRESHOLD: u32 = 5;

/// How pairwise matches become groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterMode {
    /// One group per anchor; groups may overlap.
    #[default]
    AnchorScan,
    /// Transitive closure of matches; groups are disjoint.
    Partition,
}

impl FromStr for ClusterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anchor" | "anchor_scan" => Ok(ClusterMode::AnchorScan),
            "partition" | "strict" => Ok(ClusterMode::Partition),
            other => Err(format!("unknown cluster mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarityOptions {
    pub threshold: u32,
    pub metric: DistanceMetric,
    pub mode: ClusterMode,
}

impl Default for SimilarityOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
            metric: DistanceMetric::default(),
            mode: ClusterMode::default(),
        }
    }
}

impl SimilarityOptions {
    pub fn with_threshold(threshold: u32) -> Self {
        Self {
            threshold,
            ..Default::default()
        }
    }
}

/// Records within `threshold` of an anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarityGroup<Id> {
    pub anchor: Id,
    pub threshold: u32,
    /// Anchor first, then matches in input order.
    pub members: Vec<Id>,
}

impl<Id> SimilarityGroup<Id> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Anchor-scan grouping with the character metric. Groups may overlap.
pub fn group_similar<R: Fingerprinted>(
    records: &[R],
    threshold: u32,
) -> Vec<SimilarityGroup<R::Id>> {
    group_similar_with(records, &SimilarityOptions::with_threshold(threshold))
}

#[instrument(level = "debug", skip_all, fields(
    records = records.len(),
    threshold = options.threshold,
    metric = ?options.metric,
    mode = ?options.mode
))]
pub fn group_similar_with<R: Fingerprinted>(
    records: &[R],
    options: &SimilarityOptions,
) -> Vec<SimilarityGroup<R::Id>> {
    let candidates: Vec<(&R, &str)> = records
        .iter()
        .filter_map(|r| present(r.perceptual_hash()).map(|h| (r, h)))
        .collect();

    let matches =
        |a: &str, b: &str| hamming_distance_with(a, b, options.metric).within(options.threshold);

    let groups = match options.mode {
        ClusterMode::AnchorScan => anchor_scan(&candidates, options.threshold, matches),
        ClusterMode::Partition => partition(&candidates, options.threshold, matches),
    };

    debug!(
        candidates = candidates.len(),
        groups = groups.len(),
        "Grouped similar images"
    );
    groups
}

fn anchor_scan<R, F>(
    candidates: &[(&R, &str)],
    threshold: u32,
    matches: F,
) -> Vec<SimilarityGroup<R::Id>>
where
    R: Fingerprinted,
    F: Fn(&str, &str) -> bool,
{
    let mut groups = Vec::new();
    for (i, &(anchor, anchor_hash)) in candidates.iter().enumerate() {
        let mut members = vec![anchor.id()];
        for &(other, other_hash) in &candidates[i + 1..] {
            if matches(anchor_hash, other_hash) {
                members.push(other.id());
            }
        }
        if members.len() > 1 {
            groups.push(SimilarityGroup {
                anchor: anchor.id(),
                threshold,
                members,
            });
        }
    }
    groups
}

fn partition<R, F>(
    candidates: &[(&R, &str)],
    threshold: u32,
    matches: F,
) -> Vec<SimilarityGroup<R::Id>>
where
    R: Fingerprinted,
    F: Fn(&str, &str) -> bool,
{
    fn find(parent: &mut [usize], mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }

    let n = candidates.len();
    let mut parent: Vec<usize> = (0..n).collect();
    for i in 0..n {
        for j in (i + 1)..n {
            if matches(candidates[i].1, candidates[j].1) {
                let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                if ri != rj {
                    // keep the earliest index as root so it anchors the group
                    let (root, child) = if ri < rj { (ri, rj) } else { (rj, ri) };
                    parent[child] = root;
                }
            }
        }
    }

    let mut slots: HashMap<usize, usize> = HashMap::new();
    let mut components: Vec<Vec<usize>> = Vec::new();
    for i in 0..n {
        let root = find(&mut parent, i);
        let slot = *slots.entry(root).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[slot].push(i);
    }

    components
        .into_iter()
        .filter(|members| members.len() > 1)
        .map(|members| SimilarityGroup {
            anchor: candidates[members[0]].0.id(),
            threshold,
            members: members.iter().map(|&i| candidates[i].0.id()).collect(),
        })
        .collect()
}
