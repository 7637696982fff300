//! Engine configuration
//!
//! Loads grouping parameters from environment variables with defaults.

use serde::{Deserialize, Serialize};

use crate::distance::DistanceMetric;
use crate::group::{ClusterMode, SimilarityOptions, DEFAULT_SIMILARITY_THRESHOLD};

pub const ENV_SIMILARITY_THRESHOLD: &str = "LUMEN_SIMILARITY_THRESHOLD";
pub const ENV_DISTANCE_METRIC: &str = "LUMEN_DISTANCE_METRIC";
pub const ENV_CLUSTER_MODE: &str = "LUMEN_CLUSTER_MODE";

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum distance for two images to count as similar (default: 5)
    pub similarity_threshold: u32,
    /// Distance granularity (default: hex characters)
    pub metric: DistanceMetric,
    /// Grouping strategy (default: overlapping anchor scan)
    pub cluster_mode: ClusterMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            metric: DistanceMetric::default(),
            cluster_mode: ClusterMode::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let similarity_threshold = lookup(ENV_SIMILARITY_THRESHOLD)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.similarity_threshold);

        let metric = lookup(ENV_DISTANCE_METRIC)
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.metric);

        let cluster_mode = lookup(ENV_CLUSTER_MODE)
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.cluster_mode);

        Self {
            similarity_threshold,
            metric,
            cluster_mode,
        }
    }

    pub fn similarity_options(&self) -> SimilarityOptions {
        SimilarityOptions {
            threshold: self.similarity_threshold,
            metric: self.metric,
            mode: self.cluster_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.similarity_threshold, 5);
        assert_eq!(config.metric, DistanceMetric::HexChar);
        assert_eq!(config.cluster_mode, ClusterMode::AnchorScan);
    }

    #[test]
    fn test_empty_lookup_is_default() {
        assert_eq!(EngineConfig::from_lookup(|_| None), EngineConfig::default());
    }

    #[test]
    fn test_lookup_overrides() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            (ENV_SIMILARITY_THRESHOLD, "12"),
            (ENV_DISTANCE_METRIC, "bit"),
            (ENV_CLUSTER_MODE, "partition"),
        ]));
        assert_eq!(config.similarity_threshold, 12);
        assert_eq!(config.metric, DistanceMetric::Bit);
        assert_eq!(config.cluster_mode, ClusterMode::Partition);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            (ENV_SIMILARITY_THRESHOLD, "-3"),
            (ENV_DISTANCE_METRIC, "euclid"),
            (ENV_CLUSTER_MODE, ""),
        ]));
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_similarity_options() {
        let config = EngineConfig {
            similarity_threshold: 9,
            metric: DistanceMetric::Bit,
            cluster_mode: ClusterMode::Partition,
        };
        let options = config.similarity_options();
        assert_eq!(options.threshold, 9);
        assert_eq!(options.metric, DistanceMetric::Bit);
        assert_eq!(options.mode, ClusterMode::Partition);
    }
}
