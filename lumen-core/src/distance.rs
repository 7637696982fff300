//! Hamming comparison of hex fingerprints.
//!
//! The default metric compares hex *characters* position by position, so
//! two fingerprints can differ by at most 16 even though they carry 64 bits.
//! Similarity thresholds are expressed in that unit unless
//! [`DistanceMetric::Bit`] is selected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Granularity of a Hamming comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Count differing characters. Range `[0, 16]` for perceptual fingerprints.
    #[default]
    HexChar,
    /// Count differing bits of the decoded nibbles. Range `[0, 64]`.
    Bit,
}

impl DistanceMetric {
    /// Largest possible distance between two fingerprints of `hex_len` characters.
    pub fn max_distance(self, hex_len: usize) -> u32 {
        match self {
            DistanceMetric::HexChar => hex_len as u32,
            DistanceMetric::Bit => hex_len as u32 * 4,
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hex" | "char" | "hex_char" => Ok(DistanceMetric::HexChar),
            "bit" | "bits" => Ok(DistanceMetric::Bit),
            other => Err(format!("unknown distance metric: {}", other)),
        }
    }
}

/// Outcome of comparing two fingerprints.
///
/// `Finite` orders before `Incomparable`, so incomparable pairs sort last and
/// never fall within a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distance {
    Finite(u32),
    /// Lengths differ, or the bit metric met a non-hex character.
    Incomparable,
}

impl Distance {
    pub fn value(self) -> Option<u32> {
        match self {
            Distance::Finite(d) => Some(d),
            Distance::Incomparable => None,
        }
    }

    pub fn is_comparable(self) -> bool {
        matches!(self, Distance::Finite(_))
    }

    /// True when comparable and at most `threshold`.
    pub fn within(self, threshold: u32) -> bool {
        matches!(self, Distance::Finite(d) if d <= threshold)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Finite(d) => write!(f, "{}", d),
            Distance::Incomparable => f.write_str("incomparable"),
        }
    }
}

/// Character-level Hamming distance between two fingerprints.
pub fn hamming_distance(a: &str, b: &str) -> Distance {
    hamming_distance_with(a, b, DistanceMetric::HexChar)
}

/// Hamming distance under an explicit metric.
pub fn hamming_distance_with(a: &str, b: &str, metric: DistanceMetric) -> Distance {
    if a.chars().count() != b.chars().count() {
        return Distance::Incomparable;
    }

    match metric {
        DistanceMetric::HexChar => {
            Distance::Finite(a.chars().zip(b.chars()).filter(|(x, y)| x != y).count() as u32)
        }
        DistanceMetric::Bit => {
            let mut total = 0;
            for (x, y) in a.chars().zip(b.chars()) {
                match (x.to_digit(16), y.to_digit(16)) {
                    (Some(x), Some(y)) => total += (x ^ y).count_ones(),
                    _ => return Distance::Incomparable,
                }
            }
            Distance::Finite(total)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_is_zero() {
        assert_eq!(
            hamming_distance("deadbeefcafebabe", "deadbeefcafebabe"),
            Distance::Finite(0)
        );
    }

    #[test]
    fn test_length_mismatch_is_incomparable() {
        assert_eq!(hamming_distance("0000", "00000"), Distance::Incomparable);
        assert_eq!(
            hamming_distance_with("0000", "00000", DistanceMetric::Bit),
            Distance::Incomparable
        );
    }

    #[test]
    fn test_char_metric_undercounts_bits() {
        let h0 = "0000000000000000";
        let h2 = "0000000000000003";
        assert_eq!(hamming_distance(h0, h2), Distance::Finite(1));
        assert_eq!(
            hamming_distance_with(h0, h2, DistanceMetric::Bit),
            Distance::Finite(2)
        );
    }

    #[test]
    fn test_maximum_distances() {
        let zeros = "0000000000000000";
        let ones = "ffffffffffffffff";
        assert_eq!(hamming_distance(zeros, ones), Distance::Finite(16));
        assert_eq!(
            hamming_distance_with(zeros, ones, DistanceMetric::Bit),
            Distance::Finite(64)
        );
    }

    #[test]
    fn test_char_metric_is_case_sensitive() {
        assert_eq!(hamming_distance("ab", "AB"), Distance::Finite(2));
        assert_eq!(
            hamming_distance_with("ab", "AB", DistanceMetric::Bit),
            Distance::Finite(0)
        );
    }

    #[test]
    fn test_bit_metric_rejects_non_hex() {
        assert_eq!(
            hamming_distance_with("0g", "00", DistanceMetric::Bit),
            Distance::Incomparable
        );
        assert_eq!(hamming_distance("0g", "00"), Distance::Finite(1));
    }

    #[test]
    fn test_incomparable_orders_last_and_never_within() {
        assert!(Distance::Finite(u32::MAX) < Distance::Incomparable);
        assert!(!Distance::Incomparable.within(u32::MAX));
        assert!(Distance::Finite(5).within(5));
        assert!(!Distance::Finite(6).within(5));
    }

    #[test]
    fn test_metric_from_str() {
        assert_eq!("bit".parse::<DistanceMetric>(), Ok(DistanceMetric::Bit));
        assert_eq!("HEX".parse::<DistanceMetric>(), Ok(DistanceMetric::HexChar));
        assert!("nibble".parse::<DistanceMetric>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Distance::Finite(3).to_string(), "3");
        assert_eq!(Distance::Incomparable.to_string(), "incomparable");
    }
}
