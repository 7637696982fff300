#![no_main]

//! Fuzz target for Hamming comparison of arbitrary strings
//!
//! Run with: cargo +nightly fuzz run fuzz_distance

use libfuzzer_sys::fuzz_target;
use lumen_core::{hamming_distance, hamming_distance_with, DistanceMetric};

fuzz_target!(|input: (&str, &str)| {
    let (a, b) = input;
    for metric in [DistanceMetric::HexChar, DistanceMetric::Bit] {
        let forward = hamming_distance_with(a, b, metric);
        assert_eq!(forward, hamming_distance_with(b, a, metric));
        if let Some(d) = forward.value() {
            assert!(d <= metric.max_distance(a.chars().count()));
        }
    }
    assert!(hamming_distance(a, a).within(0));
});
