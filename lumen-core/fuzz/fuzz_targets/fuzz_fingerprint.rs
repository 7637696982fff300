#![no_main]

//! Fuzz target for the decode and fingerprint path
//!
//! Arbitrary bytes must either fingerprint or fail with an error, never panic.
//!
//! Run with: cargo +nightly fuzz run fuzz_fingerprint

use libfuzzer_sys::fuzz_target;
use lumen_core::{compute_fingerprints, describe, sniff_mime};

fuzz_target!(|data: &[u8]| {
    let _ = sniff_mime(data);
    let _ = describe(data);

    let report = compute_fingerprints(data);
    if report.ok {
        assert_eq!(report.content_hash.map(|h| h.len()), Some(64));
        assert_eq!(report.perceptual_hash.map(|h| h.len()), Some(16));
    } else {
        assert!(report.content_hash.is_none() && report.perceptual_hash.is_none());
    }
});
