//! Lumen Core - content-addressable image identity and near-duplicate detection
//!
//! This crate turns images into two fingerprints and groups catalogs by them.
//!
//! # Features
//!
//! - Exact content fingerprint: SHA3-256 over a canonical 64x64 RGB grid,
//!   stable across lossless container changes
//! - Perceptual fingerprint: 64-bit average hash over a canonical 8x8 gray grid
//! - Hamming comparison with explicit handling of incomparable fingerprints
//! - Exact duplicate grouping and threshold-based similarity grouping
//! - File inspection (size, MIME type, raw checksum, image properties)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use lumen_core::{fingerprint, group_similar, hamming_distance, FingerprintRecord};
//!
//! # fn example() -> lumen_core::Result<()> {
//! let a = fingerprint(Path::new("a.jpg"))?;
//! let b = fingerprint(Path::new("b.png"))?;
//!
//! let distance = hamming_distance(&a.perceptual_hash.to_hex(), &b.perceptual_hash.to_hex());
//! println!("distance: {}", distance);
//!
//! let records = vec![
//!     FingerprintRecord::from_fingerprints("a.jpg", &a),
//!     FingerprintRecord::from_fingerprints("b.png", &b),
//! ];
//! for group in group_similar(&records, 5) {
//!     println!("{:?}", group.members);
//! }
//! # Ok(())
//! # }
//! ```

pub mod canonical;
pub mod config;
pub mod distance;
pub mod error;
pub mod fingerprint;
pub mod group;
pub mod input;
pub mod inspect;
pub mod pixels;

// Re-export main types for convenience
pub use canonical::{canonicalize, convert_mode, luma, CANONICAL_FILTER};
pub use config::EngineConfig;
pub use distance::{hamming_distance, hamming_distance_with, Distance, DistanceMetric};
pub use error::{ErrorKind, LumenError, Result};
pub use fingerprint::{
    compute_fingerprints, content_hash, fingerprint, perceptual_hash, ContentFingerprint,
    ContentHasher, FailureReport, FingerprintReport, Fingerprints, PerceptualFingerprint,
    PerceptualHasher, CONTENT_GRID_SIZE, PERCEPTUAL_GRID_SIZE,
};
pub use group::{
    group_duplicates, group_similar, group_similar_with, ClusterMode, DuplicateGroup,
    FingerprintRecord, Fingerprinted, SimilarityGroup, SimilarityOptions,
    DEFAULT_SIMILARITY_THRESHOLD,
};
pub use input::{load, ImageInput};
pub use inspect::{
    describe, encode, file_checksum, file_info, mime_from_extension, sniff_mime, FileInfo,
    ImageDescription,
};
pub use pixels::{ColorMode, PixelBuffer};

// Re-exported so callers can name containers for `encode` without a direct dependency.
pub use image::ImageFormat;
