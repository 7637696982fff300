//! Image fingerprints.
//!
//! # Components
//!
//! - **Content hashing**: exact identity over a canonical 64x64 RGB grid,
//!   used as a uniqueness key.
//! - **Perceptual hashing**: coarse 64-bit signature over a canonical 8x8
//!   gray grid, compared by Hamming distance to find near-duplicates.
//!
//! [`fingerprint`] decodes its input once and computes both.

pub mod content;
pub mod perceptual;

pub use content::*;
pub use perceptual::*;

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::error::{ErrorKind, LumenError, Result};
use crate::input::{load, ImageInput};

/// Both fingerprints of one image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprints {
    pub content_hash: ContentFingerprint,
    pub perceptual_hash: PerceptualFingerprint,
}

/// Kind and cause of a failed fingerprint computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&LumenError> for FailureReport {
    fn from(err: &LumenError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Flat, serializable outcome of [`compute_fingerprints`].
///
/// When `ok` is false both hashes are `None`; partial results are never
/// reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintReport {
    pub content_hash: Option<String>,
    pub perceptual_hash: Option<String>,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<FailureReport>,
}

impl FingerprintReport {
    pub fn from_result(result: &Result<Fingerprints>) -> Self {
        match result {
            Ok(fps) => Self {
                content_hash: Some(fps.content_hash.to_string()),
                perceptual_hash: Some(fps.perceptual_hash.to_hex()),
                ok: true,
                error: None,
            },
            Err(err) => Self {
                content_hash: None,
                perceptual_hash: None,
                ok: false,
                error: Some(FailureReport::from(err)),
            },
        }
    }
}

impl From<Result<Fingerprints>> for FingerprintReport {
    fn from(result: Result<Fingerprints>) -> Self {
        Self::from_result(&result)
    }
}

/// Decode once and compute both fingerprints.
#[instrument(level = "debug", skip_all)]
pub fn fingerprint<'a>(input: impl Into<ImageInput<'a>>) -> Result<Fingerprints> {
    let pixels = load(input.into())?;
    let content_hash = ContentHasher::new().hash_pixels(&pixels)?;
    let perceptual_hash = PerceptualHasher::new().hash_pixels(&pixels)?;
    Ok(Fingerprints {
        content_hash,
        perceptual_hash,
    })
}

/// Combined entry point reporting failure through the `ok` flag.
pub fn compute_fingerprints<'a>(input: impl Into<ImageInput<'a>>) -> FingerprintReport {
    let result = fingerprint(input);
    if let Err(err) = &result {
        warn!(error = %err, kind = ?err.kind(), "Fingerprint computation failed");
    }
    FingerprintReport::from(result)
}
