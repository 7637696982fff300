//! Exact-content fingerprints.
//!
//! # Algorithm
//!
//! 1. Convert to RGB and resample to 64x64 (see [`crate::canonical`])
//! 2. Encode as PNG with fixed compression and filter settings
//! 3. SHA3-256 of the encoded bytes, as 64 lowercase hex characters
//!
//! Two inputs whose canonical grids are pixel-identical always agree, no
//! matter which container, metadata or compression they arrived in.

use std::fmt;
use std::str::FromStr;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::ImageEncoder;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use tracing::{debug, instrument};

use crate::canonical::canonicalize;
use crate::error::{LumenError, Result};
use crate::input::{load, ImageInput};
use crate::pixels::{ColorMode, PixelBuffer};

/// Side length of the canonical content grid.
pub const CONTENT_GRID_SIZE: u32 = 64;

/// Length of a content fingerprint in hex characters.
pub const CONTENT_HASH_HEX_LEN: usize = 64;

/// 256-bit exact-content identity, stored as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ContentFingerprint(String);

impl ContentFingerprint {
    /// Parse a stored fingerprint, normalizing to lowercase.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        if hex_str.len() != CONTENT_HASH_HEX_LEN || !hex_str.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(LumenError::Decode(format!(
                "content fingerprint must be {} hex characters, got {:?}",
                CONTENT_HASH_HEX_LEN, hex_str
            )));
        }
        Ok(Self(hex_str.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_digest(digest: &[u8]) -> Self {
        Self(hex::encode(digest))
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContentFingerprint {
    type Err = LumenError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl From<ContentFingerprint> for String {
    fn from(fp: ContentFingerprint) -> Self {
        fp.0
    }
}

impl TryFrom<String> for ContentFingerprint {
    type Error = LumenError;

    fn try_from(value: String) -> Result<Self> {
        Self::from_hex(&value)
    }
}

/// Computes [`ContentFingerprint`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHasher;

impl ContentHasher {
    pub fn new() -> Self {
        Self
    }

    /// Fingerprint any accepted input.
    pub fn hash_input(&self, input: ImageInput<'_>) -> Result<ContentFingerprint> {
        let pixels = load(input)?;
        self.hash_pixels(&pixels)
    }

    /// Fingerprint already-decoded pixels.
    #[instrument(level = "debug", skip_all, fields(width = pixels.width(), height = pixels.height()))]
    pub fn hash_pixels(&self, pixels: &PixelBuffer) -> Result<ContentFingerprint> {
        let canonical = canonicalize(pixels, CONTENT_GRID_SIZE, CONTENT_GRID_SIZE, ColorMode::Rgb)?;
        let encoded = encode_canonical_png(&canonical)?;
        let digest = Sha3_256::digest(&encoded);
        let fingerprint = ContentFingerprint::from_digest(&digest);
        debug!(png_bytes = encoded.len(), fingerprint = %fingerprint, "Computed content hash");
        Ok(fingerprint)
    }
}

/// Serialize a canonical grid to PNG with fixed, reproducible settings.
pub(crate) fn encode_canonical_png(pixels: &PixelBuffer) -> Result<Vec<u8>> {
    let mut encoded = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut encoded, CompressionType::Default, FilterType::Adaptive);
    encoder
        .write_image(
            pixels.as_bytes(),
            pixels.width(),
            pixels.height(),
            pixels.mode().extended_color_type(),
        )
        .map_err(|e| LumenError::Encode(e.to_string()))?;
    Ok(encoded)
}

/// Compute the content fingerprint of an image with default settings.
pub fn content_hash<'a>(input: impl Into<ImageInput<'a>>) -> Result<ContentFingerprint> {
    ContentHasher::new().hash_input(input.into())
}
