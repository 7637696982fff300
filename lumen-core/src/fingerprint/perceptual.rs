//! Perceptual fingerprints for near-duplicate detection.
//!
//! # Algorithm
//!
//! Mean-threshold hashing over an 8x8 grayscale canonical grid:
//!
//! 1. Convert to gray (ITU-R 601-2 luma) and resample to 8x8
//! 2. Take the arithmetic mean of the 64 intensities
//! 3. Scan left-to-right, top-to-bottom; emit `1` when a pixel is above the mean
//! 4. Pack the 64 bits most-significant first into a `u64`
//!
//! Visually similar images tend to differ in few positions. Unrelated images
//! can collide.
//!
//! # Usage
//!
//! ```no_run
//! use lumen_core::{hamming_distance, PerceptualHasher};
//!
//! let a = std::fs::read("image.jpg").unwrap();
//! let b = std::fs::read("image2.jpg").unwrap();
//! let hasher = PerceptualHasher::new();
//! let hash1 = hasher.hash_bytes(&a).unwrap();
//! let hash2 = hasher.hash_bytes(&b).unwrap();
//!
//! let similar = hamming_distance(&hash1.to_hex(), &hash2.to_hex()).within(5);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::canonical::canonicalize;
use crate::error::{LumenError, Result};
use crate::input::{load, ImageInput};
use crate::pixels::{ColorMode, PixelBuffer};

/// Side length of the canonical perceptual grid.
pub const PERCEPTUAL_GRID_SIZE: u32 = 8;

/// Length of a perceptual fingerprint in hex characters.
pub const PERCEPTUAL_HASH_HEX_LEN: usize = 16;

/// 64-bit mean-threshold fingerprint; serialized as 16 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PerceptualFingerprint(u64);

impl PerceptualFingerprint {
    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u64 {
        self.0
    }

    /// Zero-padded lowercase hex, always 16 characters.
    pub fn to_hex(self) -> String {
        format!("{:016x}", self.0)
    }

    /// Parse a 16-character hex fingerprint.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        if hex_str.len() != PERCEPTUAL_HASH_HEX_LEN || !hex_str.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(LumenError::Decode(format!(
                "perceptual fingerprint must be {} hex characters, got {:?}",
                PERCEPTUAL_HASH_HEX_LEN, hex_str
            )));
        }
        u64::from_str_radix(hex_str, 16)
            .map(Self)
            .map_err(|e| LumenError::Decode(format!("Invalid hex string: {}", e)))
    }

    /// True bit-level distance to another fingerprint, in `[0, 64]`.
    pub fn bit_distance(self, other: Self) -> u32 {
        (self.0 ^ other.0).count_ones()
    }
}

impl fmt::Display for PerceptualFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for PerceptualFingerprint {
    type Err = LumenError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl From<PerceptualFingerprint> for String {
    fn from(fp: PerceptualFingerprint) -> Self {
        fp.to_hex()
    }
}

impl TryFrom<String> for PerceptualFingerprint {
    type Error = LumenError;

    fn try_from(value: String) -> Result<Self> {
        Self::from_hex(&value)
    }
}

/// Computes [`PerceptualFingerprint`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerceptualHasher;

impl PerceptualHasher {
    pub fn new() -> Self {
        Self
    }

    /// Compute a fingerprint from raw encoded image bytes.
    pub fn hash_bytes(&self, image_data: &[u8]) -> Result<PerceptualFingerprint> {
        self.hash_input(ImageInput::Bytes(image_data))
    }

    pub fn hash_input(&self, input: ImageInput<'_>) -> Result<PerceptualFingerprint> {
        let pixels = load(input)?;
        self.hash_pixels(&pixels)
    }

    #[instrument(level = "debug", skip_all, fields(width = pixels.width(), height = pixels.height()))]
    pub fn hash_pixels(&self, pixels: &PixelBuffer) -> Result<PerceptualFingerprint> {
        let grid = canonicalize(
            pixels,
            PERCEPTUAL_GRID_SIZE,
            PERCEPTUAL_GRID_SIZE,
            ColorMode::Gray,
        )?;
        let fingerprint = mean_threshold_bits(grid.as_bytes());
        debug!(fingerprint = %fingerprint, "Computed perceptual hash");
        Ok(fingerprint)
    }
}

/// Threshold intensities against their mean and pack MSB-first.
fn mean_threshold_bits(intensities: &[u8]) -> PerceptualFingerprint {
    let total: u64 = intensities.iter().map(|&v| v as u64).sum();
    let mean = total as f64 / intensities.len() as f64;

    let bits = intensities
        .iter()
        .fold(0u64, |acc, &v| (acc << 1) | u64::from(v as f64 > mean));
    PerceptualFingerprint(bits)
}

/// Compute the perceptual fingerprint of an image with default settings.
pub fn perceptual_hash<'a>(input: impl Into<ImageInput<'a>>) -> Result<PerceptualFingerprint> {
    PerceptualHasher::new().hash_input(input.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_grid(values: impl Fn(u32, u32) -> u8) -> PixelBuffer {
        let mut data = Vec::with_capacity(64);
        for y in 0..8 {
            for x in 0..8 {
                data.push(values(x, y));
            }
        }
        PixelBuffer::new(8, 8, ColorMode::Gray, data).unwrap()
    }

    #[test]
    fn test_uniform_image_hashes_to_zero() {
        let hash = PerceptualHasher::new()
            .hash_pixels(&gray_grid(|_, _| 128))
            .unwrap();
        assert_eq!(hash.to_hex(), "0000000000000000");
    }

    #[test]
    fn test_top_half_bright() {
        let hash = PerceptualHasher::new()
            .hash_pixels(&gray_grid(|_, y| if y < 4 { 200 } else { 10 }))
            .unwrap();
        assert_eq!(hash.to_hex(), "ffffffff00000000");
    }

    #[test]
    fn test_scan_order_is_msb_first() {
        let first = gray_grid(|x, y| if (x, y) == (0, 0) { 255 } else { 0 });
        let last = gray_grid(|x, y| if (x, y) == (7, 7) { 255 } else { 0 });
        let second_row = gray_grid(|x, y| if (x, y) == (0, 1) { 255 } else { 0 });

        let hasher = PerceptualHasher::new();
        assert_eq!(hasher.hash_pixels(&first).unwrap().to_hex(), "8000000000000000");
        assert_eq!(hasher.hash_pixels(&last).unwrap().to_hex(), "0000000000000001");
        assert_eq!(
            hasher.hash_pixels(&second_row).unwrap().to_hex(),
            "0080000000000000"
        );
    }

    #[test]
    fn test_pixel_equal_to_mean_is_zero_bit() {
        // two pixels at 20, two at 0, the rest at 10: the mean is exactly 10
        let grid = gray_grid(|x, y| match (x, y) {
            (0, 0) | (1, 0) => 20,
            (2, 0) | (3, 0) => 0,
            _ => 10,
        });
        let hash = PerceptualHasher::new().hash_pixels(&grid).unwrap();
        assert_eq!(hash.to_hex(), "c000000000000000");
    }

    #[test]
    fn test_color_input_is_converted_to_luma() {
        let mut data = Vec::new();
        for y in 0..8 {
            for _ in 0..8 {
                data.extend_from_slice(if y == 0 { &[0u8, 255, 0] } else { &[255u8, 0, 0] });
            }
        }
        let rgb = PixelBuffer::new(8, 8, ColorMode::Rgb, data).unwrap();
        let hash = PerceptualHasher::new().hash_pixels(&rgb).unwrap();
        // green lumas brighter than red, so only the first row is set
        assert_eq!(hash.to_hex(), "ff00000000000000");
    }

    #[test]
    fn test_hex_roundtrip() {
        let original = PerceptualFingerprint::from_bits(0xdead_beef_cafe_babe);
        assert_eq!(original.to_hex(), "deadbeefcafebabe");
        let restored = PerceptualFingerprint::from_hex("deadbeefcafebabe").unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_hex_is_zero_padded() {
        assert_eq!(PerceptualFingerprint::from_bits(1).to_hex(), "0000000000000001");
    }

    #[test]
    fn test_from_hex_rejects_wrong_length() {
        assert!(PerceptualFingerprint::from_hex("0000").is_err());
        assert!(PerceptualFingerprint::from_hex("zzzzzzzzzzzzzzzz").is_err());
    }

    #[test]
    fn test_bit_distance() {
        let a = PerceptualFingerprint::from_bits(0);
        let b = PerceptualFingerprint::from_bits(0b11);
        assert_eq!(a.bit_distance(b), 2);
        assert_eq!(a.bit_distance(PerceptualFingerprint::from_bits(u64::MAX)), 64);
    }
}
