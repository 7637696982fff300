//! WebAssembly bindings for Lumen image fingerprinting.
//!
//! Fingerprints are computed client-side, directly in the browser, without
//! sending images to a server. Structured results are returned as JSON strings.

use lumen_core::{
    compute_fingerprints, describe, hamming_distance_with, sniff_mime, Distance, DistanceMetric,
    ImageDescription,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Compute content and perceptual fingerprints of an encoded image.
///
/// # Arguments
/// * `image_bytes` - Encoded image (PNG, JPEG, GIF, WebP, BMP, ICO or TIFF)
///
/// # Returns
/// A JSON string `{content_hash, perceptual_hash, ok, error?}`
#[wasm_bindgen]
pub fn compute_fingerprints_wasm(image_bytes: &[u8]) -> String {
    let report = compute_fingerprints(image_bytes);
    serde_json::to_string(&report).unwrap_or_else(|e| {
        format!(
            r#"{{"content_hash":null,"perceptual_hash":null,"ok":false,"error":{{"kind":"encode","message":"Serialization error: {}"}}}}"#,
            e
        )
    })
}

/// Hamming distance between two fingerprints.
///
/// Counts differing hex characters, or differing bits when `bits` is true.
/// Returns `-1` when the fingerprints cannot be compared.
#[wasm_bindgen]
pub fn hamming_distance_wasm(a: &str, b: &str, bits: bool) -> i32 {
    let metric = if bits {
        DistanceMetric::Bit
    } else {
        DistanceMetric::HexChar
    };
    match hamming_distance_with(a, b, metric) {
        Distance::Finite(d) => i32::try_from(d).unwrap_or(i32::MAX),
        Distance::Incomparable => -1,
    }
}

/// MIME type sniffed from leading magic bytes.
#[wasm_bindgen]
pub fn sniff_mime_wasm(bytes: &[u8]) -> String {
    sniff_mime(bytes).to_string()
}

#[derive(Serialize)]
struct DescriptionResult {
    ok: bool,
    image: Option<ImageDescription>,
    error: Option<String>,
}

/// Dimensions and color properties of an encoded image, as JSON.
#[wasm_bindgen]
pub fn describe_image_wasm(image_bytes: &[u8]) -> String {
    let result = match describe(image_bytes) {
        Ok(image) => DescriptionResult {
            ok: true,
            image: Some(image),
            error: None,
        },
        Err(e) => DescriptionResult {
            ok: false,
            image: None,
            error: Some(e.to_string()),
        },
    };
    serde_json::to_string(&result)
        .unwrap_or_else(|_| r#"{"ok":false,"error":"Unknown error"}"#.to_string())
}

/// Get the library version.
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
