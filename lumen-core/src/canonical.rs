//! Deterministic resize and color-mode normalization.
//!
//! Every fingerprint is computed over a canonical pixel grid, so the
//! transforms here are fixed: color conversion first, then a Lanczos3
//! resample. Changing either changes every fingerprint ever issued.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma, LumaA, Pixel, Rgb, Rgba};
use tracing::debug;

use crate::error::{LumenError, Result};
use crate::pixels::{ColorMode, PixelBuffer};

/// Resampling filter used for all canonical grids.
pub const CANONICAL_FILTER: FilterType = FilterType::Lanczos3;

/// ITU-R 601-2 luma in 16-bit fixed point, rounded.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((19595 * r as u32 + 38470 * g as u32 + 7471 * b as u32 + 0x8000) >> 16) as u8
}

/// Produce a new buffer of exactly `width`x`height` in `mode`.
pub fn canonicalize(
    source: &PixelBuffer,
    width: u32,
    height: u32,
    mode: ColorMode,
) -> Result<PixelBuffer> {
    if width == 0 || height == 0 {
        return Err(LumenError::UnsupportedInput(format!(
            "canonical size must be non-zero, got {}x{}",
            width, height
        )));
    }

    let converted = convert_mode(source, mode)?;
    if converted.dimensions() == (width, height) {
        return Ok(converted);
    }

    let (src_w, src_h) = converted.dimensions();
    let data = converted.into_bytes();
    let resized = match mode {
        ColorMode::Gray => resample::<Luma<u8>>(src_w, src_h, data, width, height),
        ColorMode::GrayAlpha => resample::<LumaA<u8>>(src_w, src_h, data, width, height),
        ColorMode::Rgb => resample::<Rgb<u8>>(src_w, src_h, data, width, height),
        ColorMode::Rgba => resample::<Rgba<u8>>(src_w, src_h, data, width, height),
    }?;

    debug!(
        from_width = src_w,
        from_height = src_h,
        width,
        height,
        mode = ?mode,
        "Canonicalized pixel grid"
    );

    PixelBuffer::new(width, height, mode, resized)
}

/// Convert channel layout without changing dimensions.
///
/// Alpha is dropped without premultiplication; gray expands by replication.
pub fn convert_mode(source: &PixelBuffer, mode: ColorMode) -> Result<PixelBuffer> {
    if source.mode() == mode {
        return Ok(source.clone());
    }

    let src_channels = source.mode().channels();
    let pixel_count = source.as_bytes().len() / src_channels;
    let mut out = Vec::with_capacity(pixel_count * mode.channels());

    for px in source.as_bytes().chunks_exact(src_channels) {
        let (r, g, b, a) = match source.mode() {
            ColorMode::Gray => (px[0], px[0], px[0], u8::MAX),
            ColorMode::GrayAlpha => (px[0], px[0], px[0], px[1]),
            ColorMode::Rgb => (px[0], px[1], px[2], u8::MAX),
            ColorMode::Rgba => (px[0], px[1], px[2], px[3]),
        };
        match mode {
            ColorMode::Gray => out.push(luma(r, g, b)),
            ColorMode::GrayAlpha => out.extend_from_slice(&[luma(r, g, b), a]),
            ColorMode::Rgb => out.extend_from_slice(&[r, g, b]),
            ColorMode::Rgba => out.extend_from_slice(&[r, g, b, a]),
        }
    }

    PixelBuffer::new(source.width(), source.height(), mode, out)
}

fn resample<P>(width: u32, height: u32, data: Vec<u8>, to_w: u32, to_h: u32) -> Result<Vec<u8>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let buffer: ImageBuffer<P, Vec<u8>> = ImageBuffer::from_raw(width, height, data)
        .ok_or_else(|| {
            LumenError::UnsupportedInput(format!("pixel data does not fit {}x{}", width, height))
        })?;
    Ok(imageops::resize(&buffer, to_w, to_h, CANONICAL_FILTER).into_raw())
}
