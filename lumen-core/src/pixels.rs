//! In-memory pixel grids.
//!
//! A [`PixelBuffer`] is the common currency between the input normalizer and
//! the canonicalizer: 8 bits per channel, row-major, channels interleaved.

use image::{ColorType, DynamicImage, ExtendedColorType, ImageBuffer};
use serde::{Deserialize, Serialize};

use crate::error::{LumenError, Result};

/// Channel layout of a [`PixelBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
}

impl ColorMode {
    /// Number of interleaved channels per pixel.
    pub fn channels(self) -> usize {
        match self {
            ColorMode::Gray => 1,
            ColorMode::GrayAlpha => 2,
            ColorMode::Rgb => 3,
            ColorMode::Rgba => 4,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, ColorMode::GrayAlpha | ColorMode::Rgba)
    }

    /// Map an `image` color type onto the 8-bit mode it is reduced to on load.
    pub fn from_color_type(color: ColorType) -> Self {
        match (color.has_color(), color.has_alpha()) {
            (false, false) => ColorMode::Gray,
            (false, true) => ColorMode::GrayAlpha,
            (true, false) => ColorMode::Rgb,
            (true, true) => ColorMode::Rgba,
        }
    }

    pub(crate) fn extended_color_type(self) -> ExtendedColorType {
        match self {
            ColorMode::Gray => ExtendedColorType::L8,
            ColorMode::GrayAlpha => ExtendedColorType::La8,
            ColorMode::Rgb => ExtendedColorType::Rgb8,
            ColorMode::Rgba => ExtendedColorType::Rgba8,
        }
    }
}

/// Decoded image content with known shape and channel layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    mode: ColorMode,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Build a buffer from raw row-major bytes.
    ///
    /// Fails with [`LumenError::UnsupportedInput`] when a dimension is zero or
    /// `data` does not hold exactly `width * height * channels` bytes.
    pub fn new(width: u32, height: u32, mode: ColorMode, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(LumenError::UnsupportedInput(format!(
                "pixel buffer has zero dimension ({}x{})",
                width, height
            )));
        }
        let expected = width as usize * height as usize * mode.channels();
        if data.len() != expected {
            return Err(LumenError::UnsupportedInput(format!(
                "pixel buffer holds {} bytes, expected {} for {}x{} {:?}",
                data.len(),
                expected,
                width,
                height,
                mode
            )));
        }
        Ok(Self {
            width,
            height,
            mode,
            data,
        })
    }

    /// Reduce a decoded image to 8 bits per channel.
    pub fn from_dynamic(image: &DynamicImage) -> Result<Self> {
        let (width, height) = (image.width(), image.height());
        let (mode, data) = match image {
            DynamicImage::ImageLuma8(buf) => (ColorMode::Gray, buf.as_raw().clone()),
            DynamicImage::ImageLumaA8(buf) => (ColorMode::GrayAlpha, buf.as_raw().clone()),
            DynamicImage::ImageRgb8(buf) => (ColorMode::Rgb, buf.as_raw().clone()),
            DynamicImage::ImageRgba8(buf) => (ColorMode::Rgba, buf.as_raw().clone()),
            other => match ColorMode::from_color_type(other.color()) {
                ColorMode::Gray => (ColorMode::Gray, other.to_luma8().into_raw()),
                ColorMode::GrayAlpha => (ColorMode::GrayAlpha, other.to_luma_alpha8().into_raw()),
                ColorMode::Rgb => (ColorMode::Rgb, other.to_rgb8().into_raw()),
                ColorMode::Rgba => (ColorMode::Rgba, other.to_rgba8().into_raw()),
            },
        };
        Self::new(width, height, mode, data)
    }

    /// Convert back into an `image` container for encoding.
    pub fn to_dynamic(&self) -> DynamicImage {
        let (w, h, data) = (self.width, self.height, self.data.clone());
        // length validated in new()
        let image = match self.mode {
            ColorMode::Gray => ImageBuffer::from_raw(w, h, data).map(DynamicImage::ImageLuma8),
            ColorMode::GrayAlpha => {
                ImageBuffer::from_raw(w, h, data).map(DynamicImage::ImageLumaA8)
            }
            ColorMode::Rgb => ImageBuffer::from_raw(w, h, data).map(DynamicImage::ImageRgb8),
            ColorMode::Rgba => ImageBuffer::from_raw(w, h, data).map(DynamicImage::ImageRgba8),
        };
        image.unwrap_or_else(|| DynamicImage::new_rgb8(w, h))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    /// Row-major interleaved channel bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Channel values of the pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let channels = self.mode.channels();
        let offset = (y as usize * self.width as usize + x as usize) * channels;
        self.data.get(offset..offset + channels)
    }
}
