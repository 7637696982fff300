//! File-level inspection: size, MIME type, raw checksum and image properties.
//!
//! Nothing here feeds the fingerprints. The raw checksum in particular changes
//! with every re-encode, unlike the content fingerprint.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use tracing::{debug, instrument};

use crate::error::{LumenError, Result};
use crate::input::{decode, Decoded, ImageInput};
use crate::pixels::ColorMode;

/// Number of leading bytes examined by [`sniff_mime`].
pub const SNIFF_LEN: usize = 32;

const CHECKSUM_BUFFER_SIZE: usize = 8192;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Size and MIME type of a file. Either may be unknown.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileInfo {
    pub size: Option<u64>,
    pub mime_type: Option<String>,
}

/// Decoded image properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescription {
    pub width: u32,
    pub height: u32,
    pub mode: ColorMode,
    /// Bits per channel in the source, before reduction to 8.
    pub bit_depth: u8,
    pub has_alpha: bool,
    /// Container format detected from content, if the input was encoded.
    pub format: Option<String>,
}

/// MIME type implied by a path's extension, case-insensitively.
///
/// The table covers image types only. Other extensions (`.txt`, `.pdf`)
/// return `None` and [`file_info`] falls back to sniffing.
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "heic" => "image/heic",
        _ => return None,
    };
    Some(mime)
}

/// MIME type from leading magic bytes.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        "image/png"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "image/gif"
    } else if bytes.starts_with(b"RIFF") && is_webp_riff(bytes) {
        "image/webp"
    } else if bytes.starts_with(b"BM") {
        "image/bmp"
    } else if bytes.starts_with(&[0x00, 0x00, 0x01, 0x00]) {
        "image/x-icon"
    } else {
        OCTET_STREAM
    }
}

// `WEBP` anywhere in the first 12 bytes of a RIFF container.
fn is_webp_riff(bytes: &[u8]) -> bool {
    bytes[..bytes.len().min(12)].windows(4).any(|w| w == b"WEBP")
}

/// Size and MIME type of a file.
///
/// The extension wins when it is recognized; otherwise the first
/// [`SNIFF_LEN`] bytes are sniffed. A file that cannot be stat'ed yields
/// neither field.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn file_info(path: &Path) -> FileInfo {
    let Ok(metadata) = std::fs::metadata(path) else {
        debug!("File cannot be stat'ed");
        return FileInfo::default();
    };

    let mime_type = match mime_from_extension(path) {
        Some(mime) => Some(mime.to_string()),
        None => read_head(path).ok().map(|head| sniff_mime(&head).to_string()),
    };

    FileInfo {
        size: Some(metadata.len()),
        mime_type,
    }
}

fn read_head(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut head = Vec::with_capacity(SNIFF_LEN);
    File::open(path)?
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut head)?;
    Ok(head)
}

/// SHA3-256 of the raw file bytes, lowercase hex.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn file_checksum(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LumenError::NotFound(path.to_path_buf()),
        _ => LumenError::Io(e),
    })?;

    let mut hasher = Sha3_256::new();
    let mut buffer = [0u8; CHECKSUM_BUFFER_SIZE];
    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Decode an input and report its shape and color properties.
pub fn describe<'a>(input: impl Into<ImageInput<'a>>) -> Result<ImageDescription> {
    let description = match decode(input.into())? {
        Decoded::Pixels(pixels) => ImageDescription {
            width: pixels.width(),
            height: pixels.height(),
            mode: pixels.mode(),
            bit_depth: 8,
            has_alpha: pixels.mode().has_alpha(),
            format: None,
        },
        Decoded::Image { image, format } => {
            let color = image.color();
            let channels = u16::from(color.channel_count()).max(1);
            ImageDescription {
                width: image.width(),
                height: image.height(),
                mode: ColorMode::from_color_type(color),
                bit_depth: (color.bits_per_pixel() / channels) as u8,
                has_alpha: color.has_alpha(),
                format: format.and_then(format_name),
            }
        }
    };
    Ok(description)
}

fn format_name(format: ImageFormat) -> Option<String> {
    format.extensions_str().first().map(|ext| ext.to_string())
}

/// Decode an input and re-encode it into `format`.
#[instrument(level = "debug", skip_all, fields(format = ?format))]
pub fn encode<'a>(input: impl Into<ImageInput<'a>>, format: ImageFormat) -> Result<Vec<u8>> {
    let image: DynamicImage = match decode(input.into())? {
        Decoded::Pixels(pixels) => pixels.to_dynamic(),
        Decoded::Image { image, .. } => image,
    };

    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, format)
        .map_err(|e| LumenError::Encode(e.to_string()))?;
    let bytes = out.into_inner();
    debug!(len = bytes.len(), "Encoded image");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::PixelBuffer;
    use std::path::PathBuf;

    fn rgba_pixels() -> PixelBuffer {
        PixelBuffer::new(3, 2, ColorMode::Rgba, [10u8, 20, 30, 128].repeat(6)).unwrap()
    }

    #[test]
    fn test_extension_table_is_case_insensitive() {
        assert_eq!(mime_from_extension(Path::new("a.JPG")), Some("image/jpeg"));
        assert_eq!(mime_from_extension(Path::new("a.jpe")), Some("image/jpeg"));
        assert_eq!(mime_from_extension(Path::new("a.Tiff")), Some("image/tiff"));
        assert_eq!(mime_from_extension(Path::new("a.ico")), Some("image/x-icon"));
        assert_eq!(mime_from_extension(Path::new("a.dat")), None);
        assert_eq!(mime_from_extension(Path::new("notes.txt")), None);
        assert_eq!(mime_from_extension(Path::new("noext")), None);
    }

    #[test]
    fn test_sniff_magic_bytes() {
        assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
        assert_eq!(
            sniff_mime(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00]),
            "image/png"
        );
        assert_eq!(sniff_mime(b"GIF89a...."), "image/gif");
        assert_eq!(sniff_mime(b"RIFF\x10\x00\x00\x00WEBPVP8 "), "image/webp");
        assert_eq!(sniff_mime(b"RIFFWEBP\0\0\0\0"), "image/webp");
        assert_eq!(sniff_mime(b"RIFF\x10\x00\x00\x00WAVE"), OCTET_STREAM);
        assert_eq!(sniff_mime(b"RIFF\x10\x00\x00\x00WAVEWEBP"), OCTET_STREAM);
        assert_eq!(sniff_mime(b"BM\x00\x00"), "image/bmp");
        assert_eq!(sniff_mime(&[0x00, 0x00, 0x01, 0x00, 0x01]), "image/x-icon");
        assert_eq!(sniff_mime(b""), OCTET_STREAM);
    }

    #[test]
    fn test_file_info_sniffs_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.bin");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x43]).unwrap();

        let info = file_info(&path);
        assert_eq!(info.size, Some(6));
        assert_eq!(info.mime_type.as_deref(), Some("image/jpeg"));
    }

    #[test]
    fn test_file_info_prefers_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mislabeled.png");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF]).unwrap();
        assert_eq!(file_info(&path).mime_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_file_info_unknown_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes");
        std::fs::write(&path, b"plain text").unwrap();
        assert_eq!(file_info(&path).mime_type.as_deref(), Some(OCTET_STREAM));
    }

    #[test]
    fn test_file_info_missing_file() {
        let info = file_info(Path::new("/definitely/not/here.png"));
        assert_eq!(info, FileInfo::default());
    }

    #[test]
    fn test_file_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        std::fs::write(&path, b"").unwrap();
        // SHA3-256 of the empty string
        assert_eq!(
            file_checksum(&path).unwrap(),
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
        );

        let big = dir.path().join("big");
        std::fs::write(&big, vec![7u8; CHECKSUM_BUFFER_SIZE * 3 + 5]).unwrap();
        let expected = hex::encode(Sha3_256::digest(vec![7u8; CHECKSUM_BUFFER_SIZE * 3 + 5]));
        assert_eq!(file_checksum(&big).unwrap(), expected);
    }

    #[test]
    fn test_file_checksum_missing_is_not_found() {
        let path = PathBuf::from("/definitely/not/here.png");
        assert!(matches!(
            file_checksum(&path),
            Err(LumenError::NotFound(p)) if p == path
        ));
    }

    #[test]
    fn test_describe_pixels() {
        let description = describe(&rgba_pixels()).unwrap();
        assert_eq!((description.width, description.height), (3, 2));
        assert_eq!(description.mode, ColorMode::Rgba);
        assert_eq!(description.bit_depth, 8);
        assert!(description.has_alpha);
        assert_eq!(description.format, None);
    }

    #[test]
    fn test_encode_then_describe() {
        let png = encode(&rgba_pixels(), ImageFormat::Png).unwrap();
        assert_eq!(sniff_mime(&png), "image/png");

        let description = describe(&png).unwrap();
        assert_eq!((description.width, description.height), (3, 2));
        assert_eq!(description.mode, ColorMode::Rgba);
        assert_eq!(description.format.as_deref(), Some("png"));
    }

    #[test]
    fn test_describe_sixteen_bit_source() {
        let img = image::ImageBuffer::from_pixel(4, 4, image::Luma([40000u16]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageLuma16(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();

        let description = describe(&out.into_inner()).unwrap();
        assert_eq!(description.bit_depth, 16);
        assert_eq!(description.mode, ColorMode::Gray);
        assert!(!description.has_alpha);
    }

    #[test]
    fn test_encode_garbage_is_decode_error() {
        let garbage = b"not an image".to_vec();
        assert!(matches!(
            encode(&garbage, ImageFormat::Png),
            Err(LumenError::Decode(_))
        ));
    }
}
