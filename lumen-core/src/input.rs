//! Input normalization: every accepted image source becomes a [`PixelBuffer`].

use std::borrow::Cow;
use std::fmt;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, ImageReader};
use tracing::{debug, instrument};

use crate::error::{LumenError, Result};
use crate::pixels::PixelBuffer;

/// A readable, seekable byte source.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// One of the accepted image representations.
pub enum ImageInput<'a> {
    /// Image file on disk; the container is sniffed from content.
    Path(&'a Path),
    /// Already-decoded pixels.
    Pixels(&'a PixelBuffer),
    /// Encoded image bytes held in memory.
    Bytes(&'a [u8]),
    /// Encoded image bytes behind a seekable stream.
    Stream(Box<dyn ReadSeek + 'a>),
}

impl<'a> ImageInput<'a> {
    pub fn stream<R: Read + Seek + 'a>(reader: R) -> Self {
        ImageInput::Stream(Box::new(reader))
    }

    fn variant(&self) -> &'static str {
        match self {
            ImageInput::Path(_) => "path",
            ImageInput::Pixels(_) => "pixels",
            ImageInput::Bytes(_) => "bytes",
            ImageInput::Stream(_) => "stream",
        }
    }
}

impl fmt::Debug for ImageInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageInput::Path(path) => f.debug_tuple("Path").field(path).finish(),
            ImageInput::Pixels(px) => f.debug_tuple("Pixels").field(&px.dimensions()).finish(),
            ImageInput::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            ImageInput::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl<'a> From<&'a Path> for ImageInput<'a> {
    fn from(path: &'a Path) -> Self {
        ImageInput::Path(path)
    }
}

impl<'a> From<&'a PathBuf> for ImageInput<'a> {
    fn from(path: &'a PathBuf) -> Self {
        ImageInput::Path(path.as_path())
    }
}

impl<'a> From<&'a PixelBuffer> for ImageInput<'a> {
    fn from(pixels: &'a PixelBuffer) -> Self {
        ImageInput::Pixels(pixels)
    }
}

impl<'a> From<&'a [u8]> for ImageInput<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        ImageInput::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for ImageInput<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        ImageInput::Bytes(bytes.as_slice())
    }
}

/// Result of decoding, before reduction to 8 bits.
pub(crate) enum Decoded<'a> {
    Image {
        image: DynamicImage,
        format: Option<ImageFormat>,
    },
    Pixels(&'a PixelBuffer),
}

pub(crate) fn decode(input: ImageInput<'_>) -> Result<Decoded<'_>> {
    match input {
        ImageInput::Pixels(pixels) => Ok(Decoded::Pixels(pixels)),
        ImageInput::Path(path) => {
            if !path.exists() {
                return Err(LumenError::NotFound(path.to_path_buf()));
            }
            if !path.is_file() {
                return Err(LumenError::UnsupportedInput(format!(
                    "{} is not a regular file",
                    path.display()
                )));
            }
            let reader = ImageReader::open(path).map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => LumenError::NotFound(path.to_path_buf()),
                _ => LumenError::Io(e),
            })?;
            decode_reader(reader)
        }
        ImageInput::Bytes(bytes) => decode_reader(ImageReader::new(Cursor::new(bytes))),
        ImageInput::Stream(stream) => decode_reader(ImageReader::new(BufReader::new(stream))),
    }
}

fn decode_reader<'a, R>(reader: ImageReader<R>) -> Result<Decoded<'a>>
where
    R: std::io::BufRead + Seek,
{
    let reader = reader.with_guessed_format()?;
    let format = reader.format();
    let Some(detected) = format else {
        return Err(LumenError::Decode("unrecognized image format".into()));
    };
    let image = reader.decode().map_err(decode_failure)?;
    debug!(
        format = ?detected,
        width = image.width(),
        height = image.height(),
        color = ?image.color(),
        "Decoded image"
    );
    Ok(Decoded::Image { image, format })
}

/// Truncated or malformed data surfaces from the decoders as I/O errors;
/// those are data errors, not read failures.
fn decode_failure(err: image::ImageError) -> LumenError {
    match err {
        image::ImageError::IoError(e)
            if matches!(
                e.kind(),
                std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::InvalidData
            ) =>
        {
            LumenError::Decode(e.to_string())
        }
        other => other.into(),
    }
}

/// Decode any accepted input into a pixel buffer.
///
/// Already-decoded pixels are borrowed, everything else is decoded and
/// reduced to 8 bits per channel.
#[instrument(level = "debug", skip_all, fields(input = input.variant()))]
pub fn load(input: ImageInput<'_>) -> Result<Cow<'_, PixelBuffer>> {
    match decode(input)? {
        Decoded::Pixels(pixels) => Ok(Cow::Borrowed(pixels)),
        Decoded::Image { image, .. } => PixelBuffer::from_dynamic(&image).map(Cow::Owned),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::ColorMode;
    use image::{Rgb, RgbImage};

    fn encoded(img: RgbImage, format: ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img).write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    fn png_bytes() -> Vec<u8> {
        let mut img = RgbImage::new(5, 4);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        encoded(img, ImageFormat::Png)
    }

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 6) as u8, (y * 8) as u8, ((x + y) * 3) as u8])
        })
    }

    #[test]
    fn test_load_bytes() {
        let bytes = png_bytes();
        let pixels = load(ImageInput::from(&bytes)).unwrap();
        assert_eq!(pixels.dimensions(), (5, 4));
        assert_eq!(pixels.mode(), ColorMode::Rgb);
        assert_eq!(pixels.pixel(0, 0), Some(&[255u8, 0, 0][..]));
    }

    #[test]
    fn test_load_stream_matches_bytes() {
        let bytes = png_bytes();
        let from_stream = load(ImageInput::stream(Cursor::new(bytes.clone()))).unwrap();
        let from_bytes = load(ImageInput::from(&bytes)).unwrap();
        assert_eq!(from_stream, from_bytes);
    }

    #[test]
    fn test_load_pixels_is_borrowed() {
        let buffer = PixelBuffer::new(1, 1, ColorMode::Gray, vec![7]).unwrap();
        let loaded = load(ImageInput::from(&buffer)).unwrap();
        assert!(matches!(loaded, Cow::Borrowed(_)));
    }

    #[test]
    fn test_load_garbage_is_decode_error() {
        let garbage = b"definitely not an image".to_vec();
        assert!(matches!(
            load(ImageInput::from(&garbage)),
            Err(LumenError::Decode(_))
        ));
    }

    #[test]
    fn test_load_truncated_png_is_decode_error() {
        let mut bytes = png_bytes();
        bytes.truncate(bytes.len() / 2);
        let err = load(ImageInput::from(&bytes)).unwrap_err();
        assert!(matches!(err, LumenError::Decode(_)), "got {err:?}");
    }

    #[test]
    fn test_load_truncated_containers_are_decode_errors() {
        for format in [ImageFormat::Png, ImageFormat::Bmp, ImageFormat::Gif] {
            let mut bytes = encoded(gradient(40, 30), format);
            bytes.truncate(bytes.len() / 2);

            let err = load(ImageInput::from(&bytes)).unwrap_err();
            assert!(matches!(err, LumenError::Decode(_)), "{format:?}: got {err:?}");

            let streamed = load(ImageInput::stream(Cursor::new(bytes))).unwrap_err();
            assert!(matches!(streamed, LumenError::Decode(_)), "{format:?}: got {streamed:?}");
        }
    }

    #[test]
    fn test_truncated_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("half.bmp");
        let mut bytes = encoded(gradient(40, 30), ImageFormat::Bmp);
        bytes.truncate(bytes.len() / 2);
        std::fs::write(&path, bytes).unwrap();

        assert!(matches!(load(ImageInput::from(&path)), Err(LumenError::Decode(_))));
    }

    #[test]
    fn test_load_missing_path_is_not_found() {
        let path = Path::new("/definitely/not/here.png");
        assert!(matches!(
            load(ImageInput::from(path)),
            Err(LumenError::NotFound(p)) if p == path
        ));
    }

    #[test]
    fn test_load_directory_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load(ImageInput::from(dir.path())),
            Err(LumenError::UnsupportedInput(_))
        ));
    }

    #[test]
    fn test_load_path_ignores_misleading_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("actually_png.jpg");
        std::fs::write(&path, png_bytes()).unwrap();
        let pixels = load(ImageInput::from(&path)).unwrap();
        assert_eq!(pixels.dimensions(), (5, 4));
    }
}
