//! Pixel operations: decode, thumbnail, encode.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, GIF, BMP) | `image::load_from_memory` (format sniffed from bytes) |
//! | Thumbnail | [`fit_within`](super::fit_within) + `resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |

use super::ImagingError;
use super::calculations::fit_within;
use super::params::{Quality, ThumbnailParams};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

/// Decode an in-memory object into an image.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ImagingError> {
    image::load_from_memory(bytes).map_err(|e| ImagingError::Decode(e.to_string()))
}

/// Shrink `img` to fit the thumbnail bounds, keeping its aspect ratio.
///
/// Images already inside the bounds are returned as-is.
pub fn thumbnail(img: DynamicImage, params: &ThumbnailParams) -> DynamicImage {
    let source = img.dimensions();
    let (width, height) = fit_within(source, params.bounds());
    if (width, height) == source {
        return img;
    }
    img.resize_exact(width, height, FilterType::Lanczos3)
}

/// Bytes of an encoded JPEG, ready to store as `image/jpeg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedJpeg(Vec<u8>);

impl EncodedJpeg {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// Encode as baseline JPEG.
///
/// JPEG has no alpha channel and only 8-bit samples, so anything other than
/// 8-bit gray or RGB is converted to 8-bit RGB first.
pub fn encode_jpeg(img: &DynamicImage, quality: Quality) -> Result<EncodedJpeg, ImagingError> {
    let converted;
    let img = match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => img,
        other => {
            converted = DynamicImage::ImageRgb8(other.to_rgb8());
            &converted
        }
    };

    let mut buffer = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.value());
    img.write_with_encoder(encoder)
        .map_err(|e| ImagingError::Encode(format!("JPEG: {e}")))?;
    Ok(EncodedJpeg(buffer))
}
