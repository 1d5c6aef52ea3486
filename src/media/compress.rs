//! Budgeted JPEG re-encoding.
//!
//! | Step | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP, GIF) | `image::load_from_memory` |
//! | Encode | `image::codecs::jpeg::JpegEncoder` |
//! | Downscale | `DynamicImage::resize_exact` with `Triangle` |
//!
//! Quality drops by [`QUALITY_STEP`] per attempt. Once it reaches
//! [`MIN_QUALITY`] the image is downscaled to 3/4 per attempt instead,
//! so the loop ends for any input: either a fit is found or the image
//! is 1×1 and still over budget.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::debug;

use crate::error::{Error, Result};

/// Per-image upload cap of the posting backend (1 MiB).
pub const MAX_IMAGE_BYTES: usize = 1_048_576;

/// Starting JPEG quality.
pub const DEFAULT_QUALITY: u8 = 90;

/// Quality decrement per attempt.
pub const QUALITY_STEP: u8 = 5;

/// Quality floor; below it the image is downscaled instead.
pub const MIN_QUALITY: u8 = 10;

/// Compress `bytes` to a JPEG of at most `max_bytes`, starting at
/// [`DEFAULT_QUALITY`].
pub fn compress(bytes: &[u8], max_bytes: usize) -> Result<Vec<u8>> {
    compress_with_quality(bytes, max_bytes, DEFAULT_QUALITY)
}

/// Compress `bytes` to a JPEG of at most `max_bytes`, starting at
/// `quality`.
///
/// The output is always re-encoded, even when the input already fits.
pub fn compress_with_quality(bytes: &[u8], max_bytes: usize, quality: u8) -> Result<Vec<u8>> {
    if max_bytes == 0 {
        return Err(Error::ImageTooLarge { max_bytes });
    }

    let mut image =
        image::load_from_memory(bytes).map_err(|e| Error::ImageDecode(e.to_string()))?;
    let mut quality = quality.clamp(MIN_QUALITY, 100);
    let mut attempts = 0_u32;

    loop {
        attempts += 1;
        let encoded = encode_jpeg(&image, quality)?;
        if encoded.len() <= max_bytes {
            debug!(
                input = bytes.len(),
                output = encoded.len(),
                quality,
                attempts,
                "Image compressed"
            );
            return Ok(encoded);
        }

        if quality > MIN_QUALITY {
            quality = quality.saturating_sub(QUALITY_STEP).max(MIN_QUALITY);
            continue;
        }

        let (width, height) = image.dimensions();
        if width <= 1 && height <= 1 {
            return Err(Error::ImageTooLarge { max_bytes });
        }
        let (width, height) = ((width * 3 / 4).max(1), (height * 3 / 4).max(1));
        debug!(width, height, size = encoded.len(), "Downscaling at quality floor");
        image = image.resize_exact(width, height, FilterType::Triangle);
    }
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = image.to_rgb8();
    let mut buf = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
    encoder
        .encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| Error::ImageEncode(e.to_string()))?;
    Ok(buf)
}
