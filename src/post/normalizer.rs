//! Cover art normalization.
//!
//! Bluesky rejects image blobs above ~976.56 KiB and does not need alpha, so
//! every image is flattened onto white, bounded in size and re-encoded as
//! JPEG with decreasing quality until it fits the byte budget or the quality
//! floor is reached.

use std::io::Cursor;

use image::{
    DynamicImage, ImageReader, Rgb, RgbImage, codecs::jpeg::JpegEncoder, imageops::FilterType,
};
use thiserror::Error;

use crate::{config::ImageLimits, types::NormalizedImage};

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("cannot read image: {0}")]
    Read(#[from] std::io::Error),
    #[error("cannot decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("cannot encode image: {0}")]
    Encode(#[source] image::ImageError),
    #[error("image has no pixels")]
    Empty,
}

/// Upper bound on encode attempts for the given limits.
pub fn max_attempts(limits: &ImageLimits) -> u32 {
    let (start, floor, step) = quality_range(limits);
    let span = u32::from(start - floor);
    span.div_ceil(u32::from(step)) + 1
}

fn quality_range(limits: &ImageLimits) -> (u8, u8, u8) {
    let floor = limits.quality_floor.clamp(1, 100);
    let start = limits.start_quality.clamp(floor, 100);
    (start, floor, limits.quality_step.max(1))
}

/// Normalizes raw image bytes for upload.
///
/// 1. Decodes any format `image` can guess from the bytes.
/// 2. Composites transparent images onto white.
/// 3. Downscales with Lanczos3 so the larger side is at most
///    `limits.max_dimension`, keeping the aspect ratio.
/// 4. Encodes as JPEG, lowering the quality by `quality_step` while the
///    output is over `max_bytes` and the quality is above the floor.
///
/// The result can still exceed `max_bytes` if it was encoded at the floor.
pub fn normalize(data: &[u8], limits: &ImageLimits) -> Result<NormalizedImage, ImageError> {
    let img = ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .decode()
        .map_err(ImageError::Decode)?;

    if img.width() == 0 || img.height() == 0 {
        return Err(ImageError::Empty);
    }

    let rgb = bound_dimensions(flatten(&img), limits.max_dimension);
    let (start, floor, step) = quality_range(limits);

    let mut quality = start;
    let mut bytes = encode_jpeg(&rgb, quality)?;
    let mut attempts = 1;

    while bytes.len() > limits.max_bytes && quality > floor {
        quality = quality.saturating_sub(step).max(floor);
        bytes = encode_jpeg(&rgb, quality)?;
        attempts += 1;
    }

    Ok(NormalizedImage {
        bytes,
        width: rgb.width(),
        height: rgb.height(),
        quality,
        attempts,
    })
}

/// Drops the alpha channel by blending every pixel over opaque white.
fn flatten(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = u16::from(a);
        let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        rgb.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }
    rgb
}

/// Target size with the larger side clamped to `max`, or `None` if the image
/// already fits.
pub fn scaled_dimensions(width: u32, height: u32, max: u32) -> Option<(u32, u32)> {
    if max == 0 || (width <= max && height <= max) {
        return None;
    }

    let scale = |side: u32, larger: u32| -> u32 {
        let scaled = (u64::from(side) * u64::from(max) + u64::from(larger) / 2) / u64::from(larger);
        (scaled as u32).max(1)
    };

    if width >= height {
        Some((max, scale(height, width)))
    } else {
        Some((scale(width, height), max))
    }
}

fn bound_dimensions(rgb: RgbImage, max: u32) -> RgbImage {
    match scaled_dimensions(rgb.width(), rgb.height(), max) {
        Some((w, h)) => image::imageops::resize(&rgb, w, h, FilterType::Lanczos3),
        None => rgb,
    }
}

fn encode_jpeg(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>, ImageError> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(rgb)
        .map_err(ImageError::Encode)?;
    Ok(out)
}
