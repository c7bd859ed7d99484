//! Conversions between [`PixelBuffer`] and the `image` crate's types.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use log::debug;

use super::PixelBuffer;
use crate::error::{DecodeError, Result};

/// Decode any host image into an RGBA8 buffer.
pub fn decode(image: &DynamicImage) -> Result<PixelBuffer, DecodeError> {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    PixelBuffer::from_raw(width, height, rgba.into_raw())
}

/// Decode an encoded image file held in memory (format is sniffed).
pub fn decode_bytes(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    let image = image::load_from_memory(bytes).map_err(|e| DecodeError::Format(e.to_string()))?;
    decode(&image)
}

/// Wrap a buffer as a host image without copying.
pub fn encode(buffer: PixelBuffer) -> DynamicImage {
    let (width, height) = (buffer.width(), buffer.height());
    match RgbaImage::from_raw(width, height, buffer.into_bytes()) {
        Some(image) => DynamicImage::ImageRgba8(image),
        // from_raw only fails on a length mismatch, which PixelBuffer rules out
        None => DynamicImage::new_rgba8(width, height),
    }
}

/// Resample to exactly `width x height` with bilinear filtering.
/// Returns a clone when the size already matches.
pub fn resize(buffer: &PixelBuffer, width: u32, height: u32) -> PixelBuffer {
    if buffer.width() == width && buffer.height() == height {
        return buffer.clone();
    }
    debug!(
        "resize {}x{} -> {}x{}",
        buffer.width(),
        buffer.height(),
        width,
        height
    );
    let Some(view) = image::ImageBuffer::<image::Rgba<u8>, &[u8]>::from_raw(
        buffer.width(),
        buffer.height(),
        buffer.as_bytes(),
    ) else {
        return PixelBuffer::with_size(width, height);
    };
    let resized = imageops::resize(&view, width, height, FilterType::Triangle);
    PixelBuffer::from_raw(width, height, resized.into_raw())
        .unwrap_or_else(|_| PixelBuffer::with_size(width, height))
}

/// Open and decode an image file.
pub fn open(path: impl AsRef<Path>) -> Result<PixelBuffer> {
    let bytes = std::fs::read(path)?;
    Ok(decode_bytes(&bytes)?)
}

/// Encode and write a buffer; the format follows the file extension.
/// JPEG has no alpha channel, so alpha is dropped for `.jpg`/`.jpeg`.
pub fn save(buffer: &PixelBuffer, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let image = encode(buffer.clone());
    let is_jpeg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"));
    if is_jpeg {
        DynamicImage::ImageRgb8(image.to_rgb8()).save(path)?;
    } else {
        image.save(path)?;
    }
    Ok(())
}
