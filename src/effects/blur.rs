use image::imageops;
use image::{ImageBuffer, Rgba};

use crate::raster::PixelBuffer;

/// Gaussian blur through `image::imageops::blur`; `radius` is the sigma.
/// Dimensions are preserved. Callers validate `radius > 0`.
pub(crate) fn gaussian_blur(source: &PixelBuffer, radius: f32) -> PixelBuffer {
    let Some(view) =
        ImageBuffer::<Rgba<u8>, &[u8]>::from_raw(source.width(), source.height(), source.as_bytes())
    else {
        return source.clone();
    };
    let blurred = imageops::blur(&view, radius);
    PixelBuffer::from_raw(source.width(), source.height(), blurred.into_raw())
        .unwrap_or_else(|_| source.clone())
}
