use crate::raster::{PixelBuffer, CHANNELS};

/// Color negative: 255 - v on R, G and B. Alpha is kept.
pub(crate) fn invert(mut buffer: PixelBuffer) -> PixelBuffer {
    for px in buffer.as_bytes_mut().chunks_exact_mut(CHANNELS) {
        invert_pixel(px);
    }
    buffer
}

#[inline]
pub(crate) fn invert_pixel(px: &mut [u8]) {
    px[0] = 255 - px[0];
    px[1] = 255 - px[1];
    px[2] = 255 - px[2];
}
