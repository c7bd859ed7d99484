use crate::progress::{Progress, PIXEL_INTERVAL};
use crate::raster::PixelBuffer;
use crate::util::RandomSource;

/// Spread in pixels: `spread` scaled by a quarter of the longer side
#[inline]
pub(crate) fn effective_spread(spread: f32, width: u32, height: u32) -> f64 {
    f64::from(spread) * f64::from(width.max(height)) / 4.0
}

/// Swap every pixel, in raster order, with a Gaussian-displaced neighbour.
///
/// Works in place: later visits see earlier swaps, so a pixel can travel
/// more than once. Targets are clamped to the image. A non-positive
/// effective spread returns the buffer untouched.
pub(crate) fn local_shuffle(
    mut buffer: PixelBuffer,
    spread: f32,
    rng: &mut dyn RandomSource,
    progress: &mut Progress<'_>,
) -> PixelBuffer {
    let sigma = effective_spread(spread, buffer.width(), buffer.height());
    if sigma <= 0.0 {
        return buffer;
    }

    let width = i64::from(buffer.width());
    let height = i64::from(buffer.height());
    let count = buffer.pixel_count();

    for i in 0..count {
        let x = i as i64 % width;
        let y = i as i64 / width;

        // Offsets truncate toward zero and saturate for huge spreads
        let dx = (rng.gaussian() * sigma) as i64;
        let dy = (rng.gaussian() * sigma) as i64;

        let nx = x.saturating_add(dx).clamp(0, width - 1);
        let ny = y.saturating_add(dy).clamp(0, height - 1);
        buffer.swap_pixels(i, (ny * width + nx) as usize);

        progress.tick(i, count, PIXEL_INTERVAL);
    }
    buffer
}
