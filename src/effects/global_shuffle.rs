use crate::progress::{Progress, PIXEL_INTERVAL};
use crate::raster::PixelBuffer;
use crate::util::RandomSource;

/// Fisher-Yates over pixel indices of the whole buffer.
/// The output holds exactly the input pixels, in a uniformly random order.
pub(crate) fn global_shuffle(
    mut buffer: PixelBuffer,
    rng: &mut dyn RandomSource,
    progress: &mut Progress<'_>,
) -> PixelBuffer {
    let count = buffer.pixel_count();
    for i in (1..count).rev() {
        let j = rng.index(i + 1);
        buffer.swap_pixels(i, j);

        if i % PIXEL_INTERVAL == 0 {
            progress.update((count - i) as f32 / count as f32);
        }
    }
    buffer
}
