use crate::color::{hsl_to_rgb, rgb_to_hsl, to_byte, unit, Hsl};
use crate::progress::{Progress, BLOCK_INTERVAL};
use crate::raster::PixelBuffer;
use crate::util::RandomSource;

/// Number of colors sampled from the source
pub const PALETTE_SIZE: usize = 100;

/// Saturation multiplier range, per pixel
const SATURATION_JITTER: (f32, f32) = (1.0, 1.5);
/// Lightness multiplier range, per pixel
const LIGHTNESS_JITTER: (f32, f32) = (0.0, 1.5);

/// Build a mosaic from colors sampled out of `source`.
///
/// Nothing is moved: a palette of [`PALETTE_SIZE`] HSL colors is sampled at
/// random positions, each tile takes one palette entry, and every pixel in
/// the tile jitters its saturation and lightness. Pixels outside whole
/// tiles are opaque white.
pub(crate) fn bined_color_shuffle(
    source: &PixelBuffer,
    block_size: u32,
    rng: &mut dyn RandomSource,
    progress: &mut Progress<'_>,
) -> PixelBuffer {
    let palette = sample_palette(source, rng);

    let (width, height) = (source.width(), source.height());
    let block = block_size.max(1);
    let blocks_x = width / block;
    let blocks_y = height / block;
    let total = (blocks_x * blocks_y) as usize;

    let mut out = PixelBuffer::filled(width, height, [255; 4]);
    let mut done = 0;

    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            let base = palette[rng.index(palette.len())];

            for ly in 0..block {
                for lx in 0..block {
                    let s = base.s * rng.uniform(SATURATION_JITTER.0, SATURATION_JITTER.1);
                    let l = base.l * rng.uniform(LIGHTNESS_JITTER.0, LIGHTNESS_JITTER.1);
                    let (r, g, b) =
                        hsl_to_rgb(Hsl::new(base.h, s.clamp(0.0, 1.0), l.clamp(0.0, 1.0)));
                    out.set_pixel(
                        bx * block + lx,
                        by * block + ly,
                        [to_byte(r), to_byte(g), to_byte(b), 255],
                    );
                }
            }

            done += 1;
            progress.tick(done, total, BLOCK_INTERVAL);
        }
    }
    out
}

/// Colors at uniformly random positions, converted to HSL
fn sample_palette(source: &PixelBuffer, rng: &mut dyn RandomSource) -> Vec<Hsl> {
    let count = source.pixel_count();
    (0..PALETTE_SIZE)
        .map(|_| {
            let [r, g, b, _] = source.pixel_at(rng.index(count));
            rgb_to_hsl(unit(r), unit(g), unit(b))
        })
        .collect()
}
