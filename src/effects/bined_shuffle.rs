use crate::progress::{Progress, BLOCK_INTERVAL};
use crate::raster::PixelBuffer;
use crate::util::RandomSource;

/// Permute pixels inside each `block_size` square tile.
///
/// Tiles are laid from the top-left corner; a right or bottom strip
/// narrower than a tile is left as it was.
pub(crate) fn bined_shuffle(
    mut buffer: PixelBuffer,
    block_size: u32,
    rng: &mut dyn RandomSource,
    progress: &mut Progress<'_>,
) -> PixelBuffer {
    let block = block_size.max(1) as usize;
    let width = buffer.width() as usize;
    let blocks_x = width / block;
    let blocks_y = buffer.height() as usize / block;
    let total = blocks_x * blocks_y;
    if total == 0 {
        return buffer;
    }

    // At least one tile fits, so a tile is no larger than the image
    let tile = block * block;
    let mut indices = Vec::with_capacity(tile);
    let mut order = Vec::with_capacity(tile);
    let mut scratch = Vec::with_capacity(tile);
    let mut done = 0;

    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            indices.clear();
            for ly in 0..block {
                let row = (by * block + ly) * width;
                indices.extend((0..block).map(|lx| row + bx * block + lx));
            }

            order.clear();
            order.extend_from_slice(&indices);
            rng.shuffle_indices(&mut order);

            scratch.clear();
            scratch.extend(order.iter().map(|&src| buffer.pixel_at(src)));
            for (&dst, &pixel) in indices.iter().zip(&scratch) {
                buffer.set_pixel_at(dst, pixel);
            }

            done += 1;
            progress.tick(done, total, BLOCK_INTERVAL);
        }
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Rng;

    /// Every pixel encodes its own (x, y)
    fn coordinates(width: u32, height: u32) -> PixelBuffer {
        let mut buffer = PixelBuffer::with_size(width, height);
        for y in 0..height {
            for x in 0..width {
                buffer.set_pixel(x, y, [x as u8, y as u8, 0, 255]);
            }
        }
        buffer
    }

    #[test]
    fn test_pixels_stay_in_their_tile() {
        let source = coordinates(32, 24);
        let out = bined_shuffle(source.clone(), 8, &mut Rng::new(4), &mut Progress::silent());
        assert_ne!(out, source);
        for y in 0..24 {
            for x in 0..32 {
                let [sx, sy, _, _] = out.get_pixel(x, y).unwrap();
                assert_eq!(u32::from(sx) / 8, x / 8, "pixel at ({x},{y}) left its tile");
                assert_eq!(u32::from(sy) / 8, y / 8, "pixel at ({x},{y}) left its tile");
            }
        }
    }

    #[test]
    fn test_each_tile_keeps_its_multiset() {
        let source = coordinates(16, 16);
        let out = bined_shuffle(source.clone(), 4, &mut Rng::new(9), &mut Progress::silent());
        for ty in 0..4 {
            for tx in 0..4 {
                let collect = |b: &PixelBuffer| {
                    let mut v: Vec<[u8; 4]> = (0..4)
                        .flat_map(|ly| (0..4).map(move |lx| (tx * 4 + lx, ty * 4 + ly)))
                        .map(|(x, y)| b.get_pixel(x, y).unwrap())
                        .collect();
                    v.sort_unstable();
                    v
                };
                assert_eq!(collect(&out), collect(&source));
            }
        }
    }

    #[test]
    fn test_remainder_strip_untouched() {
        let source = coordinates(10, 7);
        let out = bined_shuffle(source.clone(), 4, &mut Rng::new(2), &mut Progress::silent());
        for y in 0..7 {
            for x in 0..10 {
                if x >= 8 || y >= 4 {
                    assert_eq!(out.get_pixel(x, y), source.get_pixel(x, y));
                }
            }
        }
    }

    #[test]
    fn test_block_larger_than_image_is_noop() {
        let source = coordinates(5, 5);
        for block in [16, 70_000, u32::MAX] {
            let out = bined_shuffle(source.clone(), block, &mut Rng::new(2), &mut Progress::silent());
            assert_eq!(out, source);
        }
    }
}
