use crate::color::to_byte;
use crate::raster::PixelBuffer;
use crate::util::RandomSource;

/// RGB corner colors of a gradient, components in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Corners {
    pub top_left: [f32; 3],
    pub top_right: [f32; 3],
    pub bottom_left: [f32; 3],
    pub bottom_right: [f32; 3],
}

impl Corners {
    /// Four independent uniformly random colors
    pub fn random(rng: &mut dyn RandomSource) -> Self {
        let mut color = || [(); 3].map(|()| rng.uniform(0.0, 1.0));
        Self {
            top_left: color(),
            top_right: color(),
            bottom_left: color(),
            bottom_right: color(),
        }
    }
}

#[inline]
fn lerp3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [0, 1, 2].map(|c| a[c] * (1.0 - t) + b[c] * t)
}

/// Normalized coordinate; 0 when the axis has a single pixel
#[inline]
fn normalized(i: u32, len: u32) -> f32 {
    if len > 1 {
        i as f32 / (len - 1) as f32
    } else {
        0.0
    }
}

/// Bilinear blend of `corners` over a `width x height` opaque canvas
pub fn gradient_with_corners(width: u32, height: u32, corners: &Corners) -> PixelBuffer {
    let mut out = PixelBuffer::with_size(width, height);
    for y in 0..height {
        let fy = normalized(y, height);
        for x in 0..width {
            let fx = normalized(x, width);
            let top = lerp3(corners.top_left, corners.top_right, fx);
            let bottom = lerp3(corners.bottom_left, corners.bottom_right, fx);
            let [r, g, b] = lerp3(top, bottom, fy);
            out.set_pixel(x, y, [to_byte(r), to_byte(g), to_byte(b), 255]);
        }
    }
    out
}

/// Gradient between four random corner colors. Ignores any source image.
pub(crate) fn gradient(width: u32, height: u32, rng: &mut dyn RandomSource) -> PixelBuffer {
    gradient_with_corners(width, height, &Corners::random(rng))
}
