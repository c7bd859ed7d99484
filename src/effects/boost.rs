use crate::raster::{PixelBuffer, CHANNELS};

/// Floor for the standard deviation divisor; keeps flat channels finite
const MIN_STD: f32 = 1.0;

/// Steepness of the tanh soft clip
const CLIP_GAIN: f32 = 4.0;

/// Mean and population standard deviation of one channel
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelStats {
    pub mean: f32,
    pub std: f32,
}

impl ChannelStats {
    /// Statistics from a channel's pixel count, sum and sum of squares.
    /// Integer sums make the result independent of summation order.
    pub(crate) fn from_sums(count: u64, sum: u64, sum_sq: u64) -> Self {
        if count == 0 {
            return Self::default();
        }
        let n = u128::from(count);
        let s = u128::from(sum);
        // n * sum_sq >= sum^2 for any set of values
        let scatter = n * u128::from(sum_sq) - s * s;
        Self {
            mean: (sum as f64 / count as f64) as f32,
            std: ((scatter as f64).sqrt() / count as f64) as f32,
        }
    }
}

/// Per-channel sums of values and squared values for R, G and B
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct ChannelSums {
    pub sum: [u64; 3],
    pub sum_sq: [u64; 3],
}

impl ChannelSums {
    #[inline]
    pub(crate) fn add_pixel(mut self, px: &[u8]) -> Self {
        for c in 0..3 {
            let v = u64::from(px[c]);
            self.sum[c] += v;
            self.sum_sq[c] += v * v;
        }
        self
    }

    pub(crate) fn merge(self, other: Self) -> Self {
        Self {
            sum: [0, 1, 2].map(|c| self.sum[c] + other.sum[c]),
            sum_sq: [0, 1, 2].map(|c| self.sum_sq[c] + other.sum_sq[c]),
        }
    }

    pub(crate) fn stats(&self, count: usize) -> [ChannelStats; 3] {
        [0, 1, 2].map(|c| ChannelStats::from_sums(count as u64, self.sum[c], self.sum_sq[c]))
    }
}

/// Per-channel statistics for R, G and B
pub(crate) fn channel_stats(buffer: &PixelBuffer) -> [ChannelStats; 3] {
    buffer
        .as_bytes()
        .chunks_exact(CHANNELS)
        .fold(ChannelSums::default(), ChannelSums::add_pixel)
        .stats(buffer.pixel_count())
}

/// Map a normalized value into [0, 1] with a smooth tanh knee
#[inline]
pub(crate) fn soft_clip(z: f32) -> f32 {
    ((z * CLIP_GAIN).tanh() + 1.0) / 2.0
}

/// Boost one channel value given its statistics and factor
#[inline]
pub(crate) fn boost_value(value: u8, stats: ChannelStats, factor: f32) -> u8 {
    let z = (f32::from(value) - stats.mean) / stats.std.max(MIN_STD) * factor;
    (soft_clip(z) * 255.0).clamp(0.0, 255.0).round() as u8
}

/// Per-channel contrast normalization with soft clipping.
///
/// Each channel is turned into a z-score, scaled by its boost factor and
/// squashed through tanh, so a flat channel lands on the midpoint (128).
/// Alpha is untouched.
pub(crate) fn boost(mut buffer: PixelBuffer, factors: [f32; 3]) -> PixelBuffer {
    let stats = channel_stats(&buffer);
    for px in buffer.as_bytes_mut().chunks_exact_mut(CHANNELS) {
        for c in 0..3 {
            px[c] = boost_value(px[c], stats[c], factors[c]);
        }
    }
    buffer
}
