//! Data-parallel engine.
//!
//! Each kernel computes an output pixel (or row) without looking at other
//! outputs, so rows run on the rayon pool independently. Random effects use
//! a per-pixel hash stream seeded once per call instead of a shared
//! sequential generator.

use std::f64::consts::TAU;
use std::thread;

use log::debug;
use rayon::prelude::*;

use super::{EffectEngine, EngineKind};
use crate::effects::{self, boost_value, effective_spread, invert_pixel, ChannelSums, Effect};
use crate::error::Result;
use crate::options::Options;
use crate::progress::Progress;
use crate::raster::{PixelBuffer, CHANNELS};
use crate::util::{hash_unit, RandomSource, GAUSSIAN_MIN_U1};

/// Gaussian kernels are truncated at this many sigmas
const KERNEL_SIGMAS: f32 = 3.0;

/// Parallel engine for Invert, Boost, LocalShuffle and GaussianBlur.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelEngine;

impl ParallelEngine {
    /// Some(engine) if this machine has more than one hardware thread
    pub fn probe() -> Option<Self> {
        let threads = thread::available_parallelism().map_or(1, |n| n.get());
        debug!("parallel engine probe: {} hardware threads", threads);
        (threads > 1).then_some(Self)
    }
}

impl EffectEngine for ParallelEngine {
    fn name(&self) -> &str {
        "parallel"
    }

    fn kind(&self) -> EngineKind {
        EngineKind::Parallel
    }

    fn supports(&self, effect: Effect) -> bool {
        matches!(
            effect,
            Effect::Invert | Effect::Boost | Effect::LocalShuffle | Effect::GaussianBlur
        )
    }

    fn run(
        &self,
        effect: Effect,
        source: &PixelBuffer,
        options: &Options,
        rng: &mut dyn RandomSource,
        progress: &mut Progress<'_>,
    ) -> Result<PixelBuffer> {
        options.validate(effect)?;
        effects::check_source(effect, source)?;
        let output = match effect {
            Effect::Invert => invert(source),
            Effect::Boost => boost(source, options.boost(), progress),
            Effect::LocalShuffle => local_shuffle(source, options.spread, rng.next_u64()),
            Effect::GaussianBlur => gaussian_blur(source, options.blur_radius(), progress),
            // Not a per-pixel kernel; run the sequential version
            _ => effects::run(effect, source, options, rng, progress)?,
        };
        Ok(output)
    }
}

fn row_stride(buffer: &PixelBuffer) -> usize {
    buffer.width() as usize * CHANNELS
}

fn invert(source: &PixelBuffer) -> PixelBuffer {
    let mut out = source.clone();
    let stride = row_stride(&out);
    out.as_bytes_mut().par_chunks_mut(stride).for_each(|row| {
        for px in row.chunks_exact_mut(CHANNELS) {
            invert_pixel(px);
        }
    });
    out
}

// ============================================================================
// Boost
// ============================================================================

/// One pass of integer sums; identical to the sequential result however
/// rayon splits the work
fn boost(source: &PixelBuffer, factors: [f32; 3], progress: &mut Progress<'_>) -> PixelBuffer {
    let stats = source
        .as_bytes()
        .par_chunks(CHANNELS)
        .fold(ChannelSums::default, ChannelSums::add_pixel)
        .reduce(ChannelSums::default, ChannelSums::merge)
        .stats(source.pixel_count());
    progress.update(0.5);

    let mut out = source.clone();
    let stride = row_stride(&out);
    out.as_bytes_mut().par_chunks_mut(stride).for_each(|row| {
        for px in row.chunks_exact_mut(CHANNELS) {
            for c in 0..3 {
                px[c] = boost_value(px[c], stats[c], factors[c]);
            }
        }
    });
    out
}

// ============================================================================
// Local shuffle (gather)
// ============================================================================

/// Box-Muller pair from the per-pixel hash stream
#[inline]
fn hashed_gaussian(x: u32, y: u32, salt: u32, seed: u64) -> f64 {
    let u1 = (1.0 - hash_unit(x, y, salt, seed)).max(GAUSSIAN_MIN_U1);
    let u2 = hash_unit(x, y, salt + 1, seed);
    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}

/// Every output pixel copies the source pixel at a Gaussian-displaced,
/// clamped position. Unlike the sequential swap chain this is not a
/// permutation: some pixels are duplicated and some dropped.
fn local_shuffle(source: &PixelBuffer, spread: f32, seed: u64) -> PixelBuffer {
    let sigma = effective_spread(spread, source.width(), source.height());
    if sigma <= 0.0 {
        return source.clone();
    }

    let width = i64::from(source.width());
    let height = i64::from(source.height());
    let mut out = PixelBuffer::with_size(source.width(), source.height());
    let stride = row_stride(&out);

    out.as_bytes_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.chunks_exact_mut(CHANNELS).enumerate() {
                let (hx, hy) = (x as u32, y as u32);
                let dx = (hashed_gaussian(hx, hy, 0, seed) * sigma) as i64;
                let dy = (hashed_gaussian(hx, hy, 2, seed) * sigma) as i64;
                let sx = (x as i64).saturating_add(dx).clamp(0, width - 1);
                let sy = (y as i64).saturating_add(dy).clamp(0, height - 1);
                px.copy_from_slice(&source.pixel_at((sy * width + sx) as usize));
            }
        });
    out
}

// ============================================================================
// Gaussian blur (separable)
// ============================================================================

/// Normalized 1D Gaussian kernel covering +/- 3 sigma
fn gaussian_kernel_1d(sigma: f32) -> Vec<f32> {
    let radius = (sigma * KERNEL_SIGMAS).ceil().max(1.0) as i32;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / two_sigma_sq).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Two passes (rows, then columns) with clamped edges. All four channels
/// are filtered.
fn gaussian_blur(source: &PixelBuffer, sigma: f32, progress: &mut Progress<'_>) -> PixelBuffer {
    let kernel = gaussian_kernel_1d(sigma);
    let half = (kernel.len() / 2) as isize;
    let width = source.width() as usize;
    let height = source.height() as usize;
    let stride = width * CHANNELS;
    let bytes = source.as_bytes();

    // Horizontal pass
    let mut temp = vec![0.0f32; bytes.len()];
    temp.par_chunks_mut(stride).enumerate().for_each(|(y, row_out)| {
        let row_in = &bytes[y * stride..(y + 1) * stride];
        for x in 0..width {
            let mut sum = [0.0f32; CHANNELS];
            for (ki, &kv) in kernel.iter().enumerate() {
                let sx = (x as isize + ki as isize - half).clamp(0, width as isize - 1) as usize;
                for c in 0..CHANNELS {
                    sum[c] += f32::from(row_in[sx * CHANNELS + c]) * kv;
                }
            }
            row_out[x * CHANNELS..(x + 1) * CHANNELS].copy_from_slice(&sum);
        }
    });
    progress.update(0.5);

    // Vertical pass
    let mut out = PixelBuffer::with_size(source.width(), source.height());
    out.as_bytes_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            for x in 0..width {
                for c in 0..CHANNELS {
                    let mut sum = 0.0f32;
                    for (ki, &kv) in kernel.iter().enumerate() {
                        let sy = (y as isize + ki as isize - half)
                            .clamp(0, height as isize - 1) as usize;
                        sum += temp[sy * stride + x * CHANNELS + c] * kv;
                    }
                    row_out[x * CHANNELS + c] = sum.round().clamp(0.0, 255.0) as u8;
                }
            }
        });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CpuEngine;
    use crate::util::Rng;

    fn noisy(width: u32, height: u32) -> PixelBuffer {
        let mut buffer = PixelBuffer::with_size(width, height);
        for i in 0..buffer.pixel_count() {
            let v = (i * 53 % 256) as u8;
            buffer.set_pixel_at(i, [v, 255 - v, v / 2, 255]);
        }
        buffer
    }

    fn run(effect: Effect, engine: &dyn EffectEngine, source: &PixelBuffer, options: &Options) -> PixelBuffer {
        engine
            .run(effect, source, options, &mut Rng::new(5), &mut Progress::silent())
            .unwrap()
    }

    #[test]
    fn test_supported_effects() {
        let engine = ParallelEngine;
        assert!(engine.supports(Effect::Invert));
        assert!(engine.supports(Effect::Boost));
        assert!(engine.supports(Effect::LocalShuffle));
        assert!(engine.supports(Effect::GaussianBlur));
        assert!(!engine.supports(Effect::GlobalShuffle));
        assert!(!engine.supports(Effect::Gradient));
    }

    #[test]
    fn test_invert_matches_cpu() {
        let source = noisy(31, 7);
        let options = Options::default();
        assert_eq!(
            run(Effect::Invert, &ParallelEngine, &source, &options),
            run(Effect::Invert, &CpuEngine, &source, &options)
        );
    }

    #[test]
    fn test_boost_matches_cpu_exactly() {
        let source = noisy(400, 250);
        let options = Options::default().with_boost(0.4, 0.3, 0.2);
        let a = run(Effect::Boost, &ParallelEngine, &source, &options);
        let b = run(Effect::Boost, &CpuEngine, &source, &options);
        assert_eq!(a, b);
        assert_eq!(a, run(Effect::Boost, &ParallelEngine, &source, &options));
    }

    #[test]
    fn test_flat_boost_is_midpoint() {
        let red = PixelBuffer::filled(4, 4, [255, 0, 0, 255]);
        let options = Options::default().with_boost(1.0, 0.0, 0.0);
        let out = run(Effect::Boost, &ParallelEngine, &red, &options);
        assert!(out.pixels().all(|p| p == [128, 128, 128, 255]));
    }

    #[test]
    fn test_local_shuffle_gathers_from_source() {
        let source = noisy(24, 24);
        let options = Options::default().with_spread(0.3);
        let out = run(Effect::LocalShuffle, &ParallelEngine, &source, &options);
        assert_eq!((out.width(), out.height()), (24, 24));
        let palette: std::collections::HashSet<[u8; 4]> = source.pixels().collect();
        assert!(out.pixels().all(|p| palette.contains(&p)));
        assert_ne!(out, source);
    }

    #[test]
    fn test_local_shuffle_huge_spread_gathers_from_corners() {
        let source = noisy(8, 8);
        let options = Options::default().with_spread(1e20);
        let out = run(Effect::LocalShuffle, &ParallelEngine, &source, &options);
        let corners = [(0, 0), (7, 0), (0, 7), (7, 7)].map(|(x, y)| source.get_pixel(x, y));
        // Every offset saturates, so each pixel comes from a corner or an edge
        assert!(out.pixels().all(|p| source.pixels().any(|q| q == p)));
        assert!(out.pixels().any(|p| corners.contains(&Some(p))));
    }

    #[test]
    fn test_local_shuffle_zero_spread() {
        let source = noisy(8, 8);
        let options = Options::default().with_spread(0.0);
        assert_eq!(run(Effect::LocalShuffle, &ParallelEngine, &source, &options), source);
    }

    #[test]
    fn test_blur_flat_and_size() {
        let source = PixelBuffer::filled(13, 6, [10, 200, 90, 255]);
        let options = Options::default().with_kernel_size(6);
        let out = run(Effect::GaussianBlur, &ParallelEngine, &source, &options);
        assert_eq!(out, source);
    }

    #[test]
    fn test_blur_rejects_zero_kernel() {
        let source = PixelBuffer::filled(4, 4, [0, 0, 0, 255]);
        let options = Options::default().with_kernel_size(0);
        let result = ParallelEngine.run(
            Effect::GaussianBlur,
            &source,
            &options,
            &mut Rng::new(0),
            &mut Progress::silent(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_kernel_is_normalized() {
        for sigma in [0.5, 1.0, 7.5, 25.0] {
            let kernel = gaussian_kernel_1d(sigma);
            assert_eq!(kernel.len() % 2, 1);
            let sum: f32 = kernel.iter().sum();
            assert!((sum - 1.0).abs() < 1e-4);
        }
    }
}
