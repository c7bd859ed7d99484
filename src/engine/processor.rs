//! The single entry point for running effects.

use std::time::Instant;

use image::DynamicImage;
use log::{debug, info, warn};

use super::{CpuEngine, EffectEngine, ParallelEngine};
use crate::effects::Effect;
use crate::error::Result;
use crate::options::Options;
use crate::progress::{Progress, ProgressSink, SharedProgress};
use crate::raster::{self, PixelBuffer};
use crate::util::{RandomSource, Rng};

/// Forwards every update to the shared handle and an optional subscriber
struct Fanout<'a> {
    shared: &'a SharedProgress,
    extra: Option<&'a dyn ProgressSink>,
}

impl ProgressSink for Fanout<'_> {
    fn report(&self, fraction: f32) {
        self.shared.report(fraction);
        if let Some(sink) = self.extra {
            sink.report(fraction);
        }
    }
}

/// Runs effects on whichever engine suits them.
///
/// Engines are probed once at construction and tried in order; the CPU
/// engine is always last and supports everything. The processor owns the
/// random source, so `apply` needs `&mut self` and one processor cannot run
/// two effects at once.
///
/// ```no_run
/// use madpixels::{Effect, Options, Processor};
///
/// let image = image::open("photo.png")?;
/// let mut processor = Processor::new();
/// let out = processor.apply(Effect::Boost, &image, &Options::default())?;
/// out.save("boosted.png")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Processor {
    engines: Vec<Box<dyn EffectEngine>>,
    rng: Box<dyn RandomSource>,
    progress: SharedProgress,
    sink: Option<Box<dyn ProgressSink>>,
}

impl Default for Processor {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor {
    /// Probe for the parallel engine and seed from entropy
    pub fn new() -> Self {
        let mut engines: Vec<Box<dyn EffectEngine>> = Vec::new();
        match ParallelEngine::probe() {
            Some(engine) => engines.push(Box::new(engine)),
            None => warn!("single hardware thread; parallel engine disabled"),
        }
        Self::with_engines(engines, Rng::from_entropy())
    }

    /// CPU engine only. Together with `with_seed` this makes every effect
    /// reproducible.
    pub fn cpu_only() -> Self {
        Self::with_engines(Vec::new(), Rng::from_entropy())
    }

    fn with_engines(mut engines: Vec<Box<dyn EffectEngine>>, rng: Rng) -> Self {
        engines.push(Box::new(CpuEngine));
        let names: Vec<&str> = engines.iter().map(|e| e.name()).collect();
        info!("processor engines: [{}], seed {}", names.join(", "), rng.seed());
        Self {
            engines,
            rng: Box::new(rng),
            progress: SharedProgress::new(),
            sink: None,
        }
    }

    /// Replace the random source with a seeded one
    pub fn with_seed(self, seed: u64) -> Self {
        debug!("processor reseeded with {}", seed);
        self.with_rng(Rng::new(seed))
    }

    pub fn with_rng(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Also send progress updates to `sink`
    pub fn with_sink(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Try `engine` before every engine already registered
    pub fn with_engine(mut self, engine: Box<dyn EffectEngine>) -> Self {
        debug!("engine '{}' registered first", engine.name());
        self.engines.insert(0, engine);
        self
    }

    /// Handle for polling progress from another thread
    pub fn progress(&self) -> SharedProgress {
        self.progress.clone()
    }

    /// Names of the registered engines, in the order they are tried
    pub fn engines(&self) -> impl Iterator<Item = &str> {
        self.engines.iter().map(|e| e.name())
    }

    /// Name of the engine that will run `effect`
    pub fn engine_for(&self, effect: Effect) -> &str {
        select(&self.engines, effect).name()
    }

    /// Apply `effect` to `image` and return a new image.
    ///
    /// `image` is never modified. Gradient does not read its input, so any
    /// image (even an empty one) is accepted for it.
    pub fn apply(
        &mut self,
        effect: Effect,
        image: &DynamicImage,
        options: &Options,
    ) -> Result<DynamicImage> {
        let source = if effect == Effect::Gradient {
            PixelBuffer::with_size(0, 0)
        } else {
            raster::decode(image)?
        };
        let output = self.apply_buffer(effect, &source, options)?;
        Ok(raster::encode(output))
    }

    /// Apply `effect` to a raw buffer.
    ///
    /// Progress goes to 0.0 and busy when work starts and to 1.0 and idle
    /// when it ends, whether or not the effect succeeded.
    pub fn apply_buffer(
        &mut self,
        effect: Effect,
        source: &PixelBuffer,
        options: &Options,
    ) -> Result<PixelBuffer> {
        let Self {
            engines,
            rng,
            progress,
            sink,
        } = self;

        let engine = select(engines, effect);
        let fanout = Fanout {
            shared: progress,
            extra: sink.as_deref(),
        };

        progress.begin();
        let mut reporter = Progress::new(&fanout);
        reporter.start();

        let started = Instant::now();
        let result = engine.run(effect, source, options, &mut **rng, &mut reporter);

        reporter.finish();
        progress.finish();

        match &result {
            Ok(out) => info!(
                "{} on {}: {}x{} -> {}x{} in {:.1?}",
                effect,
                engine.name(),
                source.width(),
                source.height(),
                out.width(),
                out.height(),
                started.elapsed()
            ),
            Err(e) => warn!("{} on {} failed: {}", effect, engine.name(), e),
        }
        result
    }
}

/// First engine supporting `effect`; the CPU engine when none does
fn select(engines: &[Box<dyn EffectEngine>], effect: Effect) -> &dyn EffectEngine {
    match engines.iter().find(|e| e.supports(effect)) {
        Some(engine) => engine.as_ref(),
        None => &CpuEngine,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, DecodeError, Error};
    use crate::engine::EngineKind;
    use image::RgbaImage;
    use std::sync::{Arc, Mutex};

    fn red_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 255])))
    }

    fn noisy(width: u32, height: u32) -> PixelBuffer {
        let mut buffer = PixelBuffer::with_size(width, height);
        for i in 0..buffer.pixel_count() {
            let v = (i * 37 % 256) as u8;
            buffer.set_pixel_at(i, [v, v / 3, 255 - v, 255]);
        }
        buffer
    }

    #[test]
    fn test_global_shuffle_of_flat_image() {
        let mut processor = Processor::cpu_only().with_seed(1);
        let options = Options::default().with_size(4, 4);
        let out = processor
            .apply(Effect::GlobalShuffle, &red_image(4, 4), &options)
            .unwrap()
            .to_rgba8();
        assert_eq!(out.dimensions(), (4, 4));
        assert!(out.pixels().all(|p| p.0 == [255, 0, 0, 255]));
    }

    #[test]
    fn test_boost_of_flat_image_is_midpoint() {
        let mut processor = Processor::new();
        let options = Options::default().with_boost(1.0, 1.0, 1.0);
        let out = processor
            .apply(Effect::Boost, &red_image(4, 4), &options)
            .unwrap()
            .to_rgba8();
        assert!(out.pixels().all(|p| p.0 == [128, 128, 128, 255]));
    }

    #[test]
    fn test_progress_runs_from_zero_to_one() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let mut processor = Processor::cpu_only()
            .with_seed(3)
            .with_sink(move |f: f32| log.lock().unwrap().push(f));
        let handle = processor.progress();
        let options = Options::default().with_size(150, 150);
        processor
            .apply_buffer(Effect::GlobalShuffle, &noisy(20, 20), &options)
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.first(), Some(&0.0));
        assert_eq!(seen.last(), Some(&1.0));
        assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{seen:?}");
        assert!(seen.len() > 2);
        assert_eq!(handle.fraction(), 1.0);
        assert!(!handle.is_busy());
    }

    #[test]
    fn test_caller_buffer_untouched() {
        let source = noisy(12, 9);
        let before = source.clone();
        let mut processor = Processor::new().with_seed(8);
        let options = Options::default().with_size(12, 9).with_block_size(3);
        for effect in Effect::ALL {
            let out = processor.apply_buffer(effect, &source, &options).unwrap();
            assert_eq!(source, before, "{effect}");
            if !effect.uses_working_size() {
                assert_eq!((out.width(), out.height()), (12, 9));
            }
        }
    }

    #[test]
    fn test_invalid_options_fail_and_finish_progress() {
        let mut processor = Processor::cpu_only();
        let handle = processor.progress();
        let options = Options::default().with_block_size(0);
        let result = processor.apply(Effect::BinedColorShuffle, &red_image(8, 8), &options);
        assert!(matches!(result, Err(Error::Config(ConfigError::ZeroBlockSize))));
        assert!(!handle.is_busy());
        assert_eq!(handle.fraction(), 1.0);
    }

    #[test]
    fn test_empty_image_is_a_decode_error() {
        let mut processor = Processor::cpu_only();
        let empty = DynamicImage::new_rgba8(0, 0);
        let result = processor.apply(Effect::Invert, &empty, &Options::default());
        assert!(matches!(result, Err(Error::Decode(DecodeError::Empty { .. }))));
    }

    #[test]
    fn test_gradient_ignores_input() {
        let mut processor = Processor::new();
        let options = Options::default().with_size(30, 20);
        let out = processor
            .apply(Effect::Gradient, &DynamicImage::new_rgba8(0, 0), &options)
            .unwrap();
        assert_eq!((out.width(), out.height()), (30, 20));
    }

    #[test]
    fn test_seeded_cpu_runs_are_reproducible() {
        let source = noisy(16, 16);
        let options = Options::default().with_size(16, 16).with_block_size(4);
        for effect in [Effect::GlobalShuffle, Effect::LocalShuffle, Effect::BinedColorShuffle] {
            let a = Processor::cpu_only().with_seed(99).apply_buffer(effect, &source, &options);
            let b = Processor::cpu_only().with_seed(99).apply_buffer(effect, &source, &options);
            assert_eq!(a.unwrap(), b.unwrap(), "{effect}");
        }
    }

    #[test]
    fn test_extreme_but_valid_options_do_not_panic() {
        let source = noisy(8, 8);
        let huge_spread = Options::default().with_spread(1e20);
        for mut processor in [
            Processor::cpu_only(),
            Processor::cpu_only().with_engine(Box::new(ParallelEngine)),
        ] {
            let out = processor
                .apply_buffer(Effect::LocalShuffle, &source, &huge_spread)
                .unwrap();
            assert_eq!((out.width(), out.height()), (8, 8));
        }

        let huge_block = Options::default().with_size(16, 16).with_block_size(u32::MAX);
        let mut processor = Processor::cpu_only().with_seed(2);
        let tiled = processor
            .apply_buffer(Effect::BinedShuffle, &source, &huge_block)
            .unwrap();
        assert_eq!(tiled, raster::resize(&source, 16, 16));
        let mosaic = processor
            .apply_buffer(Effect::BinedColorShuffle, &source, &huge_block)
            .unwrap();
        assert!(mosaic.pixels().all(|p| p == [255; 4]));
    }

    #[test]
    fn test_engine_routing() {
        let processor = Processor::cpu_only().with_engine(Box::new(ParallelEngine));
        assert_eq!(processor.engines().collect::<Vec<_>>(), vec!["parallel", "cpu"]);
        assert_eq!(processor.engine_for(Effect::Invert), "parallel");
        assert_eq!(processor.engine_for(Effect::GlobalShuffle), "cpu");
        assert_eq!(Processor::cpu_only().engine_for(Effect::Invert), "cpu");
        assert_eq!(select(&[], Effect::Boost).kind(), EngineKind::Cpu);
    }
}
