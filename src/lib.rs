//! Pixel-level image effects
//!
//! Takes an image, runs one of a fixed set of effects on an RGBA8 copy of
//! it and hands back a new image. The effects fall into three groups:
//!
//! - Shuffles: permute pixels globally, inside square tiles or around
//!   their own position, or rebuild the image as a mosaic of sampled colors
//! - Transforms: invert, per-channel contrast boost, Gaussian blur
//! - Creations: a four-corner gradient that ignores the input
//!
//! [`Processor`] is the entry point. It owns the random source, reports
//! progress and routes each effect to the fastest engine available.

pub mod color;
pub mod effects;
pub mod engine;
pub mod error;
pub mod options;
pub mod progress;
pub mod raster;
pub mod util;

pub use effects::{Category, Effect, UnknownEffect};
pub use engine::{CpuEngine, EffectEngine, EngineKind, ParallelEngine, Processor};
pub use error::{ConfigError, DecodeError, Error, Result};
pub use options::Options;
pub use progress::{ChannelSink, ProgressSink, ProgressState, SharedProgress};
pub use raster::PixelBuffer;
pub use util::{RandomSource, Rng};
