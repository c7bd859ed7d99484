//! Effect engines
//!
//! An [`EffectEngine`] runs effects on some kind of hardware. Every engine
//! takes and returns the same types; which one handles an effect is decided
//! by [`Processor`] from what was found at startup, never by the caller.
//!
//! - [`CpuEngine`] - sequential reference implementation, supports every effect
//! - [`ParallelEngine`] - data-parallel kernels for the per-pixel effects,
//!   available when more than one hardware thread exists

mod cpu;
mod parallel;
mod processor;

pub use cpu::CpuEngine;
pub use parallel::ParallelEngine;
pub use processor::Processor;

use crate::effects::Effect;
use crate::error::Result;
use crate::options::Options;
use crate::progress::Progress;
use crate::raster::PixelBuffer;
use crate::util::RandomSource;

/// Kind of hardware an engine runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    /// Single thread, sequential loops
    Cpu,
    /// All hardware threads, one independent kernel per pixel or row
    Parallel,
}

/// One implementation of the effect contract.
///
/// `run` must validate `options`, leave `source` untouched and return a
/// newly allocated buffer. Pixel values may differ between engines for the
/// random effects; dimensions and types may not.
pub trait EffectEngine: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> EngineKind;

    /// Whether this engine implements `effect`
    fn supports(&self, effect: Effect) -> bool;

    fn run(
        &self,
        effect: Effect,
        source: &PixelBuffer,
        options: &Options,
        rng: &mut dyn RandomSource,
        progress: &mut Progress<'_>,
    ) -> Result<PixelBuffer>;
}
