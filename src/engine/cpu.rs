//! CPU engine.

use super::{EffectEngine, EngineKind};
use crate::effects::{self, Effect};
use crate::error::Result;
use crate::options::Options;
use crate::progress::Progress;
use crate::raster::PixelBuffer;
use crate::util::RandomSource;

/// Sequential engine. Always available and supports every effect, so it
/// is the fallback for anything a faster engine does not cover.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuEngine;

impl EffectEngine for CpuEngine {
    fn name(&self) -> &str {
        "cpu"
    }

    fn kind(&self) -> EngineKind {
        EngineKind::Cpu
    }

    fn supports(&self, _effect: Effect) -> bool {
        true
    }

    fn run(
        &self,
        effect: Effect,
        source: &PixelBuffer,
        options: &Options,
        rng: &mut dyn RandomSource,
        progress: &mut Progress<'_>,
    ) -> Result<PixelBuffer> {
        effects::run(effect, source, options, rng, progress)
    }
}
