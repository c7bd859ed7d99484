mod bined_shuffle;
mod blur;
mod boost;
mod color_shuffle;
mod global_shuffle;
mod gradient;
mod invert;
mod local_shuffle;

pub use gradient::{gradient_with_corners, Corners};

pub(crate) use bined_shuffle::bined_shuffle;
pub(crate) use blur::gaussian_blur;
pub(crate) use boost::{boost, boost_value, ChannelSums};
pub(crate) use color_shuffle::bined_color_shuffle;
pub(crate) use global_shuffle::global_shuffle;
pub(crate) use gradient::gradient;
pub(crate) use invert::{invert, invert_pixel};
pub(crate) use local_shuffle::{effective_spread, local_shuffle};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, Result};
use crate::options::Options;
use crate::progress::Progress;
use crate::raster::{self, PixelBuffer};
use crate::util::RandomSource;

/// UI grouping for effects. Has no influence on behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Shuffles,
    Transforms,
    Creations,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Shuffles, Category::Transforms, Category::Creations];

    pub fn name(self) -> &'static str {
        match self {
            Category::Shuffles => "Shuffles",
            Category::Transforms => "Transforms",
            Category::Creations => "Creations",
        }
    }

    /// Effects in this category, in menu order
    pub fn effects(self) -> impl Iterator<Item = Effect> {
        Effect::ALL.into_iter().filter(move |e| e.category() == self)
    }
}

/// The closed set of effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Effect {
    /// Fisher-Yates over every pixel of the working image
    GlobalShuffle,
    /// Pixels permuted within fixed square tiles
    BinedShuffle,
    /// Raster-order swaps with Gaussian-displaced neighbours
    LocalShuffle,
    /// Mosaic synthesized from a sampled HSL palette
    BinedColorShuffle,
    Invert,
    /// Per-channel z-score normalization with tanh soft clip
    Boost,
    GaussianBlur,
    /// Bilinear blend of four random corner colors
    Gradient,
}

impl Effect {
    pub const ALL: [Effect; 8] = [
        Effect::GlobalShuffle,
        Effect::BinedShuffle,
        Effect::LocalShuffle,
        Effect::BinedColorShuffle,
        Effect::Invert,
        Effect::Boost,
        Effect::GaussianBlur,
        Effect::Gradient,
    ];

    pub fn category(self) -> Category {
        match self {
            Effect::GlobalShuffle
            | Effect::BinedShuffle
            | Effect::LocalShuffle
            | Effect::BinedColorShuffle => Category::Shuffles,
            Effect::Invert | Effect::Boost | Effect::GaussianBlur => Category::Transforms,
            Effect::Gradient => Category::Creations,
        }
    }

    /// Display name for menus
    pub fn name(self) -> &'static str {
        match self {
            Effect::GlobalShuffle => "Global Shuffle",
            Effect::BinedShuffle => "Bined Shuffle",
            Effect::LocalShuffle => "Local Shuffle",
            Effect::BinedColorShuffle => "Color Shuffle",
            Effect::Invert => "Invert",
            Effect::Boost => "Boost",
            Effect::GaussianBlur => "Gaussian Blur",
            Effect::Gradient => "Gradient",
        }
    }

    /// Stable identifier for files and command lines
    pub fn slug(self) -> &'static str {
        match self {
            Effect::GlobalShuffle => "global-shuffle",
            Effect::BinedShuffle => "bined-shuffle",
            Effect::LocalShuffle => "local-shuffle",
            Effect::BinedColorShuffle => "bined-color-shuffle",
            Effect::Invert => "invert",
            Effect::Boost => "boost",
            Effect::GaussianBlur => "gaussian-blur",
            Effect::Gradient => "gradient",
        }
    }

    /// True if the output has the `Options` working size rather than the
    /// source size
    pub fn uses_working_size(self) -> bool {
        matches!(
            self,
            Effect::GlobalShuffle
                | Effect::BinedShuffle
                | Effect::BinedColorShuffle
                | Effect::Gradient
        )
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognized effect name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown effect '{0}'")]
pub struct UnknownEffect(pub String);

impl FromStr for Effect {
    type Err = UnknownEffect;

    /// Accepts the slug or the display name, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Effect::ALL
            .into_iter()
            .find(|e| e.slug().eq_ignore_ascii_case(wanted) || e.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownEffect(s.to_string()))
    }
}

/// Run `effect` on the CPU.
///
/// Validates `options` for the effect, resizes to the working size where
/// the effect calls for it, and always returns a newly allocated buffer.
pub fn run(
    effect: Effect,
    source: &PixelBuffer,
    options: &Options,
    rng: &mut dyn RandomSource,
    progress: &mut Progress<'_>,
) -> Result<PixelBuffer> {
    options.validate(effect)?;
    check_source(effect, source)?;
    let output = match effect {
        Effect::GlobalShuffle => {
            global_shuffle(working_copy(source, options), rng, progress)
        },
        Effect::BinedShuffle => bined_shuffle(
            working_copy(source, options),
            options.block_size,
            rng,
            progress,
        ),
        Effect::LocalShuffle => local_shuffle(source.clone(), options.spread, rng, progress),
        Effect::BinedColorShuffle => bined_color_shuffle(
            &working_copy(source, options),
            options.block_size,
            rng,
            progress,
        ),
        Effect::Invert => invert(source.clone()),
        Effect::Boost => boost(source.clone(), options.boost()),
        Effect::GaussianBlur => gaussian_blur(source, options.blur_radius()),
        Effect::Gradient => gradient(options.width, options.height, rng),
    };
    Ok(output)
}

/// Reject zero-area sources for every effect that reads its input
pub(crate) fn check_source(effect: Effect, source: &PixelBuffer) -> Result<(), DecodeError> {
    if effect != Effect::Gradient && source.pixel_count() == 0 {
        return Err(DecodeError::Empty {
            width: source.width(),
            height: source.height(),
        });
    }
    Ok(())
}

/// Owned copy of `source` at the working size
fn working_copy(source: &PixelBuffer, options: &Options) -> PixelBuffer {
    raster::resize(source, options.width, options.height)
}
