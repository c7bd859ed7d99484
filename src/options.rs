//! Effect parameters.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::effects::Effect;
use crate::error::{ConfigError, Result};

/// Flat parameter record shared by every effect.
///
/// Fields are independent; each effect reads only the ones it needs and
/// [`Options::validate`] checks only those.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// Working width for resized shuffles and creations
    pub width: u32,
    /// Working height for resized shuffles and creations
    pub height: u32,
    /// Tile edge for the bined effects
    pub block_size: u32,
    /// Local shuffle spread, as a fraction of a quarter of the longer side
    pub spread: f32,
    /// Blur kernel size; the blur radius is half of it
    pub kernel_size: u32,
    pub boost_red: f32,
    pub boost_green: f32,
    pub boost_blue: f32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            block_size: 16,
            spread: 0.25,
            kernel_size: 50,
            boost_red: 0.4,
            boost_green: 0.3,
            boost_blue: 0.2,
        }
    }
}

impl Options {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_block_size(mut self, block_size: u32) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_spread(mut self, spread: f32) -> Self {
        self.spread = spread;
        self
    }

    pub fn with_kernel_size(mut self, kernel_size: u32) -> Self {
        self.kernel_size = kernel_size;
        self
    }

    pub fn with_boost(mut self, red: f32, green: f32, blue: f32) -> Self {
        self.boost_red = red;
        self.boost_green = green;
        self.boost_blue = blue;
        self
    }

    /// Blur radius derived from the kernel size
    pub fn blur_radius(&self) -> f32 {
        self.kernel_size as f32 / 2.0
    }

    /// Boost factors as [r, g, b]
    pub fn boost(&self) -> [f32; 3] {
        [self.boost_red, self.boost_green, self.boost_blue]
    }

    /// Check the fields `effect` depends on.
    pub fn validate(&self, effect: Effect) -> Result<(), ConfigError> {
        if effect.uses_working_size() && (self.width == 0 || self.height == 0) {
            return Err(ConfigError::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        match effect {
            Effect::BinedShuffle | Effect::BinedColorShuffle if self.block_size == 0 => {
                Err(ConfigError::ZeroBlockSize)
            },
            Effect::LocalShuffle if !(self.spread.is_finite() && self.spread >= 0.0) => {
                Err(ConfigError::InvalidSpread(self.spread))
            },
            Effect::GaussianBlur if self.kernel_size == 0 => Err(ConfigError::ZeroKernel),
            Effect::Boost if !self.boost().iter().all(|b| b.is_finite()) => {
                Err(ConfigError::NonFiniteBoost {
                    red: self.boost_red,
                    green: self.boost_green,
                    blue: self.boost_blue,
                })
            },
            _ => Ok(()),
        }
    }

    /// Save options to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load options from a JSON file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
