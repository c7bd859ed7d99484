//! Error types for madpixels.

use thiserror::Error;

/// The source has no usable pixel data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The image has a zero dimension.
    #[error("cannot process this image: empty raster ({width}x{height})")]
    Empty {
        /// Reported width.
        width: u32,
        /// Reported height.
        height: u32,
    },

    /// Raw data does not match `width * height * 4`.
    #[error("cannot process this image: expected {expected} bytes of RGBA data, got {actual}")]
    Length {
        /// Byte count implied by the dimensions.
        expected: usize,
        /// Byte count actually supplied.
        actual: usize,
    },

    /// The encoded bytes could not be decoded into a raster.
    #[error("cannot process this image: {0}")]
    Format(String),
}

/// An option value makes the selected effect ill-defined.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Working width or height is zero.
    #[error("working size must be at least 1x1, got {width}x{height}")]
    ZeroDimension {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// Block size of zero.
    #[error("block size must be at least 1")]
    ZeroBlockSize,

    /// Blur kernel size of zero (radius would be zero).
    #[error("kernel size must be at least 1")]
    ZeroKernel,

    /// Spread is negative or not a number.
    #[error("spread must be a finite value >= 0, got {0}")]
    InvalidSpread(f32),

    /// One of the boost factors is NaN or infinite.
    #[error("boost factors must be finite, got ({red}, {green}, {blue})")]
    NonFiniteBoost {
        /// Red factor.
        red: f32,
        /// Green factor.
        green: f32,
        /// Blue factor.
        blue: f32,
    },
}

/// Errors returned by [`Processor`](crate::Processor) and the raster helpers.
#[derive(Debug, Error)]
pub enum Error {
    /// Source image has no accessible pixel buffer.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Options rejected for the selected effect.
    #[error("invalid options: {0}")]
    Config(#[from] ConfigError),

    /// Reading or writing a file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding an image file failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Options file could not be parsed or written.
    #[error("options file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_message() {
        let err = DecodeError::Empty {
            width: 0,
            height: 10,
        };
        assert_eq!(
            err.to_string(),
            "cannot process this image: empty raster (0x10)"
        );
    }

    #[test]
    fn test_config_error_converts() {
        let err: Error = ConfigError::ZeroBlockSize.into();
        assert!(matches!(err, Error::Config(ConfigError::ZeroBlockSize)));
        assert_eq!(err.to_string(), "invalid options: block size must be at least 1");
    }
}
