use crate::error::DecodeError;

/// Bytes per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

// ============================================================================
// PixelBuffer
// ============================================================================

/// RGBA8 pixel buffer, row-major, 4 interleaved channels.
/// Every effect reads one of these and returns a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Create a transparent black buffer
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; byte_len(width, height)],
            width,
            height,
        }
    }

    /// Create a buffer where every pixel is `rgba`
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut buffer = Self::with_size(width, height);
        buffer.fill(rgba);
        buffer
    }

    /// Wrap raw RGBA bytes.
    ///
    /// Fails if a dimension is zero or `bytes.len() != width * height * 4`.
    pub fn from_raw(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self, DecodeError> {
        if width == 0 || height == 0 {
            return Err(DecodeError::Empty { width, height });
        }
        let expected = byte_len(width, height);
        if bytes.len() != expected {
            return Err(DecodeError::Length {
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            pixels: bytes,
            width,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels (not bytes)
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Linear pixel index of (x, y)
    #[inline]
    pub fn pixel_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Read pixel (x, y) as [r, g, b, a], None if out of bounds
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.width && y < self.height {
            Some(self.pixel_at(self.pixel_index(x, y)))
        } else {
            None
        }
    }

    /// Write pixel (x, y); out-of-bounds writes are ignored
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x < self.width && y < self.height {
            let idx = self.pixel_index(x, y);
            self.set_pixel_at(idx, rgba);
        }
    }

    /// Read the pixel at linear index `i`
    ///
    /// # Panics
    /// Panics if `i >= pixel_count()`
    #[inline]
    pub fn pixel_at(&self, i: usize) -> [u8; 4] {
        let o = i * CHANNELS;
        [
            self.pixels[o],
            self.pixels[o + 1],
            self.pixels[o + 2],
            self.pixels[o + 3],
        ]
    }

    /// Write the pixel at linear index `i`
    ///
    /// # Panics
    /// Panics if `i >= pixel_count()`
    #[inline]
    pub fn set_pixel_at(&mut self, i: usize, rgba: [u8; 4]) {
        let o = i * CHANNELS;
        self.pixels[o..o + CHANNELS].copy_from_slice(&rgba);
    }

    /// Swap all 4 channels of two pixels by linear index
    #[inline]
    pub fn swap_pixels(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        let (head, tail) = self.pixels.split_at_mut(hi * CHANNELS);
        head[lo * CHANNELS..(lo + 1) * CHANNELS].swap_with_slice(&mut tail[..CHANNELS]);
    }

    /// Fill every pixel with one color
    pub fn fill(&mut self, rgba: [u8; 4]) {
        for px in self.pixels.chunks_exact_mut(CHANNELS) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Iterate pixels in raster order
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.pixels
            .chunks_exact(CHANNELS)
            .map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Get raw bytes (RGBA order)
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Get mutable raw bytes (for effects that work on whole rows)
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Give up ownership of the bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }
}

#[inline]
fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * CHANNELS
}
