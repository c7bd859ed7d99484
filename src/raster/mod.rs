mod convert;
mod pixel_buffer;

pub use convert::{decode, decode_bytes, encode, open, resize, save};
pub use pixel_buffer::{PixelBuffer, CHANNELS};
