//! File decoders for images and depth maps.

mod depth;
mod rgb;

pub use depth::*;
pub use rgb::*;
