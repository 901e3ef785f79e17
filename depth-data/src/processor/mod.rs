//! Sample transforms and augmentations.

pub mod crop;
pub mod normalize;
pub mod random_resized_crop;
pub mod resize;
pub mod transform;
pub mod zoom;

pub use crop::*;
pub use normalize::*;
pub use random_resized_crop::*;
pub use resize::*;
pub use transform::*;
pub use zoom::*;
