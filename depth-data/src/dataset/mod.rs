//! Dataset indexing and sample assembly.

mod adapter;
mod auxiliary;
mod depth_dataset;
mod index;

pub use adapter::*;
pub use auxiliary::*;
pub use depth_dataset::*;
pub use index::*;
