//! Training sample assembly for depth and disparity estimation.
//!
//! The crate indexes heterogeneous image+depth datasets, converts ground
//! truth depth into disparity and validity masks, and produces cropped,
//! resized and normalized tensors for a training loop. The entry point is
//! [DepthDataset](crate::dataset::DepthDataset).

mod common;
pub mod config;
pub mod dataset;
pub mod error;
pub mod io;
pub mod loader;
pub mod mode;
pub mod processor;
pub mod sample;
pub mod utils;

pub use config::{CameraParams, CropSize, DatasetConfig, DatasetKind, LoaderConfig, SampleConfig};
pub use dataset::{DepthDataset, SampleIndex};
pub use error::DataError;
pub use loader::{Batch, DataLoader, DataLoaderInit};
pub use mode::{Mode, OutputKind, ScaleRatios};
pub use sample::{DisparitySample, InpaintingSample, Sample};
