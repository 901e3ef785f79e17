//! Sample assembler configuration format.

use crate::{common::*, error::DataError, mode::Mode, processor::RandomZoomInit};

/// The sample assembler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleConfig {
    /// The operating mode.
    pub mode: Mode,
    /// The list of image+depth datasets. The position of an entry is its dataset id.
    pub datasets: Vec<DatasetConfig>,
    /// The root of the auxiliary natural image corpus, laid out as `<dir>/<class>/<image>`.
    pub auxiliary_dir: PathBuf,
    /// The bound of the longer side of the resized sample.
    #[serde(default = "default_max_dim")]
    pub max_dim: NonZeroUsize,
    /// The random crop window. Cropping is disabled if set to `null`.
    #[serde(default = "default_crop")]
    pub crop: Option<CropSize>,
    /// The side length of auxiliary images.
    #[serde(default = "default_auxiliary_size")]
    pub auxiliary_size: NonZeroUsize,
    /// The zoom window options used by inpainting modes.
    #[serde(default)]
    pub zoom: RandomZoomInit,
    /// The batched loader options.
    #[serde(default)]
    pub loader: LoaderConfig,
}

impl SampleConfig {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = std::fs::read_to_string(path)?;
        let config = json5::from_str(&text)?;
        Ok(config)
    }

    /// Check the constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.datasets.is_empty() {
            return Err(DataError::config("the dataset list must not be empty").into());
        }
        self.datasets.iter().try_for_each(|dataset| dataset.validate())?;
        if let Some(crop) = &self.crop {
            crop.validate()?;
        }
        self.zoom
            .clone()
            .build()
            .map_err(|err| DataError::config(err.to_string()))?;
        Ok(())
    }
}

/// An image+depth dataset entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// The dataset layout and depth encoding.
    pub name: DatasetKind,
    /// The dataset root containing `images/` and the depth directory.
    pub path: PathBuf,
    pub params: CameraParams,
}

impl DatasetConfig {
    pub fn validate(&self) -> Result<()> {
        let CameraParams { focal, baseline } = self.params;
        if focal <= 0.0 || baseline <= 0.0 {
            return Err(DataError::config(format!(
                "focal and baseline of dataset '{}' must be positive, but get focal={} baseline={}",
                self.path.display(),
                focal,
                baseline
            ))
            .into());
        }
        Ok(())
    }
}

/// Variants of dataset layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// HDF5 depth files in `depth/`, zero depth marks invalid pixels.
    Mega,
    /// OpenEXR depth files in `depths/`, infinite depth marks the far plane.
    Gta,
    /// Image-encoded depth files in `depth/` sharing the image file name.
    Generic,
}

/// Camera parameters used to convert depth to disparity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CameraParams {
    pub focal: R64,
    pub baseline: R64,
}

impl CameraParams {
    /// The product `focal * baseline`.
    pub fn scale(&self) -> f64 {
        (self.focal * self.baseline).raw()
    }
}

/// The crop window size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropSize {
    pub height: usize,
    pub width: usize,
}

impl CropSize {
    pub fn validate(&self) -> Result<()> {
        if self.height == 0 || self.width == 0 {
            return Err(DataError::config("crop height and width must be positive").into());
        }
        Ok(())
    }
}

impl Default for CropSize {
    fn default() -> Self {
        Self {
            height: 756,
            width: 1024,
        }
    }
}

/// Batched loader options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    pub batch_size: NonZeroUsize,
    /// If set, visit samples in random order.
    pub shuffle: bool,
    /// The maximum number of samples assembled concurrently.
    pub num_workers: NonZeroUsize,
    /// The master random seed. Samples are not reproducible if unset.
    pub seed: Option<u64>,
    /// The device where batches are delivered.
    #[serde(with = "tch_serde::serde_device")]
    pub device: Device,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: NonZeroUsize::new(4).unwrap(),
            shuffle: true,
            num_workers: NonZeroUsize::new(2).unwrap(),
            seed: None,
            device: Device::Cpu,
        }
    }
}

fn default_max_dim() -> NonZeroUsize {
    NonZeroUsize::new(1024).unwrap()
}

fn default_crop() -> Option<CropSize> {
    Some(CropSize::default())
}

fn default_auxiliary_size() -> NonZeroUsize {
    NonZeroUsize::new(256).unwrap()
}
