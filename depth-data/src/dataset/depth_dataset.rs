use super::{AuxiliaryPool, DepthAdapter, SampleIndex};
use crate::{
    common::*,
    config::SampleConfig,
    error::DataError,
    io,
    mode::OutputKind,
    processor::{
        GeometricTransform, GeometricTransformInit, RandomResizedCrop, RandomResizedCropInit,
        RandomZoom, NATURAL_IMAGE_NORM,
    },
    sample::{DisparitySample, InpaintingSample, Sample},
};

/// The random access dataset of training samples.
///
/// The dataset only holds immutable state after construction. Every call to
/// [get](DepthDataset::get) builds its sample from scratch, so the dataset can
/// be shared among workers behind an [Arc].
#[derive(Debug)]
pub struct DepthDataset {
    config: SampleConfig,
    adapters: Vec<Box<dyn DepthAdapter>>,
    index: SampleIndex,
    auxiliary: AuxiliaryPool,
    transform: GeometricTransform,
    auxiliary_crop: RandomResizedCrop,
    zoom: RandomZoom,
}

impl DepthDataset {
    pub fn new(config: SampleConfig) -> Result<Self> {
        config.validate()?;

        let SampleConfig {
            mode,
            ref datasets,
            ref auxiliary_dir,
            max_dim,
            crop,
            auxiliary_size,
            ref zoom,
            ..
        } = config;

        #[cfg(not(feature = "hdf5"))]
        if let Some(dataset) = datasets
            .iter()
            .find(|dataset| dataset.name == crate::config::DatasetKind::Mega)
        {
            return Err(DataError::config(format!(
                "dataset '{}' stores depth in HDF5 files, but the 'hdf5' feature is not enabled",
                dataset.path.display()
            ))
            .into());
        }

        let adapters: Vec<_> = datasets
            .iter()
            .map(|dataset| dataset.name.build_adapter(dataset.params))
            .collect();
        let index = {
            let roots: Vec<_> = datasets
                .iter()
                .map(|dataset| dataset.path.as_path())
                .zip(adapters.iter())
                .collect();
            SampleIndex::build(&roots)?
        };
        let auxiliary = AuxiliaryPool::scan(auxiliary_dir)?;

        izip!(datasets, index.dataset_sizes(datasets.len())).for_each(|(dataset, size)| {
            info!(
                "loaded {} samples from {:?} dataset at '{}'",
                size,
                dataset.name,
                dataset.path.display()
            );
        });
        info!("loaded {} auxiliary images", auxiliary.len());

        let transform = GeometricTransformInit {
            crop,
            max_dim: max_dim.get(),
            ratios: mode.ratios(),
        }
        .build()?;
        let auxiliary_crop = RandomResizedCropInit::new(auxiliary_size.get()).build()?;
        let zoom = zoom.clone().build()?;

        Ok(Self {
            config,
            adapters,
            index,
            auxiliary,
            transform,
            auxiliary_crop,
            zoom,
        })
    }

    pub fn config(&self) -> &SampleConfig {
        &self.config
    }

    pub fn index(&self) -> &SampleIndex {
        &self.index
    }

    pub fn auxiliary(&self) -> &AuxiliaryPool {
        &self.auxiliary
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Count the samples of each dataset in configuration order.
    pub fn dataset_sizes(&self) -> Vec<usize> {
        self.index.dataset_sizes(self.adapters.len())
    }

    /// Assemble the sample at `index`.
    ///
    /// All random choices are drawn from `rng`.
    pub fn get<R>(&self, index: usize, rng: &mut R) -> Result<Sample>
    where
        R: Rng + ?Sized,
    {
        let (image_file, depth_file, dataset_id) =
            self.index.get(index).ok_or(DataError::IndexOutOfRange {
                index,
                len: self.len(),
            })?;

        let image = io::load_rgb_image(image_file)?;
        let maps = self.adapters[dataset_id].load_depth(depth_file)?;

        {
            let (_, image_h, image_w) = image.size3()?;
            let (depth_h, depth_w) = maps.depth.dim();
            if (image_h, image_w) != (depth_h as i64, depth_w as i64) {
                return Err(DataError::decode(
                    depth_file,
                    format!(
                        "depth size {}x{} does not match image size {}x{}",
                        depth_h, depth_w, image_h, image_w
                    ),
                )
                .into());
            }
        }

        let streams = self.transform.forward(&image, &maps, rng)?;

        let sample: Sample = match self.config.mode.output_kind() {
            OutputKind::Disparity => {
                let auxiliary = self.load_auxiliary(rng)?;
                DisparitySample {
                    image: streams.image,
                    disparity: streams.disparity,
                    mask: streams.mask,
                    auxiliary,
                    dataset_id,
                }
                .into()
            }
            OutputKind::Inpainting => {
                let (_, height, width) = streams.depth.size3()?;
                let (zoom_from, zoom_to) = self.zoom.sample(height, width, rng);
                InpaintingSample {
                    image: streams.image,
                    disparity: streams.disparity,
                    depth: streams.depth,
                    zoom_from,
                    zoom_to,
                    dataset_id,
                }
                .into()
            }
        };

        Ok(sample)
    }

    /// Pick a random auxiliary image and produce a normalized square crop.
    fn load_auxiliary<R>(&self, rng: &mut R) -> Result<Tensor>
    where
        R: Rng + ?Sized,
    {
        let path = self.auxiliary.sample(rng);
        let image = io::load_rgb_image(path)?;
        let cropped = self.auxiliary_crop.forward(&image, rng)?;
        NATURAL_IMAGE_NORM.forward(&cropped)
    }
}
