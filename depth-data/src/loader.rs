//! Batched and parallel sample loading.

use crate::{
    common::*,
    config::LoaderConfig,
    dataset::DepthDataset,
    sample::{DisparitySample, InpaintingSample, Sample},
};
use futures::stream::BoxStream;

#[derive(Debug, Clone)]
pub struct DataLoaderInit {
    pub batch_size: usize,
    /// If set, the sample order is shuffled every epoch.
    pub shuffle: bool,
    /// The maximum number of samples assembled concurrently.
    pub num_workers: usize,
    /// The master seed. The loader is seeded from entropy if unset.
    pub seed: Option<u64>,
    /// The device where batches are delivered.
    pub device: Device,
}

impl DataLoaderInit {
    pub fn build(self) -> Result<DataLoader> {
        let Self {
            batch_size,
            shuffle,
            num_workers,
            seed,
            device,
        } = self;

        ensure!(batch_size > 0, "batch_size must be positive");
        ensure!(num_workers > 0, "num_workers must be positive");

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(DataLoader {
            batch_size,
            shuffle,
            num_workers,
            device,
            rng,
        })
    }
}

impl From<&LoaderConfig> for DataLoaderInit {
    fn from(from: &LoaderConfig) -> Self {
        let LoaderConfig {
            batch_size,
            shuffle,
            num_workers,
            seed,
            device,
        } = *from;

        Self {
            batch_size: batch_size.get(),
            shuffle,
            num_workers: num_workers.get(),
            seed,
            device,
        }
    }
}

/// Iterates a [DepthDataset] in batches.
#[derive(Debug)]
pub struct DataLoader {
    batch_size: usize,
    shuffle: bool,
    num_workers: usize,
    device: Device,
    rng: StdRng,
}

impl DataLoader {
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// The number of batches in an epoch of `dataset`.
    pub fn num_batches(&self, dataset: &DepthDataset) -> usize {
        (dataset.len() + self.batch_size - 1) / self.batch_size
    }

    /// Produce the batches of one epoch.
    ///
    /// Samples are assembled on blocking worker threads and delivered in
    /// order. The last batch has fewer samples if the dataset size is not a
    /// multiple of the batch size. Every sample draws its randomness from a
    /// generator seeded by the loader, so a seeded loader yields the same
    /// epochs regardless of scheduling.
    ///
    /// It must be polled within a tokio runtime.
    pub fn stream(&mut self, dataset: Arc<DepthDataset>) -> BoxStream<'static, Result<Batch>> {
        let Self {
            batch_size,
            shuffle,
            num_workers,
            device,
            ref mut rng,
        } = *self;

        let mut indexes = (0..dataset.len()).collect_vec();
        if shuffle {
            indexes.shuffle(rng);
        }
        let seeds: Vec<u64> = (0..indexes.len()).map(|_| rng.gen()).collect();

        stream::iter(izip!(indexes, seeds))
            .map(move |(index, seed)| {
                let dataset = dataset.clone();

                async move {
                    let sample = tokio::task::spawn_blocking(move || {
                        let mut rng = StdRng::seed_from_u64(seed);
                        dataset.get(index, &mut rng)
                    })
                    .await??;
                    Fallible::Ok(sample)
                }
            })
            .buffered(num_workers)
            .chunks(batch_size)
            .map(move |samples| {
                let samples: Vec<_> = samples.into_iter().try_collect()?;
                let batch = Batch::collate(samples)?;
                Ok(batch.prepare_transfer(device))
            })
            .boxed()
    }
}

/// A batch of [DisparitySample]s stacked along the first dimension.
#[derive(Debug, TensorLike)]
pub struct DisparityBatch {
    /// `[batch, 3, h, w]`
    pub image: Tensor,
    /// `[batch, 1, h, w]`
    pub disparity: Tensor,
    /// `[batch, 1, h, w]`
    pub mask: Tensor,
    /// `[batch, 3, size, size]`
    pub auxiliary: Tensor,
    #[tensor_like(clone)]
    pub dataset_ids: Vec<usize>,
}

/// A batch of [InpaintingSample]s stacked along the first dimension.
#[derive(Debug, TensorLike)]
pub struct InpaintingBatch {
    pub image: Tensor,
    pub disparity: Tensor,
    pub depth: Tensor,
    /// `[batch, 4]` windows in `(cy, cx, h, w)` order.
    pub zoom_from: Tensor,
    /// `[batch, 4]` windows in `(cy, cx, h, w)` order.
    pub zoom_to: Tensor,
    #[tensor_like(clone)]
    pub dataset_ids: Vec<usize>,
}

#[derive(Debug, TensorLike)]
pub enum Batch {
    Disparity(DisparityBatch),
    Inpainting(InpaintingBatch),
}

impl Batch {
    /// Stack samples of the same kind into a batch.
    pub fn collate(samples: Vec<Sample>) -> Result<Self> {
        ensure!(!samples.is_empty(), "cannot collate an empty batch");

        let batch = match samples[0] {
            Sample::Disparity(_) => {
                let (images, disparities, masks, auxiliaries, dataset_ids) = samples
                    .into_iter()
                    .map(|sample| match sample {
                        Sample::Disparity(DisparitySample {
                            image,
                            disparity,
                            mask,
                            auxiliary,
                            dataset_id,
                        }) => Ok((image, disparity, mask, auxiliary, dataset_id)),
                        Sample::Inpainting(_) => bail!("cannot mix sample kinds in a batch"),
                    })
                    .collect::<Result<Vec<_>>>()?
                    .into_iter()
                    .unzip_n_vec();

                Self::Disparity(DisparityBatch {
                    image: Tensor::stack(&images, 0),
                    disparity: Tensor::stack(&disparities, 0),
                    mask: Tensor::stack(&masks, 0),
                    auxiliary: Tensor::stack(&auxiliaries, 0),
                    dataset_ids,
                })
            }
            Sample::Inpainting(_) => {
                let (images, disparities, depths, zoom_froms, zoom_tos, dataset_ids) = samples
                    .into_iter()
                    .map(|sample| match sample {
                        Sample::Inpainting(InpaintingSample {
                            image,
                            disparity,
                            depth,
                            zoom_from,
                            zoom_to,
                            dataset_id,
                        }) => Ok((
                            image,
                            disparity,
                            depth,
                            zoom_from.to_tensor(),
                            zoom_to.to_tensor(),
                            dataset_id,
                        )),
                        Sample::Disparity(_) => bail!("cannot mix sample kinds in a batch"),
                    })
                    .collect::<Result<Vec<_>>>()?
                    .into_iter()
                    .unzip_n_vec();

                Self::Inpainting(InpaintingBatch {
                    image: Tensor::stack(&images, 0),
                    disparity: Tensor::stack(&disparities, 0),
                    depth: Tensor::stack(&depths, 0),
                    zoom_from: Tensor::stack(&zoom_froms, 0),
                    zoom_to: Tensor::stack(&zoom_tos, 0),
                    dataset_ids,
                })
            }
        };

        Ok(batch)
    }

    pub fn len(&self) -> usize {
        self.dataset_ids().len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset_ids().is_empty()
    }

    pub fn dataset_ids(&self) -> &[usize] {
        match self {
            Self::Disparity(batch) => &batch.dataset_ids,
            Self::Inpainting(batch) => &batch.dataset_ids,
        }
    }

    pub fn image(&self) -> &Tensor {
        match self {
            Self::Disparity(batch) => &batch.image,
            Self::Inpainting(batch) => &batch.image,
        }
    }

    /// Copy the batch to `device`, leaving `self` untouched.
    pub fn prepare_transfer(&self, device: Device) -> Self {
        self.to_device(device)
    }
}
