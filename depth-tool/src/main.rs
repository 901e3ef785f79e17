use anyhow::{Context, Result};
use clap::Parser;
use depth_data::{
    loader::{Batch, DataLoaderInit},
    processor::{Normalize, NATURAL_IMAGE_NORM},
    sample::Sample,
    utils, DepthDataset, SampleConfig,
};
use futures::stream::TryStreamExt as _;
use log::info;
use prettytable::{cell, row, Table};
use rand::{rngs::StdRng, SeedableRng};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};
use tch::{vision, Kind, Tensor};

#[derive(Debug, Clone, Parser)]
/// Inspect and exercise depth training datasets.
enum Opts {
    /// Print the datasets described by a configuration file.
    Info {
        /// configuration file
        config_file: PathBuf,
    },
    /// Assemble one sample and save its streams as PNG images.
    Preview {
        /// configuration file
        config_file: PathBuf,
        /// sample index
        #[clap(long, default_value = "0")]
        index: usize,
        /// output directory
        #[clap(long)]
        output_dir: PathBuf,
        /// random seed
        #[clap(long)]
        seed: Option<u64>,
    },
    /// Run the batched loader for one epoch.
    Iterate {
        /// configuration file
        config_file: PathBuf,
        /// stop after this number of batches
        #[clap(long)]
        max_batches: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();

    match Opts::parse() {
        Opts::Info { config_file } => info(config_file)?,
        Opts::Preview {
            config_file,
            index,
            output_dir,
            seed,
        } => preview(config_file, index, output_dir, seed)?,
        Opts::Iterate {
            config_file,
            max_batches,
        } => iterate(config_file, max_batches).await?,
    }

    Ok(())
}

fn load_dataset(config_file: &Path) -> Result<DepthDataset> {
    let config = SampleConfig::open(config_file)
        .with_context(|| format!("failed to load config file '{}'", config_file.display()))?;
    DepthDataset::new(config)
}

fn info(config_file: impl AsRef<Path>) -> Result<()> {
    let dataset = load_dataset(config_file.as_ref())?;
    let config = dataset.config();

    // print dataset information
    {
        let mut table = Table::new();
        table.add_row(row!["id", "kind", "path", "focal", "baseline", "samples"]);

        config
            .datasets
            .iter()
            .zip(dataset.dataset_sizes())
            .enumerate()
            .for_each(|(id, (dataset_config, size))| {
                table.add_row(row![
                    id,
                    format!("{:?}", dataset_config.name),
                    dataset_config.path.display(),
                    dataset_config.params.focal,
                    dataset_config.params.baseline,
                    size,
                ]);
            });

        table.printstd();
    }

    println!("mode: {}", config.mode);
    println!("total samples: {}", dataset.len());
    println!(
        "auxiliary images: {} in '{}'",
        dataset.auxiliary().len(),
        config.auxiliary_dir.display()
    );

    Ok(())
}

fn preview(
    config_file: impl AsRef<Path>,
    index: usize,
    output_dir: impl AsRef<Path>,
    seed: Option<u64>,
) -> Result<()> {
    let output_dir = output_dir.as_ref();
    let dataset = load_dataset(config_file.as_ref())?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let sample = dataset.get(index, &mut rng)?;
    fs::create_dir_all(output_dir)?;

    let save = |name: &str, image: &Tensor| -> Result<()> {
        let path = output_dir.join(name);
        vision::image::save(image, &path)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        info!("saved '{}'", path.display());
        Ok(())
    };

    save("image.png", &signed_to_rgb(sample.image()))?;
    save("disparity.png", &gray_to_rgb(sample.disparity())?)?;

    match &sample {
        Sample::Disparity(sample) => {
            save("mask.png", &gray_to_rgb(&sample.mask)?)?;
            save("auxiliary.png", &normalized_to_rgb(&sample.auxiliary))?;
        }
        Sample::Inpainting(sample) => {
            save("depth.png", &gray_to_rgb(&sample.depth)?)?;
            println!("zoom_from: {:?}", sample.zoom_from);
            println!("zoom_to: {:?}", sample.zoom_to);
        }
    }

    println!("dataset id: {}", sample.dataset_id());
    Ok(())
}

async fn iterate(config_file: impl AsRef<Path>, max_batches: Option<usize>) -> Result<()> {
    let dataset = Arc::new(load_dataset(config_file.as_ref())?);
    let mut loader = DataLoaderInit::from(&dataset.config().loader).build()?;
    let num_batches = loader.num_batches(&dataset);
    let max_batches = max_batches.unwrap_or(num_batches).min(num_batches);

    let since = Instant::now();
    let mut num_samples = 0;
    let mut stream = loader.stream(dataset.clone());

    for step in 0..max_batches {
        let batch: Batch = match stream.try_next().await? {
            Some(batch) => batch,
            None => break,
        };
        num_samples += batch.len();
        info!(
            "batch {}/{}: image {:?}, datasets {:?}",
            step + 1,
            num_batches,
            batch.image().size(),
            batch.dataset_ids()
        );
    }

    let elapsed = since.elapsed().as_secs_f64();
    info!(
        "loaded {} samples in {:.2}s ({:.2} samples/s)",
        num_samples,
        elapsed,
        num_samples as f64 / elapsed
    );

    Ok(())
}

/// Map a `[3, h, w]` image in `[-1, 1]` to `u8`.
fn signed_to_rgb(image: &Tensor) -> Tensor {
    ((image + 1.0) * 127.5).clamp(0.0, 255.0).to_kind(Kind::Uint8)
}

/// Map a `[3, h, w]` image normalized by natural image statistics to `u8`.
fn normalized_to_rgb(image: &Tensor) -> Tensor {
    let device = image.device();
    let Normalize { mean, std } = NATURAL_IMAGE_NORM;
    let mean = Tensor::of_slice(&mean).view([3, 1, 1]).to_device(device);
    let std = Tensor::of_slice(&std).view([3, 1, 1]).to_device(device);
    ((image * std + mean) * 255.0)
        .clamp(0.0, 255.0)
        .to_kind(Kind::Uint8)
}

/// Stretch the finite range of a `[1, h, w]` map to `u8` and repeat it over 3 channels.
fn gray_to_rgb(map: &Tensor) -> Result<Tensor> {
    let (_, height, width) = map.size3()?;
    let (min, max) = utils::tensor_values(map)
        .into_iter()
        .filter(|value| value.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), value| {
            (min.min(value), max.max(value))
        });
    let (min, max) = if min <= max {
        (min as f64, max as f64)
    } else {
        (0.0, 0.0)
    };
    let range = (max - min).max(1e-6);

    let image = ((map.clamp(min, max) - min) / range * 255.0)
        .to_kind(Kind::Uint8)
        .expand(&[3, height, width], false)
        .contiguous();
    Ok(image)
}
