#![allow(dead_code)]

use anyhow::Result;
use depth_data::{
    config::{CameraParams, CropSize, DatasetConfig, DatasetKind, LoaderConfig, SampleConfig},
    mode::Mode,
    processor::RandomZoomInit,
};
use image::{ImageBuffer, Luma, Rgb};
use noisy_float::prelude::*;
use std::{
    fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

/// Write a `generic` dataset of `num_samples` constant images and depth maps.
pub fn write_generic_dataset(
    root: &Path,
    num_samples: usize,
    (height, width): (u32, u32),
    depth: u16,
) -> Result<()> {
    fs::create_dir_all(root.join("images"))?;
    fs::create_dir_all(root.join("depth"))?;

    for index in 0..num_samples {
        let name = format!("{:05}.png", index);
        let image = ImageBuffer::from_pixel(width, height, Rgb([200u8, 100, 50]));
        image.save(root.join("images").join(&name))?;
        let depth_map: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(width, height, Luma([depth]));
        depth_map.save(root.join("depth").join(&name))?;
    }
    Ok(())
}

/// Write a `gta` dataset with one image and an EXR depth map.
///
/// The depth is stored in the `R` channel. The top left pixel is infinitely
/// far and the remaining pixels are at `depth`.
pub fn write_gta_dataset(root: &Path, (height, width): (u32, u32), depth: f32) -> Result<()> {
    fs::create_dir_all(root.join("images"))?;
    fs::create_dir_all(root.join("depths"))?;

    let image = ImageBuffer::from_pixel(width, height, Rgb([10u8, 20, 30]));
    image.save(root.join("images/00000.png"))?;
    exr::prelude::write_rgb_file(
        root.join("depths/00000.exr"),
        width as usize,
        height as usize,
        |x, y| {
            let value = if (x, y) == (0, 0) { f32::INFINITY } else { depth };
            (value, -1.0f32, -1.0f32)
        },
    )?;
    Ok(())
}

/// Write an auxiliary corpus with one class directory holding `num_images` images.
pub fn write_auxiliary_dir(root: &Path, num_images: usize) -> Result<PathBuf> {
    let class_dir = root.join("n00000001");
    fs::create_dir_all(&class_dir)?;

    for index in 0..num_images {
        let value = (index * 40 % 256) as u8;
        let image = ImageBuffer::from_fn(120, 90, |x, y| {
            Rgb([value, (x % 256) as u8, (y % 256) as u8])
        });
        image.save(class_dir.join(format!("{}.png", index)))?;
    }
    Ok(root.to_owned())
}

pub fn sample_config(
    mode: Mode,
    dataset_dir: &Path,
    auxiliary_dir: &Path,
    crop: Option<CropSize>,
) -> SampleConfig {
    SampleConfig {
        mode,
        datasets: vec![DatasetConfig {
            name: DatasetKind::Generic,
            path: dataset_dir.to_owned(),
            params: CameraParams {
                focal: r64(1000.0),
                baseline: r64(0.1),
            },
        }],
        auxiliary_dir: auxiliary_dir.to_owned(),
        max_dim: NonZeroUsize::new(1024).unwrap(),
        crop,
        auxiliary_size: NonZeroUsize::new(256).unwrap(),
        zoom: RandomZoomInit::default(),
        loader: LoaderConfig::default(),
    }
}
