//! The geometric transform chain applied to the image and ground truth maps.

use super::{
    crop::{CropWindow, RandomCrop},
    normalize::SYMMETRIC_NORM,
    resize::{resize_area, target_size, StreamSizes},
};
use crate::{common::*, config::CropSize, dataset::DepthMaps, mode::ScaleRatios, utils};

/// The transformed streams of a sample.
#[derive(Debug)]
pub struct TransformedStreams {
    /// `[3, h, w]` float image normalized to `[-1, 1]`.
    pub image: Tensor,
    /// `[1, h, w]` depth at the disparity resolution.
    pub depth: Tensor,
    /// `[1, h, w]` disparity.
    pub disparity: Tensor,
    /// `[1, h, w]` mask in `[0, 1]`.
    pub mask: Tensor,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeometricTransformInit {
    /// The random crop window, or no cropping if `None`.
    pub crop: Option<CropSize>,
    /// The bound of the longer side after resizing.
    pub max_dim: usize,
    pub ratios: ScaleRatios,
}

impl GeometricTransformInit {
    pub fn build(self) -> Result<GeometricTransform> {
        let Self {
            crop,
            max_dim,
            ratios,
        } = self;

        ensure!(max_dim > 0, "max_dim must be positive");
        ensure!(
            ratios.image > 0 && ratios.disparity > 0 && ratios.mask > 0,
            "scale ratios must be positive"
        );
        let crop = crop.map(RandomCrop::new).transpose()?;

        Ok(GeometricTransform {
            crop,
            max_dim: max_dim as i64,
            ratios,
        })
    }
}

/// Random crop, aspect preserving resize and per-stream downscaling.
#[derive(Debug, Clone)]
pub struct GeometricTransform {
    crop: Option<RandomCrop>,
    max_dim: i64,
    ratios: ScaleRatios,
}

impl GeometricTransform {
    /// Transform a `[3, height, width]` `u8` image and its `height` by `width` maps.
    ///
    /// All streams share the same crop window. The maps are expected to match
    /// the image size.
    pub fn forward<R>(
        &self,
        image: &Tensor,
        maps: &DepthMaps,
        rng: &mut R,
    ) -> Result<TransformedStreams>
    where
        R: Rng + ?Sized,
    {
        let (channels, src_h, src_w) = image.size3()?;
        ensure!(
            channels == 3,
            "channel size must be 3, but get {}",
            channels
        );

        let window = match &self.crop {
            Some(crop) => crop.sample(src_h, src_w, rng)?,
            None => CropWindow {
                top: 0,
                left: 0,
                height: src_h,
                width: src_w,
            },
        };

        let target = target_size(window.height, window.width, self.max_dim);
        let StreamSizes {
            image: (image_h, image_w),
            disparity: (disp_h, disp_w),
            mask: (mask_h, mask_w),
        } = StreamSizes::new(target, &self.ratios)?;

        let image = {
            let cropped = window.apply(image).to_kind(Kind::Float) / 255.0;
            let resized = resize_area(&cropped, image_h, image_w)?;
            SYMMETRIC_NORM.forward(&resized)?
        };
        let depth = {
            let cropped = window.apply(&utils::array2_to_tensor(&maps.depth));
            resize_area(&cropped, disp_h, disp_w)?
        };
        let disparity = {
            let cropped = window.apply(&utils::array2_to_tensor(&maps.disparity));
            resize_area(&cropped, disp_h, disp_w)?
        };
        let mask = {
            let cropped = window.apply(&utils::array2_to_tensor(&maps.mask));
            resize_area(&cropped, mask_h, mask_w)?.clamp(0.0, 1.0)
        };

        Ok(TransformedStreams {
            image,
            depth,
            disparity,
            mask,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mode::Mode, utils::tensor_values};

    fn constant_maps(height: usize, width: usize, value: f32) -> DepthMaps {
        DepthMaps {
            depth: Array2::from_elem((height, width), value),
            disparity: Array2::from_elem((height, width), 100.0 / value),
            mask: Array2::ones((height, width)),
        }
    }

    #[test]
    fn disparity_mode_shapes() -> Result<()> {
        let transform = GeometricTransformInit {
            crop: Some(CropSize::default()),
            max_dim: 1024,
            ratios: Mode::Disparity.ratios(),
        }
        .build()?;
        let mut rng = StdRng::seed_from_u64(2);

        let image = Tensor::full(&[3, 800, 1100], 128i64, (Kind::Uint8, Device::Cpu));
        let maps = constant_maps(800, 1100, 10.0);
        let streams = transform.forward(&image, &maps, &mut rng)?;

        assert_eq!(streams.image.size(), vec![3, 378, 512]);
        assert_eq!(streams.disparity.size(), vec![1, 189, 256]);
        assert_eq!(streams.depth.size(), vec![1, 189, 256]);
        assert_eq!(streams.mask.size(), vec![1, 189, 256]);
        assert!(tensor_values(&streams.disparity)
            .into_iter()
            .all(|value| (value - 10.0).abs() < 1e-4));
        Ok(())
    }

    #[test]
    fn uncropped_source_is_resized() -> Result<()> {
        let transform = GeometricTransformInit {
            crop: None,
            max_dim: 1024,
            ratios: Mode::Refine.ratios(),
        }
        .build()?;
        let mut rng = StdRng::seed_from_u64(2);

        let image = Tensor::full(&[3, 50, 80], 255i64, (Kind::Uint8, Device::Cpu));
        let maps = constant_maps(50, 80, 4.0);
        let streams = transform.forward(&image, &maps, &mut rng)?;

        assert_eq!(streams.image.size(), vec![3, 640, 1024]);
        assert_eq!(streams.mask.size(), vec![1, 640, 1024]);
        assert!(tensor_values(&streams.image)
            .into_iter()
            .all(|value| (value - 1.0).abs() < 1e-5));
        Ok(())
    }
}
