//! Per-channel image normalization.

use crate::common::*;

/// Maps `[0, 1]` images to `[-1, 1]`.
pub const SYMMETRIC_NORM: Normalize = Normalize {
    mean: [0.5, 0.5, 0.5],
    std: [0.5, 0.5, 0.5],
};

/// Channel statistics of natural images.
pub const NATURAL_IMAGE_NORM: Normalize = Normalize {
    mean: [0.485, 0.456, 0.406],
    std: [0.229, 0.224, 0.225],
};

/// Normalize a 3-channel image by `(value - mean) / std` per channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalize {
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl Normalize {
    /// Normalize a `[3, height, width]` image.
    ///
    /// `u8` images are scaled to `[0, 1]` before normalization.
    pub fn forward(&self, image: &Tensor) -> Result<Tensor> {
        let (channels, _height, _width) = image.size3()?;
        ensure!(
            channels == 3,
            "channel size must be 3, but get {}",
            channels
        );

        let device = image.device();
        let image = match image.kind() {
            Kind::Uint8 => image.to_kind(Kind::Float) / 255.0,
            Kind::Float => image.shallow_clone(),
            kind => bail!("unsupported image kind {:?}", kind),
        };

        let mean = Tensor::of_slice(&self.mean).view([3, 1, 1]).to_device(device);
        let std = Tensor::of_slice(&self.std).view([3, 1, 1]).to_device(device);
        Ok((image - mean) / std)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::tensor_values;
    use approx::assert_abs_diff_eq;

    #[test]
    fn symmetric_norm_range() -> Result<()> {
        let image = Tensor::of_slice(&[0u8, 255, 51, 0, 255, 51, 0, 255, 51]).view([3, 1, 3]);
        let normalized = SYMMETRIC_NORM.forward(&image)?;
        let values = tensor_values(&normalized);
        assert_abs_diff_eq!(values[0], -1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(values[1], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(values[2], -0.6, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn natural_image_norm_per_channel() -> Result<()> {
        let image = Tensor::ones(&[3, 2, 2], (Kind::Float, Device::Cpu));
        let normalized = NATURAL_IMAGE_NORM.forward(&image)?;
        let values = tensor_values(&normalized);
        assert_abs_diff_eq!(values[0], (1.0 - 0.485) / 0.229, epsilon = 1e-5);
        assert_abs_diff_eq!(values[4], (1.0 - 0.456) / 0.224, epsilon = 1e-5);
        assert_abs_diff_eq!(values[8], (1.0 - 0.406) / 0.225, epsilon = 1e-5);

        assert!(NATURAL_IMAGE_NORM
            .forward(&Tensor::ones(&[1, 2, 2], (Kind::Float, Device::Cpu)))
            .is_err());
        Ok(())
    }
}
