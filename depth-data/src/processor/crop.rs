//! The random crop shared by all streams of a sample.

use crate::{common::*, config::CropSize, error::DataError};

/// A crop window in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CropWindow {
    pub top: i64,
    pub left: i64,
    pub height: i64,
    pub width: i64,
}

impl CropWindow {
    /// Crop the last two dimensions of a tensor.
    pub fn apply(&self, tensor: &Tensor) -> Tensor {
        let ndim = tensor.dim() as i64;
        tensor
            .narrow(ndim - 2, self.top, self.height)
            .narrow(ndim - 1, self.left, self.width)
    }
}

/// Crop a fixed-size window at a uniformly random position.
#[derive(Debug, Clone)]
pub struct RandomCrop {
    height: i64,
    width: i64,
}

impl RandomCrop {
    pub fn new(size: CropSize) -> Result<Self> {
        size.validate()?;
        let CropSize { height, width } = size;
        Ok(Self {
            height: height as i64,
            width: width as i64,
        })
    }

    /// Sample a window inside a source of `src_h` by `src_w` pixels.
    ///
    /// It fails with [DataError::Geometry] if the source is smaller than the window.
    pub fn sample<R>(&self, src_h: i64, src_w: i64, rng: &mut R) -> Result<CropWindow>
    where
        R: Rng + ?Sized,
    {
        let Self { height, width } = *self;

        if src_h < height || src_w < width {
            return Err(DataError::Geometry {
                src_h,
                src_w,
                crop_h: height,
                crop_w: width,
            }
            .into());
        }

        let top = rng.gen_range(0..=(src_h - height));
        let left = rng.gen_range(0..=(src_w - width));

        Ok(CropWindow {
            top,
            left,
            height,
            width,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_window_in_bounds() -> Result<()> {
        let crop = RandomCrop::new(CropSize::default())?;
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..100 {
            let window = crop.sample(800, 1100, &mut rng)?;
            assert_eq!((window.height, window.width), (756, 1024));
            assert!(window.top >= 0 && window.top + window.height <= 800);
            assert!(window.left >= 0 && window.left + window.width <= 1100);
        }

        let window = crop.sample(756, 1024, &mut rng)?;
        assert_eq!((window.top, window.left), (0, 0));
        Ok(())
    }

    #[test]
    fn crop_larger_than_source_fails() -> Result<()> {
        let crop = RandomCrop::new(CropSize::default())?;
        let mut rng = StdRng::seed_from_u64(1);

        let err = crop.sample(500, 800, &mut rng).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::Geometry {
                src_h: 500,
                src_w: 800,
                ..
            })
        ));
        assert!(crop.sample(755, 2048, &mut rng).is_err());
        Ok(())
    }

    #[test]
    fn crop_window_applies_to_last_dims() {
        let window = CropWindow {
            top: 1,
            left: 2,
            height: 2,
            width: 3,
        };
        let tensor = Tensor::arange(3 * 4 * 6i64, (Kind::Float, Device::Cpu)).view([3, 4, 6]);
        let cropped = window.apply(&tensor);
        assert_eq!(cropped.size(), vec![3, 2, 3]);
        assert_eq!(f64::from(&cropped.get(0).get(0).get(0)), 8.0);
    }
}
