//! The random resized crop augmentation for auxiliary images.

use super::crop::CropWindow;
use crate::common::*;

const MAX_ATTEMPTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RandomResizedCropInit {
    /// The side length of the square output.
    pub size: usize,
    /// The range of the crop area relative to the source area.
    pub scale: (R64, R64),
    /// The range of the crop aspect ratio (width over height).
    pub ratio: (R64, R64),
}

impl RandomResizedCropInit {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    pub fn build(self) -> Result<RandomResizedCrop> {
        let Self {
            size,
            scale: (min_scale, max_scale),
            ratio: (min_ratio, max_ratio),
        } = self;

        ensure!(size > 0, "size must be positive");
        ensure!(
            min_scale > 0.0 && min_scale <= max_scale && max_scale <= 1.0,
            "scale range must satisfy 0 < min <= max <= 1"
        );
        ensure!(
            min_ratio > 0.0 && min_ratio <= max_ratio,
            "ratio range must satisfy 0 < min <= max"
        );

        Ok(RandomResizedCrop {
            size: size as i64,
            scale: (min_scale.raw(), max_scale.raw()),
            log_ratio: (min_ratio.raw().ln(), max_ratio.raw().ln()),
        })
    }
}

impl Default for RandomResizedCropInit {
    fn default() -> Self {
        Self {
            size: 256,
            scale: (r64(0.08), r64(1.0)),
            ratio: (r64(3.0 / 4.0), r64(4.0 / 3.0)),
        }
    }
}

/// Crop a random area with random aspect ratio and resize it to a square.
#[derive(Debug, Clone)]
pub struct RandomResizedCrop {
    size: i64,
    scale: (f64, f64),
    log_ratio: (f64, f64),
}

impl RandomResizedCrop {
    pub fn size(&self) -> i64 {
        self.size
    }

    /// Sample the crop window on a source of `height` by `width` pixels.
    pub fn sample_window<R>(&self, height: i64, width: i64, rng: &mut R) -> CropWindow
    where
        R: Rng + ?Sized,
    {
        let area = (height * width) as f64;
        let (min_scale, max_scale) = self.scale;
        let (min_log_ratio, max_log_ratio) = self.log_ratio;

        for _ in 0..MAX_ATTEMPTS {
            let target_area = area * rng.gen_range(min_scale..=max_scale);
            let aspect = rng.gen_range(min_log_ratio..=max_log_ratio).exp();
            let crop_w = (target_area * aspect).sqrt().round() as i64;
            let crop_h = (target_area / aspect).sqrt().round() as i64;

            if 0 < crop_w && crop_w <= width && 0 < crop_h && crop_h <= height {
                let top = rng.gen_range(0..=(height - crop_h));
                let left = rng.gen_range(0..=(width - crop_w));
                return CropWindow {
                    top,
                    left,
                    height: crop_h,
                    width: crop_w,
                };
            }
        }

        // fall back to the largest center crop within the ratio range
        let in_ratio = width as f64 / height as f64;
        let min_ratio = min_log_ratio.exp();
        let max_ratio = max_log_ratio.exp();
        let (crop_h, crop_w) = if in_ratio < min_ratio {
            ((width as f64 / min_ratio).round() as i64, width)
        } else if in_ratio > max_ratio {
            (height, (height as f64 * max_ratio).round() as i64)
        } else {
            (height, width)
        };
        let crop_h = crop_h.clamp(1, height);
        let crop_w = crop_w.clamp(1, width);

        CropWindow {
            top: (height - crop_h) / 2,
            left: (width - crop_w) / 2,
            height: crop_h,
            width: crop_w,
        }
    }

    /// Apply on a `[3, height, width]` `u8` image. The output is a `u8` image of
    /// `[3, size, size]`.
    pub fn forward<R>(&self, image: &Tensor, rng: &mut R) -> Result<Tensor>
    where
        R: Rng + ?Sized,
    {
        let (channels, height, width) = image.size3()?;
        ensure!(
            channels == 3,
            "channel size must be 3, but get {}",
            channels
        );
        ensure!(
            image.kind() == Kind::Uint8,
            "expect a u8 image, but get {:?}",
            image.kind()
        );

        let window = self.sample_window(height, width, rng);
        let cropped = window.apply(image).contiguous();
        let resized = vision::image::resize(&cropped, self.size, self.size)?;
        Ok(resized)
    }
}
