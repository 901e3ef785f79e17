//! Aspect preserving target sizes and area resizing.

use crate::{common::*, mode::ScaleRatios};

/// Output sizes of the streams of a sample in `(height, width)` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamSizes {
    pub image: (i64, i64),
    /// Also used by the depth stream.
    pub disparity: (i64, i64),
    pub mask: (i64, i64),
}

impl StreamSizes {
    pub fn new(target: (i64, i64), ratios: &ScaleRatios) -> Result<Self> {
        let scale = |ratio: i64| -> Result<(i64, i64)> {
            let (height, width) = target;
            let size = (height / ratio, width / ratio);
            ensure!(
                size.0 > 0 && size.1 > 0,
                "target size {}x{} vanishes after dividing by {}",
                height,
                width,
                ratio
            );
            Ok(size)
        };

        Ok(Self {
            image: scale(ratios.image)?,
            disparity: scale(ratios.disparity)?,
            mask: scale(ratios.mask)?,
        })
    }
}

/// Compute the `(height, width)` that keeps the aspect ratio of the source
/// and bounds both sides by `max_dim`.
///
/// The longer side becomes exactly `max_dim`.
pub fn target_size(height: i64, width: i64, max_dim: i64) -> (i64, i64) {
    let ratio = width as f64 / height as f64;
    let max_dim_f = max_dim as f64;
    let target_w = ((max_dim_f * ratio).round() as i64).min(max_dim);
    let target_h = ((max_dim_f / ratio).round() as i64).min(max_dim);
    (target_h, target_w)
}

/// Resize the last two dimensions of a `[channels, height, width]` float
/// tensor.
///
/// Enlarged axes are interpolated bilinearly. Shrunk axes average the source
/// pixels covered by each output pixel. Non-integer shrink factors average
/// overlapping bins with equal weights.
pub fn resize_area(tensor: &Tensor, height: i64, width: i64) -> Result<Tensor> {
    let (channels, src_h, src_w) = tensor.size3()?;
    if (src_h, src_w) == (height, width) {
        return Ok(tensor.shallow_clone());
    }

    let resized = tch::no_grad(|| {
        let mut batch = tensor.view([1, channels, src_h, src_w]);

        let (up_h, up_w) = (height.max(src_h), width.max(src_w));
        if (up_h, up_w) != (src_h, src_w) {
            batch = batch.upsample_bilinear2d(&[up_h, up_w], false, None, None);
        }
        if (height, width) != (up_h, up_w) {
            batch = batch.adaptive_avg_pool2d(&[height, width]);
        }

        batch.view([channels, height, width])
    });
    Ok(resized)
}
