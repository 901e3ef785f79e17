//! Assembled training samples.

use crate::{common::*, processor::ZoomWindow};

/// The sample produced in `disparity`, `refine` and `eval` modes.
#[derive(Debug, TensorLike)]
pub struct DisparitySample {
    /// `[3, h, w]` image in `[-1, 1]`.
    pub image: Tensor,
    /// `[1, h, w]` disparity.
    pub disparity: Tensor,
    /// `[1, h, w]` validity mask in `[0, 1]`.
    pub mask: Tensor,
    /// `[3, 256, 256]` auxiliary natural image.
    pub auxiliary: Tensor,
    pub dataset_id: usize,
}

/// The sample produced in `inpainting` and `inpaint-eval` modes.
#[derive(Debug, TensorLike)]
pub struct InpaintingSample {
    pub image: Tensor,
    pub disparity: Tensor,
    pub depth: Tensor,
    #[tensor_like(copy)]
    pub zoom_from: ZoomWindow,
    #[tensor_like(copy)]
    pub zoom_to: ZoomWindow,
    pub dataset_id: usize,
}

#[derive(Debug, TensorLike)]
pub enum Sample {
    Disparity(DisparitySample),
    Inpainting(InpaintingSample),
}

impl Sample {
    pub fn dataset_id(&self) -> usize {
        match self {
            Self::Disparity(sample) => sample.dataset_id,
            Self::Inpainting(sample) => sample.dataset_id,
        }
    }

    pub fn image(&self) -> &Tensor {
        match self {
            Self::Disparity(sample) => &sample.image,
            Self::Inpainting(sample) => &sample.image,
        }
    }

    pub fn disparity(&self) -> &Tensor {
        match self {
            Self::Disparity(sample) => &sample.disparity,
            Self::Inpainting(sample) => &sample.disparity,
        }
    }

    /// Copy the sample to `device`, leaving `self` untouched.
    pub fn prepare_transfer(&self, device: Device) -> Self {
        self.to_device(device)
    }
}

impl From<DisparitySample> for Sample {
    fn from(from: DisparitySample) -> Self {
        Self::Disparity(from)
    }
}

impl From<InpaintingSample> for Sample {
    fn from(from: InpaintingSample) -> Self {
        Self::Inpainting(from)
    }
}
