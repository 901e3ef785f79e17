//! Operating modes and the per-mode stream scaling.

use crate::common::*;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// The operating mode of the sample assembler.
///
/// The mode decides the downscale ratio of every output stream, the shape of
/// the produced sample, and whether a zoom window is sampled.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Mode {
    Disparity,
    Refine,
    Eval,
    InpaintEval,
    Inpainting,
}

/// The shape of the sample produced in a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    /// Image, disparity, mask, auxiliary image and dataset id.
    Disparity,
    /// Image, disparity, depth, zoom windows and dataset id.
    Inpainting,
}

/// Integer divisors applied to the target size of each stream.
///
/// The depth stream is resized along with the disparity stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScaleRatios {
    pub image: i64,
    pub disparity: i64,
    pub mask: i64,
}

impl ScaleRatios {
    pub const fn uniform(ratio: i64) -> Self {
        Self {
            image: ratio,
            disparity: ratio,
            mask: ratio,
        }
    }
}

impl Mode {
    pub fn ratios(&self) -> ScaleRatios {
        match self {
            Self::Disparity => ScaleRatios {
                image: 2,
                disparity: 4,
                mask: 4,
            },
            Self::Refine | Self::Eval | Self::InpaintEval => ScaleRatios::uniform(1),
            Self::Inpainting => ScaleRatios::uniform(2),
        }
    }

    pub fn output_kind(&self) -> OutputKind {
        match self {
            Self::Inpainting | Self::InpaintEval => OutputKind::Inpainting,
            Self::Disparity | Self::Refine | Self::Eval => OutputKind::Disparity,
        }
    }

    /// Whether a random zoom window pair is sampled for each sample.
    pub fn requires_zoom(&self) -> bool {
        self.output_kind() == OutputKind::Inpainting
    }
}
