use crate::{
    common::*,
    config::{CameraParams, DatasetKind},
    io,
};

/// Offset added to depth before inversion to keep disparity finite.
pub const DEPTH_EPSILON: f64 = 1e-4;

/// Aligned ground truth maps of a sample.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthMaps {
    pub depth: Array2<f32>,
    pub disparity: Array2<f32>,
    /// Per-pixel validity, 1 for measured depth and 0 otherwise.
    pub mask: Array2<f32>,
}

/// The per-dataset policy of depth file naming, decoding and conversion.
pub trait DepthAdapter
where
    Self: Debug + Send + Sync,
{
    fn kind(&self) -> DatasetKind;

    fn params(&self) -> &CameraParams;

    /// Derive the depth file path of the image file `file_name` under the dataset root.
    fn depth_path(&self, root: &Path, file_name: &Path) -> PathBuf;

    /// Decode the raw depth array.
    fn read_depth(&self, path: &Path) -> Result<Array2<f32>>;

    /// Convert raw depth to disparity and validity mask.
    fn convert_depth(&self, depth: Array2<f32>) -> DepthMaps;

    fn load_depth(&self, path: &Path) -> Result<DepthMaps> {
        let depth = self.read_depth(path)?;
        Ok(self.convert_depth(depth))
    }
}

impl DatasetKind {
    pub fn build_adapter(self, params: CameraParams) -> Box<dyn DepthAdapter> {
        match self {
            Self::Mega => Box::new(MegaAdapter { params }),
            Self::Gta => Box::new(GtaAdapter { params }),
            Self::Generic => Box::new(GenericAdapter { params }),
        }
    }
}

/// Compute `focal * baseline / (depth + 1e-4)` elementwise.
pub fn depth_to_disparity(depth: &Array2<f32>, params: &CameraParams) -> Array2<f32> {
    let scale = params.scale();
    depth.mapv(|value| (scale / (value as f64 + DEPTH_EPSILON)) as f32)
}

/// Depth in HDF5 containers where zero marks missing measurements.
#[derive(Debug, Clone)]
pub struct MegaAdapter {
    pub params: CameraParams,
}

impl DepthAdapter for MegaAdapter {
    fn kind(&self) -> DatasetKind {
        DatasetKind::Mega
    }

    fn params(&self) -> &CameraParams {
        &self.params
    }

    fn depth_path(&self, root: &Path, file_name: &Path) -> PathBuf {
        root.join("depth").join(file_name.with_extension("h5"))
    }

    fn read_depth(&self, path: &Path) -> Result<Array2<f32>> {
        io::read_hdf5_depth(path, io::HDF5_DEPTH_FIELD)
    }

    fn convert_depth(&self, mut depth: Array2<f32>) -> DepthMaps {
        let mask = depth.mapv(|value| if value != 0.0 { 1.0 } else { 0.0 });

        // invalid pixels go to the far plane so that their disparity vanishes
        depth.mapv_inplace(|value| if value == 0.0 { f32::INFINITY } else { value });

        let disparity = depth_to_disparity(&depth, &self.params);
        DepthMaps {
            depth,
            disparity,
            mask,
        }
    }
}

/// Depth in OpenEXR files where infinity marks the sky.
#[derive(Debug, Clone)]
pub struct GtaAdapter {
    pub params: CameraParams,
}

impl DepthAdapter for GtaAdapter {
    fn kind(&self) -> DatasetKind {
        DatasetKind::Gta
    }

    fn params(&self) -> &CameraParams {
        &self.params
    }

    fn depth_path(&self, root: &Path, file_name: &Path) -> PathBuf {
        root.join("depths").join(file_name.with_extension("exr"))
    }

    fn read_depth(&self, path: &Path) -> Result<Array2<f32>> {
        io::read_exr_depth(path)
    }

    fn convert_depth(&self, mut depth: Array2<f32>) -> DepthMaps {
        let far = self.params.scale() as f32;
        depth.mapv_inplace(|value| if value == f32::INFINITY { far } else { value });

        let mask = Array2::ones(depth.raw_dim());
        let disparity = depth_to_disparity(&depth, &self.params);
        DepthMaps {
            depth,
            disparity,
            mask,
        }
    }
}

/// Depth stored as images with the same file name as the color image.
#[derive(Debug, Clone)]
pub struct GenericAdapter {
    pub params: CameraParams,
}

impl DepthAdapter for GenericAdapter {
    fn kind(&self) -> DatasetKind {
        DatasetKind::Generic
    }

    fn params(&self) -> &CameraParams {
        &self.params
    }

    fn depth_path(&self, root: &Path, file_name: &Path) -> PathBuf {
        root.join("depth").join(file_name)
    }

    fn read_depth(&self, path: &Path) -> Result<Array2<f32>> {
        io::read_image_depth(path)
    }

    fn convert_depth(&self, depth: Array2<f32>) -> DepthMaps {
        let mask = Array2::ones(depth.raw_dim());
        let disparity = depth_to_disparity(&depth, &self.params);
        DepthMaps {
            depth,
            disparity,
            mask,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn params() -> CameraParams {
        CameraParams {
            focal: r64(1000.0),
            baseline: r64(0.1),
        }
    }

    #[test]
    fn depth_file_naming() {
        let root = Path::new("/data/set");
        let file = Path::new("frame_0001.jpg");

        let mega = DatasetKind::Mega.build_adapter(params());
        assert_eq!(
            mega.depth_path(root, file),
            Path::new("/data/set/depth/frame_0001.h5")
        );

        let gta = DatasetKind::Gta.build_adapter(params());
        assert_eq!(
            gta.depth_path(root, file),
            Path::new("/data/set/depths/frame_0001.exr")
        );

        let generic = DatasetKind::Generic.build_adapter(params());
        assert_eq!(
            generic.depth_path(root, file),
            Path::new("/data/set/depth/frame_0001.jpg")
        );
        assert_eq!(generic.kind(), DatasetKind::Generic);
    }

    #[test]
    fn mega_zero_depth_is_masked() {
        let adapter = MegaAdapter { params: params() };
        let DepthMaps {
            depth,
            disparity,
            mask,
        } = adapter.convert_depth(array![[0.0, 10.0], [50.0, 0.0]]);

        assert_eq!(mask, array![[0.0, 1.0], [1.0, 0.0]]);
        assert!(depth[[0, 0]].is_infinite() && depth[[1, 1]].is_infinite());
        assert_eq!(disparity[[0, 0]], 0.0);
        assert_eq!(disparity[[1, 1]], 0.0);
        assert_abs_diff_eq!(disparity[[0, 1]], 10.0, epsilon = 1e-3);
        assert_abs_diff_eq!(disparity[[1, 0]], 2.0, epsilon = 1e-4);
    }

    #[test]
    fn gta_infinite_depth_goes_to_far_plane() {
        let adapter = GtaAdapter { params: params() };
        let DepthMaps {
            depth,
            disparity,
            mask,
        } = adapter.convert_depth(array![[f32::INFINITY, 25.0], [0.0, f32::INFINITY]]);

        let far = 100.0;
        let expect = far / (far + 1e-4);
        assert!(mask.iter().all(|&value| value == 1.0));
        assert_eq!(depth[[0, 0]], 100.0);
        assert_abs_diff_eq!(disparity[[0, 0]], expect as f32, epsilon = 1e-6);
        assert_abs_diff_eq!(disparity[[1, 1]], expect as f32, epsilon = 1e-6);
        assert_abs_diff_eq!(disparity[[0, 1]], 4.0, epsilon = 1e-4);

        // zero depth maps to fb / 1e-4
        assert_abs_diff_eq!(disparity[[1, 0]], 1e6, epsilon = 1.0);
    }

    #[test]
    fn generic_depth_keeps_non_finite_values() {
        let adapter = GenericAdapter { params: params() };
        let DepthMaps {
            disparity, mask, ..
        } = adapter.convert_depth(array![[50.0, f32::NAN], [-50.0, 200.0]]);

        assert!(mask.iter().all(|&value| value == 1.0));
        assert_abs_diff_eq!(disparity[[0, 0]], 2.0, epsilon = 1e-4);
        assert!(disparity[[0, 1]].is_nan());
        assert_abs_diff_eq!(disparity[[1, 0]], -2.0, epsilon = 1e-4);
        assert_abs_diff_eq!(disparity[[1, 1]], 0.5, epsilon = 1e-4);
    }
}
