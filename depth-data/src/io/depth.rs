use crate::{common::*, error::DataError};
use ::image::{DynamicImage, ImageBuffer, Pixel};

/// The HDF5 dataset holding metric depth.
pub const HDF5_DEPTH_FIELD: &str = "depth";

/// EXR channels searched for depth values, in order of preference.
const EXR_DEPTH_CHANNELS: &[&str] = &["Z", "Y", "R"];

/// Read a 2D depth array from a field of an HDF5 file.
#[cfg(feature = "hdf5")]
pub fn read_hdf5_depth(path: impl AsRef<Path>, field: &str) -> Result<Array2<f32>> {
    let path = path.as_ref();
    let file = hdf5::File::open(path).map_err(|err| DataError::decode(path, err))?;
    let dataset = file.dataset(field).map_err(|err| {
        DataError::decode(path, format!("field '{}' is not readable: {}", field, err))
    })?;
    let depth = dataset
        .read_2d::<f32>()
        .map_err(|err| DataError::decode(path, err))?;
    Ok(depth)
}

#[cfg(not(feature = "hdf5"))]
pub fn read_hdf5_depth(path: impl AsRef<Path>, _field: &str) -> Result<Array2<f32>> {
    Err(DataError::decode(
        path.as_ref(),
        "'hdf5' feature must be enabled to read HDF5 depth files",
    )
    .into())
}

/// Read a depth map from an OpenEXR file, keeping the full floating point range.
///
/// The first layer is used. The channel is picked from `Z`, `Y` and `R` in
/// order and falls back to the first channel of the layer.
pub fn read_exr_depth(path: impl AsRef<Path>) -> Result<Array2<f32>> {
    use exr::prelude::{read_first_flat_layer_from_file, FlatSamples, Vec2};

    let path = path.as_ref();
    let image = read_first_flat_layer_from_file(path).map_err(|err| DataError::decode(path, err))?;
    let layer = image.layer_data;
    let Vec2(width, height) = layer.size;

    let channels = &layer.channel_data.list;
    let channel = EXR_DEPTH_CHANNELS
        .iter()
        .find_map(|&name| {
            channels
                .iter()
                .find(|channel| channel.name.to_string() == name)
        })
        .or_else(|| channels.first())
        .ok_or_else(|| DataError::decode(path, "no channels found in the first layer"))?;

    let values: Vec<f32> = match &channel.sample_data {
        FlatSamples::F16(samples) => samples.iter().map(|value| value.to_f32()).collect(),
        FlatSamples::F32(samples) => samples.clone(),
        FlatSamples::U32(samples) => samples.iter().map(|&value| value as f32).collect(),
    };

    let depth = Array2::from_shape_vec((height, width), values)
        .map_err(|err| DataError::decode(path, err))?;
    Ok(depth)
}

/// Read a depth map stored as an image.
///
/// Sample values are kept as stored, so 16-bit images keep their range. For
/// color images the first channel is used.
pub fn read_image_depth(path: impl AsRef<Path>) -> Result<Array2<f32>> {
    let path = path.as_ref();
    let image = ::image::open(path).map_err(|err| DataError::decode(path, err))?;

    let depth = match image {
        DynamicImage::ImageLuma8(buf) => first_channel(buf),
        DynamicImage::ImageLumaA8(buf) => first_channel(buf),
        DynamicImage::ImageLuma16(buf) => first_channel(buf),
        DynamicImage::ImageLumaA16(buf) => first_channel(buf),
        DynamicImage::ImageRgb16(buf) => first_channel(buf),
        DynamicImage::ImageRgba16(buf) => first_channel(buf),
        other => first_channel(other.to_rgb8()),
    }
    .map_err(|err| DataError::decode(path, err))?;

    Ok(depth)
}

fn first_channel<P>(buf: ImageBuffer<P, Vec<P::Subpixel>>) -> Result<Array2<f32>>
where
    P: Pixel + 'static,
    P::Subpixel: Into<f32> + 'static,
{
    let (width, height) = buf.dimensions();
    let num_channels = P::CHANNEL_COUNT as usize;
    let values: Vec<f32> = buf
        .into_raw()
        .into_iter()
        .step_by(num_channels)
        .map(Into::into)
        .collect();
    let array = Array2::from_shape_vec((height as usize, width as usize), values)?;
    Ok(array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};

    #[test]
    fn read_8bit_and_16bit_depth_images() -> Result<()> {
        let dir = tempfile::tempdir()?;

        let path8 = dir.path().join("depth8.png");
        GrayImage::from_pixel(5, 3, Luma([50u8])).save(&path8)?;
        let depth = read_image_depth(&path8)?;
        assert_eq!(depth.dim(), (3, 5));
        assert!(depth.iter().all(|&value| value == 50.0));

        let path16 = dir.path().join("depth16.png");
        let image: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_pixel(4, 2, Luma([40000u16]));
        image.save(&path16)?;
        let depth = read_image_depth(&path16)?;
        assert_eq!(depth.dim(), (2, 4));
        assert!(depth.iter().all(|&value| value == 40000.0));

        let path_rgb = dir.path().join("depth_rgb.png");
        RgbImage::from_pixel(2, 2, Rgb([7, 8, 9])).save(&path_rgb)?;
        let depth = read_image_depth(&path_rgb)?;
        assert!(depth.iter().all(|&value| value == 7.0));

        Ok(())
    }

    #[test]
    fn read_exr_red_channel_with_infinity() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("depth.exr");
        exr::prelude::write_rgb_file(&path, 4, 3, |x, y| {
            let red = if (x, y) == (0, 0) {
                f32::INFINITY
            } else {
                (x + 10 * y) as f32
            };
            (red, -1.0f32, -2.0f32)
        })?;

        let depth = read_exr_depth(&path)?;
        assert_eq!(depth.dim(), (3, 4));
        assert!(depth[[0, 0]].is_infinite() && depth[[0, 0]] > 0.0);
        assert_eq!(depth[[0, 3]], 3.0);
        assert_eq!(depth[[1, 0]], 10.0);
        assert_eq!(depth[[2, 3]], 23.0);
        Ok(())
    }

    #[test]
    fn missing_depth_file_is_decode_error() {
        let err = read_image_depth("/nonexistent/depth/file.png").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::Decode { .. })
        ));

        let err = read_exr_depth("/nonexistent/depths/file.exr").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::Decode { .. })
        ));
    }

    #[cfg(feature = "hdf5")]
    #[test]
    fn read_hdf5_depth_field() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("depth.h5");
        {
            let file = hdf5::File::create(&path)?;
            let values = ndarray::array![[0.0f32, 1.5, 2.0], [3.0, 0.0, 4.5]];
            file.new_dataset::<f32>()
                .shape((2, 3))
                .create(HDF5_DEPTH_FIELD)?
                .write(&values)?;
        }

        let depth = read_hdf5_depth(&path, HDF5_DEPTH_FIELD)?;
        assert_eq!(depth.dim(), (2, 3));
        assert_eq!(depth[[1, 2]], 4.5);

        let err = read_hdf5_depth(&path, "missing").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::Decode { .. })
        ));
        Ok(())
    }
}
