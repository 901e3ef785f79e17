use crate::{common::*, error::DataError};

/// Load an image file as a `[3, height, width]` tensor of `u8` in RGB order.
pub fn load_rgb_image(path: impl AsRef<Path>) -> Result<Tensor> {
    let path = path.as_ref();
    let image = vision::image::load(path).map_err(|err| DataError::decode(path, err))?;

    match image.size().as_slice() {
        &[3, _, _] => Ok(image),
        shape => Err(DataError::decode(
            path,
            format!("expect 3 color channels, but get shape {:?}", shape),
        )
        .into()),
    }
}
