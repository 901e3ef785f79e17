use crate::common::*;

/// Convert a 2D array into a `[1, height, width]` float tensor.
pub fn array2_to_tensor(array: &Array2<f32>) -> Tensor {
    let (height, width) = array.dim();
    let values = array.as_standard_layout().into_owned().into_raw_vec();
    Tensor::of_slice(&values).view([1, height as i64, width as i64])
}

/// Extract the values of a tensor in row-major order.
pub fn tensor_values(tensor: &Tensor) -> Vec<f32> {
    tensor
        .to_kind(Kind::Float)
        .contiguous()
        .view([-1])
        .into()
}
