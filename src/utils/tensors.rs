use burn::tensor::{backend::Backend, Data, ElementConversion, Int, Shape, Tensor};

/// Build a 1D integer tensor, typically row indices for `select`
pub fn index_tensor<B: Backend>(indices: Vec<usize>, device: &B::Device) -> Tensor<B, 1, Int> {
    let len = indices.len();

    Tensor::from_data(
        Data::new(
            indices.into_iter().map(|e| (e as i64).elem()).collect(),
            Shape::new([len]),
        ),
        device,
    )
}

/// Build a float tensor of the given shape from row-major host values
pub fn float_tensor<B: Backend, const D: usize>(
    values: Vec<f32>,
    shape: [usize; D],
    device: &B::Device,
) -> Tensor<B, D> {
    Tensor::from_data(
        Data::new(
            values.into_iter().map(|e| e.elem()).collect(),
            Shape::new(shape),
        ),
        device,
    )
}

/// Read an integer tensor back to the host
pub fn int_values<B: Backend, const D: usize>(tensor: Tensor<B, D, Int>) -> Vec<i64> {
    tensor.into_data().convert::<i64>().value
}

/// Read a single element tensor back to the host
pub fn scalar<B: Backend>(tensor: Tensor<B, 1>) -> f64 {
    tensor.into_scalar().elem::<f64>()
}

/// Flat row indices, into a `[batch * max_len, ..]` view, that reverse the valid prefix of every
/// sequence. Padding positions stay where they are.
pub fn reversed_positions(seq_len: &[usize], max_len: usize) -> Vec<usize> {
    seq_len
        .iter()
        .enumerate()
        .flat_map(|(i, &len)| {
            let len = len.min(max_len);

            (0..max_len).map(move |j| {
                if j < len {
                    i * max_len + (len - 1 - j)
                } else {
                    i * max_len + j
                }
            })
        })
        .collect()
}

/// Flat row index of the last valid position of every sequence. Empty sequences point at their
/// first position and are expected to be masked out by the caller.
pub fn last_positions(seq_len: &[usize], max_len: usize) -> Vec<usize> {
    seq_len
        .iter()
        .enumerate()
        .map(|(i, &len)| i * max_len + len.min(max_len).saturating_sub(1))
        .collect()
}
