use burn::{
    config::Config,
    module::Module,
    nn::{Lstm, LstmConfig},
    tensor::{backend::Backend, Tensor},
};

use crate::utils::tensors::{float_tensor, index_tensor, last_positions, reversed_positions};

/// Configuration for [BiLstm]
#[derive(Config)]
pub struct BiLstmConfig {
    /// Size of the input features
    pub d_input: usize,

    /// Size of the hidden state of each direction
    pub d_hidden: usize,
}

impl BiLstmConfig {
    /// Initialize both directions
    pub fn init<B: Backend>(&self, device: &B::Device) -> BiLstm<B> {
        BiLstm {
            cell_fw: LstmConfig::new(self.d_input, self.d_hidden, true).init(device),
            cell_bw: LstmConfig::new(self.d_input, self.d_hidden, true).init(device),
        }
    }
}

/// Two independent LSTMs reading padded sequences in opposite directions
#[derive(Module, Debug)]
pub struct BiLstm<B: Backend> {
    /// Reads every sequence from its first token
    pub cell_fw: Lstm<B>,

    /// Reads every sequence from its last valid token
    pub cell_bw: Lstm<B>,
}

/// The final states of both directions, concatenated on the feature axis
#[derive(Debug, Clone)]
pub struct BiLstmState<B: Backend> {
    /// Final cell states: [batch_size, 2 * d_hidden]
    pub cell: Tensor<B, 2>,

    /// Final hidden states: [batch_size, 2 * d_hidden]
    pub hidden: Tensor<B, 2>,
}

impl<B: Backend> BiLstm<B> {
    /// Encode `input` ([batch_size, max_len, d_input]) into its final states.
    ///
    /// Only the first `seq_len[i]` positions of sequence `i` contribute. Sequences of length 0
    /// get zero states.
    pub fn forward(&self, input: Tensor<B, 3>, seq_len: &[usize]) -> BiLstmState<B> {
        let [batch_size, max_len, d_input] = input.dims();
        let device = input.device();

        let reverse = index_tensor::<B>(reversed_positions(seq_len, max_len), &device);
        let last = index_tensor::<B>(last_positions(seq_len, max_len), &device);
        let non_empty = float_tensor::<B, 2>(
            seq_len
                .iter()
                .map(|len| if *len > 0 { 1.0 } else { 0.0 })
                .collect(),
            [batch_size, 1],
            &device,
        );

        let (cells_fw, hidden_fw) = self.cell_fw.forward(input.clone(), None);

        let reversed = input
            .reshape([batch_size * max_len, d_input])
            .select(0, reverse)
            .reshape([batch_size, max_len, d_input]);

        let (cells_bw, hidden_bw) = self.cell_bw.forward(reversed, None);

        let final_state = |states: Tensor<B, 3>| {
            let [_, _, d_hidden] = states.dims();

            states
                .reshape([batch_size * max_len, d_hidden])
                .select(0, last.clone())
                .mul(non_empty.clone().repeat(1, d_hidden))
        };

        BiLstmState {
            cell: Tensor::cat(vec![final_state(cells_fw), final_state(cells_bw)], 1),
            hidden: Tensor::cat(vec![final_state(hidden_fw), final_state(hidden_bw)], 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;
    use pretty_assertions::assert_eq;

    use super::*;

    type B = NdArray;

    fn input(values: Vec<f32>, shape: [usize; 3]) -> Tensor<B, 3> {
        float_tensor(values, shape, &Default::default())
    }

    #[test]
    fn test_output_shape() {
        let encoder = BiLstmConfig::new(2, 3).init::<B>(&Default::default());

        let state = encoder.forward(input(vec![0.5; 2 * 4 * 2], [2, 4, 2]), &[4, 2]);

        assert_eq!(state.hidden.dims(), [2, 6]);
        assert_eq!(state.cell.dims(), [2, 6]);
    }

    #[test]
    fn test_padding_is_ignored() {
        let encoder = BiLstmConfig::new(1, 3).init::<B>(&Default::default());

        let zeros = encoder.forward(input(vec![0.3, -0.7, 0.0, 0.0], [1, 4, 1]), &[2]);
        let noise = encoder.forward(input(vec![0.3, -0.7, 9.0, -4.0], [1, 4, 1]), &[2]);

        zeros
            .hidden
            .into_data()
            .assert_approx_eq(&noise.hidden.into_data(), 5);
        zeros
            .cell
            .into_data()
            .assert_approx_eq(&noise.cell.into_data(), 5);
    }

    #[test]
    fn test_padded_sequence_matches_unpadded() {
        let encoder = BiLstmConfig::new(1, 3).init::<B>(&Default::default());

        let padded = encoder.forward(input(vec![0.3, -0.7, 0.0], [1, 3, 1]), &[2]);
        let exact = encoder.forward(input(vec![0.3, -0.7], [1, 2, 1]), &[2]);

        padded
            .hidden
            .into_data()
            .assert_approx_eq(&exact.hidden.into_data(), 5);
    }

    #[test]
    fn test_backward_direction_reads_in_reverse() {
        let encoder = BiLstmConfig::new(1, 3).init::<B>(&Default::default());

        let state = encoder.forward(input(vec![0.3, -0.7, 0.0], [1, 3, 1]), &[2]);

        // Run the backward cell by hand on the reversed valid prefix
        let (_, hidden) = encoder
            .cell_bw
            .forward(input(vec![-0.7, 0.3], [1, 2, 1]), None);
        let expected = hidden.slice([0..1, 1..2, 0..3]).reshape([1, 3]);

        state
            .hidden
            .slice([0..1, 3..6])
            .into_data()
            .assert_approx_eq(&expected.into_data(), 5);
    }

    #[test]
    fn test_empty_sequence_has_zero_state() {
        let encoder = BiLstmConfig::new(1, 2).init::<B>(&Default::default());

        let state = encoder.forward(input(vec![0.3, 0.0], [2, 1, 1]), &[1, 0]);

        let hidden = state.hidden.into_data().convert::<f32>().value;
        assert_eq!(&hidden[4..], &[0.0, 0.0, 0.0, 0.0]);
    }
}
