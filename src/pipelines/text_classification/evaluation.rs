use burn::{
    tensor::backend::Backend,
    train::{ClassificationOutput, ValidStep},
};

use crate::utils::tensors::{int_values, scalar};

use super::{
    batcher::{Batcher, Train},
    item::Example,
    sampler::TextBatch,
};

/// Aggregated metrics over the held-out chunks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Mean loss over chunks
    pub loss: f64,

    /// Mean accuracy over chunks
    pub accuracy: f64,

    /// Population standard deviation of the chunk accuracies
    pub std_accuracy: f64,
}

/// Fraction of rows whose highest score is the target class. NaN for an empty output.
pub fn accuracy<B: Backend>(output: &ClassificationOutput<B>) -> f64 {
    let predictions = int_values(output.output.clone().argmax(1));
    let targets = int_values(output.targets.clone());

    if targets.is_empty() {
        return f64::NAN;
    }

    let correct = predictions
        .iter()
        .zip(&targets)
        .filter(|(prediction, target)| prediction == target)
        .count();

    correct as f64 / targets.len() as f64
}

/// Mean of the non-NaN values, NaN when there are none
pub fn nanmean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Population standard deviation of the non-NaN values, NaN when there are none
pub fn nanstd(values: &[f64]) -> f64 {
    let mean = nanmean(values);

    let deviations: Vec<f64> = values
        .iter()
        .filter(|v| !v.is_nan())
        .map(|v| (v - mean).powi(2))
        .collect();

    nanmean(&deviations).sqrt()
}

/// Combine per-chunk losses and accuracies
pub fn summarize(losses: &[f64], accuracies: &[f64]) -> Evaluation {
    Evaluation {
        loss: nanmean(losses),
        accuracy: nanmean(accuracies),
        std_accuracy: nanstd(accuracies),
    }
}

/// Run the model over every held-out chunk without updating it
pub fn evaluate<B, M>(
    model: &M,
    batcher: &Batcher<B>,
    chunks: &[Vec<Example>],
) -> anyhow::Result<Evaluation>
where
    B: Backend,
    M: ValidStep<Train<B>, ClassificationOutput<B>>,
{
    let mut losses = Vec::with_capacity(chunks.len());
    let mut accuracies = Vec::with_capacity(chunks.len());

    for chunk in chunks.iter().filter(|chunk| !chunk.is_empty()) {
        let item = batcher.train(&TextBatch::new(0, chunk))?;
        let output = model.step(item);

        accuracies.push(accuracy(&output));
        losses.push(scalar(output.loss));
    }

    Ok(summarize(&losses, &accuracies))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use burn::backend::NdArray;

    use super::*;
    use crate::{
        testing,
        utils::tensors::{float_tensor, index_tensor},
    };

    type B = NdArray;

    #[test]
    fn test_identical_chunks_have_no_spread() {
        let evaluation = summarize(&[0.5, 0.5, 0.5], &[0.8, 0.8, 0.8]);

        assert!((evaluation.loss - 0.5).abs() < 1e-12);
        assert!((evaluation.accuracy - 0.8).abs() < 1e-12);
        assert!(evaluation.std_accuracy.abs() < 1e-12);
    }

    #[test]
    fn test_nan_chunks_are_excluded() {
        let evaluation = summarize(&[1.0, f64::NAN, 3.0], &[0.5, 1.0, f64::NAN]);

        assert!((evaluation.loss - 2.0).abs() < 1e-12);
        assert!((evaluation.accuracy - 0.75).abs() < 1e-12);
        assert!((evaluation.std_accuracy - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_nothing_to_average() {
        let evaluation = summarize(&[], &[f64::NAN]);

        assert!(evaluation.loss.is_nan());
        assert!(evaluation.accuracy.is_nan());
        assert!(evaluation.std_accuracy.is_nan());
    }

    #[test]
    fn test_accuracy() {
        let device = Default::default();

        let output = ClassificationOutput::<B> {
            loss: float_tensor(vec![0.0], [1], &device),
            output: float_tensor(vec![0.9, 0.1, 0.2, 0.8, 0.6, 0.4, 0.3, 0.7], [4, 2], &device),
            targets: index_tensor(vec![0, 1, 1, 1], &device),
        };

        assert!((accuracy(&output) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate() {
        let device = Default::default();
        let config = testing::model_config();
        let model = config.init::<B>(&device);

        let batcher = Batcher::<B>::new(
            testing::tokenizer(),
            Arc::new(testing::embedding()),
            config.pad_token_id(),
            config.max_seq_length(),
            device,
        );

        let chunks: Vec<Vec<Example>> = testing::examples(10).chunks(4).map(<[Example]>::to_vec).collect();

        let evaluation = evaluate(&model, &batcher, &chunks).unwrap();

        assert!(evaluation.loss.is_finite());
        assert!((0.0..=1.0).contains(&evaluation.accuracy));
        assert!(evaluation.std_accuracy >= 0.0);
    }
}
