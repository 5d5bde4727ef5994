use rand::{seq::SliceRandom, Rng};

use super::item::{token_count, Example, LabelPair};

/// A training batch before it is moved to a device
#[derive(Debug, Clone, PartialEq)]
pub struct TextBatch {
    /// The epoch this batch belongs to, starting at 0
    pub epoch: usize,

    /// Raw texts
    pub texts: Vec<String>,

    /// One-hot labels aligned with `texts`
    pub labels: Vec<LabelPair>,

    /// Whitespace token count of every text
    pub seq_len: Vec<usize>,
}

impl TextBatch {
    /// Build a batch from examples
    pub fn new(epoch: usize, examples: &[Example]) -> Self {
        Self {
            epoch,
            texts: examples.iter().map(|e| e.text.clone()).collect(),
            labels: examples.iter().map(|e| e.label).collect(),
            seq_len: examples.iter().map(|e| token_count(&e.text)).collect(),
        }
    }

    /// Number of texts in the batch
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Whether the batch has no texts
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// A randomly partitioned dataset
#[derive(Debug, Clone)]
pub struct Split {
    /// Examples used for optimization
    pub train: Vec<Example>,

    /// Held-out examples in fixed-size chunks
    pub validation: Vec<Vec<Example>>,
}

/// Shuffle the examples, hold out the first `val_samples` in chunks of `val_split`, and train on
/// the rest. A dataset smaller than `val_samples` is held out entirely.
pub fn split<R: Rng>(
    mut examples: Vec<Example>,
    val_samples: usize,
    val_split: usize,
    rng: &mut R,
) -> Split {
    examples.shuffle(rng);

    let val_samples = val_samples.min(examples.len());
    let train = examples.split_off(val_samples);

    let validation = examples
        .chunks(val_split.max(1))
        .map(<[Example]>::to_vec)
        .collect();

    Split { train, validation }
}

/// Produces shuffled mini-batches over a number of epochs
#[derive(Debug, Clone)]
pub struct BatchSampler {
    examples: Vec<Example>,
    batch_size: usize,
    n_epochs: usize,
}

impl BatchSampler {
    /// Create a sampler. A batch size of 0 is treated as 1.
    pub fn new(examples: Vec<Example>, batch_size: usize, n_epochs: usize) -> Self {
        Self {
            examples,
            batch_size: batch_size.max(1),
            n_epochs,
        }
    }

    /// Number of batches in every epoch
    pub fn batches_per_epoch(&self) -> usize {
        self.examples.len().div_ceil(self.batch_size)
    }

    /// Number of batches over all epochs
    pub fn total_batches(&self) -> usize {
        self.n_epochs * self.batches_per_epoch()
    }

    /// Start a fresh pass over all epochs. Every epoch draws a new permutation from `rng`.
    pub fn batches<R: Rng>(&self, rng: R) -> Batches<'_, R> {
        Batches {
            sampler: self,
            rng,
            epoch: 0,
            order: Vec::new(),
            start: 0,
        }
    }
}

/// Iterator over the batches of a [BatchSampler]
pub struct Batches<'a, R> {
    sampler: &'a BatchSampler,
    rng: R,
    /// Epochs started so far
    epoch: usize,
    order: Vec<usize>,
    start: usize,
}

impl<R: Rng> Iterator for Batches<'_, R> {
    type Item = TextBatch;

    fn next(&mut self) -> Option<Self::Item> {
        let n_samples = self.sampler.examples.len();

        if self.start >= self.order.len() {
            if n_samples == 0 || self.epoch == self.sampler.n_epochs {
                return None;
            }

            self.order = (0..n_samples).collect();
            self.order.shuffle(&mut self.rng);
            self.start = 0;
            self.epoch += 1;
        }

        let end = (self.start + self.sampler.batch_size).min(n_samples);

        let examples: Vec<Example> = self.order[self.start..end]
            .iter()
            .map(|i| self.sampler.examples[*i].clone())
            .collect();

        self.start = end;

        Some(TextBatch::new(self.epoch - 1, &examples))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::pipelines::text_classification::item::{NEGATIVE, POSITIVE};

    fn dataset(n: usize) -> Vec<Example> {
        (0..n)
            .map(|i| {
                let label = if i % 2 == 0 { POSITIVE } else { NEGATIVE };
                Example::new(format!("{}text #{}", "word ".repeat(i % 5), i), label)
            })
            .collect()
    }

    #[test]
    fn test_total_batches() {
        for (n, batch_size, n_epochs) in [(10, 3, 2), (9, 3, 3), (1, 32, 1), (33, 32, 4)] {
            let sampler = BatchSampler::new(dataset(n), batch_size, n_epochs);
            let count = sampler.batches(StdRng::seed_from_u64(1)).count();

            assert_eq!(count, n_epochs * n.div_ceil(batch_size));
            assert_eq!(count, sampler.total_batches());
        }
    }

    #[test]
    fn test_batches_are_aligned() {
        let sampler = BatchSampler::new(dataset(11), 4, 2);

        for batch in sampler.batches(StdRng::seed_from_u64(7)) {
            assert_eq!(batch.texts.len(), batch.labels.len());
            assert_eq!(batch.texts.len(), batch.seq_len.len());

            for (text, len) in batch.texts.iter().zip(&batch.seq_len) {
                assert_eq!(*len, text.split_whitespace().count());
            }
        }
    }

    #[test]
    fn test_every_epoch_covers_the_dataset_once() {
        let examples = dataset(10);
        let sampler = BatchSampler::new(examples.clone(), 3, 3);

        let mut epochs: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        let mut sizes = Vec::new();

        for batch in sampler.batches(StdRng::seed_from_u64(3)) {
            sizes.push(batch.len());
            epochs.entry(batch.epoch).or_default().extend(batch.texts);
        }

        // The final chunk of each epoch is smaller and never borrows from the next epoch
        assert_eq!(sizes, vec![3, 3, 3, 1, 3, 3, 3, 1, 3, 3, 3, 1]);

        let mut expected: Vec<String> = examples.into_iter().map(|e| e.text).collect();
        expected.sort();

        assert_eq!(epochs.len(), 3);

        for (_, mut texts) in epochs {
            texts.sort();
            assert_eq!(texts, expected);
        }
    }

    #[test]
    fn test_labels_follow_their_texts() {
        let examples = dataset(20);
        let sampler = BatchSampler::new(examples.clone(), 6, 1);

        for batch in sampler.batches(StdRng::seed_from_u64(11)) {
            for (text, label) in batch.texts.iter().zip(&batch.labels) {
                let original = examples.iter().find(|e| &e.text == text).unwrap();
                assert_eq!(&original.label, label);
            }
        }
    }

    #[test]
    fn test_restartable() {
        let sampler = BatchSampler::new(dataset(15), 4, 2);

        let first: Vec<_> = sampler.batches(StdRng::seed_from_u64(5)).collect();
        let second: Vec<_> = sampler.batches(StdRng::seed_from_u64(5)).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_dataset_yields_nothing() {
        let sampler = BatchSampler::new(Vec::new(), 4, 3);

        assert_eq!(sampler.batches(StdRng::seed_from_u64(0)).count(), 0);
    }

    #[test]
    fn test_split() {
        let mut rng = StdRng::seed_from_u64(42);

        let result = split(dataset(12_000), 10_000, 50, &mut rng);

        assert_eq!(result.validation.len(), 200);
        assert!(result.validation.iter().all(|chunk| chunk.len() == 50));
        assert_eq!(result.train.len(), 2_000);

        // Nothing is lost or duplicated by the split
        let mut texts: Vec<String> = result
            .validation
            .into_iter()
            .flatten()
            .chain(result.train)
            .map(|e| e.text)
            .collect();
        texts.sort();
        texts.dedup();

        assert_eq!(texts.len(), 12_000);
    }

    #[test]
    fn test_split_small_dataset_is_all_validation() {
        let mut rng = StdRng::seed_from_u64(42);

        let result = split(dataset(120), 10_000, 50, &mut rng);

        assert_eq!(
            result.validation.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![50, 50, 20]
        );
        assert!(result.train.is_empty());
    }
}
