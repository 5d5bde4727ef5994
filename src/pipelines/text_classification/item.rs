use derive_new::new;

/// One-hot pair for a positive text
pub const POSITIVE: LabelPair = LabelPair([1.0, 0.0]);

/// One-hot pair for a negative text
pub const NEGATIVE: LabelPair = LabelPair([0.0, 1.0]);

/// A binary label encoded as a one-hot pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPair(pub [f32; 2]);

impl LabelPair {
    /// Encode a raw data source label. Only `1` is positive.
    pub fn from_label(label: i64) -> Self {
        if label == 1 {
            POSITIVE
        } else {
            NEGATIVE
        }
    }

    /// The index of the hot entry, which is also the class id predicted by the model
    pub fn class_index(&self) -> usize {
        if self.0[0] >= self.0[1] {
            0
        } else {
            1
        }
    }
}

/// A labelled text used for training and validation
#[derive(Clone, Debug, PartialEq, new)]
pub struct Example {
    /// The raw text
    pub text: String,

    /// The encoded label
    pub label: LabelPair,
}

/// Count whitespace separated tokens, which is the sequence length the encoder sees
pub fn token_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Pair up raw texts and labels into examples
pub fn examples(texts: &[String], labels: &[i64]) -> Vec<Example> {
    texts
        .iter()
        .zip(labels)
        .map(|(text, label)| Example::new(text.clone(), LabelPair::from_label(*label)))
        .collect()
}
