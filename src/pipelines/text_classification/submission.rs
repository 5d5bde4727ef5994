use std::path::Path;

use anyhow::Context;
use log::info;
use serde::Serialize;

use crate::utils::tensors::int_values;

use super::{batcher::Batcher, model::Classifier};

/// Predicted class ids for the unlabeled texts, in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predictions(pub Vec<usize>);

impl Predictions {
    /// Number of predictions
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no predictions
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Submission label of a class id: class 0 is positive
pub fn submission_label(class: usize) -> i8 {
    if class == 0 {
        1
    } else {
        -1
    }
}

#[derive(Serialize)]
struct Row {
    #[serde(rename = "Id")]
    id: usize,

    #[serde(rename = "Prediction")]
    prediction: i8,
}

/// Write predictions as an `Id,Prediction` CSV with 1-based ids
pub fn write_submission(path: &Path, predictions: &Predictions) -> anyhow::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Unable to create submission file {}", path.display()))?;

    // Written by hand so an empty prediction set still gets a header
    writer.write_record(["Id", "Prediction"])?;

    for (i, class) in predictions.0.iter().enumerate() {
        writer.serialize(Row {
            id: i + 1,
            prediction: submission_label(*class),
        })?;
    }

    writer.flush()?;

    Ok(())
}

/// Predict the class of every text, `chunk_size` texts at a time
pub fn predict<B, M>(
    model: &M,
    batcher: &Batcher<B>,
    texts: &[String],
    chunk_size: usize,
) -> anyhow::Result<Predictions>
where
    B: burn::tensor::backend::Backend,
    M: Classifier<B>,
{
    let mut classes = Vec::with_capacity(texts.len());

    for chunk in texts.chunks(chunk_size.max(1)) {
        let probabilities = model.infer(batcher.infer(chunk)?);

        classes.extend(
            int_values(probabilities.argmax(1))
                .into_iter()
                .map(|class| class as usize),
        );
    }

    Ok(Predictions(classes))
}

/// Predict the unlabeled texts and write them to a submission file
pub fn predict_to_file<B, M>(
    model: &M,
    batcher: &Batcher<B>,
    texts: &[String],
    chunk_size: usize,
    path: &Path,
) -> anyhow::Result<Predictions>
where
    B: burn::tensor::backend::Backend,
    M: Classifier<B>,
{
    let predictions = predict(model, batcher, texts, chunk_size)?;

    write_submission(path, &predictions)?;

    info!("Wrote {} predictions to {}", predictions.len(), path.display());

    Ok(predictions)
}
