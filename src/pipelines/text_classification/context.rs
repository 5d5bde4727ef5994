use std::{
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use burn::tensor::backend::Backend;

use crate::utils::files::ensure_dir;

/// The device and output layout shared by every component of a training run
#[derive(Debug, Clone)]
pub struct RunContext<B: Backend> {
    /// Device on which to perform computation (e.g., CPU or CUDA device)
    pub device: B::Device,

    /// Top-level output directory, holding configs and submission files
    pub output_dir: PathBuf,

    /// `<output_dir>/runs/checkpoints`
    pub checkpoint_dir: PathBuf,

    /// `<output_dir>/runs/summaries/train`
    pub train_summary_dir: PathBuf,

    /// `<output_dir>/runs/summaries/dev`
    pub dev_summary_dir: PathBuf,
}

impl<B: Backend> RunContext<B> {
    /// Create the output layout under `output_dir`
    pub fn new(output_dir: impl AsRef<Path>, device: B::Device) -> anyhow::Result<Self> {
        let output_dir = ensure_dir(output_dir)?;
        let runs = output_dir.join("runs");

        Ok(Self {
            device,
            checkpoint_dir: ensure_dir(runs.join("checkpoints"))?,
            train_summary_dir: ensure_dir(runs.join("summaries").join("train"))?,
            dev_summary_dir: ensure_dir(runs.join("summaries").join("dev"))?,
            output_dir,
        })
    }

    /// Where the model configuration is stored
    pub fn model_config_path(&self) -> PathBuf {
        self.output_dir.join("config.json")
    }

    /// Where the training configuration is stored
    pub fn training_config_path(&self) -> PathBuf {
        self.output_dir.join("training.json")
    }

    /// A submission file name tagged with the current time, and with the held-out accuracy for
    /// intermediate submissions
    pub fn submission_path(&self, accuracy: Option<f64>) -> PathBuf {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        let name = match accuracy {
            Some(accuracy) => format!("kaggle_{}_accu{:.6}.csv", timestamp, accuracy),
            None => format!("kaggle_final_{}.csv", timestamp),
        };

        self.output_dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;

    use super::*;
    use crate::utils::files::scratch_dir;

    #[test]
    fn test_layout() {
        let root = scratch_dir("context");

        let context = RunContext::<NdArray>::new(root.join("out"), Default::default()).unwrap();

        assert!(context.checkpoint_dir.ends_with("out/runs/checkpoints"));
        assert!(context.train_summary_dir.ends_with("out/runs/summaries/train"));
        assert!(context.dev_summary_dir.ends_with("out/runs/summaries/dev"));
        assert!(context.checkpoint_dir.is_dir());
        assert!(context.train_summary_dir.is_dir());
        assert!(context.dev_summary_dir.is_dir());
    }

    #[test]
    fn test_submission_names() {
        let root = scratch_dir("context-names");
        let context = RunContext::<NdArray>::new(&root, Default::default()).unwrap();

        let best = context.submission_path(Some(0.8125));
        let best = best.file_name().unwrap().to_str().unwrap();
        assert!(best.starts_with("kaggle_"));
        assert!(best.ends_with("_accu0.812500.csv"));

        let last = context.submission_path(None);
        let last = last.file_name().unwrap().to_str().unwrap();
        assert!(last.starts_with("kaggle_final_"));
        assert!(last.ends_with(".csv"));
    }
}
