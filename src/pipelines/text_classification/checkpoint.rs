use std::path::{Path, PathBuf};

use burn::{
    module::Module,
    record::{CompactRecorder, Recorder},
    tensor::backend::Backend,
};
use log::info;

/// Saves and restores step-tagged model parameters
#[derive(Debug, Clone)]
pub struct Checkpointer {
    dir: PathBuf,
}

impl Checkpointer {
    /// Create a checkpointer writing into an existing directory
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// The checkpoint path for a step, without the extension added by the recorder
    pub fn path(&self, step: usize) -> PathBuf {
        self.dir.join(format!("model-{}", step))
    }

    /// Persist every parameter of the model, tagged with `step`
    pub fn save<B: Backend, M: Module<B>>(&self, model: &M, step: usize) -> anyhow::Result<PathBuf> {
        let path = self.path(step);

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .map_err(|e| anyhow!("Unable to save checkpoint {}: {}", path.display(), e))?;

        info!("Saved model checkpoint to {}", path.display());

        Ok(path)
    }

    /// Load the parameters saved at `step` into the model
    pub fn load<B: Backend, M: Module<B>>(
        &self,
        model: M,
        step: usize,
        device: &B::Device,
    ) -> anyhow::Result<M> {
        let path = self.path(step);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .map_err(|e| anyhow!("Unable to load checkpoint {}: {}", path.display(), e))?;

        Ok(model.load_record(record))
    }
}

#[cfg(test)]
mod tests {
    use burn::{
        backend::NdArray,
        nn::{Linear, LinearConfig},
    };

    use super::*;
    use crate::utils::files::scratch_dir;

    type B = NdArray;

    #[test]
    fn test_save_and_load() {
        let device = Default::default();
        let checkpointer = Checkpointer::new(scratch_dir("checkpoint"));

        let saved: Linear<B> = LinearConfig::new(3, 2).init(&device);
        checkpointer.save(&saved, 7).unwrap();

        let fresh: Linear<B> = LinearConfig::new(3, 2).init(&device);
        let loaded = checkpointer.load(fresh, 7, &device).unwrap();

        // Half precision storage
        loaded
            .weight
            .val()
            .into_data()
            .assert_approx_eq(&saved.weight.val().into_data(), 2);
    }

    #[test]
    fn test_missing_step() {
        let device = Default::default();
        let checkpointer = Checkpointer::new(scratch_dir("checkpoint-missing"));

        let model: Linear<B> = LinearConfig::new(3, 2).init(&device);

        assert!(checkpointer.load(model, 1, &device).is_err());
    }
}
