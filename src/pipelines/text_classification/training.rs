use std::{path::PathBuf, sync::Arc, time::Instant};

use burn::{
    config::Config as _,
    module::AutodiffModule,
    optim::{AdamConfig, Optimizer},
    tensor::backend::AutodiffBackend,
    train::{ClassificationOutput, TrainOutput, TrainStep},
    LearningRate,
};
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use tokenizers::Tokenizer;

use crate::{
    datasets::DataSource,
    embeddings::EmbeddingTable,
    models::ebilstm,
    utils::{interrupt::Interrupt, tensors::scalar},
};

use super::{
    batcher::{Batcher, Train},
    checkpoint::Checkpointer,
    context::RunContext,
    evaluation::{accuracy, evaluate, Evaluation},
    item::{examples, Example},
    model::Classifier,
    sampler::{split, BatchSampler, TextBatch},
    submission::{predict_to_file, Predictions},
    summary::SummaryWriter,
};

/// Define configuration struct for the experiment
#[derive(burn::config::Config)]
pub struct Config {
    /// Number of examples held out for evaluation
    #[config(default = 10_000)]
    pub val_samples: usize,

    /// Size of every held-out chunk, also used to chunk predictions
    #[config(default = 50)]
    pub val_split: usize,

    /// Number of epochs
    #[config(default = 20)]
    pub n_epochs: usize,

    /// Batch size
    #[config(default = 32)]
    pub batch_size: usize,

    /// Learning rate
    #[config(default = 1e-4)]
    pub learning_rate: LearningRate,

    /// Adam epsilon
    #[config(default = 1e-8)]
    pub adam_epsilon: f32,

    /// Evaluate every n steps
    #[config(default = 2000)]
    pub eval_every_step: usize,

    /// Log rolling averages every n steps
    #[config(default = 100)]
    pub output_every_step: usize,

    /// Save a checkpoint every n steps
    #[config(default = 2000)]
    pub checkpoint_every_step: usize,

    /// Seed for the split and the batch order. Fresh entropy when unset.
    pub seed: Option<u64>,

    /// Contextual model name (e.g., "bert-large-uncased")
    #[config(default = "\"bert-large-uncased\".to_string()")]
    pub model_name: String,

    /// Directory for configs, checkpoints, summaries and submissions
    #[config(default = "\"output\".to_string()")]
    pub output_dir: String,
}

/// How a training run ended
#[derive(Debug, Clone, PartialEq)]
pub enum TrainingOutcome {
    /// Every batch was consumed, followed by a final evaluation, checkpoint and prediction
    Finished {
        /// Steps performed
        step: usize,

        /// Best held-out accuracy seen at a periodic evaluation
        best_accuracy: Option<f64>,

        /// Final predictions for the unlabeled texts
        predictions: Predictions,
    },

    /// Stopped early by an interruption
    Interrupted {
        /// Steps performed
        step: usize,
    },
}

fn every(step: usize, n: usize) -> bool {
    n > 0 && step % n == 0
}

/// The best held-out accuracy seen so far
#[derive(Debug, Clone, Copy)]
struct BestAccuracy(f64);

impl Default for BestAccuracy {
    fn default() -> Self {
        Self(-1.0)
    }
}

impl BestAccuracy {
    /// Record an accuracy, returning whether it is strictly better than every earlier one. NaN
    /// never is.
    fn improve(&mut self, accuracy: f64) -> bool {
        if accuracy > self.0 {
            self.0 = accuracy;
            true
        } else {
            false
        }
    }

    fn get(&self) -> Option<f64> {
        (self.0 >= 0.0).then_some(self.0)
    }
}

/// The optimization loop and everything it reports to
pub struct TrainingLoop<'a, B: AutodiffBackend> {
    /// Output layout and device
    pub context: &'a RunContext<B>,

    /// Experiment configuration
    pub config: &'a Config,

    /// Batcher for optimization steps
    pub batcher_train: &'a Batcher<B>,

    /// Batcher for evaluation and prediction, which run without gradients
    pub batcher_valid: &'a Batcher<B::InnerBackend>,

    /// Held-out chunks
    pub validation: &'a [Vec<Example>],

    /// Unlabeled texts to predict
    pub test_texts: &'a [String],

    /// Polled before every step
    pub interrupt: &'a Interrupt,
}

impl<'a, B: AutodiffBackend> TrainingLoop<'a, B> {
    /// Consume the batches, one optimization step each
    pub fn run<M, I>(&self, mut model: M, batches: I) -> anyhow::Result<TrainingOutcome>
    where
        M: AutodiffModule<B> + TrainStep<Train<B>, ClassificationOutput<B>>,
        M::InnerModule: Classifier<B::InnerBackend>,
        I: IntoIterator<Item = TextBatch>,
    {
        let config = self.config;

        let mut optim = AdamConfig::new()
            .with_epsilon(config.adam_epsilon)
            .init::<B, M>();

        let checkpointer = Checkpointer::new(&self.context.checkpoint_dir);
        let mut train_summary = SummaryWriter::new(&self.context.train_summary_dir)?;
        let mut dev_summary = SummaryWriter::new(&self.context.dev_summary_dir)?;

        let mut step = 0;
        let mut best_accuracy = BestAccuracy::default();
        let mut loss_sum = 0.0;
        let mut accuracy_sum = 0.0;

        info!("Training started");

        for batch in batches {
            if self.interrupt.is_triggered() {
                return self.interrupted(&checkpointer, &model, step);
            }

            let item = self.batcher_train.train(&batch)?;

            let TrainOutput { grads, item: output } = model.step(item);
            model = optim.step(config.learning_rate, model, grads);

            step += 1;

            let batch_accuracy = accuracy(&output);
            let batch_loss = scalar(output.loss);

            train_summary.add_scalars(step, &[("loss", batch_loss), ("accuracy", batch_accuracy)])?;

            loss_sum += batch_loss;
            accuracy_sum += batch_accuracy;

            if every(step, config.output_every_step) {
                let n = config.output_every_step as f64;

                info!(
                    "Step {}, epoch {}, loss {:.6}, accuracy {:.4}",
                    step,
                    batch.epoch,
                    loss_sum / n,
                    accuracy_sum / n
                );

                loss_sum = 0.0;
                accuracy_sum = 0.0;
            }

            if every(step, config.eval_every_step) {
                let evaluation = self.evaluate(&model, step, &mut dev_summary)?;

                if best_accuracy.improve(evaluation.accuracy) {
                    let path = self.context.submission_path(Some(evaluation.accuracy));
                    info!("New best accuracy, writing submission {}", path.display());

                    self.predict(&model, path)?;
                }
            }

            if every(step, config.checkpoint_every_step) {
                checkpointer.save(&model, step)?;
            }
        }

        if self.interrupt.is_triggered() {
            return self.interrupted(&checkpointer, &model, step);
        }

        if step == 0 {
            info!("No steps performed");
        } else {
            info!("Finished all batches after {} steps", step);
        }

        info!("Performing final evaluation...");
        self.evaluate(&model, step, &mut dev_summary)?;

        info!("Performing final checkpoint...");
        checkpointer.save(&model, step)?;

        let path = self.context.submission_path(None);
        info!("Writing final submission {}", path.display());

        let predictions = self.predict(&model, path)?;

        Ok(TrainingOutcome::Finished {
            step,
            best_accuracy: best_accuracy.get(),
            predictions,
        })
    }

    fn evaluate<M>(
        &self,
        model: &M,
        step: usize,
        summary: &mut SummaryWriter,
    ) -> anyhow::Result<Evaluation>
    where
        M: AutodiffModule<B>,
        M::InnerModule: Classifier<B::InnerBackend>,
    {
        info!("Evaluating...");

        let start = Instant::now();
        let evaluation = evaluate(&model.valid(), self.batcher_valid, self.validation)?;

        info!(
            "Evaluation performed in {}ms: loss {:.6}, accuracy {:.4} (std {:.4})",
            start.elapsed().as_millis(),
            evaluation.loss,
            evaluation.accuracy,
            evaluation.std_accuracy
        );

        summary.add_scalars(
            step,
            &[
                ("val_accuracy", evaluation.accuracy),
                ("val_std_accuracy", evaluation.std_accuracy),
                ("val_loss", evaluation.loss),
            ],
        )?;

        Ok(evaluation)
    }

    fn predict<M>(&self, model: &M, path: PathBuf) -> anyhow::Result<Predictions>
    where
        M: AutodiffModule<B>,
        M::InnerModule: Classifier<B::InnerBackend>,
    {
        predict_to_file(
            &model.valid(),
            self.batcher_valid,
            self.test_texts,
            self.config.val_split,
            &path,
        )
    }

    fn interrupted<M: AutodiffModule<B>>(
        &self,
        checkpointer: &Checkpointer,
        model: &M,
        step: usize,
    ) -> anyhow::Result<TrainingOutcome> {
        if step == 0 {
            info!("Training interrupted before the first step, no checkpointing to do");
        } else {
            info!("Training interrupted, performing final checkpoint...");
            info!("Press Ctrl-C again to forcefully interrupt this");

            checkpointer.save(model, step)?;
        }

        Ok(TrainingOutcome::Interrupted { step })
    }
}

/// Define train function
#[allow(clippy::too_many_arguments)]
pub fn train<B: AutodiffBackend, D: DataSource>(
    device: B::Device,              // Device on which to perform computation
    data: &D,                       // Labeled and unlabeled texts
    embedding: EmbeddingTable,      // Static word vectors
    tokenizer: Tokenizer,           // Tokenizer of the contextual model
    model_config: ebilstm::Config,  // Model configuration
    model_file: Option<PathBuf>,    // Pretrained contextual weights
    config: Config,                 // Experiment configuration
    interrupt: &Interrupt,          // Stops the loop between batches
) -> anyhow::Result<TrainingOutcome> {
    data.validate()?;

    let context = RunContext::<B>::new(&config.output_dir, device.clone())?;

    // Save the configuration so the checkpoints can be rebuilt
    model_config
        .save(context.model_config_path())
        .map_err(|e| anyhow!("Unable to save model config: {}", e))?;
    config
        .save(context.training_config_path())
        .map_err(|e| anyhow!("Unable to save training config: {}", e))?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    info!("Splitting dataset into training and validation...");

    let split = split(
        examples(data.texts(), data.labels()),
        config.val_samples,
        config.val_split,
        &mut rng,
    );

    info!(
        "{} training examples, {} held-out chunks, {} unlabeled texts",
        split.train.len(),
        split.validation.len(),
        data.test_texts().len()
    );

    let embedding = Arc::new(embedding);

    // Initialize batchers for training and evaluation
    let batcher_train = Batcher::<B>::new(
        tokenizer.clone(),
        embedding.clone(),
        model_config.pad_token_id(),
        model_config.max_seq_length(),
        device.clone(),
    );
    let batcher_valid = Batcher::<B::InnerBackend>::new(
        tokenizer,
        embedding,
        model_config.pad_token_id(),
        model_config.max_seq_length(),
        device.clone(),
    );

    info!("Building model...");

    let model = match model_file {
        Some(model_file) => model_config.init_pretrained::<B>(model_file, &device),
        None => model_config.init::<B>(&device),
    };

    let sampler = BatchSampler::new(split.train, config.batch_size, config.n_epochs);

    info!(
        "Generating {} batches over {} epochs...",
        sampler.total_batches(),
        config.n_epochs
    );

    let training = TrainingLoop {
        context: &context,
        config: &config,
        batcher_train: &batcher_train,
        batcher_valid: &batcher_valid,
        validation: &split.validation,
        test_texts: data.test_texts(),
        interrupt,
    };

    training.run(model, sampler.batches(&mut rng))
}
