//! Command line tool for training

use anyhow::anyhow;
use burn::backend::{libtorch::LibTorchDevice, Autodiff, LibTorch};
use contextual_bilstm::{
    cli::{datasets::Dataset, models::Model},
    datasets::{raw_text::RawText, DataSource},
    embeddings::EmbeddingTable,
    models::ebilstm,
    pipelines::text_classification::{self, TrainingOutcome},
    utils::{hugging_face::download_hf_model, interrupt::Interrupt},
};
use log::{error, info, LevelFilter};
use pico_args::Arguments;
use tokenizers::Tokenizer;

const HELP: &str = "\
Usage: train DATASET [OPTIONS]

Arguments:
  DATASET              The dataset to use (e.g., 'raw-text')

Options:
  -h, --help           Print help
  -m, --model          The contextual model to use (defaults to 'bert-large-uncased')
  -d, --data-dir       The directory holding train.csv and test.csv (defaults to 'data')
  -e, --embeddings     The path to the pre-trained word2vec embeddings
  -o, --output-dir     Where to write configs, checkpoints and submissions (defaults to 'output')
  -n, --num-epochs     Number of epochs to train for
  -b, --batch-size     Batch size
  -s, --seed           Seed for the validation split and batch order
  --cpu                Train on the CPU instead of the first CUDA device
";

#[derive(Debug)]
struct Args {
    dataset: String,
    model: Option<String>,
    data_dir: Option<String>,
    embeddings: Option<String>,
    output_dir: Option<String>,
    num_epochs: Option<usize>,
    batch_size: Option<usize>,
    seed: Option<u64>,
    cpu: bool,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            model: pargs.opt_value_from_str(["-m", "--model"])?,
            data_dir: pargs.opt_value_from_str(["-d", "--data-dir"])?,
            embeddings: pargs.opt_value_from_str(["-e", "--embeddings"])?,
            output_dir: pargs.opt_value_from_str(["-o", "--output-dir"])?,
            num_epochs: pargs.opt_value_from_str(["-n", "--num-epochs"])?,
            batch_size: pargs.opt_value_from_str(["-b", "--batch-size"])?,
            seed: pargs.opt_value_from_str(["-s", "--seed"])?,
            cpu: pargs.contains("--cpu"),
            dataset: pargs.free_from_str().map_err(|e| match e {
                pico_args::Error::MissingArgument => anyhow!("Missing required argument: DATASET"),
                _ => anyhow!("{}", e),
            })?,
        };

        Ok(Some(args))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::formatted_timed_builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let Some(args) = Args::parse()? else {
        print!("{}", HELP);

        return Ok(());
    };

    let model = match &args.model {
        Some(model) => Model::try_from(model.as_str())?,
        None => Model::default(),
    };

    let data_dir = args.data_dir.clone().unwrap_or_else(|| "data".to_string());
    let embeddings = args.embeddings.clone().unwrap_or_default();

    let data = match Dataset::try_from(args.dataset.as_str())? {
        Dataset::RawText => RawText::load(&data_dir, embeddings)?,
    };

    if let Err(e) = data.validate() {
        error!("{}", e);
        std::process::exit(1);
    }

    info!("Loading word2vec embeddings from {}...", data.embedding_src());
    let embedding = EmbeddingTable::load(data.embedding_src())?;

    let files = download_hf_model(&model.to_string()).await?;

    let tokenizer = Tokenizer::from_file(&files.tokenizer)
        .map_err(|e| anyhow!("Unable to load tokenizer: {}", e))?;

    let model_config =
        ebilstm::Config::load_pretrained(files.config, embedding.dim(), data.max_tok_count())?;

    let mut config = text_classification::Config::new().with_model_name(model.to_string());

    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }

    if let Some(num_epochs) = args.num_epochs {
        config.n_epochs = num_epochs;
    }

    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }

    config.seed = args.seed;

    let device = if args.cpu {
        LibTorchDevice::Cpu
    } else {
        LibTorchDevice::Cuda(0)
    };

    let interrupt = Interrupt::new();
    interrupt.listen_for_ctrl_c();

    let outcome = tokio::task::spawn_blocking(move || {
        text_classification::train::<Autodiff<LibTorch>, _>(
            device,
            &data,
            embedding,
            tokenizer,
            model_config,
            Some(files.weights),
            config,
            &interrupt,
        )
    })
    .await??;

    match outcome {
        TrainingOutcome::Finished {
            step,
            best_accuracy,
            predictions,
        } => info!(
            "Finished after {} steps, best accuracy {:?}, {} final predictions",
            step,
            best_accuracy,
            predictions.len()
        ),
        TrainingOutcome::Interrupted { step } => info!("Interrupted after {} steps", step),
    }

    Ok(())
}
