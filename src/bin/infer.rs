//! Command line tool to predict unlabeled texts from a training checkpoint

use std::path::PathBuf;

use anyhow::anyhow;
use burn::{
    backend::{libtorch::LibTorchDevice, LibTorch},
    config::Config as _,
};
use contextual_bilstm::{
    cli::models::Model,
    datasets::{raw_text::RawText, DataSource},
    embeddings::EmbeddingTable,
    pipelines::text_classification::{self, Config},
    utils::hugging_face::download_hf_model,
};
use log::{info, LevelFilter};
use pico_args::Arguments;
use tokenizers::Tokenizer;

const HELP: &str = "\
Usage: infer STEP [OPTIONS]

Arguments:
  STEP                 The checkpoint step to restore

Options:
  -h, --help           Print help
  -d, --data-dir       The directory holding test.csv (defaults to 'data')
  -e, --embeddings     The path to the word2vec embeddings used for training
  -o, --output-dir     The output directory of the training run (defaults to 'output')
  -f, --file           The submission file to write (defaults to '<output-dir>/kaggle_step<STEP>.csv')
  --cpu                Run on the CPU instead of the first CUDA device
";

#[derive(Debug)]
struct Args {
    step: usize,
    data_dir: Option<String>,
    embeddings: Option<String>,
    output_dir: Option<String>,
    file: Option<PathBuf>,
    cpu: bool,
}

fn parse_args() -> anyhow::Result<Option<Args>> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        return Ok(None);
    }

    let args = Args {
        data_dir: pargs.opt_value_from_str(["-d", "--data-dir"])?,
        embeddings: pargs.opt_value_from_str(["-e", "--embeddings"])?,
        output_dir: pargs.opt_value_from_str(["-o", "--output-dir"])?,
        file: pargs.opt_value_from_str(["-f", "--file"])?,
        cpu: pargs.contains("--cpu"),
        step: pargs.free_from_str().map_err(|e| match e {
            pico_args::Error::MissingArgument => anyhow!("Missing required argument: STEP"),
            _ => anyhow!("{}", e),
        })?,
    };

    Ok(Some(args))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::formatted_timed_builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let Some(args) = parse_args()? else {
        println!("{}", HELP);
        return Ok(());
    };

    let output_dir = PathBuf::from(args.output_dir.unwrap_or_else(|| "output".to_string()));

    // The training config names the contextual model the checkpoint was built on
    let config = Config::load(output_dir.join("training.json"))
        .map_err(|e| anyhow!("Unable to load training config: {}", e))?;
    let model = Model::try_from(config.model_name.as_str())?;

    let data_dir = args.data_dir.unwrap_or_else(|| "data".to_string());
    let data = RawText::load(&data_dir, args.embeddings.unwrap_or_default())?;
    data.validate()?;

    info!("Loading word2vec embeddings from {}...", data.embedding_src());
    let embedding = EmbeddingTable::load(data.embedding_src())?;

    let files = download_hf_model(&model.to_string()).await?;
    let tokenizer = Tokenizer::from_file(&files.tokenizer)
        .map_err(|e| anyhow!("Unable to load tokenizer: {}", e))?;

    let device = if args.cpu {
        LibTorchDevice::Cpu
    } else {
        LibTorchDevice::Cuda(0)
    };

    let submission = args
        .file
        .unwrap_or_else(|| output_dir.join(format!("kaggle_step{}.csv", args.step)));

    let predictions = tokio::task::spawn_blocking(move || {
        text_classification::infer::<LibTorch>(
            device,
            &output_dir,
            args.step,
            embedding,
            tokenizer,
            data.test_texts(),
            config.val_split,
            &submission,
        )
    })
    .await??;

    info!("Predicted {} texts", predictions.len());

    Ok(())
}
