use clap::{Parser, ValueEnum};
use image_jobs::config::{self, JobConfig};
use image_jobs::jobs::{ExifExtractor, ItemProcessor, Thumbnailer};
use image_jobs::pipeline::{self, PipelineOptions};
use image_jobs::store::{ObjectStore, S3Store};
use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum JobKind {
    /// Extract EXIF tags to exif/<key without first segment>.json
    Exif,
    /// Write an 800x600-bounded JPEG to processed/resize/<filename>
    Resize,
}

#[derive(Parser)]
#[command(name = "image-jobs")]
#[command(version)]
#[command(about = "EXIF extraction and thumbnail jobs for uploaded images")]
#[command(long_about = "\
EXIF extraction and thumbnail jobs for uploaded images

Each invocation receives a batch of fan-out envelopes. Every envelope holds a
JSON-encoded list of storage change records, and every record names one
uploaded object:

  { \"Records\": [ { \"Sns\": { \"Message\": \"{\\\"Records\\\": [ { \\\"s3\\\": ... } ]}\" } } ] }

Records are processed independently. The response counts them:

  { \"statusCode\": 200 | 207, \"processed\": N, \"failed\": M }

Without --event the binary serves invocations from the Lambda runtime API.
With --event it runs a single batch from a JSON file and prints the summary.")]
struct Cli {
    /// Which job this process runs
    #[arg(value_enum, env = "IMAGE_JOBS_JOB")]
    job: JobKind,

    /// TOML file overriding the stock configuration
    #[arg(long, env = "IMAGE_JOBS_CONFIG")]
    config: Option<PathBuf>,

    /// Run once against a batch read from this JSON file
    #[arg(long)]
    event: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;
    init_thread_pool(&config.processing);

    let store: Arc<dyn ObjectStore> = Arc::new(S3Store::from_env().await);
    let processor = build_processor(cli.job, store, &config);
    let options = PipelineOptions::from(&config);

    match cli.event {
        Some(path) => {
            let event: Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
            let summary = pipeline::run(processor.as_ref(), event, &options).await;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        None => {
            lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
                let processor = Arc::clone(&processor);
                async move {
                    let summary = pipeline::run(processor.as_ref(), event.payload, &options).await;
                    Ok::<_, Error>(summary)
                }
            }))
            .await
        }
    }
}

fn build_processor(
    job: JobKind,
    store: Arc<dyn ObjectStore>,
    config: &JobConfig,
) -> Arc<dyn ItemProcessor> {
    match job {
        JobKind::Exif => Arc::new(ExifExtractor::new(store)),
        JobKind::Resize => Arc::new(Thumbnailer::new(store, config.thumbnail.params())),
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
    {
        tracing::warn!(error = %e, "rayon pool already initialised");
    }
}
