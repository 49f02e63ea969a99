//! Invocation pipeline: unwrap → process → aggregate.
//!
//! ```text
//! event ──► Batch ──► Unwrapper ──► ChangeRecord ──► resolve ──► ItemProcessor
//!                        │                                            │
//!                        └── envelope failures ──► Tally ◄── results ─┘
//! ```
//!
//! Records are processed with at most `max_in_flight` running at once and
//! their results are tallied in completion order. Nothing a record does can
//! reach another record: every outcome, good or bad, becomes exactly one
//! count in the [`Summary`].

use crate::batch::Unwrapper;
use crate::config::JobConfig;
use crate::event::{Batch, ChangeRecord};
use crate::jobs::{ItemProcessor, ItemResult};
use crate::summary::{Summary, Tally};
use futures::StreamExt;
use serde_json::Value;

/// Knobs the pipeline itself needs. A `max_in_flight` of zero is treated as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub max_in_flight: usize,
    pub url_decode: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from(&JobConfig::default())
    }
}

impl From<&JobConfig> for PipelineOptions {
    fn from(config: &JobConfig) -> Self {
        Self {
            max_in_flight: config.processing.max_in_flight.max(1),
            url_decode: config.keys.url_decode,
        }
    }
}

/// Process one invocation payload and summarise the outcome.
pub async fn run<P: ItemProcessor + ?Sized>(
    processor: &P,
    event: Value,
    options: &PipelineOptions,
) -> Summary {
    let batch = Batch::from_event(event);
    tracing::info!(job = processor.name(), envelopes = batch.len(), "batch received");

    // buffer_unordered(0) would not bound anything
    let max_in_flight = options.max_in_flight.max(1);
    let mut unwrapper = Unwrapper::new(batch);
    let mut tally = Tally::default();
    {
        let mut results = futures::stream::iter(unwrapper.by_ref())
            .map(|record| process_record(processor, record, options))
            .buffer_unordered(max_in_flight);
        while let Some(result) = results.next().await {
            tally.record(&result);
        }
    }

    let summary = tally.finish(unwrapper.envelope_failures());
    tracing::info!(
        job = processor.name(),
        processed = summary.processed,
        failed = summary.failed,
        status = summary.status.code(),
        "processing complete"
    );
    summary
}

async fn process_record<P: ItemProcessor + ?Sized>(
    processor: &P,
    record: ChangeRecord,
    options: &PipelineOptions,
) -> ItemResult {
    let item = record.resolve(options.url_decode).inspect_err(|err| {
        tracing::error!(job = processor.name(), kind = %err.kind(), error = %err, "skipping record");
    })?;

    tracing::info!(job = processor.name(), bucket = %item.bucket, key = %item.key, "processing");
    processor.process(&item).await.inspect_err(|err| {
        tracing::error!(
            job = processor.name(),
            bucket = %item.bucket,
            key = %item.key,
            kind = %err.kind(),
            error = %err,
            "failed to process"
        );
    })
}
