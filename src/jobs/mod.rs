//! Per-item processors and their error model.
//!
//! A job turns one [`Item`] into one artifact in the same bucket:
//!
//! | Job | Reads | Writes |
//! |---|---|---|
//! | [`ExifExtractor`] | `uploads/2024/a.jpg` | `exif/2024/a.json` (`application/json`) |
//! | [`Thumbnailer`] | `uploads/2024/a.jpg` | `processed/resize/a.jpg` (`image/jpeg`) |
//!
//! Every failure inside a job is a [`JobError`] for that item only. The
//! pipeline counts it and moves on.
//!
//! Decoding and resizing are CPU-bound, so jobs hand that work to the rayon
//! pool through [`run_cpu`] and keep the async runtime free for store I/O.

pub mod exif;
pub mod thumbnail;

use crate::event::Item;
use crate::store::StoreError;
use async_trait::async_trait;
use std::panic::AssertUnwindSafe;
use thiserror::Error;

pub use exif::ExifExtractor;
pub use thumbnail::Thumbnailer;

/// Why an envelope or a record could not be processed.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("envelope could not be decoded: {0}")]
    EnvelopeDecode(String),
    #[error("malformed record: {0}")]
    MalformedRecord(String),
    #[error("download of s3://{bucket}/{key} failed: {source}")]
    Download {
        bucket: String,
        key: String,
        #[source]
        source: StoreError,
    },
    #[error("not a decodable image: {0}")]
    Decode(String),
    #[error("could not encode output: {0}")]
    Encode(String),
    #[error("upload of s3://{bucket}/{key} failed: {source}")]
    Upload {
        bucket: String,
        key: String,
        #[source]
        source: StoreError,
    },
}

/// Data-free tag of a [`JobError`], for logs and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    EnvelopeDecode,
    MalformedRecord,
    Download,
    Decode,
    Encode,
    Upload,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::EnvelopeDecode => "envelope_decode",
            FailureKind::MalformedRecord => "malformed_record",
            FailureKind::Download => "download",
            FailureKind::Decode => "decode",
            FailureKind::Encode => "encode",
            FailureKind::Upload => "upload",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl JobError {
    pub fn kind(&self) -> FailureKind {
        match self {
            JobError::EnvelopeDecode(_) => FailureKind::EnvelopeDecode,
            JobError::MalformedRecord(_) => FailureKind::MalformedRecord,
            JobError::Download { .. } => FailureKind::Download,
            JobError::Decode(_) => FailureKind::Decode,
            JobError::Encode(_) => FailureKind::Encode,
            JobError::Upload { .. } => FailureKind::Upload,
        }
    }

    pub(crate) fn download(item: &Item, source: StoreError) -> Self {
        JobError::Download {
            bucket: item.bucket.clone(),
            key: item.key.clone(),
            source,
        }
    }

    pub(crate) fn upload(artifact: &Artifact, source: StoreError) -> Self {
        JobError::Upload {
            bucket: artifact.bucket.clone(),
            key: artifact.key.clone(),
            source,
        }
    }
}

/// Where a job wrote its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub bucket: String,
    pub key: String,
    pub content_type: &'static str,
}

/// Outcome of processing one change record.
pub type ItemResult = Result<Artifact, JobError>;

/// One job variant: fetch an item, transform it, write one artifact.
#[async_trait]
pub trait ItemProcessor: Send + Sync {
    /// Short job name used in log fields.
    fn name(&self) -> &'static str;

    /// Artifact key for a source key. Pure.
    fn destination_key(&self, source_key: &str) -> String;

    async fn process(&self, item: &Item) -> ItemResult;
}

/// Run CPU-bound image work on the rayon pool and await its result.
///
/// A panic inside `work` is contained and reported as a decode failure.
pub(crate) async fn run_cpu<T, F>(work: F) -> Result<T, JobError>
where
    F: FnOnce() -> Result<T, JobError> + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = tokio::sync::oneshot::channel();
    rayon::spawn(move || {
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(work))
            .unwrap_or_else(|_| Err(JobError::Decode("image worker panicked".into())));
        // The receiver is gone only if the invocation itself was dropped.
        let _ = tx.send(outcome);
    });
    rx.await
        .map_err(|_| JobError::Decode("image worker exited without a result".into()))?
}
