//! EXIF metadata extraction job.
//!
//! Downloads an image, checks that it decodes, reads its EXIF block and
//! writes the normalised tags as pretty-printed JSON next to the other EXIF
//! documents (see [`keys::exif_destination`]). An image without EXIF still
//! succeeds and produces `{}`.

use super::{Artifact, ItemProcessor, ItemResult, JobError, run_cpu};
use crate::event::Item;
use crate::imaging::{self, ExifAbsence, ExifMap};
use crate::keys;
use crate::store::{JSON_CONTENT_TYPE, ObjectStore, upload_bytes};
use async_trait::async_trait;
use std::sync::Arc;

pub struct ExifExtractor {
    store: Arc<dyn ObjectStore>,
}

impl ExifExtractor {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }
}

/// Decode the image, then serialise its EXIF tags.
///
/// Missing or unreadable EXIF yields an empty document; only an undecodable
/// image fails.
fn extract(bytes: Vec<u8>, key: &str) -> Result<Vec<u8>, JobError> {
    imaging::decode(&bytes).map_err(|e| JobError::Decode(e.to_string()))?;

    let tags = match imaging::read_exif(&bytes) {
        Ok(tags) => tags,
        Err(ExifAbsence::Missing) => {
            tracing::info!(key, "no EXIF data found");
            ExifMap::new()
        }
        Err(ExifAbsence::Unreadable(reason)) => {
            tracing::warn!(key, %reason, "EXIF block unreadable, writing empty document");
            ExifMap::new()
        }
    };

    serde_json::to_vec_pretty(&tags).map_err(|e| JobError::Encode(e.to_string()))
}

#[async_trait]
impl ItemProcessor for ExifExtractor {
    fn name(&self) -> &'static str {
        "exif"
    }

    fn destination_key(&self, source_key: &str) -> String {
        keys::exif_destination(source_key)
    }

    async fn process(&self, item: &Item) -> ItemResult {
        let bytes = self
            .store
            .get(&item.bucket, &item.key)
            .await
            .map_err(|e| JobError::download(item, e))?;

        let key = item.key.clone();
        let document = run_cpu(move || extract(bytes, &key)).await?;

        let artifact = Artifact {
            bucket: item.bucket.clone(),
            key: self.destination_key(&item.key),
            content_type: JSON_CONTENT_TYPE,
        };
        tracing::info!(destination = %artifact.key, "saving EXIF data");
        upload_bytes(
            self.store.as_ref(),
            &artifact.bucket,
            &artifact.key,
            document,
            artifact.content_type,
        )
        .await
        .map_err(|e| JobError::upload(&artifact, e))?;

        Ok(artifact)
    }
}
