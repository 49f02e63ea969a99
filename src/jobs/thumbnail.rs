//! Thumbnail job.
//!
//! Shrinks an image to fit the configured bounds (800×600 by default) and
//! writes it as JPEG under `processed/resize/`, keeping only the source
//! filename.

use super::{Artifact, ItemProcessor, ItemResult, JobError, run_cpu};
use crate::event::Item;
use crate::imaging::{self, EncodedJpeg, ThumbnailParams};
use crate::keys;
use crate::store::{JPEG_CONTENT_TYPE, ObjectStore, upload_image};
use async_trait::async_trait;
use std::sync::Arc;

pub struct Thumbnailer {
    store: Arc<dyn ObjectStore>,
    params: ThumbnailParams,
}

impl Thumbnailer {
    pub fn new(store: Arc<dyn ObjectStore>, params: ThumbnailParams) -> Self {
        Self { store, params }
    }
}

/// A thumbnail ready for upload.
struct Rendered {
    jpeg: EncodedJpeg,
    width: u32,
    height: u32,
}

/// Decode, shrink and encode. All pixel work for one item happens here, on
/// the rayon pool.
fn render(bytes: &[u8], params: &ThumbnailParams) -> Result<Rendered, JobError> {
    let img = imaging::decode(bytes).map_err(|e| JobError::Decode(e.to_string()))?;
    let thumb = imaging::thumbnail(img, params);
    let jpeg = imaging::encode_jpeg(&thumb, params.quality)
        .map_err(|e| JobError::Encode(e.to_string()))?;
    Ok(Rendered {
        jpeg,
        width: thumb.width(),
        height: thumb.height(),
    })
}

#[async_trait]
impl ItemProcessor for Thumbnailer {
    fn name(&self) -> &'static str {
        "resize"
    }

    fn destination_key(&self, source_key: &str) -> String {
        keys::thumbnail_destination(source_key)
    }

    async fn process(&self, item: &Item) -> ItemResult {
        let bytes = self
            .store
            .get(&item.bucket, &item.key)
            .await
            .map_err(|e| JobError::download(item, e))?;

        let params = self.params;
        let rendered = run_cpu(move || render(&bytes, &params)).await?;

        let artifact = Artifact {
            bucket: item.bucket.clone(),
            key: self.destination_key(&item.key),
            content_type: JPEG_CONTENT_TYPE,
        };
        upload_image(
            self.store.as_ref(),
            &artifact.bucket,
            &artifact.key,
            rendered.jpeg,
        )
        .await
        .map_err(|e| JobError::upload(&artifact, e))?;
        tracing::info!(
            destination = %artifact.key,
            width = rendered.width,
            height = rendered.height,
            "resized image saved"
        );

        Ok(artifact)
    }
}
