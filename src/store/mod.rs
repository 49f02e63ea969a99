//! Object store capability.
//!
//! The jobs only ever need two calls: fetch an object's bytes and write bytes
//! back with a content type. [`ObjectStore`] is that seam. Production uses
//! [`S3Store`]; tests use an in-memory store.
//!
//! A single store handle is built at startup and shared by every record and
//! every invocation for the life of the process.
//!
//! Uploads go through one of two explicit helpers, picked by the caller:
//! [`upload_bytes`] for ready-made payloads such as JSON documents, and
//! [`upload_image`] for JPEGs the caller has already encoded.

pub mod s3;

use crate::imaging::EncodedJpeg;
use async_trait::async_trait;
use thiserror::Error;

pub use s3::S3Store;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("object s3://{bucket}/{key} not found")]
    NotFound { bucket: String, key: String },
    #[error("request failed: {0}")]
    Request(String),
    #[error("reading object body failed: {0}")]
    Body(String),
}

/// Minimal object storage interface consumed by the jobs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the full contents of an object.
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Create or replace an object.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError>;
}

/// Store a ready-made payload.
pub async fn upload_bytes<S: ObjectStore + ?Sized>(
    store: &S,
    bucket: &str,
    key: &str,
    body: Vec<u8>,
    content_type: &str,
) -> Result<(), StoreError> {
    store.put(bucket, key, body, content_type).await
}

/// Store an encoded JPEG as `image/jpeg`.
pub async fn upload_image<S: ObjectStore + ?Sized>(
    store: &S,
    bucket: &str,
    key: &str,
    image: EncodedJpeg,
) -> Result<(), StoreError> {
    store
        .put(bucket, key, image.into_bytes(), JPEG_CONTENT_TYPE)
        .await
}
