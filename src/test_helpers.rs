//! Shared test utilities.
//!
//! Provides an in-memory [`ObjectStore`], small image fixtures built on the
//! fly, and builders for fan-out notification payloads.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let store = Arc::new(MemoryStore::new());
//! store.insert("photos", "uploads/a.jpg", jpeg_bytes(64, 48));
//!
//! let event = sns_event(&[&[("photos", "uploads/a.jpg")]]);
//! let options = PipelineOptions::default();
//! let summary = pipeline::run(&ExifExtractor::new(store.clone()), event, &options).await;
//!
//! assert_eq!(store.keys("photos"), vec!["exif/a.json", "uploads/a.jpg"]);
//! ```

use crate::store::{ObjectStore, StoreError};
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

// =========================================================================
// In-memory object store
// =========================================================================

type Objects = HashMap<(String, String), (Vec<u8>, String)>;

/// Object store backed by a map. Puts to keys registered with
/// [`MemoryStore::failing_puts_for`] fail with a request error.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<Objects>,
    failing_puts: HashSet<String>,
    puts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_puts_for(mut self, key: &str) -> Self {
        self.failing_puts.insert(key.to_string());
        self
    }

    /// Seed an object, as if it had been uploaded by a user.
    pub fn insert(&self, bucket: &str, key: &str, body: Vec<u8>) {
        self.objects.lock().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            (body, "application/octet-stream".to_string()),
        );
    }

    /// Body and content type of a stored object.
    pub fn object(&self, bucket: &str, key: &str) -> Option<(Vec<u8>, String)> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Number of successful puts.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// All keys in a bucket, sorted.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        self.object(bucket, key)
            .map(|(body, _)| body)
            .ok_or_else(|| StoreError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        if self.failing_puts.contains(key) {
            return Err(StoreError::Request(format!("simulated put failure for {key}")));
        }
        self.objects.lock().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            (body, content_type.to_string()),
        );
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// =========================================================================
// Image fixtures
// =========================================================================

/// A gradient JPEG of the given size.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, 90)
        .encode_image(&img)
        .unwrap();
    buf
}

/// A half-transparent PNG of the given size.
pub fn png_rgba_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, if x < width / 2 { 255 } else { 0 }])
    });
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// A JPEG carrying an APP1 EXIF segment with the given fields.
pub fn jpeg_with_exif(width: u32, height: u32, fields: &[exif::Field]) -> Vec<u8> {
    let mut writer = exif::experimental::Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).unwrap();
    jpeg_with_exif_block(width, height, &tiff.into_inner())
}

/// A JPEG whose APP1 EXIF segment carries `tiff` verbatim, valid or not.
pub fn jpeg_with_exif_block(width: u32, height: u32, tiff: &[u8]) -> Vec<u8> {
    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(tiff);
    let segment_len = u16::try_from(payload.len() + 2).unwrap();

    let jpeg = jpeg_bytes(width, height);
    let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 4);
    out.extend_from_slice(&jpeg[..2]); // SOI
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

// =========================================================================
// Notification builders
// =========================================================================

/// One storage change record.
pub fn s3_record(bucket: &str, key: &str) -> Value {
    json!({
        "eventName": "ObjectCreated:Put",
        "s3": {
            "bucket": { "name": bucket },
            "object": { "key": key, "size": 1024 }
        }
    })
}

/// An envelope whose message is a JSON string holding `records`.
pub fn sns_envelope(records: &[Value]) -> Value {
    let message = json!({ "Records": records }).to_string();
    json!({
        "EventSource": "aws:sns",
        "Sns": { "Type": "Notification", "Message": message }
    })
}

/// A full invocation payload: one envelope per slice of `(bucket, key)` pairs.
pub fn sns_event(envelopes: &[&[(&str, &str)]]) -> Value {
    let envelopes: Vec<Value> = envelopes
        .iter()
        .map(|records| {
            let records: Vec<Value> = records
                .iter()
                .map(|(bucket, key)| s3_record(bucket, key))
                .collect();
            sns_envelope(&records)
        })
        .collect();
    json!({ "Records": envelopes })
}
