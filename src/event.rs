//! Notification data model.
//!
//! An invocation receives a fan-out batch shaped like this:
//!
//! ```text
//! { "Records": [                                  ← Batch
//!     { "Sns": { "Message": "<json string>" } },  ← Envelope
//!     ...
//! ] }
//!
//! Message, once decoded:
//! { "Records": [                                  ← sub-batch
//!     { "s3": { "bucket": { "name": "photos" },   ← ChangeRecord
//!               "object": { "key": "uploads/a.jpg" } } },
//!     ...
//! ] }
//! ```
//!
//! Parsing is layered. The batch is read leniently, each envelope
//! is decoded on its own, and a change record stays an opaque JSON value until
//! [`ChangeRecord::resolve`] is called on it. A malformed piece therefore only
//! fails itself, never its neighbours.

use crate::jobs::JobError;
use serde_json::Value;

/// Top-level invocation payload: an ordered list of envelopes.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub envelopes: Vec<Envelope>,
}

impl Batch {
    /// Read the envelopes out of an invocation payload.
    ///
    /// A payload without a `Records` array is treated as an empty batch.
    pub fn from_event(event: Value) -> Self {
        let envelopes = match event {
            Value::Object(mut fields) => match fields.remove("Records") {
                Some(Value::Array(records)) => records.into_iter().map(Envelope).collect(),
                other => {
                    tracing::warn!(
                        records = ?other.as_ref().map(json_type),
                        "invocation payload has no Records array, treating as empty batch"
                    );
                    Vec::new()
                }
            },
            other => {
                tracing::warn!(
                    payload = json_type(&other),
                    "invocation payload is not an object, treating as empty batch"
                );
                Vec::new()
            }
        };
        Self { envelopes }
    }

    pub fn len(&self) -> usize {
        self.envelopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.envelopes.is_empty()
    }
}

/// One transport wrapper. Holds the raw JSON so that a bad envelope can be
/// reported when it is reached rather than when the batch is read.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope(pub Value);

impl Envelope {
    /// Decode the nested message into its change records, in original order.
    ///
    /// The message must be a JSON object. A missing `Records` field means no
    /// records; a `Records` field that is not an array is an error.
    pub fn decode(self) -> Result<Vec<ChangeRecord>, JobError> {
        let message = self
            .0
            .get("Sns")
            .and_then(|sns| sns.get("Message"))
            .and_then(Value::as_str)
            .ok_or_else(|| JobError::EnvelopeDecode("no Sns.Message string".into()))?;

        let payload: Value = serde_json::from_str(message)
            .map_err(|e| JobError::EnvelopeDecode(format!("message is not JSON: {e}")))?;
        let Value::Object(mut fields) = payload else {
            return Err(JobError::EnvelopeDecode(format!(
                "message is a JSON {}, expected an object",
                json_type(&payload)
            )));
        };

        match fields.remove("Records") {
            None => Ok(Vec::new()),
            Some(Value::Array(records)) => Ok(records.into_iter().map(ChangeRecord).collect()),
            Some(other) => Err(JobError::EnvelopeDecode(format!(
                "message Records is a JSON {}, expected an array",
                json_type(&other)
            ))),
        }
    }
}

/// One storage change, still in its raw JSON form.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord(pub Value);

/// The object a change record points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Item {
    pub bucket: String,
    pub key: String,
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

impl ChangeRecord {
    /// Extract `s3.bucket.name` and `s3.object.key`.
    ///
    /// With `url_decode` set the key is form-decoded (`+` is a space, then
    /// `%XX` escapes), which is how storage notifications transmit keys.
    pub fn resolve(self, url_decode: bool) -> Result<Item, JobError> {
        let s3 = self.0.get("s3");
        let bucket = s3
            .and_then(|s3| s3.get("bucket"))
            .and_then(|bucket| bucket.get("name"))
            .and_then(Value::as_str)
            .ok_or_else(|| JobError::MalformedRecord("no s3.bucket.name string".into()))?;
        let raw_key = s3
            .and_then(|s3| s3.get("object"))
            .and_then(|object| object.get("key"))
            .and_then(Value::as_str)
            .ok_or_else(|| JobError::MalformedRecord("no s3.object.key string".into()))?;

        let key = if url_decode {
            decode_key(raw_key)?
        } else {
            raw_key.to_string()
        };
        if key.is_empty() {
            return Err(JobError::MalformedRecord("object key is empty".into()));
        }

        Ok(Item {
            bucket: bucket.to_string(),
            key,
        })
    }
}

fn decode_key(raw: &str) -> Result<String, JobError> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| {
            JobError::MalformedRecord(format!("object key {raw:?} does not decode to UTF-8: {e}"))
        })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
