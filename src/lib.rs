//! # Image Jobs
//!
//! Two event-driven image jobs fed by storage change notifications that
//! arrive through a fan-out topic. Each invocation receives a batch of
//! envelopes, each envelope carries a JSON-encoded list of change records,
//! and each record names one uploaded object.
//!
//! - **exif** reads the EXIF tags of the object and writes them as JSON under
//!   `exif/`, keeping the key's directory structure minus its first segment.
//! - **resize** shrinks the object to fit 800×600 and writes it as JPEG under
//!   `processed/resize/`, keeping only the filename.
//!
//! # Architecture
//!
//! ```text
//! invocation payload
//!   └─ event::Batch ─► batch::Unwrapper ─► event::ChangeRecord
//!                                             └─ resolve ─► event::Item
//!                                                             └─ jobs::ItemProcessor
//!                                                                  ├─ store (get / put)
//!                                                                  └─ imaging (rayon)
//! summary::Tally ◄── one outcome per record, one per undecodable envelope
//! ```
//!
//! Every record is isolated. Whatever goes wrong with one of them becomes a
//! single failure in the [`summary::Summary`]; the invocation itself always
//! completes.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`event`] | Notification data model: batch, envelope, change record, item |
//! | [`batch`] | Lazy flattening of envelopes into change records |
//! | [`keys`] | Destination key derivation for both jobs |
//! | [`jobs`] | The `ItemProcessor` seam, failure taxonomy, and both jobs |
//! | [`pipeline`] | Bounded-concurrency orchestration of one invocation |
//! | [`summary`] | Order-independent tally and the response shape |
//! | [`imaging`] | Pure-Rust decode, thumbnail, JPEG encode, and EXIF reading |
//! | [`store`] | Object storage trait and its S3 implementation |
//! | [`config`] | Optional `TOML` configuration over stock defaults |

pub mod batch;
pub mod config;
pub mod event;
pub mod imaging;
pub mod jobs;
pub mod keys;
pub mod pipeline;
pub mod store;
pub mod summary;

#[cfg(test)]
pub(crate) mod test_helpers;
