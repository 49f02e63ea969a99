//! Batch unwrapping.
//!
//! [`Unwrapper`] flattens a batch of envelopes into a lazy stream of change
//! records. Envelopes are decoded one at a time as the iterator reaches them.
//! An envelope that fails to decode is logged, counted in
//! [`Unwrapper::envelope_failures`], and skipped; iteration carries on with
//! the next one.

use crate::event::{Batch, ChangeRecord, Envelope};

/// Lazy iterator over every change record of a batch, in batch order.
#[derive(Debug)]
pub struct Unwrapper {
    envelopes: std::iter::Enumerate<std::vec::IntoIter<Envelope>>,
    current: std::vec::IntoIter<ChangeRecord>,
    envelope_failures: usize,
}

impl Unwrapper {
    pub fn new(batch: Batch) -> Self {
        Self {
            envelopes: batch.envelopes.into_iter().enumerate(),
            current: Vec::new().into_iter(),
            envelope_failures: 0,
        }
    }

    /// Envelopes skipped so far because their payload could not be decoded.
    pub fn envelope_failures(&self) -> usize {
        self.envelope_failures
    }
}

impl Iterator for Unwrapper {
    type Item = ChangeRecord;

    fn next(&mut self) -> Option<ChangeRecord> {
        loop {
            if let Some(record) = self.current.next() {
                return Some(record);
            }
            let (index, envelope) = self.envelopes.next()?;
            match envelope.decode() {
                Ok(records) => {
                    tracing::debug!(envelope = index, records = records.len(), "envelope decoded");
                    self.current = records.into_iter();
                }
                Err(err) => {
                    self.envelope_failures += 1;
                    tracing::warn!(envelope = index, error = %err, "skipping envelope");
                }
            }
        }
    }
}

/// Flatten a batch into a lazy record stream.
pub fn unwrap(batch: Batch) -> Unwrapper {
    Unwrapper::new(batch)
}
