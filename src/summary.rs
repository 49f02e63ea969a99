//! Result aggregation.
//!
//! [`Tally`] accumulates per-record outcomes in whatever order they complete,
//! and [`Tally::finish`] folds in the envelope-level failures to produce the
//! [`Summary`] returned to the invoker:
//!
//! ```json
//! { "statusCode": 207, "processed": 1, "failed": 1 }
//! ```

use serde::{Deserialize, Serialize};

/// Invocation status. Serialized as its HTTP-style code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum Status {
    /// Every record succeeded (200).
    Ok,
    /// At least one record or envelope failed (207).
    PartialFailure,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::PartialFailure => 207,
        }
    }
}

impl From<Status> for u16 {
    fn from(status: Status) -> Self {
        status.code()
    }
}

impl TryFrom<u16> for Status {
    type Error = String;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            200 => Ok(Status::Ok),
            207 => Ok(Status::PartialFailure),
            other => Err(format!("unknown status code {other}")),
        }
    }
}

/// Outcome of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(rename = "statusCode")]
    pub status: Status,
    pub processed: usize,
    pub failed: usize,
}

impl Summary {
    /// Total records and envelopes accounted for.
    pub fn total(&self) -> usize {
        self.processed + self.failed
    }
}

/// Running success/failure counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub processed: usize,
    pub failed: usize,
}

impl Tally {
    pub fn record<T, E>(&mut self, outcome: &Result<T, E>) {
        match outcome {
            Ok(_) => self.processed += 1,
            Err(_) => self.failed += 1,
        }
    }

    pub fn finish(self, envelope_failures: usize) -> Summary {
        let failed = self.failed + envelope_failures;
        Summary {
            status: if failed == 0 {
                Status::Ok
            } else {
                Status::PartialFailure
            },
            processed: self.processed,
            failed,
        }
    }
}

/// Aggregate a complete set of outcomes.
pub fn aggregate<'a, T: 'a, E: 'a>(
    outcomes: impl IntoIterator<Item = &'a Result<T, E>>,
    envelope_failures: usize,
) -> Summary {
    let mut tally = Tally::default();
    for outcome in outcomes {
        tally.record(outcome);
    }
    tally.finish(envelope_failures)
}
