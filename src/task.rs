//! Timeout-bounded parse units.
//!
//! Every parse-from-network operation races against a fixed deadline. The
//! caller always learns one of exactly three outcomes: the parse succeeded,
//! the parse (or its fetch) failed, or the deadline expired first. UI and
//! caching layers depend on keeping transient timeouts distinct from
//! structural parse failures, so the three-way split is part of the public
//! contract.

use std::future::Future;
use std::time::Duration;

use crate::error::{DiveMeetsError, Result};

/// Deadline applied to every network-backed parse unit.
pub const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of a timeout-bounded parse unit.
#[derive(Debug)]
pub enum Outcome<T> {
    /// The unit completed and produced a value before the deadline.
    Parsed(T),
    /// The fetch or parse failed before the deadline.
    Failed(DiveMeetsError),
    /// The deadline expired; the unit was cancelled at its next await point.
    TimedOut,
}

impl<T> Outcome<T> {
    /// The parsed value, discarding failure detail.
    pub fn parsed(self) -> Option<T> {
        match self {
            Outcome::Parsed(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Outcome::Parsed(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, Outcome::TimedOut)
    }
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Outcome::Parsed(value),
            Err(err) => Outcome::Failed(err),
        }
    }
}

/// Race `unit` against `limit`.
///
/// Cancellation is cooperative: the unit is dropped at its next await point
/// (in practice, the network fetch), so a unit that has already entered its
/// synchronous table walk finishes that walk before the outcome is reported.
/// Callers must therefore perform cache writes only after `Parsed` is
/// observed, which keeps a timed-out unit from leaving partial entries.
pub async fn bounded<T>(limit: Duration, unit: impl Future<Output = Result<T>>) -> Outcome<T> {
    match tokio::time::timeout(limit, unit).await {
        Ok(result) => result.into(),
        Err(_) => Outcome::TimedOut,
    }
}
