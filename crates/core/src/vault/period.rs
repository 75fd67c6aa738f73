//! Period tracker: which period is open, and the explicit close transition.

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::{PeriodId, Timestamp};

/// The open period is identified by its start timestamp. It only moves when
/// [`PeriodTracker::close`] is called, and then by exactly one period length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTracker {
    start: PeriodId,
    length_secs: u64,
}

impl PeriodTracker {
    pub fn new(start: Timestamp, length_secs: u64) -> Self {
        Self { start, length_secs }
    }

    /// Identifier of the open period.
    pub fn current(&self) -> PeriodId {
        self.start
    }

    /// Earliest time at which the open period may be closed.
    pub fn ends_at(&self) -> Timestamp {
        self.start.saturating_add(self.length_secs)
    }

    /// Whether `period` lies strictly before the open period.
    pub fn is_closed(&self, period: PeriodId) -> bool {
        period < self.start
    }

    /// Close the open period at time `now` and return its identifier.
    ///
    /// The successor starts at `start + length`, never at `now`: a late close
    /// leaves the new period already partly elapsed.
    pub fn close(&mut self, now: Timestamp) -> Result<PeriodId, LedgerError> {
        let ready_at = self
            .start
            .checked_add(self.length_secs)
            .ok_or(LedgerError::ArithmeticOverflow("period boundary"))?;
        if now < ready_at {
            return Err(LedgerError::ReleaseNotReady {
                period: self.start,
                ready_at,
                now,
            });
        }
        let closed = self.start;
        self.start = ready_at;
        Ok(closed)
    }
}
