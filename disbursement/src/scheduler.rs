//! The disbursement scheduler state.

use crate::error::DisbursementError;
use crate::schedule::{DisbursementSchedule, WeeklySchedule};
use nmr_types::{NmrAmount, Timestamp};
use serde::{Deserialize, Serialize};

/// A period boundary crossed during a rollover.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rollover {
    pub period_index: u64,
    pub period_start: Timestamp,
    /// Quota left unspent in the period that just ended (discarded).
    pub discarded: NmrAmount,
    /// Fresh quota for the new period.
    pub quota: NmrAmount,
}

/// A checked but not yet applied quota debit.
///
/// Produced by [`DisbursementScheduler::prepare_debit`], which never mutates.
/// The caller performs the ledger credit and then hands this back to
/// [`DisbursementScheduler::commit`].
#[must_use = "a prepared debit does nothing until committed"]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreparedDebit {
    amount: NmrAmount,
    period_index: u64,
    period_start: Timestamp,
    remaining_after: NmrAmount,
    rollover: Option<Rollover>,
}

impl PreparedDebit {
    pub fn amount(&self) -> NmrAmount {
        self.amount
    }

    pub fn remaining_after(&self) -> NmrAmount {
        self.remaining_after
    }

    /// The rollover that committing this debit will also apply, if any.
    pub fn rollover(&self) -> Option<Rollover> {
        self.rollover
    }
}

/// Tracks the quota of the current disbursement period.
///
/// `remaining` only decreases within a period. At a boundary it is replaced
/// by `schedule.quota_for(period_index)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisbursementScheduler<S = WeeklySchedule> {
    schedule: S,
    genesis: Timestamp,
    period_secs: u64,
    period_index: u64,
    period_start: Timestamp,
    remaining: NmrAmount,
}

impl<S: DisbursementSchedule> DisbursementScheduler<S> {
    /// Start the schedule at `genesis` with the quota for period 0.
    pub fn new(
        schedule: S,
        genesis: Timestamp,
        period_secs: u64,
    ) -> Result<Self, DisbursementError> {
        if period_secs == 0 {
            return Err(DisbursementError::InvalidPeriod);
        }
        let remaining = schedule.quota_for(0);
        Ok(Self {
            schedule,
            genesis,
            period_secs,
            period_index: 0,
            period_start: genesis,
            remaining,
        })
    }

    pub fn schedule(&self) -> &S {
        &self.schedule
    }

    pub fn genesis(&self) -> Timestamp {
        self.genesis
    }

    pub fn period_secs(&self) -> u64 {
        self.period_secs
    }

    /// Index of the period recorded at the last rollover.
    pub fn period_index(&self) -> u64 {
        self.period_index
    }

    /// Start of the period recorded at the last rollover.
    pub fn period_start(&self) -> Timestamp {
        self.period_start
    }

    /// Quota recorded at the last operation, without any pending rollover.
    pub fn remaining(&self) -> NmrAmount {
        self.remaining
    }

    /// When the current period ends and the next quota becomes available.
    pub fn next_reset(&self) -> Timestamp {
        self.period_start.saturating_add(self.period_secs)
    }

    /// The rollover `now` would trigger, without applying it.
    ///
    /// A clock reading behind the recorded period never rolls back.
    pub fn pending_rollover(&self, now: Timestamp) -> Option<Rollover> {
        if !self.period_start.has_expired(self.period_secs, now) {
            return None;
        }
        let period_index = self.genesis.elapsed_since(now) / self.period_secs;
        if period_index <= self.period_index {
            return None;
        }
        let offset = period_index.saturating_mul(self.period_secs);
        Some(Rollover {
            period_index,
            period_start: self.genesis.saturating_add(offset),
            discarded: self.remaining,
            quota: self.schedule.quota_for(period_index),
        })
    }

    /// Remaining quota as of `now`, projecting any pending rollover.
    pub fn remaining_at(&self, now: Timestamp) -> NmrAmount {
        match self.pending_rollover(now) {
            Some(rollover) => rollover.quota,
            None => self.remaining,
        }
    }

    /// Apply any pending rollover.
    pub fn rollover(&mut self, now: Timestamp) -> Option<Rollover> {
        let rollover = self.pending_rollover(now)?;
        self.apply_rollover(&rollover);
        Some(rollover)
    }

    /// Check that `amount` fits in the quota as of `now`. Never mutates.
    pub fn prepare_debit(
        &self,
        amount: NmrAmount,
        now: Timestamp,
    ) -> Result<PreparedDebit, DisbursementError> {
        let rollover = self.pending_rollover(now);
        let (period_index, period_start, remaining) = match &rollover {
            Some(r) => (r.period_index, r.period_start, r.quota),
            None => (self.period_index, self.period_start, self.remaining),
        };
        let remaining_after =
            remaining
                .checked_sub(amount)
                .ok_or(DisbursementError::InsufficientQuota {
                    needed: amount.raw(),
                    remaining: remaining.raw(),
                })?;
        Ok(PreparedDebit {
            amount,
            period_index,
            period_start,
            remaining_after,
            rollover,
        })
    }

    /// Apply a debit produced by [`prepare_debit`](Self::prepare_debit) on this
    /// same, unmodified scheduler.
    pub fn commit(&mut self, debit: PreparedDebit) {
        self.period_index = debit.period_index;
        self.period_start = debit.period_start;
        self.remaining = debit.remaining_after;
    }

    fn apply_rollover(&mut self, rollover: &Rollover) {
        self.period_index = rollover.period_index;
        self.period_start = rollover.period_start;
        self.remaining = rollover.quota;
    }
}

impl DisbursementScheduler<WeeklySchedule> {
    /// Build the default weekly scheduler from protocol parameters.
    pub fn from_params(
        params: &nmr_types::ProtocolParams,
        genesis: Timestamp,
    ) -> Result<Self, DisbursementError> {
        Self::new(
            WeeklySchedule::from_params(params),
            genesis,
            params.disbursement_period_secs,
        )
    }
}
