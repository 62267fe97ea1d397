//! Quota schedules.

use nmr_types::{NmrAmount, ProtocolParams};
use serde::{Deserialize, Serialize};

/// Maps a period index (periods elapsed since genesis) to that period's quota.
///
/// Implementations must be pure and non-increasing in `period`. The curve is
/// economic policy supplied by configuration, not derived by the ledger.
pub trait DisbursementSchedule {
    fn quota_for(&self, period: u64) -> NmrAmount;
}

/// Flat schedule: a larger quota for the first period, then a fixed amount
/// for every period after it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    pub initial: NmrAmount,
    pub weekly: NmrAmount,
}

impl WeeklySchedule {
    pub fn new(initial: NmrAmount, weekly: NmrAmount) -> Self {
        Self { initial, weekly }
    }

    pub fn from_params(params: &ProtocolParams) -> Self {
        Self::new(params.initial_disbursement, params.weekly_disbursement)
    }
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        Self::from_params(&ProtocolParams::default())
    }
}

impl DisbursementSchedule for WeeklySchedule {
    fn quota_for(&self, period: u64) -> NmrAmount {
        if period == 0 {
            self.initial
        } else {
            self.weekly
        }
    }
}
