//! Disbursement-specific errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DisbursementError {
    #[error("insufficient disbursement quota: need {needed}, remaining {remaining}")]
    InsufficientQuota { needed: u128, remaining: u128 },

    #[error("disbursement period length must be non-zero")]
    InvalidPeriod,
}
