//! Disbursement: the rate limit on minting.
//!
//! Time is divided into fixed periods (one week by default) counted from
//! genesis. Each period has a mint quota given by a [`DisbursementSchedule`];
//! quota left over at the end of a period is discarded.
//!
//! There is no timer. The scheduler notices a period boundary the next time
//! it is asked about the current time and recomputes the quota then.

pub mod error;
pub mod schedule;
pub mod scheduler;

pub use error::DisbursementError;
pub use schedule::{DisbursementSchedule, WeeklySchedule};
pub use scheduler::{DisbursementScheduler, PreparedDebit, Rollover};
