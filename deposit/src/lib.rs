//! Deposit routing.
//!
//! Payouts from the pool account need one operator approval and one
//! governance approval for the same destination and amount. Low-numbered
//! addresses act as deposit slots whose balances the operator sweeps back into
//! the pool.

pub mod error;
pub mod router;

pub use error::DepositError;
pub use router::{DepositRouter, DepositSweep, Party, TransferOutcome};
