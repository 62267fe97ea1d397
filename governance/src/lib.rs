//! Two-party governance for the Numeraire ledger.
//!
//! A privileged change takes effect only once two designated parties have
//! submitted the same value. [`DualApproval`] is that rule as a standalone
//! state machine; [`DelegateGovernor`] applies it to the delegate pointer.

pub mod approval;
pub mod delegate;
pub mod error;

pub use approval::DualApproval;
pub use delegate::{DelegateChange, DelegateGovernor};
pub use error::GovernanceError;
