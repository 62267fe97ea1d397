//! Stakes on tournament rounds.
//!
//! A stake escrows part of a source account's balance against a round. It ends
//! in exactly one of two ways: the operator destroys it (the escrow is burned)
//! or releases it after the round resolves (the escrow returns to the staker).

pub mod error;
pub mod manager;
pub mod stake;

pub use error::StakeError;
pub use manager::{StakeManager, StakeRequest};
pub use stake::{Stake, StakeKey, StakeStatus};
