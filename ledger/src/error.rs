use nmr_types::Address;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient balance in {account}: need {needed}, have {available}")]
    InsufficientBalance {
        account: Address,
        needed: u128,
        available: u128,
    },

    #[error("insufficient escrow: need {needed}, have {available}")]
    InsufficientEscrow { needed: u128, available: u128 },

    #[error("arithmetic overflow in ledger update")]
    Overflow,

    #[error("snapshot error: {0}")]
    Snapshot(String),
}
