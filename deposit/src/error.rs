use nmr_ledger::LedgerError;
use nmr_types::Address;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DepositError {
    #[error("{caller} is not authorized to {action}")]
    Unauthorized {
        caller: Address,
        action: &'static str,
    },

    #[error("{0} is not an assignable deposit address")]
    NotDepositAddress(Address),

    #[error("deposit slot {0} holds no balance")]
    EmptySlot(Address),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
