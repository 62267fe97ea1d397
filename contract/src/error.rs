use nmr_deposit::DepositError;
use nmr_disbursement::DisbursementError;
use nmr_governance::GovernanceError;
use nmr_ledger::LedgerError;
use nmr_stake::StakeError;
use nmr_tournament::TournamentError;
use nmr_types::{Address, TypesError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("disbursement error: {0}")]
    Disbursement(#[from] DisbursementError),

    #[error("tournament error: {0}")]
    Tournament(#[from] TournamentError),

    #[error("stake error: {0}")]
    Stake(#[from] StakeError),

    #[error("governance error: {0}")]
    Governance(#[from] GovernanceError),

    #[error("deposit error: {0}")]
    Deposit(#[from] DepositError),

    #[error("invalid protocol parameters: {0}")]
    Params(#[from] TypesError),

    #[error("{caller} is not authorized to {action}")]
    Unauthorized {
        caller: Address,
        action: &'static str,
    },

    #[error("minting {requested} would raise supply above the cap of {cap}")]
    SupplyCapExceeded { requested: u128, cap: u128 },

    #[error("config error: {0}")]
    Config(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Whether the call was rejected because of who made it, at any layer.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. }
                | Self::Stake(StakeError::Unauthorized { .. })
                | Self::Governance(GovernanceError::Unauthorized(_))
                | Self::Deposit(DepositError::Unauthorized { .. })
        )
    }

    /// Whether the call collided with an existing tournament, round or active
    /// stake.
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            Self::Tournament(TournamentError::TournamentExists(_))
                | Self::Tournament(TournamentError::RoundExists { .. })
                | Self::Stake(StakeError::AlreadyExists { .. })
        )
    }

    /// Whether an account held too little, at any layer.
    pub fn is_insufficient_balance(&self) -> bool {
        matches!(
            self,
            Self::Ledger(LedgerError::InsufficientBalance { .. })
                | Self::Stake(StakeError::Ledger(LedgerError::InsufficientBalance { .. }))
                | Self::Deposit(DepositError::Ledger(LedgerError::InsufficientBalance { .. }))
        )
    }
}
