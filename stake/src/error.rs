use nmr_ledger::LedgerError;
use nmr_tournament::TournamentError;
use nmr_types::{Address, RoundId, Timestamp, TournamentId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StakeError {
    #[error("{caller} is not authorized to {action}")]
    Unauthorized {
        caller: Address,
        action: &'static str,
    },

    #[error("{staker} already has an active stake on round {round} of tournament {tournament}")]
    AlreadyExists {
        tournament: TournamentId,
        round: RoundId,
        staker: Address,
    },

    #[error("no stake by {staker} on round {round} of tournament {tournament}")]
    UnknownStake {
        tournament: TournamentId,
        round: RoundId,
        staker: Address,
    },

    #[error("stake by {staker} on round {round} of tournament {tournament} is already terminated")]
    StakeTerminated {
        tournament: TournamentId,
        round: RoundId,
        staker: Address,
    },

    #[error("round resolves at {resolution_time}, now is {now}")]
    TooEarly {
        resolution_time: Timestamp,
        now: Timestamp,
    },

    #[error("stake amount must be positive")]
    ZeroAmount,

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("tournament error: {0}")]
    Tournament(#[from] TournamentError),
}
