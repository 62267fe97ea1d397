//! Tournament registry errors.

use nmr_types::{RoundId, Timestamp, TournamentId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TournamentError {
    #[error("tournament {0} already exists")]
    TournamentExists(TournamentId),

    #[error("round {round} of tournament {tournament} already exists")]
    RoundExists {
        tournament: TournamentId,
        round: RoundId,
    },

    #[error("tournament {0} not found")]
    UnknownTournament(TournamentId),

    #[error("round {round} of tournament {tournament} not found")]
    UnknownRound {
        tournament: TournamentId,
        round: RoundId,
    },

    #[error("resolution time {resolution_time} is not after {now}")]
    InvalidDeadline {
        resolution_time: Timestamp,
        now: Timestamp,
    },
}
