//! Stake records.

use nmr_types::{Address, Confidence, NmrAmount, RoundId, Timestamp, TournamentId};
use serde::{Deserialize, Serialize};

/// Identifies at most one active stake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StakeKey {
    pub tournament_id: TournamentId,
    pub round_id: RoundId,
    pub staker: Address,
}

impl StakeKey {
    pub fn new(tournament_id: TournamentId, round_id: RoundId, staker: Address) -> Self {
        Self {
            tournament_id,
            round_id,
            staker,
        }
    }
}

/// Lifecycle position of a stake, derived from its flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StakeStatus {
    Active,
    Destroyed,
    Released,
}

/// An escrowed commitment on a round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stake {
    pub tournament_id: TournamentId,
    pub round_id: RoundId,
    pub staker: Address,
    pub confidence: Confidence,
    /// Escrowed amount. Zeroed on destroy, kept on release.
    pub amount: NmrAmount,
    pub destroyed: bool,
    pub resolved: bool,
    pub staked_at: Timestamp,
}

impl Stake {
    pub fn key(&self) -> StakeKey {
        StakeKey::new(self.tournament_id, self.round_id, self.staker)
    }

    pub fn status(&self) -> StakeStatus {
        match (self.destroyed, self.resolved) {
            (true, _) => StakeStatus::Destroyed,
            (false, true) => StakeStatus::Released,
            (false, false) => StakeStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status() == StakeStatus::Active
    }
}
