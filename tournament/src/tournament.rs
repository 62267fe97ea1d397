//! Tournament and round records.

use nmr_types::{RoundId, Timestamp, TournamentId};
use serde::{Deserialize, Serialize};

/// A tournament: a container of rounds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    /// Set once at creation, never modified.
    pub creation_time: Timestamp,
    pub num_rounds: u64,
    /// Round ids in creation order.
    pub round_ids: Vec<RoundId>,
}

impl Tournament {
    pub fn new(id: TournamentId, creation_time: Timestamp) -> Self {
        Self {
            id,
            creation_time,
            num_rounds: 0,
            round_ids: Vec::new(),
        }
    }
}

/// A round within a tournament.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub tournament_id: TournamentId,
    pub round_id: RoundId,
    pub creation_time: Timestamp,
    /// Always strictly after `creation_time`.
    pub resolution_time: Timestamp,
    pub num_stakes: u64,
}

impl Round {
    /// Whether stakes on this round may be released at `now`.
    pub fn is_resolvable(&self, now: Timestamp) -> bool {
        now >= self.resolution_time
    }
}
