//! The tournament registry.

use std::collections::BTreeMap;

use crate::error::TournamentError;
use crate::tournament::{Round, Tournament};
use nmr_types::{RoundId, Timestamp, TournamentId};
use serde::{Deserialize, Serialize};

/// All tournaments and their rounds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentRegistry {
    tournaments: BTreeMap<TournamentId, Tournament>,
    /// Rounds grouped by tournament id, then round id.
    rounds: BTreeMap<TournamentId, BTreeMap<RoundId, Round>>,
}

impl TournamentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tournament created at `now`.
    pub fn create_tournament(
        &mut self,
        id: TournamentId,
        now: Timestamp,
    ) -> Result<&Tournament, TournamentError> {
        if self.tournaments.contains_key(&id) {
            return Err(TournamentError::TournamentExists(id));
        }
        Ok(self
            .tournaments
            .entry(id)
            .or_insert_with(|| Tournament::new(id, now)))
    }

    /// Add a round to an existing tournament.
    pub fn create_round(
        &mut self,
        tournament_id: TournamentId,
        round_id: RoundId,
        resolution_time: Timestamp,
        now: Timestamp,
    ) -> Result<&Round, TournamentError> {
        if !self.tournaments.contains_key(&tournament_id) {
            return Err(TournamentError::UnknownTournament(tournament_id));
        }
        if self.has_round(tournament_id, round_id) {
            return Err(TournamentError::RoundExists {
                tournament: tournament_id,
                round: round_id,
            });
        }
        if resolution_time <= now {
            return Err(TournamentError::InvalidDeadline {
                resolution_time,
                now,
            });
        }

        let tournament = self
            .tournaments
            .get_mut(&tournament_id)
            .ok_or(TournamentError::UnknownTournament(tournament_id))?;
        tournament.round_ids.push(round_id);
        tournament.num_rounds = tournament.num_rounds.saturating_add(1);

        Ok(self
            .rounds
            .entry(tournament_id)
            .or_default()
            .entry(round_id)
            .or_insert(Round {
                tournament_id,
                round_id,
                creation_time: now,
                resolution_time,
                num_stakes: 0,
            }))
    }

    pub fn tournament(&self, id: TournamentId) -> Result<&Tournament, TournamentError> {
        self.tournaments
            .get(&id)
            .ok_or(TournamentError::UnknownTournament(id))
    }

    /// Look up a round, distinguishing a missing tournament from a missing round.
    pub fn round(
        &self,
        tournament_id: TournamentId,
        round_id: RoundId,
    ) -> Result<&Round, TournamentError> {
        self.tournament(tournament_id)?;
        self.rounds
            .get(&tournament_id)
            .and_then(|rounds| rounds.get(&round_id))
            .ok_or(TournamentError::UnknownRound {
                tournament: tournament_id,
                round: round_id,
            })
    }

    pub fn has_round(&self, tournament_id: TournamentId, round_id: RoundId) -> bool {
        self.rounds
            .get(&tournament_id)
            .is_some_and(|rounds| rounds.contains_key(&round_id))
    }

    /// Count one more stake on a round. Returns the new count.
    pub fn record_stake(
        &mut self,
        tournament_id: TournamentId,
        round_id: RoundId,
    ) -> Result<u64, TournamentError> {
        self.tournament(tournament_id)?;
        let round = self
            .rounds
            .get_mut(&tournament_id)
            .and_then(|rounds| rounds.get_mut(&round_id))
            .ok_or(TournamentError::UnknownRound {
                tournament: tournament_id,
                round: round_id,
            })?;
        round.num_stakes = round.num_stakes.saturating_add(1);
        Ok(round.num_stakes)
    }

    pub fn tournament_count(&self) -> usize {
        self.tournaments.len()
    }

    /// Tournaments in id order.
    pub fn tournaments(&self) -> impl Iterator<Item = &Tournament> {
        self.tournaments.values()
    }
}
