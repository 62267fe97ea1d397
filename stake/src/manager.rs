//! The stake manager.
//!
//! Stakes live here; the balances they escrow live in the [`LedgerStore`] and
//! the per-round stake counters in the [`TournamentRegistry`]. Both are passed
//! in by `&mut` for each call so no component caches another's state.
//!
//! Every operation validates fully before its first mutation. The ledger
//! update is the only step that can fail after validation and it is itself
//! atomic, so a failed call leaves all three stores untouched.

use std::collections::BTreeMap;

use crate::error::StakeError;
use crate::stake::{Stake, StakeKey};
use nmr_ledger::LedgerStore;
use nmr_tournament::TournamentRegistry;
use nmr_types::{Address, Confidence, NmrAmount, RoundId, Timestamp, TournamentId};
use serde::{Deserialize, Serialize};

/// Parameters of a new stake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StakeRequest {
    /// Account whose free balance funds the escrow.
    pub source: Address,
    /// Account credited on release.
    pub staker: Address,
    pub amount: NmrAmount,
    pub tournament_id: TournamentId,
    pub round_id: RoundId,
    pub confidence: Confidence,
}

impl StakeRequest {
    fn key(&self) -> StakeKey {
        StakeKey::new(self.tournament_id, self.round_id, self.staker)
    }
}

/// Owns every stake, keyed by `(tournament, round, staker)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeManager {
    operator: Address,
    stakes: BTreeMap<StakeKey, Stake>,
}

impl StakeManager {
    pub fn new(operator: Address) -> Self {
        Self {
            operator,
            stakes: BTreeMap::new(),
        }
    }

    pub fn operator(&self) -> &Address {
        &self.operator
    }

    /// Stake `amount` of the caller's own balance.
    #[allow(clippy::too_many_arguments)]
    pub fn stake(
        &mut self,
        ledger: &mut LedgerStore,
        registry: &mut TournamentRegistry,
        caller: &Address,
        amount: NmrAmount,
        tournament_id: TournamentId,
        round_id: RoundId,
        confidence: Confidence,
        now: Timestamp,
    ) -> Result<&Stake, StakeError> {
        let request = StakeRequest {
            source: *caller,
            staker: *caller,
            amount,
            tournament_id,
            round_id,
            confidence,
        };
        self.place(ledger, registry, request, now)
    }

    /// Stake from a custodied `source` account on behalf of `staker`.
    ///
    /// Only the operator may do this, and never for itself.
    pub fn stake_on_behalf(
        &mut self,
        ledger: &mut LedgerStore,
        registry: &mut TournamentRegistry,
        caller: &Address,
        request: StakeRequest,
        now: Timestamp,
    ) -> Result<&Stake, StakeError> {
        self.require_operator(caller, "stake on behalf")?;
        if *caller == request.staker {
            tracing::warn!(%caller, "operator cannot stake on behalf of itself");
            return Err(StakeError::Unauthorized {
                caller: *caller,
                action: "stake on behalf of itself",
            });
        }
        self.place(ledger, registry, request, now)
    }

    /// Burn an active stake's escrow. Operator only.
    pub fn destroy_stake(
        &mut self,
        ledger: &mut LedgerStore,
        caller: &Address,
        staker: &Address,
        tournament_id: TournamentId,
        round_id: RoundId,
    ) -> Result<&Stake, StakeError> {
        self.require_operator(caller, "destroy stakes")?;
        let key = StakeKey::new(tournament_id, round_id, *staker);
        let amount = self.active_stake(&key)?.amount;

        ledger.burn_escrow(amount)?;

        let stake = self.stakes.get_mut(&key).ok_or_else(|| unknown(&key))?;
        stake.amount = NmrAmount::ZERO;
        stake.destroyed = true;
        tracing::info!(
            tournament = tournament_id,
            round = round_id,
            %staker,
            burned = %amount,
            "stake destroyed"
        );
        Ok(stake)
    }

    /// Return an active stake's escrow to its staker once the round has
    /// resolved. Operator only.
    ///
    /// `success` is recorded in the log only; the full amount is always
    /// returned.
    #[allow(clippy::too_many_arguments)]
    pub fn release_stake(
        &mut self,
        ledger: &mut LedgerStore,
        registry: &TournamentRegistry,
        caller: &Address,
        staker: &Address,
        tournament_id: TournamentId,
        round_id: RoundId,
        success: bool,
        now: Timestamp,
    ) -> Result<&Stake, StakeError> {
        self.require_operator(caller, "release stakes")?;
        let round = registry.round(tournament_id, round_id)?;
        if !round.is_resolvable(now) {
            return Err(StakeError::TooEarly {
                resolution_time: round.resolution_time,
                now,
            });
        }
        let key = StakeKey::new(tournament_id, round_id, *staker);
        let amount = self.active_stake(&key)?.amount;

        ledger.release_escrow(staker, amount)?;

        let stake = self.stakes.get_mut(&key).ok_or_else(|| unknown(&key))?;
        stake.resolved = true;
        tracing::info!(
            tournament = tournament_id,
            round = round_id,
            %staker,
            refunded = %amount,
            success,
            "stake released"
        );
        Ok(stake)
    }

    /// Look up a stake in any lifecycle state.
    pub fn get(
        &self,
        tournament_id: TournamentId,
        round_id: RoundId,
        staker: &Address,
    ) -> Result<&Stake, StakeError> {
        let key = StakeKey::new(tournament_id, round_id, *staker);
        self.stakes.get(&key).ok_or_else(|| unknown(&key))
    }

    /// Sum of all active stake amounts. Equals the ledger's escrow total.
    pub fn total_active(&self) -> Option<NmrAmount> {
        self.stakes
            .values()
            .filter(|s| s.is_active())
            .try_fold(NmrAmount::ZERO, |acc, s| acc.checked_add(s.amount))
    }

    pub fn len(&self) -> usize {
        self.stakes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stakes.is_empty()
    }

    /// All stakes in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Stake> {
        self.stakes.values()
    }

    fn place(
        &mut self,
        ledger: &mut LedgerStore,
        registry: &mut TournamentRegistry,
        request: StakeRequest,
        now: Timestamp,
    ) -> Result<&Stake, StakeError> {
        registry.round(request.tournament_id, request.round_id)?;
        let key = request.key();
        if self.stakes.get(&key).is_some_and(Stake::is_active) {
            return Err(StakeError::AlreadyExists {
                tournament: key.tournament_id,
                round: key.round_id,
                staker: key.staker,
            });
        }
        if request.amount.is_zero() {
            return Err(StakeError::ZeroAmount);
        }

        ledger.escrow(&request.source, request.amount)?;
        let num_stakes = registry.record_stake(request.tournament_id, request.round_id)?;

        tracing::info!(
            tournament = request.tournament_id,
            round = request.round_id,
            staker = %request.staker,
            source = %request.source,
            amount = %request.amount,
            confidence = request.confidence,
            num_stakes,
            "stake placed"
        );

        let stake = Stake {
            tournament_id: request.tournament_id,
            round_id: request.round_id,
            staker: request.staker,
            confidence: request.confidence,
            amount: request.amount,
            destroyed: false,
            resolved: false,
            staked_at: now,
        };
        self.stakes.insert(key, stake);
        self.stakes.get(&key).ok_or_else(|| unknown(&key))
    }

    fn active_stake(&self, key: &StakeKey) -> Result<&Stake, StakeError> {
        let stake = self.stakes.get(key).ok_or_else(|| unknown(key))?;
        if !stake.is_active() {
            return Err(StakeError::StakeTerminated {
                tournament: key.tournament_id,
                round: key.round_id,
                staker: key.staker,
            });
        }
        Ok(stake)
    }

    fn require_operator(&self, caller: &Address, action: &'static str) -> Result<(), StakeError> {
        if *caller != self.operator {
            tracing::warn!(%caller, action, "rejected non-operator stake call");
            return Err(StakeError::Unauthorized {
                caller: *caller,
                action,
            });
        }
        Ok(())
    }
}

fn unknown(key: &StakeKey) -> StakeError {
    StakeError::UnknownStake {
        tournament: key.tournament_id,
        round: key.round_id,
        staker: key.staker,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOUR_WEEKS: u64 = 4 * 7 * 24 * 60 * 60;
    const START: u64 = 1_500_000_000;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(0x1000_0000 + n)
    }

    fn operator() -> Address {
        addr(0)
    }

    fn hot_wallet() -> Address {
        addr(1)
    }

    fn ts(secs: u64) -> Timestamp {
        Timestamp::new(secs)
    }

    struct Fixture {
        ledger: LedgerStore,
        registry: TournamentRegistry,
        stakes: StakeManager,
    }

    impl Fixture {
        fn new() -> Self {
            let mut ledger = LedgerStore::new();
            ledger.mint(&hot_wallet(), NmrAmount::new(10_000)).unwrap();
            ledger.mint(&addr(4), NmrAmount::new(1_000)).unwrap();
            let mut registry = TournamentRegistry::new();
            registry.create_tournament(0, ts(START)).unwrap();
            registry
                .create_round(0, 51, ts(START + FOUR_WEEKS), ts(START))
                .unwrap();
            Self {
                ledger,
                registry,
                stakes: StakeManager::new(operator()),
            }
        }

        fn on_behalf(&mut self, staker: Address, amount: u128) -> Result<Stake, StakeError> {
            let request = StakeRequest {
                source: hot_wallet(),
                staker,
                amount: NmrAmount::new(amount),
                tournament_id: 0,
                round_id: 51,
                confidence: 5,
            };
            self.stakes
                .stake_on_behalf(
                    &mut self.ledger,
                    &mut self.registry,
                    &operator(),
                    request,
                    ts(START + 10),
                )
                .cloned()
        }

        fn destroy(&mut self, caller: Address, staker: Address) -> Result<Stake, StakeError> {
            self.stakes
                .destroy_stake(&mut self.ledger, &caller, &staker, 0, 51)
                .cloned()
        }

        fn release(
            &mut self,
            caller: Address,
            staker: Address,
            now: u64,
        ) -> Result<Stake, StakeError> {
            self.stakes
                .release_stake(
                    &mut self.ledger,
                    &self.registry,
                    &caller,
                    &staker,
                    0,
                    51,
                    true,
                    ts(now),
                )
                .cloned()
        }
    }

    #[test]
    fn test_stake_on_behalf_escrows_from_source() {
        let mut f = Fixture::new();
        let stake = f.on_behalf(addr(4), 500).unwrap();
        assert_eq!(stake.amount, NmrAmount::new(500));
        assert_eq!(stake.confidence, 5);
        assert!(!stake.destroyed);
        assert!(!stake.resolved);
        assert_eq!(f.ledger.balance_of(&hot_wallet()), NmrAmount::new(9_500));
        assert_eq!(f.ledger.balance_of(&addr(4)), NmrAmount::new(1_000));
        assert_eq!(f.ledger.total_escrowed(), NmrAmount::new(500));
        assert_eq!(f.registry.round(0, 51).unwrap().num_stakes, 1);
        assert!(f.ledger.is_consistent());
    }

    #[test]
    fn test_stake_as_self_uses_own_balance() {
        let mut f = Fixture::new();
        let stake = f
            .stakes
            .stake(
                &mut f.ledger,
                &mut f.registry,
                &addr(4),
                NmrAmount::new(300),
                0,
                51,
                1,
                ts(START + 5),
            )
            .unwrap()
            .clone();
        assert_eq!(stake.staker, addr(4));
        assert_eq!(stake.staked_at, ts(START + 5));
        assert_eq!(f.ledger.balance_of(&addr(4)), NmrAmount::new(700));
    }

    #[test]
    fn test_non_operator_cannot_stake_on_behalf() {
        let mut f = Fixture::new();
        let request = StakeRequest {
            source: hot_wallet(),
            staker: addr(4),
            amount: NmrAmount::new(10),
            tournament_id: 0,
            round_id: 51,
            confidence: 0,
        };
        let err = f
            .stakes
            .stake_on_behalf(&mut f.ledger, &mut f.registry, &addr(9), request, ts(START))
            .unwrap_err();
        assert!(matches!(err, StakeError::Unauthorized { .. }));
        assert!(f.stakes.is_empty());
    }

    #[test]
    fn test_operator_cannot_stake_on_behalf_of_itself() {
        let mut f = Fixture::new();
        let err = f.on_behalf(operator(), 10).unwrap_err();
        assert!(matches!(err, StakeError::Unauthorized { .. }));
        assert_eq!(f.ledger.total_escrowed(), NmrAmount::ZERO);
    }

    #[test]
    fn test_second_active_stake_is_rejected() {
        let mut f = Fixture::new();
        f.on_behalf(addr(4), 500).unwrap();
        let ledger_before = f.ledger.clone();
        let err = f.on_behalf(addr(4), 100).unwrap_err();
        assert_eq!(
            err,
            StakeError::AlreadyExists {
                tournament: 0,
                round: 51,
                staker: addr(4)
            }
        );
        assert_eq!(f.ledger, ledger_before);
        assert_eq!(f.stakes.get(0, 51, &addr(4)).unwrap().amount, NmrAmount::new(500));
        assert_eq!(f.registry.round(0, 51).unwrap().num_stakes, 1);
    }

    #[test]
    fn test_zero_amount_is_rejected() {
        let mut f = Fixture::new();
        assert_eq!(f.on_behalf(addr(4), 0).unwrap_err(), StakeError::ZeroAmount);
    }

    #[test]
    fn test_insufficient_source_balance_changes_nothing() {
        let mut f = Fixture::new();
        let registry_before = f.registry.clone();
        let err = f.on_behalf(addr(4), 10_001).unwrap_err();
        assert!(matches!(
            err,
            StakeError::Ledger(nmr_ledger::LedgerError::InsufficientBalance { .. })
        ));
        assert!(f.stakes.is_empty());
        assert_eq!(f.registry, registry_before);
    }

    #[test]
    fn test_stake_on_unknown_round_fails() {
        let mut f = Fixture::new();
        let err = f
            .stakes
            .stake(
                &mut f.ledger,
                &mut f.registry,
                &addr(4),
                NmrAmount::new(1),
                0,
                99,
                1,
                ts(START),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            StakeError::Tournament(nmr_tournament::TournamentError::UnknownRound { .. })
        ));
    }

    #[test]
    fn test_destroy_burns_escrow() {
        let mut f = Fixture::new();
        f.on_behalf(addr(5), 500).unwrap();
        let supply = f.ledger.total_supply();
        let stake = f.destroy(operator(), addr(5)).unwrap();
        assert!(stake.destroyed);
        assert!(!stake.resolved);
        assert_eq!(stake.amount, NmrAmount::ZERO);
        assert_eq!(f.ledger.total_supply(), supply - NmrAmount::new(500));
        assert_eq!(f.ledger.total_escrowed(), NmrAmount::ZERO);
        assert!(f.ledger.is_consistent());
    }

    #[test]
    fn test_release_after_destroy_fails() {
        let mut f = Fixture::new();
        f.on_behalf(addr(5), 500).unwrap();
        f.destroy(operator(), addr(5)).unwrap();
        let err = f.release(operator(), addr(5), START + FOUR_WEEKS).unwrap_err();
        assert!(matches!(err, StakeError::StakeTerminated { .. }));
        assert!(matches!(
            f.destroy(operator(), addr(5)).unwrap_err(),
            StakeError::StakeTerminated { .. }
        ));
    }

    #[test]
    fn test_release_returns_escrow_to_staker() {
        let mut f = Fixture::new();
        f.on_behalf(addr(6), 500).unwrap();
        let supply = f.ledger.total_supply();
        let stake = f.release(operator(), addr(6), START + FOUR_WEEKS).unwrap();
        assert!(stake.resolved);
        assert!(!stake.destroyed);
        assert_eq!(stake.amount, NmrAmount::new(500));
        assert_eq!(f.ledger.balance_of(&addr(6)), NmrAmount::new(500));
        assert_eq!(f.ledger.total_supply(), supply);
        assert!(f.ledger.is_consistent());
    }

    #[test]
    fn test_release_before_resolution_is_too_early() {
        let mut f = Fixture::new();
        f.on_behalf(addr(6), 500).unwrap();
        let err = f
            .release(operator(), addr(6), START + FOUR_WEEKS - 1)
            .unwrap_err();
        assert_eq!(
            err,
            StakeError::TooEarly {
                resolution_time: ts(START + FOUR_WEEKS),
                now: ts(START + FOUR_WEEKS - 1),
            }
        );
        assert!(f.stakes.get(0, 51, &addr(6)).unwrap().is_active());
    }

    #[test]
    fn test_non_operator_cannot_terminate() {
        let mut f = Fixture::new();
        f.on_behalf(addr(6), 500).unwrap();
        assert!(matches!(
            f.destroy(addr(6), addr(6)).unwrap_err(),
            StakeError::Unauthorized { .. }
        ));
        assert!(matches!(
            f.release(addr(6), addr(6), START + FOUR_WEEKS).unwrap_err(),
            StakeError::Unauthorized { .. }
        ));
    }

    #[test]
    fn test_unknown_stake() {
        let mut f = Fixture::new();
        assert!(matches!(
            f.destroy(operator(), addr(7)).unwrap_err(),
            StakeError::UnknownStake { .. }
        ));
    }

    #[test]
    fn test_terminal_stake_can_be_replaced() {
        let mut f = Fixture::new();
        f.on_behalf(addr(4), 500).unwrap();
        f.destroy(operator(), addr(4)).unwrap();
        let fresh = f.on_behalf(addr(4), 200).unwrap();
        assert!(fresh.is_active());
        assert_eq!(fresh.amount, NmrAmount::new(200));
        assert_eq!(f.registry.round(0, 51).unwrap().num_stakes, 2);
        assert_eq!(f.stakes.total_active(), Some(f.ledger.total_escrowed()));
    }
}
