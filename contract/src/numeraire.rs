//! The Numeraire facade.
//!
//! [`Numeraire`] owns the whole [`NumeraireState`] and a [`Clock`]. Every
//! mutating method names its caller explicitly, reads the clock once, checks
//! authorization and preconditions, and only then commits. A call that
//! returns an error leaves the state exactly as it was. Successful calls
//! emit one or more [`ContractEvent`]s to the [`EventBus`].

use nmr_deposit::{DepositSweep, TransferOutcome};
use nmr_governance::DelegateChange;
use nmr_ledger::LedgerError;
use nmr_stake::{Stake, StakeRequest};
use nmr_tournament::{Round, Tournament};
use nmr_types::{
    Address, Clock, Confidence, NmrAmount, ProtocolParams, RoundId, Timestamp, TournamentId,
};

use crate::error::ContractError;
use crate::event::{ContractEvent, EventBus};
use crate::state::NumeraireState;

/// The ledger, as seen by its callers.
pub struct Numeraire<C: Clock> {
    state: NumeraireState,
    clock: C,
    events: EventBus,
}

impl<C: Clock> Numeraire<C> {
    /// Start a fresh ledger whose first disbursement period begins now.
    pub fn new(params: ProtocolParams, clock: C) -> Result<Self, ContractError> {
        let genesis = clock.now();
        let state = NumeraireState::new(params, genesis)?;
        tracing::info!(%genesis, operator = %state.params.operator, "ledger initialised");
        Ok(Self::from_state(state, clock))
    }

    /// Resume from previously saved state.
    pub fn from_state(state: NumeraireState, clock: C) -> Self {
        Self {
            state,
            clock,
            events: EventBus::new(),
        }
    }

    pub fn state(&self) -> &NumeraireState {
        &self.state
    }

    pub fn into_state(self) -> NumeraireState {
        self.state
    }

    pub fn params(&self) -> &ProtocolParams {
        &self.state.params
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&ContractEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    // ── Ledger ─────────────────────────────────────────────────────────

    /// Mint `amount` into the pool account from the current period's quota.
    /// Operator only. Returns the quota left afterwards.
    pub fn mint(
        &mut self,
        caller: &Address,
        amount: NmrAmount,
    ) -> Result<NmrAmount, ContractError> {
        let now = self.clock.now();
        self.require_operator(caller, "mint")?;

        if let Some(cap) = self.state.params.supply_cap {
            let supply_after = self
                .state
                .ledger
                .total_supply()
                .checked_add(amount)
                .ok_or(LedgerError::Overflow)?;
            if supply_after > cap {
                return Err(ContractError::SupplyCapExceeded {
                    requested: amount.raw(),
                    cap: cap.raw(),
                });
            }
        }

        let prepared = self.state.scheduler.prepare_debit(amount, now)?;
        let pool = self.state.params.pool;
        self.state.ledger.mint(&pool, amount)?;
        self.state.scheduler.commit(prepared);

        if let Some(rollover) = prepared.rollover() {
            tracing::debug!(
                period = rollover.period_index,
                quota = %rollover.quota,
                discarded = %rollover.discarded,
                "disbursement period rolled over"
            );
            self.events.emit(&ContractEvent::DisbursementReset {
                period_index: rollover.period_index,
                quota: rollover.quota,
                discarded: rollover.discarded,
            });
        }
        let remaining = prepared.remaining_after();
        tracing::info!(%amount, %remaining, to = %pool, "minted");
        self.events.emit(&ContractEvent::Minted {
            to: pool,
            amount,
            remaining,
        });
        Ok(remaining)
    }

    /// Move `amount` of the caller's balance to `to`.
    pub fn transfer(
        &mut self,
        caller: &Address,
        to: &Address,
        amount: NmrAmount,
    ) -> Result<(), ContractError> {
        self.state.ledger.transfer(caller, to, amount)?;
        tracing::info!(from = %caller, %to, %amount, "transferred");
        self.events.emit(&ContractEvent::Transferred {
            from: *caller,
            to: *to,
            amount,
        });
        Ok(())
    }

    pub fn balance_of(&self, account: &Address) -> NmrAmount {
        self.state.ledger.balance_of(account)
    }

    pub fn total_supply(&self) -> NmrAmount {
        self.state.ledger.total_supply()
    }

    pub fn total_escrowed(&self) -> NmrAmount {
        self.state.ledger.total_escrowed()
    }

    /// Quota still mintable in the current period, as of now.
    pub fn disbursement(&self) -> NmrAmount {
        self.state.scheduler.remaining_at(self.clock.now())
    }

    /// When the next disbursement period starts, as of now.
    pub fn next_disbursement_reset(&self) -> Timestamp {
        let now = self.clock.now();
        match self.state.scheduler.pending_rollover(now) {
            Some(rollover) => rollover
                .period_start
                .saturating_add(self.state.scheduler.period_secs()),
            None => self.state.scheduler.next_reset(),
        }
    }

    // ── Tournaments ────────────────────────────────────────────────────

    pub fn create_tournament(
        &mut self,
        caller: &Address,
        id: TournamentId,
    ) -> Result<&Tournament, ContractError> {
        let now = self.clock.now();
        let tournament = self.state.registry.create_tournament(id, now)?;
        tracing::info!(tournament = id, %caller, "tournament created");
        self.events.emit(&ContractEvent::TournamentCreated {
            id,
            creation_time: tournament.creation_time,
        });
        Ok(tournament)
    }

    pub fn create_round(
        &mut self,
        caller: &Address,
        tournament_id: TournamentId,
        round_id: RoundId,
        resolution_time: Timestamp,
    ) -> Result<&Round, ContractError> {
        let now = self.clock.now();
        let round = self
            .state
            .registry
            .create_round(tournament_id, round_id, resolution_time, now)?;
        tracing::info!(
            tournament = tournament_id,
            round = round_id,
            %resolution_time,
            %caller,
            "round created"
        );
        self.events.emit(&ContractEvent::RoundCreated {
            tournament: tournament_id,
            round: round_id,
            resolution_time,
        });
        Ok(round)
    }

    pub fn get_tournament(&self, id: TournamentId) -> Result<&Tournament, ContractError> {
        Ok(self.state.registry.tournament(id)?)
    }

    pub fn get_round(
        &self,
        tournament_id: TournamentId,
        round_id: RoundId,
    ) -> Result<&Round, ContractError> {
        Ok(self.state.registry.round(tournament_id, round_id)?)
    }

    // ── Stakes ─────────────────────────────────────────────────────────

    /// Stake `amount` of the caller's own balance on a round.
    pub fn stake(
        &mut self,
        caller: &Address,
        amount: NmrAmount,
        tournament_id: TournamentId,
        round_id: RoundId,
        confidence: Confidence,
    ) -> Result<&Stake, ContractError> {
        let request = StakeRequest {
            source: *caller,
            staker: *caller,
            amount,
            tournament_id,
            round_id,
            confidence,
        };
        let now = self.clock.now();
        let state = &mut self.state;
        let stake = state.stakes.stake(
            &mut state.ledger,
            &mut state.registry,
            caller,
            amount,
            tournament_id,
            round_id,
            confidence,
            now,
        )?;
        emit_staked(&self.events, &request);
        Ok(stake)
    }

    /// Stake from custodied `source` funds on behalf of `staker`. Operator only.
    #[allow(clippy::too_many_arguments)]
    pub fn stake_on_behalf(
        &mut self,
        caller: &Address,
        source: &Address,
        staker: &Address,
        amount: NmrAmount,
        tournament_id: TournamentId,
        round_id: RoundId,
        confidence: Confidence,
    ) -> Result<&Stake, ContractError> {
        let request = StakeRequest {
            source: *source,
            staker: *staker,
            amount,
            tournament_id,
            round_id,
            confidence,
        };
        let now = self.clock.now();
        let state = &mut self.state;
        let stake = state.stakes.stake_on_behalf(
            &mut state.ledger,
            &mut state.registry,
            caller,
            request,
            now,
        )?;
        emit_staked(&self.events, &request);
        Ok(stake)
    }

    pub fn get_stake(
        &self,
        tournament_id: TournamentId,
        round_id: RoundId,
        staker: &Address,
    ) -> Result<&Stake, ContractError> {
        Ok(self.state.stakes.get(tournament_id, round_id, staker)?)
    }

    /// Burn an active stake. Operator only.
    pub fn destroy_stake(
        &mut self,
        caller: &Address,
        staker: &Address,
        tournament_id: TournamentId,
        round_id: RoundId,
    ) -> Result<&Stake, ContractError> {
        let burned = self
            .state
            .stakes
            .get(tournament_id, round_id, staker)
            .map(|s| s.amount)
            .unwrap_or_default();
        let state = &mut self.state;
        let stake = state
            .stakes
            .destroy_stake(&mut state.ledger, caller, staker, tournament_id, round_id)?;
        self.events.emit(&ContractEvent::StakeDestroyed {
            tournament: tournament_id,
            round: round_id,
            staker: *staker,
            burned,
        });
        Ok(stake)
    }

    /// Refund an active stake after its round resolves. Operator only.
    pub fn release_stake(
        &mut self,
        caller: &Address,
        staker: &Address,
        tournament_id: TournamentId,
        round_id: RoundId,
        success: bool,
    ) -> Result<&Stake, ContractError> {
        let now = self.clock.now();
        let state = &mut self.state;
        let stake = state.stakes.release_stake(
            &mut state.ledger,
            &state.registry,
            caller,
            staker,
            tournament_id,
            round_id,
            success,
            now,
        )?;
        self.events.emit(&ContractEvent::StakeReleased {
            tournament: tournament_id,
            round: round_id,
            staker: *staker,
            refunded: stake.amount,
            success,
        });
        Ok(stake)
    }

    // ── Governance ─────────────────────────────────────────────────────

    /// Approve `new_delegate` as one of the two governance identities.
    pub fn change_delegate(
        &mut self,
        caller: &Address,
        new_delegate: Address,
    ) -> Result<DelegateChange, ContractError> {
        let change = self.state.governor.change_delegate(new_delegate, caller)?;
        if let DelegateChange::Changed { previous, current } = change {
            self.events
                .emit(&ContractEvent::DelegateChanged { previous, current });
        }
        Ok(change)
    }

    pub fn delegate(&self) -> Option<&Address> {
        self.state.governor.delegate()
    }

    /// The delegate candidate awaiting its second approval, and who approved it.
    pub fn pending_delegate(&self) -> Option<(&Address, &Address)> {
        self.state.governor.pending().pending()
    }

    // ── Deposits ───────────────────────────────────────────────────────

    /// Approve a payout from the pool. Needs the operator and one governance
    /// identity to agree on destination and amount.
    pub fn numerai_transfer(
        &mut self,
        caller: &Address,
        destination: Address,
        amount: NmrAmount,
    ) -> Result<TransferOutcome, ContractError> {
        let state = &mut self.state;
        let outcome = state
            .router
            .numerai_transfer(&mut state.ledger, caller, destination, amount)?;
        if let TransferOutcome::Transferred { .. } = outcome {
            self.events
                .emit(&ContractEvent::PoolTransfer { destination, amount });
        }
        Ok(outcome)
    }

    /// Sweep a deposit slot's balance into the pool. Operator only.
    pub fn transfer_deposit(
        &mut self,
        caller: &Address,
        destination: &Address,
    ) -> Result<DepositSweep, ContractError> {
        let state = &mut self.state;
        let sweep = state
            .router
            .transfer_deposit(&mut state.ledger, caller, destination)?;
        self.events.emit(&ContractEvent::DepositSwept {
            slot: *destination,
            amount: sweep.amount,
            assigned_slot: sweep.assigned_slot,
        });
        Ok(sweep)
    }

    fn require_operator(
        &self,
        caller: &Address,
        action: &'static str,
    ) -> Result<(), ContractError> {
        if *caller != self.state.params.operator {
            tracing::warn!(%caller, action, "rejected non-operator call");
            return Err(ContractError::Unauthorized {
                caller: *caller,
                action,
            });
        }
        Ok(())
    }
}

fn emit_staked(events: &EventBus, request: &StakeRequest) {
    events.emit(&ContractEvent::Staked {
        tournament: request.tournament_id,
        round: request.round_id,
        staker: request.staker,
        source: request.source,
        amount: request.amount,
        confidence: request.confidence,
    });
}
