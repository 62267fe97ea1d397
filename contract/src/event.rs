//! Events emitted after each successful state change.

use nmr_types::{Address, Confidence, NmrAmount, RoundId, Timestamp, TournamentId};

/// Contract-level events that observers can subscribe to via the [`EventBus`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContractEvent {
    /// A new disbursement period began and its quota replaced the old one.
    DisbursementReset {
        period_index: u64,
        quota: NmrAmount,
        discarded: NmrAmount,
    },
    Minted {
        to: Address,
        amount: NmrAmount,
        remaining: NmrAmount,
    },
    Transferred {
        from: Address,
        to: Address,
        amount: NmrAmount,
    },
    TournamentCreated {
        id: TournamentId,
        creation_time: Timestamp,
    },
    RoundCreated {
        tournament: TournamentId,
        round: RoundId,
        resolution_time: Timestamp,
    },
    Staked {
        tournament: TournamentId,
        round: RoundId,
        staker: Address,
        source: Address,
        amount: NmrAmount,
        confidence: Confidence,
    },
    StakeDestroyed {
        tournament: TournamentId,
        round: RoundId,
        staker: Address,
        burned: NmrAmount,
    },
    StakeReleased {
        tournament: TournamentId,
        round: RoundId,
        staker: Address,
        refunded: NmrAmount,
        success: bool,
    },
    DelegateChanged {
        previous: Option<Address>,
        current: Address,
    },
    PoolTransfer {
        destination: Address,
        amount: NmrAmount,
    },
    DepositSwept {
        slot: Address,
        amount: NmrAmount,
        assigned_slot: bool,
    },
}

/// Synchronous fan-out event bus.
///
/// Listeners run inline on the calling thread, after the state change has
/// been committed.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&ContractEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&ContractEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &ContractEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
