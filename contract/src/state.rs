//! The complete ledger state owned by the facade.

use nmr_deposit::DepositRouter;
use nmr_disbursement::DisbursementScheduler;
use nmr_governance::DelegateGovernor;
use nmr_ledger::LedgerStore;
use nmr_stake::StakeManager;
use nmr_tournament::TournamentRegistry;
use nmr_types::{ProtocolParams, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::ContractError;

/// Every component's state, in one owned value.
///
/// Components never hold references to each other; operations that span
/// several of them borrow the fields they need for the duration of the call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumeraireState {
    pub params: ProtocolParams,
    pub ledger: LedgerStore,
    pub scheduler: DisbursementScheduler,
    pub registry: TournamentRegistry,
    pub stakes: StakeManager,
    pub governor: DelegateGovernor,
    pub router: DepositRouter,
}

impl NumeraireState {
    /// Fresh state with the first disbursement period starting at `genesis`.
    pub fn new(params: ProtocolParams, genesis: Timestamp) -> Result<Self, ContractError> {
        params.validate()?;
        let scheduler = DisbursementScheduler::from_params(&params, genesis)?;
        Ok(Self {
            ledger: LedgerStore::new(),
            scheduler,
            registry: TournamentRegistry::new(),
            stakes: StakeManager::new(params.operator),
            governor: DelegateGovernor::new(params.governance),
            router: DepositRouter::new(&params),
            params,
        })
    }

    /// Supply equals balances plus escrow, and escrow equals the sum of
    /// active stakes.
    pub fn is_consistent(&self) -> bool {
        self.ledger.is_consistent()
            && self.stakes.total_active() == Some(self.ledger.total_escrowed())
    }
}
