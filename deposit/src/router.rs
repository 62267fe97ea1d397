//! The deposit router.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::DepositError;
use nmr_governance::DualApproval;
use nmr_ledger::LedgerStore;
use nmr_types::{Address, NmrAmount, ProtocolParams};
use serde::{Deserialize, Serialize};

/// Which side of the two-of-two rule a caller stands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Party {
    Operator,
    Governance,
}

/// Result of a `numerai_transfer` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Approval recorded, waiting for the other party.
    Pending,
    /// Both parties agreed and the amount left the pool.
    Transferred { assigned_slot: bool },
}

/// Result of a `transfer_deposit` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepositSweep {
    /// Balance moved back into the pool.
    pub amount: NmrAmount,
    /// Whether the slot had been assigned by an earlier pool payout. Slots
    /// can also be funded directly by depositors.
    pub assigned_slot: bool,
}

/// Pending pool payouts and the set of assigned deposit slots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositRouter {
    operator: Address,
    governance: [Address; 2],
    pool: Address,
    deposit_address_limit: u64,
    /// At most one pending payout per destination.
    approvals: BTreeMap<Address, DualApproval<NmrAmount, Party>>,
    slots: BTreeSet<Address>,
}

impl DepositRouter {
    pub fn new(params: &ProtocolParams) -> Self {
        Self {
            operator: params.operator,
            governance: params.governance,
            pool: params.pool,
            deposit_address_limit: params.deposit_address_limit,
            approvals: BTreeMap::new(),
            slots: BTreeSet::new(),
        }
    }

    pub fn pool(&self) -> &Address {
        &self.pool
    }

    /// The pending payout to `destination`, with its first approver.
    pub fn pending(&self, destination: &Address) -> Option<(&NmrAmount, &Party)> {
        self.approvals.get(destination).and_then(DualApproval::pending)
    }

    /// Deposit slots that have received a payout.
    pub fn slots(&self) -> impl Iterator<Item = &Address> {
        self.slots.iter()
    }

    pub fn is_assigned(&self, slot: &Address) -> bool {
        self.slots.contains(slot)
    }

    pub fn is_deposit_address(&self, address: &Address) -> bool {
        address.is_numeric_at_most(self.deposit_address_limit)
    }

    /// Approve paying `amount` from the pool to `destination`.
    ///
    /// A failed transfer on the confirming call leaves the earlier approval in
    /// place.
    pub fn numerai_transfer(
        &mut self,
        ledger: &mut LedgerStore,
        caller: &Address,
        destination: Address,
        amount: NmrAmount,
    ) -> Result<TransferOutcome, DepositError> {
        let party = self.party_of(caller).ok_or_else(|| {
            tracing::warn!(%caller, "rejected pool transfer approval");
            DepositError::Unauthorized {
                caller: *caller,
                action: "approve pool transfers",
            }
        })?;

        let next = self
            .approvals
            .get(&destination)
            .cloned()
            .unwrap_or_default()
            .approve(amount, party);

        if !next.is_confirmed() {
            self.approvals.insert(destination, next);
            tracing::debug!(
                %destination,
                %amount,
                ?party,
                "pool transfer awaiting second approval"
            );
            return Ok(TransferOutcome::Pending);
        }

        ledger.transfer(&self.pool, &destination, amount)?;
        self.approvals.remove(&destination);
        let assigned_slot = self.is_deposit_address(&destination);
        if assigned_slot {
            self.slots.insert(destination);
        }
        tracing::info!(%destination, %amount, assigned_slot, "pool transfer executed");
        Ok(TransferOutcome::Transferred { assigned_slot })
    }

    /// Sweep the whole balance of a deposit slot back into the pool. Operator
    /// only.
    pub fn transfer_deposit(
        &mut self,
        ledger: &mut LedgerStore,
        caller: &Address,
        destination: &Address,
    ) -> Result<DepositSweep, DepositError> {
        if *caller != self.operator {
            tracing::warn!(%caller, "rejected deposit sweep");
            return Err(DepositError::Unauthorized {
                caller: *caller,
                action: "sweep deposits",
            });
        }
        if !self.is_deposit_address(destination) {
            return Err(DepositError::NotDepositAddress(*destination));
        }
        let balance = ledger.balance_of(destination);
        if balance.is_zero() {
            return Err(DepositError::EmptySlot(*destination));
        }

        ledger.transfer(destination, &self.pool, balance)?;
        let assigned_slot = self.is_assigned(destination);
        tracing::info!(
            slot = %destination,
            swept = %balance,
            assigned_slot,
            "deposit swept to pool"
        );
        Ok(DepositSweep {
            amount: balance,
            assigned_slot,
        })
    }

    fn party_of(&self, caller: &Address) -> Option<Party> {
        if *caller == self.operator {
            Some(Party::Operator)
        } else if self.governance.contains(caller) {
            Some(Party::Governance)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ProtocolParams {
        ProtocolParams::default()
    }

    fn slot() -> Address {
        Address::parse("0xf4240").unwrap()
    }

    fn setup(pool_balance: u128) -> (DepositRouter, LedgerStore, ProtocolParams) {
        let params = params();
        let mut ledger = LedgerStore::new();
        ledger.mint(&params.pool, NmrAmount::new(pool_balance)).unwrap();
        (DepositRouter::new(&params), ledger, params)
    }

    #[test]
    fn test_one_approval_is_pending() {
        let (mut router, mut ledger, params) = setup(100);
        let outcome = router
            .numerai_transfer(&mut ledger, &params.operator, slot(), NmrAmount::new(25))
            .unwrap();
        assert_eq!(outcome, TransferOutcome::Pending);
        assert_eq!(ledger.balance_of(&slot()), NmrAmount::ZERO);
        assert_eq!(router.pending(&slot()), Some((&NmrAmount::new(25), &Party::Operator)));
    }

    #[test]
    fn test_operator_and_governance_confirm_transfer() {
        let (mut router, mut ledger, params) = setup(100);
        router
            .numerai_transfer(&mut ledger, &params.operator, slot(), NmrAmount::new(25))
            .unwrap();
        let outcome = router
            .numerai_transfer(&mut ledger, &params.governance[0], slot(), NmrAmount::new(25))
            .unwrap();
        assert_eq!(outcome, TransferOutcome::Transferred { assigned_slot: true });
        assert_eq!(ledger.balance_of(&slot()), NmrAmount::new(25));
        assert_eq!(ledger.balance_of(&params.pool), NmrAmount::new(75));
        assert_eq!(router.pending(&slot()), None);
        assert_eq!(router.slots().collect::<Vec<_>>(), vec![&slot()]);
        assert!(router.is_assigned(&slot()));
    }

    #[test]
    fn test_two_governance_seats_are_one_party() {
        let (mut router, mut ledger, params) = setup(100);
        router
            .numerai_transfer(&mut ledger, &params.governance[0], slot(), NmrAmount::new(25))
            .unwrap();
        let outcome = router
            .numerai_transfer(&mut ledger, &params.governance[1], slot(), NmrAmount::new(25))
            .unwrap();
        assert_eq!(outcome, TransferOutcome::Pending);
        assert_eq!(ledger.balance_of(&slot()), NmrAmount::ZERO);
    }

    #[test]
    fn test_different_amount_resets_approval() {
        let (mut router, mut ledger, params) = setup(100);
        router
            .numerai_transfer(&mut ledger, &params.operator, slot(), NmrAmount::new(25))
            .unwrap();
        let outcome = router
            .numerai_transfer(&mut ledger, &params.governance[0], slot(), NmrAmount::new(30))
            .unwrap();
        assert_eq!(outcome, TransferOutcome::Pending);
        assert_eq!(router.pending(&slot()), Some((&NmrAmount::new(30), &Party::Governance)));
    }

    #[test]
    fn test_underfunded_pool_keeps_approval_pending() {
        let (mut router, mut ledger, params) = setup(10);
        router
            .numerai_transfer(&mut ledger, &params.operator, slot(), NmrAmount::new(25))
            .unwrap();
        let err = router
            .numerai_transfer(&mut ledger, &params.governance[1], slot(), NmrAmount::new(25))
            .unwrap_err();
        assert!(matches!(
            err,
            DepositError::Ledger(nmr_ledger::LedgerError::InsufficientBalance { .. })
        ));
        assert_eq!(router.pending(&slot()), Some((&NmrAmount::new(25), &Party::Operator)));
        assert_eq!(ledger.balance_of(&params.pool), NmrAmount::new(10));
    }

    #[test]
    fn test_outsider_cannot_approve() {
        let (mut router, mut ledger, _) = setup(100);
        let err = router
            .numerai_transfer(
                &mut ledger,
                &Address::from_low_u64(0xdead_beef),
                slot(),
                NmrAmount::new(1),
            )
            .unwrap_err();
        assert!(matches!(err, DepositError::Unauthorized { .. }));
        assert_eq!(router.pending(&slot()), None);
    }

    #[test]
    fn test_non_slot_destination_is_not_recorded() {
        let (mut router, mut ledger, params) = setup(100);
        let wallet = Address::from_low_u64(0xdead_beef);
        router
            .numerai_transfer(&mut ledger, &params.operator, wallet, NmrAmount::new(5))
            .unwrap();
        let outcome = router
            .numerai_transfer(&mut ledger, &params.governance[0], wallet, NmrAmount::new(5))
            .unwrap();
        assert_eq!(outcome, TransferOutcome::Transferred { assigned_slot: false });
        assert_eq!(router.slots().count(), 0);
    }

    #[test]
    fn test_sweep_moves_whole_slot_balance_to_pool() {
        let (mut router, mut ledger, params) = setup(100);
        ledger.transfer(&params.pool, &slot(), NmrAmount::new(25)).unwrap();
        let swept = router
            .transfer_deposit(&mut ledger, &params.operator, &slot())
            .unwrap();
        assert_eq!(
            swept,
            DepositSweep {
                amount: NmrAmount::new(25),
                assigned_slot: false,
            }
        );
        assert_eq!(ledger.balance_of(&slot()), NmrAmount::ZERO);
        assert_eq!(ledger.balance_of(&params.pool), NmrAmount::new(100));
    }

    #[test]
    fn test_sweep_reports_slot_assigned_by_payout() {
        let (mut router, mut ledger, params) = setup(100);
        router
            .numerai_transfer(&mut ledger, &params.operator, slot(), NmrAmount::new(40))
            .unwrap();
        router
            .numerai_transfer(&mut ledger, &params.governance[1], slot(), NmrAmount::new(40))
            .unwrap();
        ledger.transfer(&params.pool, &slot(), NmrAmount::new(2)).unwrap();

        let swept = router
            .transfer_deposit(&mut ledger, &params.operator, &slot())
            .unwrap();
        assert_eq!(swept.amount, NmrAmount::new(42));
        assert!(swept.assigned_slot);
        assert_eq!(ledger.balance_of(&params.pool), NmrAmount::new(100));
    }

    #[test]
    fn test_deposit_range_follows_params() {
        let params = ProtocolParams {
            deposit_address_limit: 10,
            ..ProtocolParams::default()
        };
        let router = DepositRouter::new(&params);
        for n in [0u64, 10, 11, 1_000_000] {
            let addr = Address::from_low_u64(n);
            assert_eq!(router.is_deposit_address(&addr), params.is_deposit_address(&addr));
        }
    }

    #[test]
    fn test_sweep_rejects_address_above_limit() {
        let (mut router, mut ledger, params) = setup(100);
        let beyond = Address::from_low_u64(1_000_001);
        assert_eq!(
            router
                .transfer_deposit(&mut ledger, &params.operator, &beyond)
                .unwrap_err(),
            DepositError::NotDepositAddress(beyond)
        );
    }

    #[test]
    fn test_sweep_of_empty_slot_fails() {
        let (mut router, mut ledger, params) = setup(100);
        assert_eq!(
            router
                .transfer_deposit(&mut ledger, &params.operator, &slot())
                .unwrap_err(),
            DepositError::EmptySlot(slot())
        );
    }

    #[test]
    fn test_sweep_is_operator_only() {
        let (mut router, mut ledger, params) = setup(100);
        ledger.transfer(&params.pool, &slot(), NmrAmount::new(25)).unwrap();
        let err = router
            .transfer_deposit(&mut ledger, &params.governance[0], &slot())
            .unwrap_err();
        assert!(matches!(err, DepositError::Unauthorized { .. }));
        assert_eq!(ledger.balance_of(&slot()), NmrAmount::new(25));
    }
}
