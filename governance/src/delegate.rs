//! The delegate pointer, changed only with both governance approvals.

use crate::approval::DualApproval;
use crate::error::GovernanceError;
use nmr_types::Address;
use serde::{Deserialize, Serialize};

/// Result of a `change_delegate` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DelegateChange {
    /// Approval recorded; the second governance identity has not matched it yet.
    Pending { candidate: Address },
    /// Both identities agreed and the delegate was replaced.
    Changed {
        previous: Option<Address>,
        current: Address,
    },
}

/// Holds the active delegate and the pending change request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateGovernor {
    governance: [Address; 2],
    delegate: Option<Address>,
    pending: DualApproval<Address, Address>,
}

impl DelegateGovernor {
    pub fn new(governance: [Address; 2]) -> Self {
        Self {
            governance,
            delegate: None,
            pending: DualApproval::NoPending,
        }
    }

    pub fn delegate(&self) -> Option<&Address> {
        self.delegate.as_ref()
    }

    pub fn pending(&self) -> &DualApproval<Address, Address> {
        &self.pending
    }

    pub fn governance(&self) -> &[Address; 2] {
        &self.governance
    }

    /// Approve `new_delegate` as `caller`.
    pub fn change_delegate(
        &mut self,
        new_delegate: Address,
        caller: &Address,
    ) -> Result<DelegateChange, GovernanceError> {
        if !self.governance.contains(caller) {
            tracing::warn!(%caller, "rejected delegate change from non-governance caller");
            return Err(GovernanceError::Unauthorized(*caller));
        }

        let next = std::mem::take(&mut self.pending).approve(new_delegate, *caller);
        if next.is_confirmed() {
            let previous = self.delegate.replace(new_delegate);
            tracing::info!(delegate = %new_delegate, "delegate changed");
            return Ok(DelegateChange::Changed {
                previous,
                current: new_delegate,
            });
        }
        self.pending = next;
        tracing::debug!(
            candidate = %new_delegate,
            %caller,
            "delegate change awaiting second approval"
        );
        Ok(DelegateChange::Pending {
            candidate: new_delegate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn g1() -> Address {
        Address::parse("0x54fd80d6ae7584d8e9a19fe1df43f04e5282cc43").unwrap()
    }

    fn g2() -> Address {
        Address::parse("0xa6d135de4acf44f34e2e14a4ee619ce0a99d1e08").unwrap()
    }

    fn candidate(n: u64) -> Address {
        Address::from_low_u64(0x5000_0000 + n)
    }

    #[test]
    fn test_single_approval_leaves_delegate_unchanged() {
        let mut governor = DelegateGovernor::new([g1(), g2()]);
        let change = governor.change_delegate(candidate(1), &g1()).unwrap();
        assert_eq!(change, DelegateChange::Pending { candidate: candidate(1) });
        assert_eq!(governor.delegate(), None);
        assert_eq!(governor.pending().pending(), Some((&candidate(1), &g1())));
    }

    #[test]
    fn test_both_approvals_change_delegate() {
        let mut governor = DelegateGovernor::new([g1(), g2()]);
        governor.change_delegate(candidate(1), &g1()).unwrap();
        let change = governor.change_delegate(candidate(1), &g2()).unwrap();
        assert_eq!(
            change,
            DelegateChange::Changed {
                previous: None,
                current: candidate(1)
            }
        );
        assert_eq!(governor.delegate(), Some(&candidate(1)));
        assert_eq!(governor.pending(), &DualApproval::NoPending);
    }

    #[test]
    fn test_same_identity_twice_does_not_confirm() {
        let mut governor = DelegateGovernor::new([g1(), g2()]);
        governor.change_delegate(candidate(1), &g1()).unwrap();
        governor.change_delegate(candidate(1), &g1()).unwrap();
        assert_eq!(governor.delegate(), None);
    }

    #[test]
    fn test_mismatched_values_restart_approval() {
        let mut governor = DelegateGovernor::new([g1(), g2()]);
        governor.change_delegate(candidate(1), &g1()).unwrap();
        governor.change_delegate(candidate(2), &g2()).unwrap();
        assert_eq!(governor.delegate(), None);
        governor.change_delegate(candidate(2), &g1()).unwrap();
        assert_eq!(governor.delegate(), Some(&candidate(2)));
    }

    #[test]
    fn test_second_change_reports_previous() {
        let mut governor = DelegateGovernor::new([g1(), g2()]);
        governor.change_delegate(candidate(1), &g2()).unwrap();
        governor.change_delegate(candidate(1), &g1()).unwrap();
        governor.change_delegate(candidate(3), &g1()).unwrap();
        let change = governor.change_delegate(candidate(3), &g2()).unwrap();
        assert_eq!(
            change,
            DelegateChange::Changed {
                previous: Some(candidate(1)),
                current: candidate(3)
            }
        );
    }

    #[test]
    fn test_outsider_is_unauthorized() {
        let mut governor = DelegateGovernor::new([g1(), g2()]);
        governor.change_delegate(candidate(1), &g1()).unwrap();
        let before = governor.clone();
        assert_eq!(
            governor.change_delegate(candidate(1), &candidate(9)).unwrap_err(),
            GovernanceError::Unauthorized(candidate(9))
        );
        assert_eq!(governor, before);
    }
}
