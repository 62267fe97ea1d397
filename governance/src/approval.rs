//! The dual-approval state machine.

use serde::{Deserialize, Serialize};

/// Progress of a value toward approval by two distinct parties.
///
/// Transitions are pure: [`approve`](Self::approve) consumes the current state
/// and returns the next one. Callers act on [`Confirmed`](Self::Confirmed)
/// and then [`reset`](Self::reset).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DualApproval<V, P> {
    NoPending,
    AwaitingSecond {
        value: V,
        first: P,
    },
    Confirmed {
        value: V,
    },
}

impl<V, P> Default for DualApproval<V, P> {
    fn default() -> Self {
        Self::NoPending
    }
}

impl<V: PartialEq, P: PartialEq> DualApproval<V, P> {
    /// Record `party`'s approval of `value`.
    ///
    /// - No pending value: `value` becomes pending with `party` as first approver.
    /// - Same value, same party: unchanged.
    /// - Same value, other party: confirmed.
    /// - Different value: replaces the pending one, only `party` has approved.
    pub fn approve(self, value: V, party: P) -> Self {
        match self {
            Self::AwaitingSecond {
                value: pending,
                first,
            } if pending == value => {
                if first == party {
                    Self::AwaitingSecond {
                        value: pending,
                        first,
                    }
                } else {
                    Self::Confirmed { value }
                }
            }
            Self::NoPending | Self::AwaitingSecond { .. } | Self::Confirmed { .. } => {
                Self::AwaitingSecond {
                    value,
                    first: party,
                }
            }
        }
    }

    /// Back to [`NoPending`](Self::NoPending).
    pub fn reset(self) -> Self {
        Self::NoPending
    }

    /// The value awaiting its second approval, if any.
    pub fn pending(&self) -> Option<(&V, &P)> {
        match self {
            Self::AwaitingSecond { value, first } => Some((value, first)),
            _ => None,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }

    /// Take the confirmed value, if this state is confirmed.
    pub fn into_confirmed(self) -> Option<V> {
        match self {
            Self::Confirmed { value } => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Approval = DualApproval<u32, char>;

    #[test]
    fn first_approval_awaits_second() {
        let state = Approval::NoPending.approve(7, 'a');
        assert_eq!(state.pending(), Some((&7, &'a')));
        assert!(!state.is_confirmed());
    }

    #[test]
    fn second_party_confirms() {
        let state = Approval::NoPending.approve(7, 'a').approve(7, 'b');
        assert_eq!(state, Approval::Confirmed { value: 7 });
        assert_eq!(state.into_confirmed(), Some(7));
    }

    #[test]
    fn repeat_by_same_party_is_noop() {
        let once = Approval::NoPending.approve(7, 'a');
        let twice = once.clone().approve(7, 'a');
        assert_eq!(once, twice);
    }

    #[test]
    fn different_value_resets_approvals() {
        let state = Approval::NoPending.approve(7, 'a').approve(8, 'b');
        assert_eq!(state.pending(), Some((&8, &'b')));
        let state = state.approve(8, 'a');
        assert_eq!(state.into_confirmed(), Some(8));
    }

    #[test]
    fn approving_after_confirmation_starts_over() {
        let state = Approval::Confirmed { value: 7 }.approve(7, 'a');
        assert_eq!(state.pending(), Some((&7, &'a')));
    }

    #[test]
    fn reset_clears_pending() {
        let state = Approval::NoPending.approve(1, 'a').reset();
        assert_eq!(state, Approval::NoPending);
        assert_eq!(state.into_confirmed(), None);
    }
}
