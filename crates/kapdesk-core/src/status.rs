//! Status transition policy.
//!
//! The original workflow never restricted transitions: any status can
//! be set from any other, which operators rely on for manual
//! correction. That permissiveness is preserved as the default, but
//! all status changes are routed through [`check_transition`] so a
//! strict machine can be swapped in without touching callers.

use crate::error::{KapdeskError, KapdeskResult};
use crate::models::ticket::TicketStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Any enum member settable from any state.
    #[default]
    Permissive,
    /// CREATED → ACCEPTED → IN_PROGRESS → COMPLETED → CLOSED, with
    /// TRANSFER_REQUESTED reachable from, and exiting to, any
    /// non-terminal state.
    Strict,
}

pub fn check_transition(
    policy: TransitionPolicy,
    from: TicketStatus,
    to: TicketStatus,
) -> KapdeskResult<()> {
    use TicketStatus::*;

    if policy == TransitionPolicy::Permissive || from == to {
        return Ok(());
    }

    let allowed = match (from, to) {
        (Created, Accepted) | (Accepted, InProgress) | (InProgress, Completed) => true,
        (Completed, Closed) => true,
        // Into the transfer side-state from any non-terminal state.
        (Created | Accepted | InProgress, TransferRequested) => true,
        // Back into normal flow once a transfer resolves.
        (TransferRequested, Created | Accepted | InProgress) => true,
        _ => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(KapdeskError::Validation {
            message: format!(
                "cannot transition from {} to {}",
                from.as_str(),
                to.as_str()
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TicketStatus::*;

    const ALL: [TicketStatus; 6] = [
        Created,
        Accepted,
        InProgress,
        Completed,
        Closed,
        TransferRequested,
    ];

    #[test]
    fn permissive_allows_every_pair() {
        for from in ALL {
            for to in ALL {
                assert!(check_transition(TransitionPolicy::Permissive, from, to).is_ok());
            }
        }
    }

    #[test]
    fn strict_follows_the_chain() {
        assert!(check_transition(TransitionPolicy::Strict, Created, Accepted).is_ok());
        assert!(check_transition(TransitionPolicy::Strict, Accepted, InProgress).is_ok());
        assert!(check_transition(TransitionPolicy::Strict, InProgress, Completed).is_ok());
        assert!(check_transition(TransitionPolicy::Strict, Completed, Closed).is_ok());
    }

    #[test]
    fn strict_rejects_jumps_and_reopening() {
        assert!(check_transition(TransitionPolicy::Strict, Created, Closed).is_err());
        assert!(check_transition(TransitionPolicy::Strict, Closed, Created).is_err());
        assert!(check_transition(TransitionPolicy::Strict, Created, Completed).is_err());
    }

    #[test]
    fn strict_transfer_side_state() {
        assert!(check_transition(TransitionPolicy::Strict, InProgress, TransferRequested).is_ok());
        assert!(check_transition(TransitionPolicy::Strict, TransferRequested, InProgress).is_ok());
        assert!(check_transition(TransitionPolicy::Strict, Closed, TransferRequested).is_err());
        assert!(check_transition(TransitionPolicy::Strict, TransferRequested, Closed).is_err());
    }
}
