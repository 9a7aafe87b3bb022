//! Approval workflow for events.
//!
//! `PENDING` is the only state with outgoing edges. `APPROVED` and
//! `REJECTED` are terminal; nothing moves an event back to `PENDING`.

use crate::models::EventStatus;
use crate::utils::error::EventError;

pub fn is_legal(from: EventStatus, to: EventStatus) -> bool {
    matches!(
        (from, to),
        (EventStatus::Pending, EventStatus::Approved) | (EventStatus::Pending, EventStatus::Rejected)
    )
}

/// Returns the new status, or `IllegalTransition` if the move is not allowed.
pub fn transition(from: EventStatus, to: EventStatus) -> Result<EventStatus, EventError> {
    if is_legal(from, to) {
        Ok(to)
    } else {
        Err(EventError::IllegalTransition {
            from: Some(from),
            to,
        })
    }
}

pub fn is_terminal(status: EventStatus) -> bool {
    !matches!(status, EventStatus::Pending)
}
