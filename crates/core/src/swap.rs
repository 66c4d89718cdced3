//! Swap request status values and the pure rules of the swap protocol.
//!
//! Nothing in here touches storage. The orchestrator loads and locks the
//! rows, hands snapshots to these functions, and writes back whatever they
//! decide, so the decision logic can be tested without a database.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::slot::{validate_transition, Actor, SlotStatus};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

pub const STATUS_PENDING: &str = "PENDING";
pub const STATUS_ACCEPTED: &str = "ACCEPTED";
pub const STATUS_REJECTED: &str = "REJECTED";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapStatus {
    Pending,
    Accepted,
    Rejected,
}

impl SwapStatus {
    /// The value stored in the `swap_requests.status` column.
    pub fn as_str(self) -> &'static str {
        match self {
            SwapStatus::Pending => STATUS_PENDING,
            SwapStatus::Accepted => STATUS_ACCEPTED,
            SwapStatus::Rejected => STATUS_REJECTED,
        }
    }

    /// `ACCEPTED` and `REJECTED` are final.
    pub fn is_terminal(self) -> bool {
        !matches!(self, SwapStatus::Pending)
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwapStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_PENDING => Ok(SwapStatus::Pending),
            STATUS_ACCEPTED => Ok(SwapStatus::Accepted),
            STATUS_REJECTED => Ok(SwapStatus::Rejected),
            other => Err(CoreError::Validation(format!(
                "Invalid swap request status '{other}'"
            ))),
        }
    }
}

/// How a response to a swap request was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapOutcome {
    /// Ownership of the two slots was exchanged.
    Accepted,
    /// The responder declined; both slots were released.
    Rejected,
    /// One of the slots no longer exists; the request was closed as rejected.
    SlotRemoved,
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// The fields of a slot the swap rules depend on, read under a row lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotState {
    pub id: DbId,
    pub owner_id: DbId,
    pub status: SlotStatus,
}

/// A write the orchestrator must apply to one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotChange {
    pub slot_id: DbId,
    pub owner_id: DbId,
    pub status: SlotStatus,
}

/// Everything a response decides: the request's final status and the slot
/// writes that go with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: SwapOutcome,
    pub request_status: SwapStatus,
    pub slot_changes: Vec<SlotChange>,
}

/// Check that `requester_id` may offer `my` in exchange for `their`.
///
/// Checks run in a fixed order and each failure is distinct:
/// 1. `my` must belong to the requester (`Forbidden`).
/// 2. `their` must not belong to the requester (`Validation`).
/// 3. Both slots must be `SWAPPABLE` (`Conflict`).
pub fn validate_proposal(
    requester_id: DbId,
    my: &SlotState,
    their: &SlotState,
) -> Result<(), CoreError> {
    if my.owner_id != requester_id {
        return Err(CoreError::Forbidden(
            "The offered slot does not belong to you".into(),
        ));
    }
    if their.owner_id == requester_id {
        return Err(CoreError::Validation(
            "Cannot request your own slot".into(),
        ));
    }
    for slot in [my, their] {
        validate_transition(slot.status, SlotStatus::SwapPending, Actor::Orchestrator).map_err(
            |_| {
                CoreError::Conflict(format!(
                    "Slot {} is {} and must be SWAPPABLE",
                    slot.id, slot.status
                ))
            },
        )?;
    }
    Ok(())
}

/// Check that `responder_id` may answer a request addressed to
/// `request_responder_id` that currently has `status`.
pub fn validate_responder(
    responder_id: DbId,
    request_responder_id: DbId,
    status: SwapStatus,
) -> Result<(), CoreError> {
    if responder_id != request_responder_id {
        return Err(CoreError::Forbidden(
            "Not authorized to respond to this swap request".into(),
        ));
    }
    if status.is_terminal() {
        return Err(CoreError::Conflict(format!(
            "Swap request already resolved as {status}"
        )));
    }
    Ok(())
}

/// Decide how a pending request is settled when both slots still exist.
///
/// Both slots must still be `SWAP_PENDING`; anything else means a slot was
/// changed behind the request's back and the response fails with `Conflict`
/// without writing. On acceptance the owners are exchanged and both slots
/// become `BUSY`. On rejection both return to `SWAPPABLE` with their owners
/// untouched.
pub fn resolve(accepted: bool, my: &SlotState, their: &SlotState) -> Result<Resolution, CoreError> {
    if my.status != SlotStatus::SwapPending || their.status != SlotStatus::SwapPending {
        return Err(CoreError::Conflict("Slots are not pending".into()));
    }

    let (outcome, request_status, slot_status) = if accepted {
        (SwapOutcome::Accepted, SwapStatus::Accepted, SlotStatus::Busy)
    } else {
        (SwapOutcome::Rejected, SwapStatus::Rejected, SlotStatus::Swappable)
    };
    validate_transition(SlotStatus::SwapPending, slot_status, Actor::Orchestrator)?;

    let (my_owner, their_owner) = if accepted {
        (their.owner_id, my.owner_id)
    } else {
        (my.owner_id, their.owner_id)
    };

    Ok(Resolution {
        outcome,
        request_status,
        slot_changes: vec![
            SlotChange {
                slot_id: my.id,
                owner_id: my_owner,
                status: slot_status,
            },
            SlotChange {
                slot_id: their.id,
                owner_id: their_owner,
                status: slot_status,
            },
        ],
    })
}

/// Settle a pending request after one (or both) of its slots vanished.
///
/// The request is closed as `REJECTED` regardless of the responder's answer
/// and a surviving reserved slot is released back to `SWAPPABLE`.
pub fn resolve_slot_removed(survivor: Option<&SlotState>) -> Resolution {
    let slot_changes = survivor
        .filter(|slot| slot.status == SlotStatus::SwapPending)
        .map(|slot| SlotChange {
            slot_id: slot.id,
            owner_id: slot.owner_id,
            status: SlotStatus::Swappable,
        })
        .into_iter()
        .collect();

    Resolution {
        outcome: SwapOutcome::SlotRemoved,
        request_status: SwapStatus::Rejected,
        slot_changes,
    }
}
