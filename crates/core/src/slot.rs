//! Slot status values and the status state machine.
//!
//! A slot moves between three states. Owners may only toggle between `BUSY`
//! and `SWAPPABLE`; every move into or out of `SWAP_PENDING` belongs to the
//! swap orchestrator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

pub const STATUS_BUSY: &str = "BUSY";
pub const STATUS_SWAPPABLE: &str = "SWAPPABLE";
pub const STATUS_SWAP_PENDING: &str = "SWAP_PENDING";

/// Maximum length of a slot title (characters).
pub const MAX_TITLE_LENGTH: usize = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotStatus {
    #[default]
    Busy,
    Swappable,
    SwapPending,
}

impl SlotStatus {
    /// The value stored in the `slots.status` column.
    pub fn as_str(self) -> &'static str {
        match self {
            SlotStatus::Busy => STATUS_BUSY,
            SlotStatus::Swappable => STATUS_SWAPPABLE,
            SlotStatus::SwapPending => STATUS_SWAP_PENDING,
        }
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_BUSY => Ok(SlotStatus::Busy),
            STATUS_SWAPPABLE => Ok(SlotStatus::Swappable),
            STATUS_SWAP_PENDING => Ok(SlotStatus::SwapPending),
            other => Err(CoreError::Validation(format!(
                "Invalid slot status '{other}'. Must be one of: {STATUS_BUSY}, \
                 {STATUS_SWAPPABLE}, {STATUS_SWAP_PENDING}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Who is asking for a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// The slot's owner, editing their own calendar.
    Owner,
    /// The swap orchestrator, inside a swap transaction.
    Orchestrator,
}

/// Returns the statuses `actor` may move a slot to from `from`.
///
/// - Owner:        `BUSY` -> `SWAPPABLE`, `SWAPPABLE` -> `BUSY`
/// - Orchestrator: `SWAPPABLE` -> `SWAP_PENDING`,
///                 `SWAP_PENDING` -> `SWAPPABLE` | `BUSY`
pub fn valid_transitions(from: SlotStatus, actor: Actor) -> &'static [SlotStatus] {
    match (actor, from) {
        (Actor::Owner, SlotStatus::Busy) => &[SlotStatus::Swappable],
        (Actor::Owner, SlotStatus::Swappable) => &[SlotStatus::Busy],
        (Actor::Owner, SlotStatus::SwapPending) => &[],
        (Actor::Orchestrator, SlotStatus::Busy) => &[],
        (Actor::Orchestrator, SlotStatus::Swappable) => &[SlotStatus::SwapPending],
        (Actor::Orchestrator, SlotStatus::SwapPending) => {
            &[SlotStatus::Swappable, SlotStatus::Busy]
        }
    }
}

/// Validate a status change requested by `actor`.
///
/// Owner edits of a reserved slot fail with `Conflict` (the reservation is
/// released by the orchestrator, so a later retry may succeed). Owner
/// requests that leave the status unchanged are accepted as no-ops. Every
/// other move outside [`valid_transitions`] fails with `InvalidState`.
pub fn validate_transition(
    from: SlotStatus,
    to: SlotStatus,
    actor: Actor,
) -> Result<(), CoreError> {
    if actor == Actor::Owner {
        if from == SlotStatus::SwapPending {
            return Err(CoreError::Conflict(
                "Slot has a pending swap request and cannot be changed".into(),
            ));
        }
        if from == to {
            return Ok(());
        }
    }

    if valid_transitions(from, actor).contains(&to) {
        Ok(())
    } else {
        Err(CoreError::InvalidState(format!(
            "Cannot move slot from {from} to {to}"
        )))
    }
}

/// Validate the status a new slot is created with.
pub fn validate_initial_status(status: SlotStatus) -> Result<(), CoreError> {
    match status {
        SlotStatus::Busy | SlotStatus::Swappable => Ok(()),
        SlotStatus::SwapPending => Err(CoreError::Validation(
            "A slot cannot be created as SWAP_PENDING".into(),
        )),
    }
}

/// Refuse owner edits of a slot that is reserved by a pending swap request.
///
/// Title, time and status are all frozen until the request is answered.
pub fn ensure_owner_editable(status: SlotStatus) -> Result<(), CoreError> {
    if status == SlotStatus::SwapPending {
        return Err(CoreError::Conflict(
            "Slot has a pending swap request and cannot be changed".into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

/// Validate a slot title: non-blank and at most [`MAX_TITLE_LENGTH`] chars.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Title must not be empty".into()));
    }
    let len = title.chars().count();
    if len > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Title exceeds maximum length of {MAX_TITLE_LENGTH} characters (got {len})"
        )));
    }
    Ok(())
}

/// Validate that a slot ends strictly after it starts.
pub fn validate_time_range(start: Timestamp, end: Timestamp) -> Result<(), CoreError> {
    if end <= start {
        return Err(CoreError::Validation(
            "endTime must be after startTime".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    use super::*;

    const ALL: [SlotStatus; 3] = [
        SlotStatus::Busy,
        SlotStatus::Swappable,
        SlotStatus::SwapPending,
    ];

    #[test]
    fn status_strings_parse_back() {
        for status in ALL {
            assert_eq!(status.as_str().parse::<SlotStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_a_validation_error() {
        assert_matches!("PENDING".parse::<SlotStatus>(), Err(CoreError::Validation(_)));
        assert_matches!("busy".parse::<SlotStatus>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn status_serializes_in_screaming_snake_case() {
        let json = serde_json::to_string(&SlotStatus::SwapPending).unwrap();
        assert_eq!(json, "\"SWAP_PENDING\"");
    }

    #[test]
    fn default_status_is_busy() {
        assert_eq!(SlotStatus::default(), SlotStatus::Busy);
    }

    #[test]
    fn owner_can_toggle_busy_and_swappable() {
        assert!(validate_transition(SlotStatus::Busy, SlotStatus::Swappable, Actor::Owner).is_ok());
        assert!(validate_transition(SlotStatus::Swappable, SlotStatus::Busy, Actor::Owner).is_ok());
    }

    #[test]
    fn owner_same_status_is_noop() {
        assert!(validate_transition(SlotStatus::Busy, SlotStatus::Busy, Actor::Owner).is_ok());
    }

    #[test]
    fn owner_cannot_touch_pending_slot() {
        for to in ALL {
            assert_matches!(
                validate_transition(SlotStatus::SwapPending, to, Actor::Owner),
                Err(CoreError::Conflict(_))
            );
        }
    }

    #[test]
    fn owner_cannot_reserve_a_slot() {
        assert_matches!(
            validate_transition(SlotStatus::Swappable, SlotStatus::SwapPending, Actor::Owner),
            Err(CoreError::InvalidState(_))
        );
        assert_matches!(
            validate_transition(SlotStatus::Busy, SlotStatus::SwapPending, Actor::Owner),
            Err(CoreError::InvalidState(_))
        );
    }

    #[test]
    fn orchestrator_transitions() {
        let ok = [
            (SlotStatus::Swappable, SlotStatus::SwapPending),
            (SlotStatus::SwapPending, SlotStatus::Swappable),
            (SlotStatus::SwapPending, SlotStatus::Busy),
        ];
        for from in ALL {
            for to in ALL {
                let result = validate_transition(from, to, Actor::Orchestrator);
                if ok.contains(&(from, to)) {
                    assert!(result.is_ok(), "{from} -> {to} should be allowed");
                } else {
                    assert_matches!(result, Err(CoreError::InvalidState(_)), "{from} -> {to}");
                }
            }
        }
    }

    #[test]
    fn initial_status_excludes_pending() {
        assert!(validate_initial_status(SlotStatus::Busy).is_ok());
        assert!(validate_initial_status(SlotStatus::Swappable).is_ok());
        assert_matches!(
            validate_initial_status(SlotStatus::SwapPending),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn pending_slots_are_frozen_for_owners() {
        assert!(ensure_owner_editable(SlotStatus::Busy).is_ok());
        assert!(ensure_owner_editable(SlotStatus::Swappable).is_ok());
        assert_matches!(
            ensure_owner_editable(SlotStatus::SwapPending),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn blank_and_long_titles_rejected() {
        assert!(validate_title("Team Meeting").is_ok());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH)).is_ok());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH + 1)).is_err());
    }

    #[test]
    fn end_must_follow_start() {
        let start = Utc::now();
        assert!(validate_time_range(start, start + Duration::hours(1)).is_ok());
        assert!(validate_time_range(start, start).is_err());
        assert!(validate_time_range(start, start - Duration::minutes(5)).is_err());
    }
}
