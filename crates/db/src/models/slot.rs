//! Slot entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use slotswap_core::error::CoreError;
use slotswap_core::slot::SlotStatus;
use slotswap_core::swap::SlotState;
use slotswap_core::types::{DbId, Timestamp};

/// A row from the `slots` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Slot {
    /// Parse the stored status column.
    pub fn status(&self) -> Result<SlotStatus, CoreError> {
        self.status.parse().map_err(|_| {
            CoreError::Internal(format!(
                "Slot {} has unknown status '{}'",
                self.id, self.status
            ))
        })
    }

    /// Snapshot of the fields the swap rules read.
    pub fn state(&self) -> Result<SlotState, CoreError> {
        Ok(SlotState {
            id: self.id,
            owner_id: self.owner_id,
            status: self.status()?,
        })
    }
}

/// A swappable slot joined with its owner's display fields.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwappableSlot {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub slot: Slot,
    pub owner_name: String,
    pub owner_email: String,
}

/// Request body for `POST /slots`.
///
/// Required fields are optional here so a missing field surfaces as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlotRequest {
    pub title: Option<String>,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub status: Option<SlotStatus>,
}

/// Validated DTO for inserting a slot.
#[derive(Debug, Clone)]
pub struct CreateSlot {
    pub owner_id: DbId,
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub status: SlotStatus,
}

/// Request body for `PUT /slots/{id}`, and the patch applied by the repository.
///
/// These are the only caller-settable fields. Ownership never changes through
/// this DTO and `status` is checked against the state machine before use.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSlot {
    pub title: Option<String>,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub status: Option<SlotStatus>,
}

impl UpdateSlot {
    /// True when the patch names no field at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.status.is_none()
    }
}
