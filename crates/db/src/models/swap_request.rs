//! Swap request entity model, display views and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use slotswap_core::error::CoreError;
use slotswap_core::swap::{SwapOutcome, SwapStatus};
use slotswap_core::types::{DbId, Timestamp};

use crate::models::slot::Slot;
use crate::models::user::UserSummary;

/// A row from the `swap_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub id: DbId,
    pub requester_id: DbId,
    pub responder_id: DbId,
    pub my_slot_id: DbId,
    pub their_slot_id: DbId,
    pub status: String,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SwapRequest {
    /// Parse the stored status column.
    pub fn status(&self) -> Result<SwapStatus, CoreError> {
        self.status.parse().map_err(|_| {
            CoreError::Internal(format!(
                "Swap request {} has unknown status '{}'",
                self.id, self.status
            ))
        })
    }
}

/// A swap request with its parties and slots resolved for display.
///
/// Slots are `None` when they have been deleted since the request was made.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequestDetail {
    #[serde(flatten)]
    pub request: SwapRequest,
    pub requester: Option<UserSummary>,
    pub responder: Option<UserSummary>,
    pub my_slot: Option<Slot>,
    pub their_slot: Option<Slot>,
}

/// DTO for inserting a new pending swap request.
#[derive(Debug, Clone)]
pub struct CreateSwapRequest {
    pub requester_id: DbId,
    pub responder_id: DbId,
    pub my_slot_id: DbId,
    pub their_slot_id: DbId,
}

/// Request body for `POST /swap-request`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapProposalRequest {
    pub my_slot_id: Option<DbId>,
    pub their_slot_id: Option<DbId>,
}

/// Request body for `POST /swap-response/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SwapResponseRequest {
    pub accepted: Option<bool>,
}

/// Result of responding to a swap request.
#[derive(Debug, Clone, Serialize)]
pub struct SwapResolution {
    pub outcome: SwapOutcome,
    pub request: SwapRequestDetail,
}

/// The caller's swap requests, split by direction.
#[derive(Debug, Clone, Serialize)]
pub struct MySwapRequests {
    /// Requests addressed to the caller.
    pub incoming: Vec<SwapRequestDetail>,
    /// Requests the caller made.
    pub outgoing: Vec<SwapRequestDetail>,
}
