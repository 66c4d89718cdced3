//! Swap transaction coordinator.
//!
//! Every operation runs in exactly one database transaction. Rows are locked
//! before they are read for a decision, every precondition is checked before
//! the first write, and the transaction handle rolls back when dropped, so an
//! early `?` return never leaves a partial swap behind.

use slotswap_core::error::CoreError;
use slotswap_core::swap::{
    resolve, resolve_slot_removed, validate_proposal, validate_responder, Resolution,
};
use slotswap_core::types::DbId;
use slotswap_db::models::slot::Slot;
use slotswap_db::models::swap_request::{
    CreateSwapRequest, SwapRequestDetail, SwapResolution,
};
use slotswap_db::repositories::{SlotRepo, SwapRequestRepo};
use slotswap_db::DbPool;
use sqlx::PgConnection;

use crate::error::{AppError, AppResult};

/// Creates and settles swap requests.
///
/// Held in [`AppState`](crate::state::AppState) as an `Arc<SwapOrchestrator>`.
pub struct SwapOrchestrator {
    pool: DbPool,
}

impl SwapOrchestrator {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Propose exchanging `my_slot_id` (owned by the requester) for
    /// `their_slot_id`.
    ///
    /// On success both slots are `SWAP_PENDING` and a `PENDING` request
    /// addressed to the other slot's owner exists. On failure nothing changed.
    pub async fn create_request(
        &self,
        requester_id: DbId,
        my_slot_id: DbId,
        their_slot_id: DbId,
    ) -> AppResult<SwapRequestDetail> {
        let mut tx = self.pool.begin().await?;

        // 1. Lock both slots.
        let slots = SlotRepo::lock_many(&mut *tx, &[my_slot_id, their_slot_id]).await?;
        let my_slot = find_locked(&slots, my_slot_id)?;
        let their_slot = find_locked(&slots, their_slot_id)?;

        // 2. Ownership, self-swap and status checks.
        validate_proposal(requester_id, &my_slot.state()?, &their_slot.state()?)?;

        // 3. Reserve both slots. Under the row locks this always hits two
        //    rows; the status guard keeps it safe without them.
        let reserved = SlotRepo::reserve(&mut *tx, &[my_slot_id, their_slot_id]).await?;
        if reserved != 2 {
            tracing::warn!(
                requester_id,
                my_slot_id,
                their_slot_id,
                reserved,
                "Slot reservation lost a race"
            );
            return Err(CoreError::Conflict("Both slots must be SWAPPABLE".into()).into());
        }

        // 4. Record the request.
        let request = SwapRequestRepo::create(
            &mut *tx,
            &CreateSwapRequest {
                requester_id,
                responder_id: their_slot.owner_id,
                my_slot_id,
                their_slot_id,
            },
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            swap_request_id = request.id,
            requester_id,
            responder_id = request.responder_id,
            my_slot_id,
            their_slot_id,
            "Swap request created"
        );

        load_detail(&self.pool, request.id).await
    }

    /// Accept or reject a pending request addressed to `responder_id`.
    ///
    /// Acceptance exchanges the owners of both slots and marks them `BUSY`;
    /// rejection returns both to `SWAPPABLE`. If a slot has disappeared the
    /// request is closed as rejected whatever the answer.
    pub async fn respond(
        &self,
        responder_id: DbId,
        request_id: DbId,
        accepted: bool,
    ) -> AppResult<SwapResolution> {
        let mut tx = self.pool.begin().await?;

        // 1. Lock the request; a concurrent response waits here.
        let request = SwapRequestRepo::lock_by_id(&mut *tx, request_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "SwapRequest",
                id: request_id,
            })?;

        // 2. Responder and status checks.
        validate_responder(responder_id, request.responder_id, request.status()?)?;

        // 3. Re-read both slots under lock.
        let slots =
            SlotRepo::lock_many(&mut *tx, &[request.my_slot_id, request.their_slot_id]).await?;
        let my_slot = slots.iter().find(|s| s.id == request.my_slot_id);
        let their_slot = slots.iter().find(|s| s.id == request.their_slot_id);

        // 4. Decide.
        let resolution = match (my_slot, their_slot) {
            (Some(mine), Some(theirs)) => resolve(accepted, &mine.state()?, &theirs.state()?)?,
            (survivor, None) | (None, survivor) => {
                let survivor = survivor.map(Slot::state).transpose()?;
                tracing::warn!(
                    swap_request_id = request_id,
                    "Swap request references a removed slot, closing it"
                );
                resolve_slot_removed(survivor.as_ref())
            }
        };

        // 5. Apply.
        apply_resolution(&mut *tx, request_id, &resolution).await?;
        tx.commit().await?;

        tracing::info!(
            swap_request_id = request_id,
            responder_id,
            outcome = ?resolution.outcome,
            "Swap request resolved"
        );

        Ok(SwapResolution {
            outcome: resolution.outcome,
            request: load_detail(&self.pool, request_id).await?,
        })
    }
}

/// Pick a locked slot out of `slots`, or fail with `NotFound`.
fn find_locked(slots: &[Slot], id: DbId) -> Result<&Slot, CoreError> {
    slots
        .iter()
        .find(|s| s.id == id)
        .ok_or(CoreError::NotFound { entity: "Slot", id })
}

/// Write a resolution: slot changes first, then the request status.
async fn apply_resolution(
    conn: &mut PgConnection,
    request_id: DbId,
    resolution: &Resolution,
) -> AppResult<()> {
    for change in &resolution.slot_changes {
        if !SlotRepo::settle(conn, change).await? {
            return Err(CoreError::Conflict(format!(
                "Slot {} is no longer pending",
                change.slot_id
            ))
            .into());
        }
    }

    SwapRequestRepo::resolve(conn, request_id, resolution.request_status)
        .await?
        .ok_or_else(|| CoreError::Conflict("Swap request already resolved".into()))?;

    Ok(())
}

async fn load_detail(pool: &DbPool, request_id: DbId) -> AppResult<SwapRequestDetail> {
    SwapRequestRepo::find_detail(pool, request_id)
        .await?
        .ok_or_else(|| {
            AppError::InternalError(format!("Swap request {request_id} vanished after commit"))
        })
}
