//! Handlers for the `/slots` resource.
//!
//! Every route is scoped to the authenticated caller: a slot owned by
//! someone else is indistinguishable from a missing one.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use slotswap_core::error::CoreError;
use slotswap_core::slot::{
    ensure_owner_editable, validate_initial_status, validate_time_range, validate_title,
    validate_transition, Actor,
};
use slotswap_core::types::DbId;
use slotswap_db::models::slot::{CreateSlot, CreateSlotRequest, Slot, UpdateSlot};
use slotswap_db::repositories::SlotRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/slots
///
/// Status defaults to `BUSY`. Creating a slot directly as `SWAP_PENDING` is
/// rejected.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateSlotRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Slot>>)> {
    let title = input
        .title
        .ok_or_else(|| CoreError::Validation("title is required".into()))?;
    let start_time = input
        .start_time
        .ok_or_else(|| CoreError::Validation("startTime is required".into()))?;
    let end_time = input
        .end_time
        .ok_or_else(|| CoreError::Validation("endTime is required".into()))?;
    let status = input.status.unwrap_or_default();

    validate_title(&title)?;
    validate_time_range(start_time, end_time)?;
    validate_initial_status(status)?;

    let slot = SlotRepo::create(
        &state.pool,
        &CreateSlot {
            owner_id: auth.user_id,
            title: title.trim().to_string(),
            start_time,
            end_time,
            status,
        },
    )
    .await?;

    tracing::info!(
        user_id = auth.user_id,
        slot_id = slot.id,
        status = %status,
        "Slot created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: slot })))
}

/// GET /api/v1/slots
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Slot>>>> {
    let slots = SlotRepo::list_for_owner(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: slots }))
}

/// PUT /api/v1/slots/{id}
///
/// Applies the allow-listed fields of the body. A status change must be an
/// owner transition (`BUSY` <-> `SWAPPABLE`). A slot with a pending swap is
/// frozen: any non-empty patch is refused with 409 until the request is
/// answered.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(mut input): AppJson<UpdateSlot>,
) -> AppResult<Json<DataResponse<Slot>>> {
    let mut tx = state.pool.begin().await?;

    let current = SlotRepo::lock_for_owner(&mut *tx, auth.user_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Slot", id }))?;
    let current_status = current.status()?;

    if !input.is_empty() {
        if let Err(err) = ensure_owner_editable(current_status) {
            tracing::warn!(
                user_id = auth.user_id,
                slot_id = id,
                "Update refused: slot has a pending swap"
            );
            return Err(err.into());
        }
    }

    if let Some(to) = input.status {
        validate_transition(current_status, to, Actor::Owner)?;
        // Same-status requests are no-ops.
        if to == current_status {
            input.status = None;
        }
    }

    if let Some(title) = input.title.as_mut() {
        validate_title(title)?;
        *title = title.trim().to_string();
    }

    if input.start_time.is_some() || input.end_time.is_some() {
        validate_time_range(
            input.start_time.unwrap_or(current.start_time),
            input.end_time.unwrap_or(current.end_time),
        )?;
    }

    let slot = SlotRepo::update(&mut *tx, id, &input).await?;
    tx.commit().await?;

    tracing::info!(
        user_id = auth.user_id,
        slot_id = id,
        status = %slot.status,
        "Slot updated"
    );

    Ok(Json(DataResponse { data: slot }))
}

/// DELETE /api/v1/slots/{id}
///
/// Refused with 409 while the slot is reserved by a pending swap.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    let mut tx = state.pool.begin().await?;

    let current = SlotRepo::lock_for_owner(&mut *tx, auth.user_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Slot", id }))?;

    if let Err(err) = ensure_owner_editable(current.status()?) {
        tracing::warn!(
            user_id = auth.user_id,
            slot_id = id,
            "Delete refused: slot has a pending swap"
        );
        return Err(err.into());
    }

    if !SlotRepo::delete(&mut *tx, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Slot", id }));
    }
    tx.commit().await?;

    tracing::info!(user_id = auth.user_id, slot_id = id, "Slot deleted");

    Ok(StatusCode::NO_CONTENT)
}
