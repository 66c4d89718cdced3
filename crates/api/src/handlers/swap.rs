//! Handlers for the marketplace and swap request endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use slotswap_core::error::CoreError;
use slotswap_core::types::DbId;
use slotswap_db::models::slot::SwappableSlot;
use slotswap_db::models::swap_request::{
    MySwapRequests, SwapProposalRequest, SwapRequestDetail, SwapResolution, SwapResponseRequest,
};

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::swap::query;

/// GET /api/v1/swappable-slots
///
/// Every `SWAPPABLE` slot not owned by the caller, with owner name and email.
pub async fn swappable(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<SwappableSlot>>>> {
    let slots = query::swappable_slots(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: slots }))
}

/// POST /api/v1/swap-request
pub async fn create_request(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<SwapProposalRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<SwapRequestDetail>>)> {
    let (Some(my_slot_id), Some(their_slot_id)) = (input.my_slot_id, input.their_slot_id) else {
        return Err(
            CoreError::Validation("mySlotId and theirSlotId are required".into()).into(),
        );
    };

    let detail = state
        .swaps
        .create_request(auth.user_id, my_slot_id, their_slot_id)
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}

/// POST /api/v1/swap-response/{id}
pub async fn respond(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<SwapResponseRequest>,
) -> AppResult<Json<DataResponse<SwapResolution>>> {
    let accepted = input
        .accepted
        .ok_or_else(|| CoreError::Validation("accepted must be true or false".into()))?;

    let resolution = state.swaps.respond(auth.user_id, id, accepted).await?;
    Ok(Json(DataResponse { data: resolution }))
}

/// GET /api/v1/swap-requests/me
pub async fn my_requests(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<MySwapRequests>>> {
    let requests = query::my_swap_requests(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: requests }))
}
