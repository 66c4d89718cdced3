//! Read-only views for the marketplace and the requests inbox.

use slotswap_core::types::DbId;
use slotswap_db::models::slot::SwappableSlot;
use slotswap_db::models::swap_request::MySwapRequests;
use slotswap_db::repositories::{SlotRepo, SwapRequestRepo};
use slotswap_db::DbPool;

use crate::error::AppResult;

/// Slots other users have marked `SWAPPABLE`, with owner display fields.
pub async fn swappable_slots(pool: &DbPool, caller_id: DbId) -> AppResult<Vec<SwappableSlot>> {
    Ok(SlotRepo::list_swappable_excluding(pool, caller_id).await?)
}

/// The caller's incoming and outgoing requests, newest first, resolved for
/// display.
pub async fn my_swap_requests(pool: &DbPool, caller_id: DbId) -> AppResult<MySwapRequests> {
    let incoming = SwapRequestRepo::list_incoming(pool, caller_id).await?;
    let outgoing = SwapRequestRepo::list_outgoing(pool, caller_id).await?;

    Ok(MySwapRequests {
        incoming: SwapRequestRepo::with_details(pool, incoming).await?,
        outgoing: SwapRequestRepo::with_details(pool, outgoing).await?,
    })
}
