//! Repository for the `swap_requests` table.
//!
//! Requests are append-only: rows are inserted as `PENDING`, later moved to a
//! terminal status exactly once, and never deleted.

use std::collections::{BTreeSet, HashMap};

use sqlx::{PgConnection, PgPool};
use slotswap_core::swap::{SwapStatus, STATUS_PENDING};
use slotswap_core::types::DbId;

use crate::models::swap_request::{CreateSwapRequest, SwapRequest, SwapRequestDetail};
use crate::repositories::{SlotRepo, UserRepo};

/// Column list for swap_requests queries.
const COLUMNS: &str = "id, requester_id, responder_id, my_slot_id, their_slot_id, status, \
    resolved_at, created_at, updated_at";

/// Provides data access for swap requests.
pub struct SwapRequestRepo;

impl SwapRequestRepo {
    /// Insert a new `PENDING` request, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateSwapRequest,
    ) -> Result<SwapRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO swap_requests
                (requester_id, responder_id, my_slot_id, their_slot_id, status)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SwapRequest>(&query)
            .bind(input.requester_id)
            .bind(input.responder_id)
            .bind(input.my_slot_id)
            .bind(input.their_slot_id)
            .bind(STATUS_PENDING)
            .fetch_one(conn)
            .await
    }

    /// Find a request by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SwapRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM swap_requests WHERE id = $1");
        sqlx::query_as::<_, SwapRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock and return a request by id.
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<SwapRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM swap_requests WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, SwapRequest>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Move a `PENDING` request to `status`, stamping `resolved_at`.
    ///
    /// Returns `None` if the request is no longer pending.
    pub async fn resolve(
        conn: &mut PgConnection,
        id: DbId,
        status: SwapStatus,
    ) -> Result<Option<SwapRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE swap_requests
             SET status = $2, resolved_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND status = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SwapRequest>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(STATUS_PENDING)
            .fetch_optional(conn)
            .await
    }

    /// Requests addressed to `user_id`, newest first.
    pub async fn list_incoming(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<SwapRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM swap_requests
             WHERE responder_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, SwapRequest>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Requests made by `user_id`, newest first.
    pub async fn list_outgoing(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<SwapRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM swap_requests
             WHERE requester_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, SwapRequest>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Find a request by id with its parties and slots resolved.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<SwapRequestDetail>, sqlx::Error> {
        let Some(request) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        Ok(Self::with_details(pool, vec![request]).await?.pop())
    }

    /// Resolve the users and slots referenced by `requests`, preserving order.
    ///
    /// Uses one query for all users and one for all slots. Slots deleted
    /// since the request was made resolve to `None`.
    pub async fn with_details(
        pool: &PgPool,
        requests: Vec<SwapRequest>,
    ) -> Result<Vec<SwapRequestDetail>, sqlx::Error> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids: Vec<DbId> = requests
            .iter()
            .flat_map(|r| [r.requester_id, r.responder_id])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let slot_ids: Vec<DbId> = requests
            .iter()
            .flat_map(|r| [r.my_slot_id, r.their_slot_id])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let users: HashMap<_, _> = UserRepo::find_summaries(pool, &user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        let slots: HashMap<_, _> = SlotRepo::find_by_ids(pool, &slot_ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        Ok(requests
            .into_iter()
            .map(|request| SwapRequestDetail {
                requester: users.get(&request.requester_id).cloned(),
                responder: users.get(&request.responder_id).cloned(),
                my_slot: slots.get(&request.my_slot_id).cloned(),
                their_slot: slots.get(&request.their_slot_id).cloned(),
                request,
            })
            .collect())
    }
}
