//! Repository for the `slots` table.

use sqlx::{PgConnection, PgPool};
use slotswap_core::slot::{SlotStatus, STATUS_SWAPPABLE, STATUS_SWAP_PENDING};
use slotswap_core::swap::SlotChange;
use slotswap_core::types::DbId;

use crate::models::slot::{CreateSlot, Slot, SwappableSlot, UpdateSlot};

/// Column list for slots queries.
const COLUMNS: &str = "id, owner_id, title, start_time, end_time, status, created_at, updated_at";

/// Same columns qualified with the `s` alias, for joins.
const QUALIFIED_COLUMNS: &str = "s.id, s.owner_id, s.title, s.start_time, s.end_time, \
    s.status, s.created_at, s.updated_at";

/// Provides data access for slots.
pub struct SlotRepo;

impl SlotRepo {
    /// Insert a new slot, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSlot) -> Result<Slot, sqlx::Error> {
        let query = format!(
            "INSERT INTO slots (owner_id, title, start_time, end_time, status)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Slot>(&query)
            .bind(input.owner_id)
            .bind(&input.title)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(input.status.as_str())
            .fetch_one(pool)
            .await
    }

    /// List a user's slots ordered by start time ascending.
    pub async fn list_for_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<Slot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM slots
             WHERE owner_id = $1
             ORDER BY start_time ASC, id ASC"
        );
        sqlx::query_as::<_, Slot>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Find a slot by id, regardless of owner.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Slot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM slots WHERE id = $1");
        sqlx::query_as::<_, Slot>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load a set of slots by id. Missing ids are simply absent from the result.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Slot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM slots WHERE id = ANY($1)");
        sqlx::query_as::<_, Slot>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Lock and return a slot owned by `owner_id`.
    ///
    /// Returns `None` both when the slot does not exist and when it belongs to
    /// someone else.
    pub async fn lock_for_owner(
        conn: &mut PgConnection,
        owner_id: DbId,
        id: DbId,
    ) -> Result<Option<Slot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM slots
             WHERE id = $1 AND owner_id = $2
             FOR UPDATE"
        );
        sqlx::query_as::<_, Slot>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(conn)
            .await
    }

    /// Lock and return every existing slot in `ids`.
    ///
    /// Rows are locked in ascending id order so two transactions locking
    /// overlapping sets cannot deadlock.
    pub async fn lock_many(
        conn: &mut PgConnection,
        ids: &[DbId],
    ) -> Result<Vec<Slot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM slots
             WHERE id = ANY($1)
             ORDER BY id ASC
             FOR UPDATE"
        );
        sqlx::query_as::<_, Slot>(&query)
            .bind(ids)
            .fetch_all(conn)
            .await
    }

    /// Apply an allow-listed patch to a slot. Absent fields keep their value.
    ///
    /// Callers must have validated any status change and hold the row lock.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateSlot,
    ) -> Result<Slot, sqlx::Error> {
        let query = format!(
            "UPDATE slots SET
                title = COALESCE($2, title),
                start_time = COALESCE($3, start_time),
                end_time = COALESCE($4, end_time),
                status = COALESCE($5, status),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Slot>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(input.status.map(SlotStatus::as_str))
            .fetch_one(conn)
            .await
    }

    /// Delete a slot. Returns `true` if a row was removed.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM slots WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move every slot in `ids` from `SWAPPABLE` to `SWAP_PENDING`.
    ///
    /// The status guard makes this a compare-and-swap: rows that are no
    /// longer swappable are skipped. Returns the number of rows reserved;
    /// callers compare it with `ids.len()`.
    pub async fn reserve(conn: &mut PgConnection, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE slots SET status = $2, updated_at = NOW()
             WHERE id = ANY($1) AND status = $3",
        )
        .bind(ids)
        .bind(STATUS_SWAP_PENDING)
        .bind(STATUS_SWAPPABLE)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Apply an orchestrator decision to a reserved slot.
    ///
    /// Only touches the row if it is still `SWAP_PENDING`. Returns `true` if
    /// the row was updated.
    pub async fn settle(conn: &mut PgConnection, change: &SlotChange) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE slots SET owner_id = $2, status = $3, updated_at = NOW()
             WHERE id = $1 AND status = $4",
        )
        .bind(change.slot_id)
        .bind(change.owner_id)
        .bind(change.status.as_str())
        .bind(STATUS_SWAP_PENDING)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// List swappable slots not owned by `excluded_owner_id`, joined with
    /// the owner's name and email, ordered by start time.
    pub async fn list_swappable_excluding(
        pool: &PgPool,
        excluded_owner_id: DbId,
    ) -> Result<Vec<SwappableSlot>, sqlx::Error> {
        let query = format!(
            "SELECT {QUALIFIED_COLUMNS}, u.name AS owner_name, u.email AS owner_email
             FROM slots s
             JOIN users u ON u.id = s.owner_id
             WHERE s.status = $1 AND s.owner_id <> $2
             ORDER BY s.start_time ASC, s.id ASC"
        );
        sqlx::query_as::<_, SwappableSlot>(&query)
            .bind(STATUS_SWAPPABLE)
            .bind(excluded_owner_id)
            .fetch_all(pool)
            .await
    }
}
