//! Database repository for parking spots.
//!
//! Spots are a per-lot numbered collection whose status cycles between
//! available and occupied. All status transitions are compare-and-set
//! updates: the `WHERE status = <expected>` clause makes concurrent claims
//! on the same spot resolve to exactly one winner.

use crate::db::{
    errors::{DbError, Result},
    models::spots::{SpotDBResponse, SpotStatus},
};
use crate::types::{LotId, SpotId};
use sqlx::SqliteConnection;
use tracing::instrument;

pub struct Spots<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Spots<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Create spots numbered `from_number..=to_number`, all available.
    ///
    /// Callers must pass the next contiguous block after the lot's current
    /// maximum; the `UNIQUE (lot_id, spot_number)` constraint rejects overlaps.
    #[instrument(skip(self), err)]
    pub async fn add_block(&mut self, lot_id: LotId, from_number: i64, to_number: i64) -> Result<()> {
        for number in from_number..=to_number {
            sqlx::query("INSERT INTO parking_spots (lot_id, spot_number, status) VALUES (?, ?, ?)")
                .bind(lot_id)
                .bind(number)
                .bind(SpotStatus::Available)
                .execute(&mut *self.db)
                .await?;
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&mut self, id: SpotId) -> Result<Option<SpotDBResponse>> {
        let spot = sqlx::query_as::<_, SpotDBResponse>("SELECT * FROM parking_spots WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(spot)
    }

    /// All spots of a lot in spot-number order, for detail views.
    #[instrument(skip(self), err)]
    pub async fn list_for_lot(&mut self, lot_id: LotId) -> Result<Vec<SpotDBResponse>> {
        let spots = sqlx::query_as::<_, SpotDBResponse>("SELECT * FROM parking_spots WHERE lot_id = ? ORDER BY spot_number")
            .bind(lot_id)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(spots)
    }

    #[instrument(skip(self), err)]
    pub async fn count_by_status(&mut self, lot_id: LotId, status: SpotStatus) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM parking_spots WHERE lot_id = ? AND status = ?")
            .bind(lot_id)
            .bind(status)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }

    /// The lowest-numbered available spot in the lot, if any.
    ///
    /// Lowest-number-first keeps the booking order deterministic and
    /// reproducible in tests.
    #[instrument(skip(self), err)]
    pub async fn find_free(&mut self, lot_id: LotId) -> Result<Option<SpotDBResponse>> {
        let spot = sqlx::query_as::<_, SpotDBResponse>(
            "SELECT * FROM parking_spots WHERE lot_id = ? AND status = ? ORDER BY spot_number ASC LIMIT 1",
        )
        .bind(lot_id)
        .bind(SpotStatus::Available)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(spot)
    }

    /// Transition a spot to occupied. Returns false when the spot was not
    /// available, i.e. a concurrent booking won the race.
    #[instrument(skip(self), err)]
    pub async fn mark_occupied(&mut self, id: SpotId) -> Result<bool> {
        self.transition(id, SpotStatus::Available, SpotStatus::Occupied).await
    }

    /// Transition a spot back to available. Returns false when the spot was
    /// not occupied.
    #[instrument(skip(self), err)]
    pub async fn mark_available(&mut self, id: SpotId) -> Result<bool> {
        self.transition(id, SpotStatus::Occupied, SpotStatus::Available).await
    }

    async fn transition(&mut self, id: SpotId, from: SpotStatus, to: SpotStatus) -> Result<bool> {
        let result = sqlx::query("UPDATE parking_spots SET status = ? WHERE id = ? AND status = ?")
            .bind(to)
            .bind(id)
            .bind(from)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Shrink helper: remove available spots numbered above `keep`.
    ///
    /// The caller has already verified the new capacity covers the occupied
    /// count, but the check is repeated structurally here: if any spot above
    /// the cut survives the delete it must have been occupied, and the
    /// operation fails instead of removing it.
    #[instrument(skip(self), err)]
    pub async fn remove_above(&mut self, lot_id: LotId, keep: i64) -> Result<()> {
        sqlx::query("DELETE FROM parking_spots WHERE lot_id = ? AND spot_number > ? AND status = ?")
            .bind(lot_id)
            .bind(keep)
            .bind(SpotStatus::Available)
            .execute(&mut *self.db)
            .await?;

        let stragglers = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM parking_spots WHERE lot_id = ? AND spot_number > ?")
            .bind(lot_id)
            .bind(keep)
            .fetch_one(&mut *self.db)
            .await?;

        if stragglers > 0 {
            return Err(DbError::Capacity {
                reason: "cannot shrink a lot past an occupied spot".to_string(),
            });
        }

        Ok(())
    }

    /// Remove every spot of a lot (lot deletion path).
    #[instrument(skip(self), err)]
    pub async fn remove_all(&mut self, lot_id: LotId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM parking_spots WHERE lot_id = ?")
            .bind(lot_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected())
    }
}
