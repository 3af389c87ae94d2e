//! Database repository for the parking lot catalog.
//!
//! A lot owns its spots: creating a lot populates spots `1..=max_spots`,
//! resizing adds or removes the tail of the numbering, and deletion walks and
//! removes the owned spots explicitly. Every one of those mutations runs in a
//! single transaction so the `max_spots == count(spots)` invariant holds at
//! every commit point.

use crate::db::{
    errors::{DbError, Result},
    handlers::{repository::Repository, spots::Spots},
    models::{
        lots::{LotCreateDBRequest, LotDBResponse, LotOccupancyDBRow, LotUpdateDBRequest},
        spots::SpotStatus,
    },
};
use crate::types::LotId;
use chrono::Utc;
use sqlx::{Connection, SqliteConnection};
use tracing::instrument;

/// Filter for listing lots
#[derive(Debug, Clone)]
pub struct LotFilter {
    pub skip: i64,
    pub limit: i64,
}

impl LotFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }
}

impl Default for LotFilter {
    fn default() -> Self {
        Self { skip: 0, limit: 100 }
    }
}

pub struct Lots<'c> {
    db: &'c mut SqliteConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Lots<'c> {
    type CreateRequest = LotCreateDBRequest;
    type UpdateRequest = LotUpdateDBRequest;
    type Response = LotDBResponse;
    type Id = LotId;
    type Filter = LotFilter;

    #[instrument(skip(self, request), fields(name = %request.name, max_spots = request.max_spots), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let mut tx = self.db.begin().await?;

        let lot = sqlx::query_as::<_, LotDBResponse>(
            r#"
            INSERT INTO parking_lots (name, address, pin_code, price, max_spots, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.address)
        .bind(&request.pin_code)
        .bind(request.price)
        .bind(request.max_spots)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        let mut spots = Spots::new(&mut tx);
        spots.add_block(lot.id, 1, request.max_spots).await?;

        tx.commit().await?;

        Ok(lot)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let lot = sqlx::query_as::<_, LotDBResponse>("SELECT * FROM parking_lots WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(lot)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let lots = sqlx::query_as::<_, LotDBResponse>("SELECT * FROM parking_lots ORDER BY name LIMIT ? OFFSET ?")
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(lots)
    }

    /// Remove a lot and all of its spots. Refused while any spot is occupied.
    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let mut tx = self.db.begin().await?;

        let occupied = Spots::new(&mut tx).count_by_status(id, SpotStatus::Occupied).await?;
        if occupied > 0 {
            return Err(DbError::Capacity {
                reason: format!("cannot delete a lot with {occupied} occupied spots"),
            });
        }

        Spots::new(&mut tx).remove_all(id).await?;
        let result = sqlx::query("DELETE FROM parking_lots WHERE id = ?").bind(id).execute(&mut *tx).await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Metadata update only; capacity changes go through [`Lots::resize`].
    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let lot = sqlx::query_as::<_, LotDBResponse>(
            r#"
            UPDATE parking_lots SET
                name = COALESCE(?, name),
                address = COALESCE(?, address),
                pin_code = COALESCE(?, pin_code),
                price = COALESCE(?, price)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.address)
        .bind(&request.pin_code)
        .bind(request.price)
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(lot)
    }
}

impl<'c> Lots<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Change a lot's capacity.
    ///
    /// Growing adds spots `old_max+1..=new_max`. Shrinking removes the
    /// highest-numbered available spots down to the new capacity, and is
    /// refused when the new capacity cannot hold the currently occupied
    /// spots.
    #[instrument(skip(self), err)]
    pub async fn resize(&mut self, id: LotId, new_max_spots: i64) -> Result<LotDBResponse> {
        let mut tx = self.db.begin().await?;

        let lot = sqlx::query_as::<_, LotDBResponse>("SELECT * FROM parking_lots WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(DbError::NotFound)?;

        let occupied = Spots::new(&mut tx).count_by_status(id, SpotStatus::Occupied).await?;
        if new_max_spots < occupied {
            return Err(DbError::Capacity {
                reason: format!("cannot reduce capacity to {new_max_spots}: {occupied} spots are occupied"),
            });
        }

        if new_max_spots > lot.max_spots {
            Spots::new(&mut tx).add_block(id, lot.max_spots + 1, new_max_spots).await?;
        } else if new_max_spots < lot.max_spots {
            Spots::new(&mut tx).remove_above(id, new_max_spots).await?;
        }

        let lot = sqlx::query_as::<_, LotDBResponse>("UPDATE parking_lots SET max_spots = ? WHERE id = ? RETURNING *")
            .bind(new_max_spots)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(lot)
    }

    /// Occupied/available counts per lot, for dashboards.
    #[instrument(skip(self), err)]
    pub async fn occupancy_summary(&mut self) -> Result<Vec<LotOccupancyDBRow>> {
        let rows = sqlx::query_as::<_, LotOccupancyDBRow>(
            r#"
            SELECT l.id AS lot_id,
                   l.name AS name,
                   COALESCE(SUM(CASE WHEN s.status = 'occupied' THEN 1 ELSE 0 END), 0) AS occupied,
                   COALESCE(SUM(CASE WHEN s.status = 'available' THEN 1 ELSE 0 END), 0) AS available
            FROM parking_lots l
            LEFT JOIN parking_spots s ON s.lot_id = l.id
            GROUP BY l.id, l.name
            ORDER BY l.name
            "#,
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows)
    }
}
