//! Database repository for the reservation ledger.
//!
//! The ledger is append-only: a reservation is opened once, closed exactly
//! once (recording the leaving time and the computed cost in the same
//! update), and never deleted. The close is a guarded update on
//! `leaving_time IS NULL`, so concurrent double-release attempts have exactly
//! one winner.

use crate::db::{
    errors::Result,
    models::reservations::{LotUsageDBRow, ReservationDBResponse, ReservationHistoryDBRow, ReservationOpenDBRequest},
};
use crate::types::{ReservationId, UserId};
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::instrument;

/// Cost of a stay: hourly price times elapsed hours, rounded to cents.
///
/// Uses millisecond precision so fractional hours (90 minutes at 10.0/hr is
/// 15.00) come out exact.
pub fn stay_cost(parking_time: DateTime<Utc>, leaving_time: DateTime<Utc>, price_per_hour: f64) -> f64 {
    let elapsed_hours = (leaving_time - parking_time).num_milliseconds() as f64 / 3_600_000.0;
    (elapsed_hours * price_per_hour * 100.0).round() / 100.0
}

pub struct Reservations<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Reservations<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Open a reservation pairing a user with a spot.
    ///
    /// The partial unique indexes on open reservations reject a second open
    /// reservation for the same user or the same spot, whatever the caller
    /// checked beforehand.
    #[instrument(skip(self, request), fields(user_id = request.user_id, spot_id = request.spot_id), err)]
    pub async fn open(&mut self, request: &ReservationOpenDBRequest) -> Result<ReservationDBResponse> {
        let reservation = sqlx::query_as::<_, ReservationDBResponse>(
            r#"
            INSERT INTO reservations (spot_id, user_id, parking_time)
            VALUES (?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(request.spot_id)
        .bind(request.user_id)
        .bind(request.parking_time)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(reservation)
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&mut self, id: ReservationId) -> Result<Option<ReservationDBResponse>> {
        let reservation = sqlx::query_as::<_, ReservationDBResponse>("SELECT * FROM reservations WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(reservation)
    }

    /// Record the leaving time and cost on an open reservation.
    ///
    /// Returns `None` when the reservation was already closed (or never
    /// existed) - the `leaving_time IS NULL` guard makes the close
    /// first-writer-wins.
    #[instrument(skip(self), err)]
    pub async fn close(
        &mut self,
        id: ReservationId,
        leaving_time: DateTime<Utc>,
        cost: f64,
    ) -> Result<Option<ReservationDBResponse>> {
        let reservation = sqlx::query_as::<_, ReservationDBResponse>(
            r#"
            UPDATE reservations SET leaving_time = ?, cost = ?
            WHERE id = ? AND leaving_time IS NULL
            RETURNING *
            "#,
        )
        .bind(leaving_time)
        .bind(cost)
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(reservation)
    }

    /// The user's open reservation, if any. The partial unique index
    /// guarantees at most one.
    #[instrument(skip(self), err)]
    pub async fn active_for_user(&mut self, user_id: UserId) -> Result<Option<ReservationDBResponse>> {
        let reservation =
            sqlx::query_as::<_, ReservationDBResponse>("SELECT * FROM reservations WHERE user_id = ? AND leaving_time IS NULL")
                .bind(user_id)
                .fetch_optional(&mut *self.db)
                .await?;

        Ok(reservation)
    }

    /// The user's full booking history, newest first, joined with the lot and
    /// spot each reservation occupied. Lot columns are NULL for lots that
    /// have since been deleted.
    #[instrument(skip(self), err)]
    pub async fn history_for_user(&mut self, user_id: UserId) -> Result<Vec<ReservationHistoryDBRow>> {
        let rows = sqlx::query_as::<_, ReservationHistoryDBRow>(
            r#"
            SELECT r.id, r.spot_id, r.user_id, r.parking_time, r.leaving_time, r.cost,
                   pl.name AS lot_name, s.spot_number AS spot_number
            FROM reservations r
            LEFT JOIN parking_spots s ON s.id = r.spot_id
            LEFT JOIN parking_lots pl ON pl.id = s.lot_id
            WHERE r.user_id = ?
            ORDER BY r.parking_time DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows)
    }

    /// Visits per lot for one user. Reservations whose lot has been deleted
    /// are not counted.
    #[instrument(skip(self), err)]
    pub async fn usage_counts_for_user(&mut self, user_id: UserId) -> Result<Vec<LotUsageDBRow>> {
        let rows = sqlx::query_as::<_, LotUsageDBRow>(
            r#"
            SELECT pl.name AS lot_name, COUNT(*) AS visits
            FROM reservations r
            JOIN parking_spots s ON s.id = r.spot_id
            JOIN parking_lots pl ON pl.id = s.lot_id
            WHERE r.user_id = ?
            GROUP BY pl.name
            ORDER BY visits DESC, lot_name
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows)
    }

    /// Revenue across all closed reservations.
    #[instrument(skip(self), err)]
    pub async fn total_revenue(&mut self) -> Result<f64> {
        let total = sqlx::query_scalar::<_, f64>("SELECT COALESCE(SUM(cost), 0.0) FROM reservations")
            .fetch_one(&mut *self.db)
            .await?;

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::errors::DbError;
    use crate::db::handlers::Spots;
    use crate::test_utils::{create_test_lot, create_test_user};
    use chrono::Duration;
    use sqlx::SqlitePool;

    #[test]
    fn test_stay_cost_whole_hours() {
        let start = Utc::now();
        assert_eq!(stay_cost(start, start + Duration::hours(2), 10.0), 20.0);
    }

    #[test]
    fn test_stay_cost_fractional_hours_round_to_cents() {
        let start = Utc::now();
        assert_eq!(stay_cost(start, start + Duration::minutes(90), 10.0), 15.0);
        // 20 minutes at 5.0/hr = 1.666... -> 1.67
        assert_eq!(stay_cost(start, start + Duration::minutes(20), 5.0), 1.67);
    }

    #[test]
    fn test_stay_cost_zero_duration() {
        let start = Utc::now();
        assert_eq!(stay_cost(start, start, 10.0), 0.0);
    }

    async fn occupy_first_spot(pool: &SqlitePool, lot_id: i64) -> i64 {
        let mut conn = pool.acquire().await.unwrap();
        let spot = Spots::new(&mut conn).find_free(lot_id).await.unwrap().unwrap();
        assert!(Spots::new(&mut conn).mark_occupied(spot.id).await.unwrap());
        spot.id
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_open_then_close_records_cost(pool: SqlitePool) {
        let lot = create_test_lot(&pool, "Harbor", 10.0, 2).await;
        let user = create_test_user(&pool, "erin", false).await;
        let spot_id = occupy_first_spot(&pool, lot.id).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Reservations::new(&mut conn);

        let start = Utc::now();
        let opened = repo
            .open(&ReservationOpenDBRequest {
                user_id: user.id,
                spot_id,
                parking_time: start,
            })
            .await
            .unwrap();
        assert!(opened.is_open());
        assert_eq!(opened.cost, None);

        let end = start + Duration::hours(2);
        let closed = repo.close(opened.id, end, stay_cost(start, end, lot.price)).await.unwrap().unwrap();
        assert!(!closed.is_open());
        assert_eq!(closed.cost, Some(20.0));
        assert_eq!(closed.leaving_time, Some(end));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_close_is_first_writer_wins(pool: SqlitePool) {
        let lot = create_test_lot(&pool, "Harbor", 10.0, 1).await;
        let user = create_test_user(&pool, "frank", false).await;
        let spot_id = occupy_first_spot(&pool, lot.id).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Reservations::new(&mut conn);

        let start = Utc::now();
        let opened = repo
            .open(&ReservationOpenDBRequest {
                user_id: user.id,
                spot_id,
                parking_time: start,
            })
            .await
            .unwrap();

        let first = repo.close(opened.id, start + Duration::hours(1), 10.0).await.unwrap();
        assert!(first.is_some());

        // Second close finds no open row to update.
        let second = repo.close(opened.id, start + Duration::hours(3), 30.0).await.unwrap();
        assert!(second.is_none());

        // The first close's figures are untouched.
        let stored = repo.get_by_id(opened.id).await.unwrap().unwrap();
        assert_eq!(stored.cost, Some(10.0));
        assert_eq!(stored.leaving_time, Some(start + Duration::hours(1)));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_second_open_reservation_per_user_is_rejected(pool: SqlitePool) {
        let lot = create_test_lot(&pool, "Harbor", 10.0, 2).await;
        let user = create_test_user(&pool, "grace", false).await;

        let mut conn = pool.acquire().await.unwrap();
        let spots = Spots::new(&mut conn).list_for_lot(lot.id).await.unwrap();

        let mut repo = Reservations::new(&mut conn);
        repo.open(&ReservationOpenDBRequest {
            user_id: user.id,
            spot_id: spots[0].id,
            parking_time: Utc::now(),
        })
        .await
        .unwrap();

        let err = repo
            .open(&ReservationOpenDBRequest {
                user_id: user.id,
                spot_id: spots[1].id,
                parking_time: Utc::now(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_history_is_newest_first(pool: SqlitePool) {
        let lot = create_test_lot(&pool, "Harbor", 10.0, 1).await;
        let user = create_test_user(&pool, "heidi", false).await;

        let mut conn = pool.acquire().await.unwrap();
        let spot = Spots::new(&mut conn).find_free(lot.id).await.unwrap().unwrap();

        let mut repo = Reservations::new(&mut conn);
        let base = Utc::now();
        for i in 0..3 {
            let start = base + Duration::hours(i);
            let opened = repo
                .open(&ReservationOpenDBRequest {
                    user_id: user.id,
                    spot_id: spot.id,
                    parking_time: start,
                })
                .await
                .unwrap();
            repo.close(opened.id, start + Duration::minutes(30), 5.0).await.unwrap();
        }

        let history = repo.history_for_user(user.id).await.unwrap();
        assert_eq!(history.len(), 3);
        assert!(history.windows(2).all(|w| w[0].parking_time >= w[1].parking_time));
        assert_eq!(history[0].lot_name.as_deref(), Some("Harbor"));
        assert_eq!(history[0].spot_number, Some(1));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_usage_counts_and_revenue(pool: SqlitePool) {
        let harbor = create_test_lot(&pool, "Harbor", 10.0, 1).await;
        let mews = create_test_lot(&pool, "Mews", 4.0, 1).await;
        let user = create_test_user(&pool, "ivan", false).await;

        let mut conn = pool.acquire().await.unwrap();
        let harbor_spot = Spots::new(&mut conn).find_free(harbor.id).await.unwrap().unwrap();
        let mews_spot = Spots::new(&mut conn).find_free(mews.id).await.unwrap().unwrap();

        let mut repo = Reservations::new(&mut conn);
        let base = Utc::now();
        for (i, spot_id) in [harbor_spot.id, harbor_spot.id, mews_spot.id].into_iter().enumerate() {
            let start = base + Duration::hours(i as i64);
            let opened = repo
                .open(&ReservationOpenDBRequest {
                    user_id: user.id,
                    spot_id,
                    parking_time: start,
                })
                .await
                .unwrap();
            repo.close(opened.id, start + Duration::hours(1), 2.5).await.unwrap();
        }

        let usage = repo.usage_counts_for_user(user.id).await.unwrap();
        assert_eq!(usage.len(), 2);
        assert_eq!(usage[0].lot_name, "Harbor");
        assert_eq!(usage[0].visits, 2);
        assert_eq!(usage[1].lot_name, "Mews");
        assert_eq!(usage[1].visits, 1);

        assert_eq!(repo.total_revenue().await.unwrap(), 7.5);
    }
}
