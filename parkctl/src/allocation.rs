//! Spot allocation and release orchestration.
//!
//! These are the only two write paths that cross the lot catalog, the spot
//! registry, and the reservation ledger at once. Each runs inside a single
//! transaction: either every step commits (spot status, ledger row) or none
//! do, so a spot is never occupied without an open reservation and vice
//! versa.
//!
//! Callers supply the wall-clock instant, which keeps booking and release
//! deterministic under test.

use crate::db::{
    handlers::{reservations::stay_cost, Lots, Repository, Reservations, Spots},
    models::reservations::{ReservationDBResponse, ReservationOpenDBRequest},
};
use crate::errors::{Error, Result};
use crate::types::{LotId, ReservationId, UserId};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{info, instrument};

/// A freshly booked reservation together with where it landed.
#[derive(Debug, Clone)]
pub struct BookedSpot {
    pub reservation: ReservationDBResponse,
    pub lot_name: String,
    pub spot_number: i64,
}

/// Book the lowest-numbered free spot of a lot for a user.
///
/// Refused when the user already has an open reservation anywhere
/// ([`Error::Conflict`]), the lot does not exist ([`Error::NotFound`]), or
/// the lot has no free spot ([`Error::Capacity`]). The spot claim is a
/// compare-and-set, so two concurrent bookings cannot both take the same
/// spot; the loser retries against the next free spot's absence as a
/// conflict.
#[instrument(skip(db), err)]
pub async fn book(db: &SqlitePool, user_id: UserId, lot_id: LotId, now: DateTime<Utc>) -> Result<BookedSpot> {
    let mut tx = db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let lot = Lots::new(&mut tx)
        .get_by_id(lot_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "parking lot".to_string(),
            id: lot_id.to_string(),
        })?;

    // One active reservation per user, checked before any spot is touched.
    if Reservations::new(&mut tx).active_for_user(user_id).await?.is_some() {
        return Err(Error::Conflict {
            message: "you already have an active reservation".to_string(),
        });
    }

    let spot = Spots::new(&mut tx).find_free(lot_id).await?.ok_or_else(|| Error::Capacity {
        message: format!("no available spots in {}", lot.name),
    })?;

    if !Spots::new(&mut tx).mark_occupied(spot.id).await? {
        // The spot was claimed between the read and the write.
        return Err(Error::Conflict {
            message: format!("spot #{} in {} was just taken", spot.spot_number, lot.name),
        });
    }

    let reservation = Reservations::new(&mut tx)
        .open(&ReservationOpenDBRequest {
            user_id,
            spot_id: spot.id,
            parking_time: now,
        })
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    info!(user_id, lot_id, spot_number = spot.spot_number, "booked spot");

    Ok(BookedSpot {
        reservation,
        lot_name: lot.name,
        spot_number: spot.spot_number,
    })
}

/// Close a reservation and free its spot.
///
/// Only the reservation's owner may release it ([`Error::Forbidden`]); a
/// closed reservation stays closed ([`Error::InvalidState`]); a release
/// instant before the parking time is rejected ([`Error::Validation`])
/// rather than producing a negative cost. The cost uses the owning lot's
/// price at release time.
#[instrument(skip(db), err)]
pub async fn release(db: &SqlitePool, user_id: UserId, reservation_id: ReservationId, now: DateTime<Utc>) -> Result<ReservationDBResponse> {
    let mut tx = db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let reservation = Reservations::new(&mut tx)
        .get_by_id(reservation_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "reservation".to_string(),
            id: reservation_id.to_string(),
        })?;

    if reservation.user_id != user_id {
        return Err(Error::Forbidden {
            message: "this reservation belongs to another user".to_string(),
        });
    }

    if !reservation.is_open() {
        return Err(Error::InvalidState {
            message: "reservation is already closed".to_string(),
        });
    }

    if now < reservation.parking_time {
        return Err(Error::Validation {
            message: "leaving time precedes parking time".to_string(),
        });
    }

    // Price at release time comes from the lot that owns the spot. An open
    // reservation pins its lot in place (occupied spots block lot deletion),
    // so a missing spot or lot here means the store is inconsistent.
    let spot = Spots::new(&mut tx)
        .get_by_id(reservation.spot_id)
        .await?
        .ok_or_else(|| Error::Internal {
            operation: format!("resolve spot for open reservation {reservation_id}"),
        })?;
    let lot = Lots::new(&mut tx)
        .get_by_id(spot.lot_id)
        .await?
        .ok_or_else(|| Error::Internal {
            operation: format!("resolve lot for open reservation {reservation_id}"),
        })?;

    let cost = stay_cost(reservation.parking_time, now, lot.price);

    let closed = Reservations::new(&mut tx)
        .close(reservation_id, now, cost)
        .await?
        .ok_or_else(|| Error::InvalidState {
            // Lost a close race after the read above.
            message: "reservation is already closed".to_string(),
        })?;

    if !Spots::new(&mut tx).mark_available(spot.id).await? {
        // An open reservation implies an occupied spot; anything else is a
        // broken invariant, not a user error.
        return Err(Error::Internal {
            operation: format!("free spot {} for reservation {reservation_id}", spot.id),
        });
    }

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    info!(user_id, reservation_id, cost, "released spot");

    Ok(closed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::Spots;
    use crate::db::models::spots::SpotStatus;
    use crate::test_utils::{create_test_lot, create_test_user};
    use chrono::Duration;
    use sqlx::SqlitePool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_book_assigns_lowest_numbered_spot(pool: SqlitePool) {
        let lot = create_test_lot(&pool, "Depot", 5.0, 2).await;
        let user = create_test_user(&pool, "alice", false).await;

        let booked = book(&pool, user.id, lot.id, Utc::now()).await.unwrap();
        assert_eq!(booked.spot_number, 1);
        assert_eq!(booked.lot_name, "Depot");
        assert!(booked.reservation.is_open());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_book_twice_without_release_conflicts(pool: SqlitePool) {
        let lot = create_test_lot(&pool, "Depot", 5.0, 2).await;
        let user = create_test_user(&pool, "alice", false).await;

        book(&pool, user.id, lot.id, Utc::now()).await.unwrap();
        let err = book(&pool, user.id, lot.id, Utc::now()).await.unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));

        // The refused booking left the lot untouched: one spot still free.
        let mut conn = pool.acquire().await.unwrap();
        let available = Spots::new(&mut conn).count_by_status(lot.id, SpotStatus::Available).await.unwrap();
        assert_eq!(available, 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_book_full_lot_is_capacity_error(pool: SqlitePool) {
        let lot = create_test_lot(&pool, "Depot", 5.0, 1).await;
        let alice = create_test_user(&pool, "alice", false).await;
        let bob = create_test_user(&pool, "bob", false).await;

        book(&pool, alice.id, lot.id, Utc::now()).await.unwrap();
        let err = book(&pool, bob.id, lot.id, Utc::now()).await.unwrap_err();
        assert!(matches!(err, Error::Capacity { .. }));

        // No half-applied state: still exactly one open reservation.
        let mut conn = pool.acquire().await.unwrap();
        let occupied = Spots::new(&mut conn).count_by_status(lot.id, SpotStatus::Occupied).await.unwrap();
        assert_eq!(occupied, 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_book_unknown_lot_is_not_found(pool: SqlitePool) {
        let user = create_test_user(&pool, "alice", false).await;
        let err = book(&pool, user.id, 999, Utc::now()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_release_computes_cost_and_frees_spot(pool: SqlitePool) {
        let lot = create_test_lot(&pool, "Depot", 10.0, 1).await;
        let user = create_test_user(&pool, "alice", false).await;

        let start = Utc::now();
        let booked = book(&pool, user.id, lot.id, start).await.unwrap();

        let closed = release(&pool, user.id, booked.reservation.id, start + Duration::hours(2)).await.unwrap();
        assert_eq!(closed.cost, Some(20.0));

        let mut conn = pool.acquire().await.unwrap();
        let available = Spots::new(&mut conn).count_by_status(lot.id, SpotStatus::Available).await.unwrap();
        assert_eq!(available, 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_release_uses_price_at_release_time(pool: SqlitePool) {
        let lot = create_test_lot(&pool, "Depot", 10.0, 1).await;
        let user = create_test_user(&pool, "alice", false).await;

        let start = Utc::now();
        let booked = book(&pool, user.id, lot.id, start).await.unwrap();

        // Price doubles while the car is parked.
        {
            use crate::db::handlers::{Lots, Repository};
            use crate::db::models::lots::LotUpdateDBRequest;
            let mut conn = pool.acquire().await.unwrap();
            Lots::new(&mut conn)
                .update(
                    lot.id,
                    &LotUpdateDBRequest {
                        name: None,
                        address: None,
                        pin_code: None,
                        price: Some(20.0),
                    },
                )
                .await
                .unwrap();
        }

        let closed = release(&pool, user.id, booked.reservation.id, start + Duration::minutes(90)).await.unwrap();
        assert_eq!(closed.cost, Some(30.0));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_release_twice_is_invalid_state(pool: SqlitePool) {
        let lot = create_test_lot(&pool, "Depot", 10.0, 1).await;
        let user = create_test_user(&pool, "alice", false).await;

        let start = Utc::now();
        let booked = book(&pool, user.id, lot.id, start).await.unwrap();
        let first = release(&pool, user.id, booked.reservation.id, start + Duration::hours(1)).await.unwrap();

        let err = release(&pool, user.id, booked.reservation.id, start + Duration::hours(5)).await.unwrap_err();
        assert!(matches!(err, Error::InvalidState { .. }));

        // First release's figures stand.
        let mut conn = pool.acquire().await.unwrap();
        let stored = Reservations::new(&mut conn).get_by_id(booked.reservation.id).await.unwrap().unwrap();
        assert_eq!(stored.cost, first.cost);
        assert_eq!(stored.leaving_time, first.leaving_time);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_release_other_users_reservation_is_forbidden(pool: SqlitePool) {
        let lot = create_test_lot(&pool, "Depot", 10.0, 1).await;
        let alice = create_test_user(&pool, "alice", false).await;
        let mallory = create_test_user(&pool, "mallory", false).await;

        let booked = book(&pool, alice.id, lot.id, Utc::now()).await.unwrap();
        let err = release(&pool, mallory.id, booked.reservation.id, Utc::now()).await.unwrap_err();
        assert!(matches!(err, Error::Forbidden { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_release_before_parking_time_is_rejected(pool: SqlitePool) {
        let lot = create_test_lot(&pool, "Depot", 10.0, 1).await;
        let user = create_test_user(&pool, "alice", false).await;

        let start = Utc::now();
        let booked = book(&pool, user.id, lot.id, start).await.unwrap();

        let err = release(&pool, user.id, booked.reservation.id, start - Duration::minutes(5)).await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        // Rejected release leaves the reservation open.
        let mut conn = pool.acquire().await.unwrap();
        let stored = Reservations::new(&mut conn).get_by_id(booked.reservation.id).await.unwrap().unwrap();
        assert!(stored.is_open());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_release_unknown_reservation_is_not_found(pool: SqlitePool) {
        let user = create_test_user(&pool, "alice", false).await;
        let err = release(&pool, user.id, 999, Utc::now()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    /// End-to-end allocation cycle: fill a two-spot lot, overflow, release,
    /// rebook the freed spot.
    #[sqlx::test]
    #[test_log::test]
    async fn test_full_lot_cycle(pool: SqlitePool) {
        let lot = create_test_lot(&pool, "Depot", 5.0, 2).await;
        let a = create_test_user(&pool, "a", false).await;
        let b = create_test_user(&pool, "b", false).await;
        let c = create_test_user(&pool, "c", false).await;

        let start = Utc::now();
        let first = book(&pool, a.id, lot.id, start).await.unwrap();
        assert_eq!(first.spot_number, 1);
        let second = book(&pool, b.id, lot.id, start).await.unwrap();
        assert_eq!(second.spot_number, 2);

        let err = book(&pool, c.id, lot.id, start).await.unwrap_err();
        assert!(matches!(err, Error::Capacity { .. }));

        release(&pool, a.id, first.reservation.id, start + Duration::hours(1)).await.unwrap();

        // C now gets the spot A freed, i.e. #1 again.
        let third = book(&pool, c.id, lot.id, start + Duration::hours(1)).await.unwrap();
        assert_eq!(third.spot_number, 1);
    }
}
