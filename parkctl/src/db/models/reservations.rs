//! Database models for the reservation ledger.

use crate::types::{ReservationId, SpotId, UserId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for opening a reservation
#[derive(Debug, Clone)]
pub struct ReservationOpenDBRequest {
    pub user_id: UserId,
    pub spot_id: SpotId,
    pub parking_time: DateTime<Utc>,
}

/// Database response for a reservation ledger row
#[derive(Debug, Clone, FromRow)]
pub struct ReservationDBResponse {
    pub id: ReservationId,
    pub spot_id: SpotId,
    pub user_id: UserId,
    pub parking_time: DateTime<Utc>,
    pub leaving_time: Option<DateTime<Utc>>,
    pub cost: Option<f64>,
}

impl ReservationDBResponse {
    /// A reservation is open until its leaving time is recorded.
    pub fn is_open(&self) -> bool {
        self.leaving_time.is_none()
    }
}

/// Reservation joined with the lot/spot it occupied, for history views.
///
/// The lot columns are optional because the ledger outlives lot deletion.
#[derive(Debug, Clone, FromRow)]
pub struct ReservationHistoryDBRow {
    pub id: ReservationId,
    pub spot_id: SpotId,
    pub user_id: UserId,
    pub parking_time: DateTime<Utc>,
    pub leaving_time: Option<DateTime<Utc>>,
    pub cost: Option<f64>,
    pub lot_name: Option<String>,
    pub spot_number: Option<i64>,
}

/// Visits-per-lot aggregate row for a single user
#[derive(Debug, Clone, FromRow)]
pub struct LotUsageDBRow {
    pub lot_name: String,
    pub visits: i64,
}
