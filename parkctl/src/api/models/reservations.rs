//! API request/response models for reservations.

use crate::allocation::BookedSpot;
use crate::db::models::reservations::{LotUsageDBRow, ReservationDBResponse, ReservationHistoryDBRow};
use crate::types::{ReservationId, SpotId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Reservation response model.
///
/// `lot_name` and `spot_number` are omitted when the lot has since been
/// deleted (the ledger outlives the catalog).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationResponse {
    pub id: ReservationId,
    pub user_id: UserId,
    pub spot_id: SpotId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spot_number: Option<i64>,
    pub parking_time: DateTime<Utc>,
    pub leaving_time: Option<DateTime<Utc>>,
    pub cost: Option<f64>,
}

impl From<ReservationDBResponse> for ReservationResponse {
    fn from(db: ReservationDBResponse) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            spot_id: db.spot_id,
            lot_name: None,
            spot_number: None,
            parking_time: db.parking_time,
            leaving_time: db.leaving_time,
            cost: db.cost,
        }
    }
}

impl From<ReservationHistoryDBRow> for ReservationResponse {
    fn from(db: ReservationHistoryDBRow) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            spot_id: db.spot_id,
            lot_name: db.lot_name,
            spot_number: db.spot_number,
            parking_time: db.parking_time,
            leaving_time: db.leaving_time,
            cost: db.cost,
        }
    }
}

impl From<BookedSpot> for ReservationResponse {
    fn from(booked: BookedSpot) -> Self {
        let mut response = Self::from(booked.reservation);
        response.lot_name = Some(booked.lot_name);
        response.spot_number = Some(booked.spot_number);
        response
    }
}

/// Visits-per-lot entry for the current user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LotUsageEntry {
    pub lot_name: String,
    pub visits: i64,
}

impl From<LotUsageDBRow> for LotUsageEntry {
    fn from(db: LotUsageDBRow) -> Self {
        Self {
            lot_name: db.lot_name,
            visits: db.visits,
        }
    }
}
