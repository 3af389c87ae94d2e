//! Database models for parking lots.

use crate::types::LotId;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for creating a new lot
#[derive(Debug, Clone)]
pub struct LotCreateDBRequest {
    pub name: String,
    pub address: String,
    pub pin_code: String,
    pub price: f64,
    pub max_spots: i64,
}

/// Database request for updating a lot's metadata.
///
/// Capacity changes go through [`crate::db::handlers::Lots::resize`] instead,
/// because they create or remove spots.
#[derive(Debug, Clone)]
pub struct LotUpdateDBRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub pin_code: Option<String>,
    pub price: Option<f64>,
}

/// Database response for a lot
#[derive(Debug, Clone, FromRow)]
pub struct LotDBResponse {
    pub id: LotId,
    pub name: String,
    pub address: String,
    pub pin_code: String,
    pub price: f64,
    pub max_spots: i64,
    pub created_at: DateTime<Utc>,
}

/// Per-lot occupancy aggregate row
#[derive(Debug, Clone, FromRow)]
pub struct LotOccupancyDBRow {
    pub lot_id: LotId,
    pub name: String,
    pub occupied: i64,
    pub available: i64,
}
