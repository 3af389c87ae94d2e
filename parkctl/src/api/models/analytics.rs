//! API models for the admin dashboards.

use crate::db::models::lots::LotOccupancyDBRow;
use crate::types::LotId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-lot occupancy entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OccupancyEntry {
    pub lot_id: LotId,
    pub lot_name: String,
    pub occupied_count: i64,
    pub available_count: i64,
}

impl From<LotOccupancyDBRow> for OccupancyEntry {
    fn from(db: LotOccupancyDBRow) -> Self {
        Self {
            lot_id: db.lot_id,
            lot_name: db.name,
            occupied_count: db.occupied,
            available_count: db.available,
        }
    }
}

/// Revenue total across all closed reservations
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RevenueResponse {
    pub total_revenue: f64,
}
