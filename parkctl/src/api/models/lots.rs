//! API request/response models for parking lots.

use crate::db::models::{
    lots::{LotCreateDBRequest, LotDBResponse, LotUpdateDBRequest},
    spots::{SpotDBResponse, SpotStatus},
};
use crate::types::{LotId, SpotId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request to create a lot
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LotCreate {
    pub name: String,
    pub address: String,
    pub pin_code: String,
    /// Hourly price, must be >= 0
    pub price: f64,
    /// Number of spots, must be > 0
    pub max_spots: i64,
}

impl From<LotCreate> for LotCreateDBRequest {
    fn from(api: LotCreate) -> Self {
        Self {
            name: api.name,
            address: api.address,
            pin_code: api.pin_code,
            price: api.price,
            max_spots: api.max_spots,
        }
    }
}

/// Request to update a lot. All fields optional; `max_spots` triggers a
/// resize with its capacity checks.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LotUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub pin_code: Option<String>,
    pub price: Option<f64>,
    pub max_spots: Option<i64>,
}

impl From<&LotUpdate> for LotUpdateDBRequest {
    fn from(api: &LotUpdate) -> Self {
        Self {
            name: api.name.clone(),
            address: api.address.clone(),
            pin_code: api.pin_code.clone(),
            price: api.price,
        }
    }
}

/// Lot response with availability counts
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LotResponse {
    pub id: LotId,
    pub name: String,
    pub address: String,
    pub pin_code: String,
    pub price: f64,
    pub max_spots: i64,
    pub occupied_spots: i64,
    pub available_spots: i64,
}

impl LotResponse {
    pub fn from_db(db: LotDBResponse, occupied_spots: i64, available_spots: i64) -> Self {
        Self {
            id: db.id,
            name: db.name,
            address: db.address,
            pin_code: db.pin_code,
            price: db.price,
            max_spots: db.max_spots,
            occupied_spots,
            available_spots,
        }
    }
}

/// One spot within a lot's spot listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SpotResponse {
    pub id: SpotId,
    pub spot_number: i64,
    pub status: SpotStatus,
}

impl From<SpotDBResponse> for SpotResponse {
    fn from(db: SpotDBResponse) -> Self {
        Self {
            id: db.id,
            spot_number: db.spot_number,
            status: db.status,
        }
    }
}
