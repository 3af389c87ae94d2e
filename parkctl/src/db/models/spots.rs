//! Database models for parking spots.

use crate::types::{LotId, SpotId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Availability state of a single spot.
///
/// Stored as TEXT; a spot's status is a cached projection of whether an open
/// reservation references it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SpotStatus {
    Available,
    Occupied,
}

/// Database response for a spot
#[derive(Debug, Clone, FromRow)]
pub struct SpotDBResponse {
    pub id: SpotId,
    pub lot_id: LotId,
    pub spot_number: i64,
    pub status: SpotStatus,
}
