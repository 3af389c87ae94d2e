//! OpenAPI documentation configuration.
//!
//! The generated document is served at `/api-docs/openapi.json`, with a
//! Scalar UI mounted at `/docs`.

use utoipa::OpenApi;

use crate::api::models::{
    analytics::{OccupancyEntry, RevenueResponse},
    auth::{AuthResponse, AuthSuccessResponse, LoginRequest, RegisterRequest},
    lots::{LotCreate, LotResponse, LotUpdate, SpotResponse},
    reservations::{LotUsageEntry, ReservationResponse},
    users::UserResponse,
};
use crate::db::models::spots::SpotStatus;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "parkctl API",
        description = "Parking facility control layer: lot administration, spot allocation, and reservation billing."
    ),
    paths(
        crate::api::handlers::auth::register,
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::logout,
        crate::api::handlers::lots::list_lots,
        crate::api::handlers::lots::create_lot,
        crate::api::handlers::lots::get_lot,
        crate::api::handlers::lots::list_lot_spots,
        crate::api::handlers::lots::update_lot,
        crate::api::handlers::lots::delete_lot,
        crate::api::handlers::reservations::book_spot,
        crate::api::handlers::reservations::release_spot,
        crate::api::handlers::reservations::list_history,
        crate::api::handlers::reservations::get_active,
        crate::api::handlers::reservations::usage_counts,
        crate::api::handlers::analytics::occupancy_summary,
        crate::api::handlers::analytics::total_revenue,
        crate::api::handlers::users::list_users,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        AuthResponse,
        AuthSuccessResponse,
        UserResponse,
        LotCreate,
        LotUpdate,
        LotResponse,
        SpotResponse,
        SpotStatus,
        ReservationResponse,
        LotUsageEntry,
        OccupancyEntry,
        RevenueResponse,
    )),
    tags(
        (name = "authentication", description = "Login, registration, and logout"),
        (name = "lots", description = "Lot catalog administration"),
        (name = "reservations", description = "Booking lifecycle and history"),
        (name = "analytics", description = "Occupancy and revenue dashboards"),
        (name = "users", description = "Account administration"),
    )
)]
pub struct ApiDoc;
