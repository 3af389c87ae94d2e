use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;

use crate::{
    AppState,
    allocation,
    api::models::{
        reservations::{LotUsageEntry, ReservationResponse},
        users::CurrentUser,
    },
    db::handlers::Reservations,
    errors::Error,
    types::{LotId, ReservationId},
};

/// Book a spot in a lot for the current user
#[utoipa::path(
    post,
    path = "/api/v1/lots/{id}/reservations",
    params(("id" = i64, Path, description = "Lot ID")),
    tag = "reservations",
    responses(
        (status = 201, description = "Spot booked", body = ReservationResponse),
        (status = 404, description = "Unknown lot"),
        (status = 409, description = "Active reservation exists, or the lot is full"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = user.id, lot_id = lot_id))]
pub async fn book_spot(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(lot_id): Path<LotId>,
) -> Result<(StatusCode, Json<ReservationResponse>), Error> {
    let booked = allocation::book(&state.db, user.id, lot_id, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(booked.into())))
}

/// Release a reservation, computing its cost
#[utoipa::path(
    post,
    path = "/api/v1/reservations/{id}/release",
    params(("id" = i64, Path, description = "Reservation ID")),
    tag = "reservations",
    responses(
        (status = 200, description = "Reservation closed", body = ReservationResponse),
        (status = 403, description = "Reservation belongs to another user"),
        (status = 404, description = "Unknown reservation"),
        (status = 409, description = "Reservation already closed"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = user.id, reservation_id = reservation_id))]
pub async fn release_spot(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(reservation_id): Path<ReservationId>,
) -> Result<Json<ReservationResponse>, Error> {
    let closed = allocation::release(&state.db, user.id, reservation_id, Utc::now()).await?;
    Ok(Json(closed.into()))
}

/// The current user's booking history, newest first
#[utoipa::path(
    get,
    path = "/api/v1/reservations",
    tag = "reservations",
    responses(
        (status = 200, description = "Booking history", body = [ReservationResponse]),
        (status = 401, description = "Not authenticated"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = user.id))]
pub async fn list_history(State(state): State<AppState>, user: CurrentUser) -> Result<Json<Vec<ReservationResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let history = Reservations::new(&mut conn).history_for_user(user.id).await?;

    Ok(Json(history.into_iter().map(ReservationResponse::from).collect()))
}

/// The current user's open reservation, if any
#[utoipa::path(
    get,
    path = "/api/v1/reservations/active",
    tag = "reservations",
    responses(
        (status = 200, description = "Open reservation, or null when none", body = ReservationResponse),
        (status = 401, description = "Not authenticated"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = user.id))]
pub async fn get_active(State(state): State<AppState>, user: CurrentUser) -> Result<Json<Option<ReservationResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let active = Reservations::new(&mut conn).active_for_user(user.id).await?;

    Ok(Json(active.map(ReservationResponse::from)))
}

/// The current user's visit counts per lot
#[utoipa::path(
    get,
    path = "/api/v1/reservations/usage",
    tag = "reservations",
    responses(
        (status = 200, description = "Visits per lot", body = [LotUsageEntry]),
        (status = 401, description = "Not authenticated"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = user.id))]
pub async fn usage_counts(State(state): State<AppState>, user: CurrentUser) -> Result<Json<Vec<LotUsageEntry>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let usage = Reservations::new(&mut conn).usage_counts_for_user(user.id).await?;

    Ok(Json(usage.into_iter().map(LotUsageEntry::from).collect()))
}
