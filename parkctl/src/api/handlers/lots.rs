use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        lots::{LotCreate, LotResponse, LotUpdate, SpotResponse},
        pagination::Pagination,
        users::CurrentUser,
    },
    auth::require_admin,
    db::{
        handlers::{Lots, Repository, Spots, lots::LotFilter},
        models::lots::LotUpdateDBRequest,
    },
    errors::Error,
    types::LotId,
};

/// List all lots with their availability counts
#[utoipa::path(
    get,
    path = "/api/v1/lots",
    params(Pagination),
    tag = "lots",
    responses(
        (status = 200, description = "Lots with availability", body = [LotResponse]),
        (status = 401, description = "Not authenticated"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_lots(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<LotResponse>>, Error> {
    let (skip, limit) = pagination.params();
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let lots = Lots::new(&mut conn).list(&LotFilter::new(skip, limit)).await?;
    let counts: HashMap<_, _> = Lots::new(&mut conn)
        .occupancy_summary()
        .await?
        .into_iter()
        .map(|row| (row.lot_id, (row.occupied, row.available)))
        .collect();

    let response = lots
        .into_iter()
        .map(|lot| {
            let (occupied, available) = counts.get(&lot.id).copied().unwrap_or((0, 0));
            LotResponse::from_db(lot, occupied, available)
        })
        .collect();

    Ok(Json(response))
}

/// Create a new lot (admin only)
#[utoipa::path(
    post,
    path = "/api/v1/lots",
    request_body = LotCreate,
    tag = "lots",
    responses(
        (status = 201, description = "Lot created", body = LotResponse),
        (status = 400, description = "Invalid price or capacity"),
        (status = 403, description = "Not an administrator"),
    )
)]
#[tracing::instrument(skip_all, fields(name = %request.name))]
pub async fn create_lot(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<LotCreate>,
) -> Result<(StatusCode, Json<LotResponse>), Error> {
    require_admin(&user)?;

    if request.price < 0.0 {
        return Err(Error::Validation {
            message: "price must not be negative".to_string(),
        });
    }
    if request.max_spots <= 0 {
        return Err(Error::Validation {
            message: "a lot needs at least one spot".to_string(),
        });
    }
    if request.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "name must not be empty".to_string(),
        });
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let lot = Lots::new(&mut tx).create(&request.clone().into()).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let response = LotResponse::from_db(lot, 0, request.max_spots);
    Ok((StatusCode::CREATED, Json(response)))
}

/// Get a single lot with its availability counts
#[utoipa::path(
    get,
    path = "/api/v1/lots/{id}",
    params(("id" = i64, Path, description = "Lot ID")),
    tag = "lots",
    responses(
        (status = 200, description = "Lot", body = LotResponse),
        (status = 404, description = "Unknown lot"),
    )
)]
#[tracing::instrument(skip_all, fields(lot_id = id))]
pub async fn get_lot(State(state): State<AppState>, _user: CurrentUser, Path(id): Path<LotId>) -> Result<Json<LotResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let lot = Lots::new(&mut conn).get_by_id(id).await?.ok_or_else(|| lot_not_found(id))?;

    let occupied = Spots::new(&mut conn)
        .count_by_status(id, crate::db::models::spots::SpotStatus::Occupied)
        .await?;
    let available = Spots::new(&mut conn)
        .count_by_status(id, crate::db::models::spots::SpotStatus::Available)
        .await?;

    Ok(Json(LotResponse::from_db(lot, occupied, available)))
}

/// List a lot's spots in number order (admin detail view)
#[utoipa::path(
    get,
    path = "/api/v1/lots/{id}/spots",
    params(("id" = i64, Path, description = "Lot ID")),
    tag = "lots",
    responses(
        (status = 200, description = "Spots of the lot", body = [SpotResponse]),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Unknown lot"),
    )
)]
#[tracing::instrument(skip_all, fields(lot_id = id))]
pub async fn list_lot_spots(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<LotId>,
) -> Result<Json<Vec<SpotResponse>>, Error> {
    require_admin(&user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    Lots::new(&mut conn).get_by_id(id).await?.ok_or_else(|| lot_not_found(id))?;
    let spots = Spots::new(&mut conn).list_for_lot(id).await?;

    Ok(Json(spots.into_iter().map(SpotResponse::from).collect()))
}

/// Update a lot's metadata and optionally resize it (admin only)
#[utoipa::path(
    patch,
    path = "/api/v1/lots/{id}",
    params(("id" = i64, Path, description = "Lot ID")),
    request_body = LotUpdate,
    tag = "lots",
    responses(
        (status = 200, description = "Updated lot", body = LotResponse),
        (status = 400, description = "Invalid price or capacity"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Unknown lot"),
        (status = 409, description = "Capacity below occupied spot count"),
    )
)]
#[tracing::instrument(skip_all, fields(lot_id = id))]
pub async fn update_lot(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<LotId>,
    Json(request): Json<LotUpdate>,
) -> Result<Json<LotResponse>, Error> {
    require_admin(&user)?;

    if request.price.is_some_and(|p| p < 0.0) {
        return Err(Error::Validation {
            message: "price must not be negative".to_string(),
        });
    }
    if request.max_spots.is_some_and(|m| m <= 0) {
        return Err(Error::Validation {
            message: "a lot needs at least one spot".to_string(),
        });
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let mut lot = match Lots::new(&mut tx).update(id, &LotUpdateDBRequest::from(&request)).await {
        Ok(lot) => lot,
        Err(crate::db::errors::DbError::NotFound) => return Err(lot_not_found(id)),
        Err(e) => return Err(e.into()),
    };

    if let Some(new_max_spots) = request.max_spots {
        lot = Lots::new(&mut tx).resize(id, new_max_spots).await?;
    }

    let occupied = Spots::new(&mut tx)
        .count_by_status(id, crate::db::models::spots::SpotStatus::Occupied)
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let available = lot.max_spots - occupied;
    Ok(Json(LotResponse::from_db(lot, occupied, available)))
}

/// Delete a lot and all of its spots (admin only)
#[utoipa::path(
    delete,
    path = "/api/v1/lots/{id}",
    params(("id" = i64, Path, description = "Lot ID")),
    tag = "lots",
    responses(
        (status = 204, description = "Lot deleted"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Unknown lot"),
        (status = 409, description = "Lot still has occupied spots"),
    )
)]
#[tracing::instrument(skip_all, fields(lot_id = id))]
pub async fn delete_lot(State(state): State<AppState>, user: CurrentUser, Path(id): Path<LotId>) -> Result<StatusCode, Error> {
    require_admin(&user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if !Lots::new(&mut conn).delete(id).await? {
        return Err(lot_not_found(id));
    }

    Ok(StatusCode::NO_CONTENT)
}

fn lot_not_found(id: LotId) -> Error {
    Error::NotFound {
        resource: "parking lot".to_string(),
        id: id.to_string(),
    }
}
