use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::{
        analytics::{OccupancyEntry, RevenueResponse},
        users::CurrentUser,
    },
    auth::require_admin,
    db::handlers::{Lots, Reservations},
    errors::Error,
};

/// Per-lot occupied/available counts (admin dashboard)
#[utoipa::path(
    get,
    path = "/api/v1/analytics/occupancy",
    tag = "analytics",
    responses(
        (status = 200, description = "Occupancy per lot", body = [OccupancyEntry]),
        (status = 403, description = "Not an administrator"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn occupancy_summary(State(state): State<AppState>, user: CurrentUser) -> Result<Json<Vec<OccupancyEntry>>, Error> {
    require_admin(&user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let summary = Lots::new(&mut conn).occupancy_summary().await?;

    Ok(Json(summary.into_iter().map(OccupancyEntry::from).collect()))
}

/// Total revenue across all closed reservations (admin dashboard)
#[utoipa::path(
    get,
    path = "/api/v1/analytics/revenue",
    tag = "analytics",
    responses(
        (status = 200, description = "Revenue total", body = RevenueResponse),
        (status = 403, description = "Not an administrator"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn total_revenue(State(state): State<AppState>, user: CurrentUser) -> Result<Json<RevenueResponse>, Error> {
    require_admin(&user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let total_revenue = Reservations::new(&mut conn).total_revenue().await?;

    Ok(Json(RevenueResponse { total_revenue }))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{auth_header, create_test_app, create_test_lot, create_test_user};
    use sqlx::SqlitePool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_occupancy_summary_tracks_bookings(pool: SqlitePool) {
        let lot = create_test_lot(&pool, "Central", 5.0, 3).await;
        let admin = create_test_user(&pool, "admin", true).await;
        let alice = create_test_user(&pool, "alice", false).await;
        let server = create_test_app(pool).await;

        server
            .post(&format!("/api/v1/lots/{}/reservations", lot.id))
            .add_header("authorization", auth_header(&alice))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = server
            .get("/api/v1/analytics/occupancy")
            .add_header("authorization", auth_header(&admin))
            .await;
        response.assert_status_ok();
        let summary: serde_json::Value = response.json();
        assert_eq!(summary[0]["lot_name"], "Central");
        assert_eq!(summary[0]["occupied_count"], 1);
        assert_eq!(summary[0]["available_count"], 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_analytics_require_admin(pool: SqlitePool) {
        let alice = create_test_user(&pool, "alice", false).await;
        let server = create_test_app(pool).await;

        for path in ["/api/v1/analytics/occupancy", "/api/v1/analytics/revenue"] {
            let response = server.get(path).add_header("authorization", auth_header(&alice)).await;
            response.assert_status(axum::http::StatusCode::FORBIDDEN);
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_revenue_starts_at_zero(pool: SqlitePool) {
        let admin = create_test_user(&pool, "admin", true).await;
        let server = create_test_app(pool).await;

        let revenue: serde_json::Value = server
            .get("/api/v1/analytics/revenue")
            .add_header("authorization", auth_header(&admin))
            .await
            .json();
        assert_eq!(revenue["total_revenue"], 0.0);
    }
}
