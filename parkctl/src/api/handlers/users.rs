use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    AppState,
    api::models::users::{CurrentUser, ListUsersQuery, UserResponse},
    auth::require_admin,
    db::handlers::{Repository, Users, users::UserFilter},
    errors::Error,
};

/// List regular (non-admin) user accounts
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(ListUsersQuery),
    tag = "users",
    responses(
        (status = 200, description = "User accounts", body = [UserResponse]),
        (status = 403, description = "Not an administrator"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserResponse>>, Error> {
    require_admin(&user)?;

    let (skip, limit) = query.pagination.params();
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let users = Users::new(&mut conn).list(&UserFilter::new(skip, limit).without_admins()).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{auth_header, create_test_app, create_test_user};
    use sqlx::SqlitePool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_users_hides_admins(pool: SqlitePool) {
        let admin = create_test_user(&pool, "admin", true).await;
        create_test_user(&pool, "alice", false).await;
        create_test_user(&pool, "bob", false).await;
        let server = create_test_app(pool).await;

        let response = server.get("/api/v1/users").add_header("authorization", auth_header(&admin)).await;
        response.assert_status_ok();
        let users: serde_json::Value = response.json();
        let names: Vec<&str> = users.as_array().unwrap().iter().map(|u| u["username"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["alice", "bob"]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_users_requires_admin(pool: SqlitePool) {
        let alice = create_test_user(&pool, "alice", false).await;
        let server = create_test_app(pool).await;

        let response = server.get("/api/v1/users").add_header("authorization", auth_header(&alice)).await;
        response.assert_status(axum::http::StatusCode::FORBIDDEN);
    }
}
