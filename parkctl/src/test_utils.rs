//! Test utilities shared across unit and endpoint tests.

use crate::api::models::users::CurrentUser;
use crate::auth::session;
use crate::config::Config;
use crate::db::{
    handlers::{Lots, Repository, Users},
    models::{
        lots::{LotCreateDBRequest, LotDBResponse},
        users::{UserCreateDBRequest, UserDBResponse},
    },
};
use axum_test::TestServer;
use sqlx::SqlitePool;

pub fn create_test_config() -> Config {
    Config {
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        ..Default::default()
    }
}

/// Spin up the full router over the given pool as an in-process test server.
pub async fn create_test_app(pool: SqlitePool) -> TestServer {
    let state = crate::AppState {
        db: pool,
        config: create_test_config(),
    };

    let router = crate::build_router(state).expect("Failed to build router");
    TestServer::new(router).expect("Failed to create test server")
}

/// `Authorization` header value carrying a session token for the user.
pub fn auth_header(user: &UserDBResponse) -> String {
    let current_user = CurrentUser {
        id: user.id,
        username: user.username.clone(),
        is_admin: user.is_admin,
    };
    let token = session::create_session_token(&current_user, &create_test_config()).expect("Failed to create session token");
    format!("Bearer {token}")
}

pub async fn create_test_user(pool: &SqlitePool, username: &str, is_admin: bool) -> UserDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            username: username.to_string(),
            password_hash: None,
            is_admin,
        })
        .await
        .expect("Failed to create test user")
}

pub async fn create_test_lot(pool: &SqlitePool, name: &str, price: f64, max_spots: i64) -> LotDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Lots::new(&mut conn)
        .create(&LotCreateDBRequest {
            name: name.to_string(),
            address: "1 Test Way".to_string(),
            pin_code: "00000".to_string(),
            price,
            max_spots,
        })
        .await
        .expect("Failed to create test lot")
}
