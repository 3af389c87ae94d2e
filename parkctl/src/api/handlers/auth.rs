use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::{
        auth::{AuthResponse, AuthSuccessResponse, LoginRequest, LoginResponse, LogoutResponse, RegisterRequest, RegisterResponse},
        users::UserResponse,
    },
    auth::{password, session},
    config::Config,
    db::{
        handlers::{Repository, Users},
        models::users::UserCreateDBRequest,
    },
    errors::Error,
};

/// Register a new user account
#[utoipa::path(
    post,
    path = "/authentication/register",
    request_body = RegisterRequest,
    tag = "authentication",
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username already taken"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(State(state): State<AppState>, Json(request): Json<RegisterRequest>) -> Result<RegisterResponse, Error> {
    if !state.config.auth.allow_registration {
        return Err(Error::Validation {
            message: "User registration is disabled".to_string(),
        });
    }

    if request.username.trim().is_empty() {
        return Err(Error::Validation {
            message: "Username must not be empty".to_string(),
        });
    }

    let password_config = &state.config.auth.password;
    if request.password.len() < password_config.min_length {
        return Err(Error::Validation {
            message: format!("Password must be at least {} characters", password_config.min_length),
        });
    }
    if request.password.len() > password_config.max_length {
        return Err(Error::Validation {
            message: format!("Password must be no more than {} characters", password_config.max_length),
        });
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let mut user_repo = Users::new(&mut tx);
    if user_repo.get_by_username(&request.username).await?.is_some() {
        return Err(Error::Conflict {
            message: "This username is already taken".to_string(),
        });
    }

    // Hash the password on a blocking thread to avoid blocking async runtime
    let password_to_hash = request.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&password_to_hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let created_user = user_repo
        .create(&UserCreateDBRequest {
            username: request.username,
            password_hash: Some(password_hash),
            is_admin: false,
        })
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let user_response = UserResponse::from(created_user.clone());
    let token = session::create_session_token(&created_user.into(), &state.config)?;
    let cookie = create_session_cookie(&token, &state.config);

    Ok(RegisterResponse {
        auth_response: AuthResponse {
            user: user_response,
            token,
            message: "Registration successful".to_string(),
        },
        cookie,
    })
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/authentication/login",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<LoginResponse, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let user = Users::new(&mut conn)
        .get_by_username(&request.username)
        .await?
        .ok_or_else(invalid_credentials)?;

    let password_hash = user.password_hash.clone().ok_or_else(invalid_credentials)?;

    // Verify password on a blocking thread to avoid blocking async runtime
    let password_to_check = request.password.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_password(&password_to_check, &password_hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(invalid_credentials());
    }

    let user_response = UserResponse::from(user.clone());
    let token = session::create_session_token(&user.into(), &state.config)?;
    let cookie = create_session_cookie(&token, &state.config);

    Ok(LoginResponse {
        auth_response: AuthResponse {
            user: user_response,
            token,
            message: "Login successful".to_string(),
        },
        cookie,
    })
}

/// Logout (clear session)
#[utoipa::path(
    post,
    path = "/authentication/logout",
    tag = "authentication",
    responses(
        (status = 200, description = "Logout successful", body = AuthSuccessResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> Result<LogoutResponse, Error> {
    // Create expired cookie to clear the session
    let cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0",
        state.config.auth.session.cookie_name
    );

    Ok(LogoutResponse {
        auth_response: AuthSuccessResponse {
            message: "Logout successful".to_string(),
        },
        cookie,
    })
}

/// Deliberately indistinguishable for unknown usernames and wrong passwords.
fn invalid_credentials() -> Error {
    Error::Unauthenticated {
        message: Some("Invalid username or password".to_string()),
    }
}

fn create_session_cookie(token: &str, config: &Config) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        config.auth.session.cookie_name,
        token,
        config.auth.session.jwt_expiry.as_secs()
    )
}

#[cfg(test)]
mod tests {
    use crate::test_utils::create_test_app;
    use serde_json::json;
    use sqlx::SqlitePool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_then_login(pool: SqlitePool) {
        let server = create_test_app(pool).await;

        let response = server
            .post("/authentication/register")
            .json(&json!({"username": "alice", "password": "hunter2-hunter2"}))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["user"]["username"], "alice");
        assert_eq!(body["user"]["is_admin"], false);
        assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));

        let response = server
            .post("/authentication/login")
            .json(&json!({"username": "alice", "password": "hunter2-hunter2"}))
            .await;
        response.assert_status_ok();
        assert!(response.headers().get("set-cookie").is_some());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_duplicate_username(pool: SqlitePool) {
        let server = create_test_app(pool).await;

        let payload = json!({"username": "bob", "password": "hunter2-hunter2"});
        server.post("/authentication/register").json(&payload).await.assert_status(axum::http::StatusCode::CREATED);

        let response = server.post("/authentication/register").json(&payload).await;
        response.assert_status(axum::http::StatusCode::CONFLICT);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_wrong_password(pool: SqlitePool) {
        let server = create_test_app(pool).await;

        server
            .post("/authentication/register")
            .json(&json!({"username": "carol", "password": "hunter2-hunter2"}))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = server
            .post("/authentication/login")
            .json(&json!({"username": "carol", "password": "wrong"}))
            .await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_short_password_rejected(pool: SqlitePool) {
        let server = create_test_app(pool).await;

        let response = server
            .post("/authentication/register")
            .json(&json!({"username": "dave", "password": "short"}))
            .await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    }
}
