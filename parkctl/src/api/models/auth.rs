//! API models for authentication payloads.

use crate::api::models::users::UserResponse;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Registration payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// Login payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body returned by login/registration, alongside the session cookie
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    /// The session JWT, also set as a cookie. API clients send it back as a
    /// `Bearer` token.
    pub token: String,
    pub message: String,
}

/// Body returned by logout
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthSuccessResponse {
    pub message: String,
}

/// Login response: auth body plus the session cookie header
#[derive(Debug)]
pub struct LoginResponse {
    pub auth_response: AuthResponse,
    pub cookie: String,
}

impl IntoResponse for LoginResponse {
    fn into_response(self) -> Response {
        with_cookie(StatusCode::OK, &self.cookie, Json(self.auth_response))
    }
}

/// Registration response: auth body plus the session cookie header
#[derive(Debug)]
pub struct RegisterResponse {
    pub auth_response: AuthResponse,
    pub cookie: String,
}

impl IntoResponse for RegisterResponse {
    fn into_response(self) -> Response {
        with_cookie(StatusCode::CREATED, &self.cookie, Json(self.auth_response))
    }
}

/// Logout response: success body plus an expired session cookie
#[derive(Debug)]
pub struct LogoutResponse {
    pub auth_response: AuthSuccessResponse,
    pub cookie: String,
}

impl IntoResponse for LogoutResponse {
    fn into_response(self) -> Response {
        with_cookie(StatusCode::OK, &self.cookie, Json(self.auth_response))
    }
}

fn with_cookie(status: StatusCode, cookie: &str, body: impl IntoResponse) -> Response {
    let mut response = (status, body).into_response();
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().insert(header::SET_COOKIE, value);
            response
        }
        Err(e) => {
            tracing::error!("Failed to encode session cookie header: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
