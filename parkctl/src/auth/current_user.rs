//! Axum extractor for the authenticated user.

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{debug, instrument, trace};

/// Extract user from a `Bearer` session token if present and valid
/// Returns:
/// - None: No Authorization header, or not a Bearer token
/// - Some(Ok(user)): Valid token found and verified
/// - Some(Err(error)): Token present but invalid/malformed
fn try_bearer_auth(parts: &Parts, config: &crate::config::Config) -> Option<Result<CurrentUser>> {
    let auth_header = parts.headers.get(axum::http::header::AUTHORIZATION)?;

    let auth_str = match auth_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::Validation {
                message: format!("Invalid authorization header: {e}"),
            }));
        }
    };

    let token = auth_str.strip_prefix("Bearer ")?;
    Some(session::verify_session_token(token, config))
}

/// Extract user from the JWT session cookie if present and valid
/// Returns:
/// - None: No session cookie present (or the token inside it is stale)
/// - Some(Ok(user)): Valid JWT found and verified
/// - Some(Err(error)): Cookie header present but unreadable
fn try_cookie_auth(parts: &Parts, config: &crate::config::Config) -> Option<Result<CurrentUser>> {
    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?;

    let cookie_str = match cookie_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::Validation {
                message: format!("Invalid cookie header: {e}"),
            }));
        }
    };
    let cookie_name = &config.auth.session.cookie_name;

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=') {
            if name == cookie_name {
                match session::verify_session_token(value, config) {
                    Ok(user) => return Some(Ok(user)),
                    // Expired/invalid session cookies are expected; fall
                    // through rather than erroring so the client can re-login.
                    Err(_) => continue,
                }
            }
        }
    }
    None
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        // Bearer tokens first (API clients), then session cookies (browsers).
        match try_bearer_auth(parts, &state.config) {
            Some(Ok(user)) => {
                debug!("Found bearer-authenticated user: {}", user.id);
                return Ok(user);
            }
            Some(Err(e)) => {
                trace!("Bearer authentication failed: {:?}", e);
            }
            None => {
                trace!("No bearer authentication attempted");
            }
        }

        match try_cookie_auth(parts, &state.config) {
            Some(Ok(user)) => {
                debug!("Found cookie-authenticated user: {}", user.id);
                return Ok(user);
            }
            Some(Err(e)) => {
                trace!("Cookie authentication failed: {:?}", e);
            }
            None => {
                trace!("No cookie authentication attempted");
            }
        }

        Err(Error::Unauthenticated { message: None })
    }
}
