//! Authentication and authorization.
//!
//! Two ways into a request: a `Bearer` session token in the Authorization
//! header (API clients) or the session cookie (browsers). Both carry the same
//! JWT, minted at login/registration and verified statelessly.
//!
//! Authorization is a single admin flag. The core operations take an
//! already-authenticated [`crate::api::models::users::CurrentUser`]; handlers
//! that manage the lot catalog or read fleet-wide analytics gate on
//! [`require_admin`].
//!
//! # Modules
//!
//! - [`current_user`]: Extractor for the authenticated user in handlers
//! - [`password`]: Password hashing and verification using Argon2
//! - [`session`]: JWT session token creation and verification

pub mod current_user;
pub mod password;
pub mod session;

use crate::api::models::users::CurrentUser;
use crate::errors::{Error, Result};

/// Reject non-admin callers.
pub fn require_admin(user: &CurrentUser) -> Result<()> {
    if user.is_admin {
        Ok(())
    } else {
        Err(Error::Forbidden {
            message: "administrator access required".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_admin() {
        let admin = CurrentUser {
            id: 1,
            username: "admin".to_string(),
            is_admin: true,
        };
        let regular = CurrentUser {
            id: 2,
            username: "user".to_string(),
            is_admin: false,
        };

        assert!(require_admin(&admin).is_ok());
        assert!(matches!(require_admin(&regular).unwrap_err(), Error::Forbidden { .. }));
    }
}
