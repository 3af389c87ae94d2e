//! HTTP request handlers for all API endpoints.
//!
//! This module contains Axum route handlers organized by resource type.
//! Each handler is responsible for:
//! - Request validation and deserialization
//! - Authentication and authorization checks
//! - Business logic execution via database repositories
//! - Response serialization
//!
//! # Handler Modules
//!
//! - [`auth`]: Registration, login, and logout
//! - [`lots`]: Lot catalog CRUD and capacity management
//! - [`reservations`]: Booking, release, history, and usage counts
//! - [`analytics`]: Occupancy and revenue dashboards
//! - [`users`]: Account listing for administrators
//!
//! # Authentication
//!
//! Handlers require authentication via session cookies or bearer tokens.
//! The [`crate::auth::current_user`] module provides the extractor that
//! handlers use to access the current user; catalog mutations additionally
//! gate on [`crate::auth::require_admin`].
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] which automatically converts to
//! appropriate HTTP status codes and JSON error responses.

pub mod analytics;
pub mod auth;
pub mod lots;
pub mod reservations;
pub mod users;
