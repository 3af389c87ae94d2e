//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Authentication** (`/authentication/*`): Login, registration, logout
//! - **Lots** (`/api/v1/lots/*`): Lot catalog administration and booking entry
//! - **Reservations** (`/api/v1/reservations/*`): Booking lifecycle and history
//! - **Analytics** (`/api/v1/analytics/*`): Occupancy and revenue dashboards
//! - **Users** (`/api/v1/users`): Account listing for administrators
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`.
//! API documentation is available at `/docs` when the server is running.

pub mod handlers;
pub mod models;
