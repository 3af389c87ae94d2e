//! API request and response data models.
//!
//! This module contains the data structures used for HTTP request
//! deserialization and response serialization. These models define the public
//! API contract.
//!
//! # Design Principles
//!
//! - **Separation of Concerns**: API models are distinct from database models,
//!   allowing independent evolution of API and storage representations
//! - **OpenAPI**: All models are annotated with `utoipa` for automatic API docs
//!
//! # Model Categories
//!
//! - [`auth`]: Login and registration payloads
//! - [`users`]: User accounts and the authenticated-caller identity
//! - [`lots`]: Lot catalog requests/responses
//! - [`reservations`]: Booking responses and per-user usage data
//! - [`analytics`]: Occupancy and revenue dashboard payloads
//! - [`pagination`]: Shared offset pagination parameters

pub mod analytics;
pub mod auth;
pub mod lots;
pub mod pagination;
pub mod reservations;
pub mod users;
