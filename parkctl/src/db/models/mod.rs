//! Database record models matching table schemas.
//!
//! This module contains struct definitions that directly correspond to database
//! table rows. These models are used by repositories to return query results
//! and accept insertion/update data.
//!
//! # Design Principles
//!
//! - **Schema Mapping**: Each model struct matches a database table schema
//! - **SQLx Integration**: Response models derive `sqlx::FromRow` for query results
//! - **Separation**: Database models are distinct from API models to allow
//!   independent evolution of storage and API representations
//!
//! # Model Categories
//!
//! - [`users`]: User accounts and credentials
//! - [`lots`]: Parking lot catalog records
//! - [`spots`]: Per-lot numbered parking spots and their status
//! - [`reservations`]: The append-only reservation ledger

pub mod lots;
pub mod reservations;
pub mod spots;
pub mod users;
