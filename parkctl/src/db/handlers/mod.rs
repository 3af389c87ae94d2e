//! Repository implementations for database access.
//!
//! This module provides repository structs for each major entity in the system.
//! The catalog-shaped entities ([`Lots`], [`Users`]) implement the
//! [`Repository`] trait; [`Spots`] and [`Reservations`] expose bespoke
//! operations because their lifecycles are state machines rather than CRUD.
//!
//! # Design Pattern
//!
//! Each repository:
//! - Wraps a SQLx connection or transaction
//! - Provides strongly-typed operations
//! - Handles query construction and parameter binding
//! - Returns domain models from [`crate::db::models`]
//! - Uses the caller's transaction for ACID guarantees
//!
//! # Common Pattern
//!
//! ```ignore
//! use parkctl::db::handlers::{Lots, Repository};
//!
//! async fn example(pool: &sqlx::SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!     let mut repo = Lots::new(&mut tx);
//!
//!     let lots = repo.list(&Default::default()).await?;
//!
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod lots;
pub mod repository;
pub mod reservations;
pub mod spots;
pub mod users;

pub use lots::Lots;
pub use repository::Repository;
pub use reservations::Reservations;
pub use spots::Spots;
pub use users::Users;
