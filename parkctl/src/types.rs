//! Common type definitions.
//!
//! Entity identifiers are `i64` aliases over the SQLite rowid-backed primary
//! keys. The aliases exist for readability at function signatures, not for
//! newtype-level safety.

/// User account identifier
pub type UserId = i64;
/// Parking lot identifier
pub type LotId = i64;
/// Parking spot identifier
pub type SpotId = i64;
/// Reservation identifier
pub type ReservationId = i64;
