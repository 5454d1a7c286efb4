//! Password hashing, database-backed sessions and the request extractors
//! that resolve a bearer token to the calling user.

pub mod extractors;
pub mod password;
pub mod session;

pub use extractors::{CurrentUser, MaybeUser, RequireAdmin, RequireOrganizer};
