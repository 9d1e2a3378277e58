//! Value objects
//!
//! Immutable, compared by value, normalized and validated at construction.
//! `from_persisted` constructors skip validation for data read back from storage.

pub mod email;
pub mod ids;
pub mod role;

pub use email::Email;
pub use ids::{GroupId, UserId};
pub use role::Role;
