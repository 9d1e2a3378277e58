//! Domain entities
//!
//! The `User` and `Group` aggregates. Each keeps a denormalized copy of the
//! other side's identifiers; the application layer keeps the two in step.
//! These are separate from the SeaORM entities in the `entity` module.

pub mod group;
pub mod user;

pub use group::Group;
pub use user::User;

use chrono::{DateTime, SubsecRound, Utc};

use crate::error::DomainError;

/// Current time at the precision PostgreSQL `timestamptz` stores
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Trimmed, non-empty display name
pub(crate) fn validate_name(raw: &str) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("name", "name is required"));
    }
    Ok(trimmed.to_string())
}
