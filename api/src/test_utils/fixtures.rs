//! Test fixtures
//!
//! Factory functions for creating valid aggregates with sensible defaults.

use crate::domain::entities::{Group, User};
use crate::domain::values::{Email, GroupId, Role, UserId};

/// Create a test user with role `user` and no memberships
pub fn test_user(name: &str, email: &str) -> User {
    User::new(
        UserId::generate(),
        name,
        Email::parse(email).expect("fixture email is valid"),
        Role::User,
    )
    .expect("fixture user is valid")
}

/// Create a test group with no members
pub fn test_group(name: &str) -> Group {
    Group::new(GroupId::generate(), name, None).expect("fixture group is valid")
}

/// Create a test group with a fixed id
pub fn test_group_with_id(id: &str, name: &str) -> Group {
    Group::new(
        GroupId::parse(id).expect("fixture id is valid"),
        name,
        Some("fixture group"),
    )
    .expect("fixture group is valid")
}
