//! SeaORM entity models for the `users`, `groups` and `user_groups` tables

pub mod groups;
pub mod user_groups;
pub mod users;
