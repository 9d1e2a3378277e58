//! HTTP handlers
//!
//! Axum request handlers. Each one binds the request, calls a use case and
//! serializes the result; errors render through `AppError`.

pub mod extract;
pub mod groups;
pub mod users;

use serde::Serialize;

pub use groups::{
    add_member, create_group, delete_group, get_group, list_groups, list_members, remove_member,
    update_group,
};
pub use users::{
    change_role, create_user, delete_user, get_user, join_group, leave_group, list_user_groups,
    list_users, update_user,
};

/// Body returned by DELETE endpoints
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: String,
    pub deleted: bool,
}

impl DeletedResponse {
    pub fn new(id: String) -> Self {
        Self { id, deleted: true }
    }
}
