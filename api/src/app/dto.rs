//! Use case inputs and response projections

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::{Group, User};

// -------------------------
// Inputs
// -------------------------

#[derive(Debug, Clone)]
pub struct CreateUserInput {
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone)]
pub struct UpdateUserInput {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct CreateGroupInput {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateGroupInput {
    pub name: String,
    pub description: Option<String>,
}

// -------------------------
// Projections
// -------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_admin: bool,
    pub group_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            name: user.name().to_string(),
            email: user.email().to_string(),
            role: user.role().to_string(),
            is_admin: user.role().is_admin(),
            group_ids: user.group_ids().iter().map(ToString::to_string).collect(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub member_ids: Vec<String>,
    pub member_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Group> for GroupResponse {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id().to_string(),
            name: group.name().to_string(),
            description: group.description().map(str::to_string),
            member_ids: group.member_ids().iter().map(ToString::to_string).collect(),
            member_count: group.member_count(),
            created_at: group.created_at(),
            updated_at: group.updated_at(),
        }
    }
}
