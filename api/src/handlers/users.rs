//! User handlers
//!
//! Endpoints for user CRUD, role changes and group membership.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::extract::JsonBody;
use super::DeletedResponse;
use crate::app::{CreateUserInput, GroupResponse, UpdateUserInput, UserResponse};
use crate::domain::ports::{GroupRepository, UserRepository};
use crate::error::AppError;
use crate::AppState;

/// Request to create a user
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
}

/// Request to replace a user's profile
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    #[serde(default)]
    pub role: String,
}

/// Body for joining or leaving a group
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMembershipRequest {
    #[serde(default)]
    pub group_id: String,
}

/// POST /users
pub async fn create_user<UR: UserRepository, GR: GroupRepository>(
    State(state): State<AppState<UR, GR>>,
    JsonBody(request): JsonBody<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = state
        .user_service
        .create_user(CreateUserInput {
            name: request.name,
            email: request.email,
            role: request.role,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users
pub async fn list_users<UR: UserRepository, GR: GroupRepository>(
    State(state): State<AppState<UR, GR>>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    Ok(Json(state.user_service.list_users().await?))
}

/// GET /users/:id
pub async fn get_user<UR: UserRepository, GR: GroupRepository>(
    State(state): State<AppState<UR, GR>>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    Ok(Json(state.user_service.get_user(&id).await?))
}

/// PUT /users/:id
pub async fn update_user<UR: UserRepository, GR: GroupRepository>(
    State(state): State<AppState<UR, GR>>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .user_service
        .update_user(
            &id,
            UpdateUserInput {
                name: request.name,
                email: request.email,
            },
        )
        .await?;

    Ok(Json(user))
}

/// DELETE /users/:id
pub async fn delete_user<UR: UserRepository, GR: GroupRepository>(
    State(state): State<AppState<UR, GR>>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    state.user_service.delete_user(&id).await?;
    Ok(Json(DeletedResponse::new(id)))
}

/// PUT /users/:id/role
pub async fn change_role<UR: UserRepository, GR: GroupRepository>(
    State(state): State<AppState<UR, GR>>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<ChangeRoleRequest>,
) -> Result<Json<UserResponse>, AppError> {
    Ok(Json(
        state.user_service.change_role(&id, &request.role).await?,
    ))
}

/// GET /users/:id/groups
pub async fn list_user_groups<UR: UserRepository, GR: GroupRepository>(
    State(state): State<AppState<UR, GR>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<GroupResponse>>, AppError> {
    Ok(Json(state.user_service.list_user_groups(&id).await?))
}

/// POST /users/:id/groups
///
/// Join a group. Both the user and the group record the membership.
pub async fn join_group<UR: UserRepository, GR: GroupRepository>(
    State(state): State<AppState<UR, GR>>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<GroupMembershipRequest>,
) -> Result<Json<UserResponse>, AppError> {
    Ok(Json(
        state
            .user_service
            .join_group(&id, &request.group_id)
            .await?,
    ))
}

/// DELETE /users/:id/groups
pub async fn leave_group<UR: UserRepository, GR: GroupRepository>(
    State(state): State<AppState<UR, GR>>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<GroupMembershipRequest>,
) -> Result<Json<UserResponse>, AppError> {
    Ok(Json(
        state
            .user_service
            .leave_group(&id, &request.group_id)
            .await?,
    ))
}
