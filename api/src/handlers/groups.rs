//! Group handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::extract::JsonBody;
use super::DeletedResponse;
use crate::app::{CreateGroupInput, GroupResponse, UpdateGroupInput, UserResponse};
use crate::domain::ports::{GroupRepository, UserRepository};
use crate::error::AppError;
use crate::AppState;

/// Request to create or replace a group
#[derive(Debug, Deserialize)]
pub struct GroupRequest {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
}

/// Body for adding or removing a member
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRequest {
    #[serde(default)]
    pub user_id: String,
}

/// POST /groups
pub async fn create_group<UR: UserRepository, GR: GroupRepository>(
    State(state): State<AppState<UR, GR>>,
    JsonBody(request): JsonBody<GroupRequest>,
) -> Result<(StatusCode, Json<GroupResponse>), AppError> {
    let group = state
        .group_service
        .create_group(CreateGroupInput {
            name: request.name,
            description: request.description,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(group)))
}

/// GET /groups
pub async fn list_groups<UR: UserRepository, GR: GroupRepository>(
    State(state): State<AppState<UR, GR>>,
) -> Result<Json<Vec<GroupResponse>>, AppError> {
    Ok(Json(state.group_service.list_groups().await?))
}

/// GET /groups/:id
pub async fn get_group<UR: UserRepository, GR: GroupRepository>(
    State(state): State<AppState<UR, GR>>,
    Path(id): Path<String>,
) -> Result<Json<GroupResponse>, AppError> {
    Ok(Json(state.group_service.get_group(&id).await?))
}

/// PUT /groups/:id
///
/// Replaces name and description; an omitted description clears it.
pub async fn update_group<UR: UserRepository, GR: GroupRepository>(
    State(state): State<AppState<UR, GR>>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<GroupRequest>,
) -> Result<Json<GroupResponse>, AppError> {
    let group = state
        .group_service
        .update_group(
            &id,
            UpdateGroupInput {
                name: request.name,
                description: request.description,
            },
        )
        .await?;

    Ok(Json(group))
}

/// DELETE /groups/:id
pub async fn delete_group<UR: UserRepository, GR: GroupRepository>(
    State(state): State<AppState<UR, GR>>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    state.group_service.delete_group(&id).await?;
    Ok(Json(DeletedResponse::new(id)))
}

/// GET /groups/:id/members
pub async fn list_members<UR: UserRepository, GR: GroupRepository>(
    State(state): State<AppState<UR, GR>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    Ok(Json(state.group_service.list_members(&id).await?))
}

/// POST /groups/:id/members
pub async fn add_member<UR: UserRepository, GR: GroupRepository>(
    State(state): State<AppState<UR, GR>>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<MemberRequest>,
) -> Result<Json<GroupResponse>, AppError> {
    Ok(Json(
        state
            .group_service
            .add_member(&id, &request.user_id)
            .await?,
    ))
}

/// DELETE /groups/:id/members
pub async fn remove_member<UR: UserRepository, GR: GroupRepository>(
    State(state): State<AppState<UR, GR>>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<MemberRequest>,
) -> Result<Json<GroupResponse>, AppError> {
    Ok(Json(
        state
            .group_service
            .remove_member(&id, &request.user_id)
            .await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_is_optional() {
        let request: GroupRequest = serde_json::from_str(r#"{"name": "Readers"}"#).unwrap();
        assert_eq!(request.name, "Readers");
        assert!(request.description.is_none());
    }

    #[test]
    fn member_request_reads_camel_case() {
        let request: MemberRequest = serde_json::from_str(r#"{"userId": "u1"}"#).unwrap();
        assert_eq!(request.user_id, "u1");
    }
}
