//! Group service
//!
//! Use cases for groups and the group side of membership.

use std::sync::Arc;

use super::dto::{CreateGroupInput, GroupResponse, UpdateGroupInput, UserResponse};
use super::membership::{self, Initiator};
use crate::domain::entities::{validate_name, Group};
use crate::domain::ports::{GroupRepository, UserRepository};
use crate::domain::values::GroupId;
use crate::error::{AppError, ValidationErrors};

/// Service for managing groups
pub struct GroupService<UR, GR>
where
    UR: UserRepository,
    GR: GroupRepository,
{
    users: Arc<UR>,
    groups: Arc<GR>,
}

impl<UR, GR> GroupService<UR, GR>
where
    UR: UserRepository,
    GR: GroupRepository,
{
    pub fn new(users: Arc<UR>, groups: Arc<GR>) -> Self {
        Self { users, groups }
    }

    #[tracing::instrument(skip_all)]
    pub async fn create_group(&self, input: CreateGroupInput) -> Result<GroupResponse, AppError> {
        let name = validate_name(&input.name)?;

        let group = Group::new(GroupId::generate(), &name, input.description.as_deref())?;
        self.groups.save(&group).await?;

        tracing::info!(group_id = %group.id(), "Group created");
        Ok(GroupResponse::from(&group))
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_group(&self, id: &str) -> Result<GroupResponse, AppError> {
        let id = GroupId::parse(id)?;
        let group = membership::load_group(self.groups.as_ref(), &id).await?;
        Ok(GroupResponse::from(&group))
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_groups(&self) -> Result<Vec<GroupResponse>, AppError> {
        let groups = self.groups.find_all().await?;
        Ok(groups.iter().map(GroupResponse::from).collect())
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn update_group(
        &self,
        id: &str,
        input: UpdateGroupInput,
    ) -> Result<GroupResponse, AppError> {
        let mut errors = ValidationErrors::new();
        let id = errors.check(GroupId::parse(id));
        let name = errors.check(validate_name(&input.name));
        let (Some(id), Some(name)) = (id, name) else {
            return Err(AppError::Validation(errors));
        };

        let mut group = membership::load_group(self.groups.as_ref(), &id).await?;
        group.update_info(&name, input.description.as_deref())?;
        self.groups.update(&group).await?;

        tracing::info!(group_id = %id, "Group updated");
        Ok(GroupResponse::from(&group))
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_group(&self, id: &str) -> Result<(), AppError> {
        let id = GroupId::parse(id)?;
        let group = membership::load_group(self.groups.as_ref(), &id).await?;

        self.groups.delete(group.id()).await?;

        tracing::info!(group_id = %id, members = group.member_count(), "Group deleted");
        Ok(())
    }

    /// Add a user to the group, mirroring the change on the user
    #[tracing::instrument(skip(self))]
    pub async fn add_member(&self, group_id: &str, user_id: &str) -> Result<GroupResponse, AppError> {
        let (user_id, group_id) = membership::parse_membership_ids(user_id, group_id)?;

        let (_, group) = membership::link(
            self.users.as_ref(),
            self.groups.as_ref(),
            &user_id,
            &group_id,
            Initiator::Group,
        )
        .await?;

        tracing::info!(group_id = %group_id, user_id = %user_id, "Member added");
        Ok(GroupResponse::from(&group))
    }

    /// Remove a user from the group, mirroring the change on the user
    #[tracing::instrument(skip(self))]
    pub async fn remove_member(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<GroupResponse, AppError> {
        let (user_id, group_id) = membership::parse_membership_ids(user_id, group_id)?;

        let (_, group) = membership::unlink(
            self.users.as_ref(),
            self.groups.as_ref(),
            &user_id,
            &group_id,
            Initiator::Group,
        )
        .await?;

        tracing::info!(group_id = %group_id, user_id = %user_id, "Member removed");
        Ok(GroupResponse::from(&group))
    }

    /// Users that belong to the group
    #[tracing::instrument(skip(self))]
    pub async fn list_members(&self, id: &str) -> Result<Vec<UserResponse>, AppError> {
        let id = GroupId::parse(id)?;
        let group = membership::load_group(self.groups.as_ref(), &id).await?;

        let mut members = Vec::with_capacity(group.member_count());
        for user_id in group.member_ids() {
            match self.users.find_by_id(user_id).await? {
                Some(user) => members.push(UserResponse::from(&user)),
                None => {
                    tracing::warn!(user_id = %user_id, "Membership references a missing user")
                }
            }
        }
        Ok(members)
    }
}
