//! User service
//!
//! Use cases for user profiles, roles and the user side of group membership.

use std::sync::Arc;

use super::dto::{CreateUserInput, GroupResponse, UpdateUserInput, UserResponse};
use super::membership::{self, Initiator};
use crate::domain::entities::{validate_name, User};
use crate::domain::ports::{GroupRepository, UserRepository};
use crate::domain::values::{Email, Role, UserId};
use crate::error::{AppError, ValidationErrors};

/// Service for managing users
pub struct UserService<UR, GR>
where
    UR: UserRepository,
    GR: GroupRepository,
{
    users: Arc<UR>,
    groups: Arc<GR>,
}

impl<UR, GR> UserService<UR, GR>
where
    UR: UserRepository,
    GR: GroupRepository,
{
    pub fn new(users: Arc<UR>, groups: Arc<GR>) -> Self {
        Self { users, groups }
    }

    /// Register a new user
    ///
    /// Fails with a conflict if another user already holds the (normalized) email.
    #[tracing::instrument(skip_all)]
    pub async fn create_user(&self, input: CreateUserInput) -> Result<UserResponse, AppError> {
        let mut errors = ValidationErrors::new();
        let name = errors.check(validate_name(&input.name));
        let email = errors.check(Email::parse(&input.email));
        let role = errors.check(Role::parse(&input.role));
        let (Some(name), Some(email), Some(role)) = (name, email, role) else {
            return Err(AppError::Validation(errors));
        };

        self.ensure_email_available(&email, None).await?;

        let user = User::new(UserId::generate(), &name, email, role)?;
        self.users.save(&user).await?;

        tracing::info!(user_id = %user.id(), role = %user.role(), "User created");
        Ok(UserResponse::from(&user))
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_user(&self, id: &str) -> Result<UserResponse, AppError> {
        let id = UserId::parse(id)?;
        let user = membership::load_user(self.users.as_ref(), &id).await?;
        Ok(UserResponse::from(&user))
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<UserResponse>, AppError> {
        let users = self.users.find_all().await?;
        Ok(users.iter().map(UserResponse::from).collect())
    }

    /// Replace name and email
    ///
    /// Keeping one's own email is not a conflict.
    #[tracing::instrument(skip(self, input))]
    pub async fn update_user(
        &self,
        id: &str,
        input: UpdateUserInput,
    ) -> Result<UserResponse, AppError> {
        let mut errors = ValidationErrors::new();
        let id = errors.check(UserId::parse(id));
        let name = errors.check(validate_name(&input.name));
        let email = errors.check(Email::parse(&input.email));
        let (Some(id), Some(name), Some(email)) = (id, name, email) else {
            return Err(AppError::Validation(errors));
        };

        let mut user = membership::load_user(self.users.as_ref(), &id).await?;
        self.ensure_email_available(&email, Some(&id)).await?;

        user.update_profile(&name, email)?;
        self.users.update(&user).await?;

        tracing::info!(user_id = %id, "User profile updated");
        Ok(UserResponse::from(&user))
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_user(&self, id: &str) -> Result<(), AppError> {
        let id = UserId::parse(id)?;
        let user = membership::load_user(self.users.as_ref(), &id).await?;

        self.users.delete(user.id()).await?;

        tracing::info!(user_id = %id, groups = user.group_ids().len(), "User deleted");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn change_role(&self, id: &str, role: &str) -> Result<UserResponse, AppError> {
        let mut errors = ValidationErrors::new();
        let id = errors.check(UserId::parse(id));
        let role = errors.check(Role::parse(role));
        let (Some(id), Some(role)) = (id, role) else {
            return Err(AppError::Validation(errors));
        };

        let mut user = membership::load_user(self.users.as_ref(), &id).await?;
        user.change_role(role);
        self.users.update(&user).await?;

        tracing::info!(user_id = %id, role = %role, "User role changed");
        Ok(UserResponse::from(&user))
    }

    /// Add the user to a group, mirroring the change on the group
    #[tracing::instrument(skip(self))]
    pub async fn join_group(&self, user_id: &str, group_id: &str) -> Result<UserResponse, AppError> {
        let (user_id, group_id) = membership::parse_membership_ids(user_id, group_id)?;

        let (user, _) = membership::link(
            self.users.as_ref(),
            self.groups.as_ref(),
            &user_id,
            &group_id,
            Initiator::User,
        )
        .await?;

        tracing::info!(user_id = %user_id, group_id = %group_id, "User joined group");
        Ok(UserResponse::from(&user))
    }

    /// Remove the user from a group, mirroring the change on the group
    #[tracing::instrument(skip(self))]
    pub async fn leave_group(
        &self,
        user_id: &str,
        group_id: &str,
    ) -> Result<UserResponse, AppError> {
        let (user_id, group_id) = membership::parse_membership_ids(user_id, group_id)?;

        let (user, _) = membership::unlink(
            self.users.as_ref(),
            self.groups.as_ref(),
            &user_id,
            &group_id,
            Initiator::User,
        )
        .await?;

        tracing::info!(user_id = %user_id, group_id = %group_id, "User left group");
        Ok(UserResponse::from(&user))
    }

    /// Groups the user belongs to
    #[tracing::instrument(skip(self))]
    pub async fn list_user_groups(&self, id: &str) -> Result<Vec<GroupResponse>, AppError> {
        let id = UserId::parse(id)?;
        let user = membership::load_user(self.users.as_ref(), &id).await?;

        let mut groups = Vec::with_capacity(user.group_ids().len());
        for group_id in user.group_ids() {
            match self.groups.find_by_id(group_id).await? {
                Some(group) => groups.push(GroupResponse::from(&group)),
                None => tracing::warn!(group_id = %group_id, "Membership references a missing group"),
            }
        }
        Ok(groups)
    }

    async fn ensure_email_available(
        &self,
        email: &Email,
        owner: Option<&UserId>,
    ) -> Result<(), AppError> {
        match self.users.find_by_email(email).await? {
            Some(existing) if Some(existing.id()) != owner => Err(AppError::email_taken(email)),
            _ => Ok(()),
        }
    }
}
