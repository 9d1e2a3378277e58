//! Cross-aggregate membership changes
//!
//! Joining and leaving touch both aggregates. The initiating aggregate is
//! mutated first and its rule violations are reported. The mirrored
//! mutation on the other aggregate may find the change already applied;
//! that outcome is expected and ignored. Both aggregates are then written
//! in initiator order, as two independent writes: if the second write fails
//! the first is not undone, and the association table (which both writes
//! target) keeps whatever the first write left.

use crate::domain::entities::{Group, User};
use crate::domain::ports::{GroupRepository, UserRepository};
use crate::domain::values::{GroupId, UserId};
use crate::error::{AppError, DomainError};

/// Which aggregate a membership request was addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initiator {
    User,
    Group,
}

pub(crate) async fn load_user<UR: UserRepository>(
    users: &UR,
    id: &UserId,
) -> Result<User, AppError> {
    users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::user_not_found(id))
}

pub(crate) async fn load_group<GR: GroupRepository>(
    groups: &GR,
    id: &GroupId,
) -> Result<Group, AppError> {
    groups
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::group_not_found(id))
}

/// Swallow the "already in place" outcome of a mirrored mutation
fn tolerate_mirrored(result: Result<(), DomainError>) -> Result<(), DomainError> {
    match result {
        Err(err @ (DomainError::AlreadyMember { .. } | DomainError::NotMember { .. })) => {
            tracing::debug!(error = %err, "Mirrored membership already in place");
            Ok(())
        }
        other => other,
    }
}

/// Make `user_id` a member of `group_id` on both sides
pub(crate) async fn link<UR, GR>(
    users: &UR,
    groups: &GR,
    user_id: &UserId,
    group_id: &GroupId,
    initiator: Initiator,
) -> Result<(User, Group), AppError>
where
    UR: UserRepository,
    GR: GroupRepository,
{
    match initiator {
        Initiator::User => {
            let mut user = load_user(users, user_id).await?;
            let mut group = load_group(groups, group_id).await?;

            user.join_group(group_id.clone())?;
            tolerate_mirrored(group.add_member(user_id.clone()))?;

            users.update(&user).await?;
            groups.update(&group).await?;
            Ok((user, group))
        }
        Initiator::Group => {
            let mut group = load_group(groups, group_id).await?;
            let mut user = load_user(users, user_id).await?;

            group.add_member(user_id.clone())?;
            tolerate_mirrored(user.join_group(group_id.clone()))?;

            groups.update(&group).await?;
            users.update(&user).await?;
            Ok((user, group))
        }
    }
}

/// Remove `user_id` from `group_id` on both sides
pub(crate) async fn unlink<UR, GR>(
    users: &UR,
    groups: &GR,
    user_id: &UserId,
    group_id: &GroupId,
    initiator: Initiator,
) -> Result<(User, Group), AppError>
where
    UR: UserRepository,
    GR: GroupRepository,
{
    match initiator {
        Initiator::User => {
            let mut user = load_user(users, user_id).await?;
            let mut group = load_group(groups, group_id).await?;

            user.leave_group(group_id)?;
            tolerate_mirrored(group.remove_member(user_id))?;

            users.update(&user).await?;
            groups.update(&group).await?;
            Ok((user, group))
        }
        Initiator::Group => {
            let mut group = load_group(groups, group_id).await?;
            let mut user = load_user(users, user_id).await?;

            group.remove_member(user_id)?;
            tolerate_mirrored(user.leave_group(group_id))?;

            groups.update(&group).await?;
            users.update(&user).await?;
            Ok((user, group))
        }
    }
}

/// Parse the two identifiers of a membership request, reporting both if both are bad
pub(crate) fn parse_membership_ids(
    user_id: &str,
    group_id: &str,
) -> Result<(UserId, GroupId), AppError> {
    let mut errors = crate::error::ValidationErrors::new();
    let user_id = errors.check(UserId::parse(user_id));
    let group_id = errors.check(GroupId::parse(group_id));

    match (user_id, group_id) {
        (Some(user_id), Some(group_id)) => Ok((user_id, group_id)),
        _ => Err(AppError::Validation(errors)),
    }
}
