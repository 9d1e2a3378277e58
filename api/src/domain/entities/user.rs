//! User aggregate
//!
//! A person with a profile, a role and a set of group memberships.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::{now, validate_name};
use crate::domain::values::{Email, GroupId, Role, UserId};
use crate::error::DomainError;

/// A user and the groups it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: String,
    email: Email,
    role: Role,
    group_ids: BTreeSet<GroupId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with no memberships
    pub fn new(id: UserId, name: &str, email: Email, role: Role) -> Result<Self, DomainError> {
        let name = validate_name(name)?;
        let created_at = now();

        Ok(Self {
            id,
            name,
            email,
            role,
            group_ids: BTreeSet::new(),
            created_at,
            updated_at: created_at,
        })
    }

    /// Rebuild a user from stored state. Nothing is re-validated and the
    /// timestamps are kept as given.
    pub fn reconstruct(
        id: UserId,
        name: String,
        email: Email,
        role: Role,
        group_ids: impl IntoIterator<Item = GroupId>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            role,
            group_ids: group_ids.into_iter().collect(),
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Groups this user belongs to, in id order
    pub fn group_ids(&self) -> &BTreeSet<GroupId> {
        &self.group_ids
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_member_of(&self, group_id: &GroupId) -> bool {
        self.group_ids.contains(group_id)
    }

    pub fn update_profile(&mut self, name: &str, email: Email) -> Result<(), DomainError> {
        self.name = validate_name(name)?;
        self.email = email;
        self.touch();
        Ok(())
    }

    pub fn change_role(&mut self, role: Role) {
        self.role = role;
        self.touch();
    }

    pub fn join_group(&mut self, group_id: GroupId) -> Result<(), DomainError> {
        if self.is_member_of(&group_id) {
            return Err(DomainError::AlreadyMember {
                user_id: self.id.clone(),
                group_id,
            });
        }
        self.group_ids.insert(group_id);
        self.touch();
        Ok(())
    }

    pub fn leave_group(&mut self, group_id: &GroupId) -> Result<(), DomainError> {
        if !self.group_ids.remove(group_id) {
            return Err(DomainError::NotMember {
                user_id: self.id.clone(),
                group_id: group_id.clone(),
            });
        }
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = now();
    }
}
