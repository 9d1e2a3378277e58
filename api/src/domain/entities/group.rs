//! Group aggregate
//!
//! A named collection of users.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::{now, validate_name};
use crate::domain::values::{GroupId, UserId};
use crate::error::DomainError;

/// A group and its members
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    id: GroupId,
    name: String,
    description: Option<String>,
    member_ids: BTreeSet<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Blank descriptions are stored as absent
fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

impl Group {
    /// Create a new group with no members
    pub fn new(id: GroupId, name: &str, description: Option<&str>) -> Result<Self, DomainError> {
        let name = validate_name(name)?;
        let created_at = now();

        Ok(Self {
            id,
            name,
            description: normalize_description(description),
            member_ids: BTreeSet::new(),
            created_at,
            updated_at: created_at,
        })
    }

    /// Rebuild a group from stored state without validation
    pub fn reconstruct(
        id: GroupId,
        name: String,
        description: Option<String>,
        member_ids: impl IntoIterator<Item = UserId>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            member_ids: member_ids.into_iter().collect(),
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &GroupId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Members of this group, in id order
    pub fn member_ids(&self) -> &BTreeSet<UserId> {
        &self.member_ids
    }

    pub fn member_count(&self) -> usize {
        self.member_ids.len()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn has_member(&self, user_id: &UserId) -> bool {
        self.member_ids.contains(user_id)
    }

    pub fn update_info(&mut self, name: &str, description: Option<&str>) -> Result<(), DomainError> {
        self.name = validate_name(name)?;
        self.description = normalize_description(description);
        self.touch();
        Ok(())
    }

    pub fn add_member(&mut self, user_id: UserId) -> Result<(), DomainError> {
        if self.has_member(&user_id) {
            return Err(DomainError::AlreadyMember {
                user_id,
                group_id: self.id.clone(),
            });
        }
        self.member_ids.insert(user_id);
        self.touch();
        Ok(())
    }

    pub fn remove_member(&mut self, user_id: &UserId) -> Result<(), DomainError> {
        if !self.member_ids.remove(user_id) {
            return Err(DomainError::NotMember {
                user_id: user_id.clone(),
                group_id: self.id.clone(),
            });
        }
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = now();
    }
}
