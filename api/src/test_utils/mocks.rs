//! In-memory implementations of the repository ports
//!
//! These store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use sea_orm::DbErr;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use crate::domain::entities::{Group, User};
use crate::domain::ports::{GroupRepository, UserRepository};
use crate::domain::values::{Email, GroupId, UserId};
use crate::error::RepositoryError;

// ============================================================================
// Shared store
// ============================================================================

#[derive(Default)]
struct Store {
    users: HashMap<UserId, User>,
    groups: HashMap<GroupId, Group>,
    user_groups: BTreeSet<(UserId, GroupId)>,
}

impl Store {
    fn group_ids_of(&self, user_id: &UserId) -> Vec<GroupId> {
        self.user_groups
            .iter()
            .filter(|(u, _)| u == user_id)
            .map(|(_, g)| g.clone())
            .collect()
    }

    fn member_ids_of(&self, group_id: &GroupId) -> Vec<UserId> {
        self.user_groups
            .iter()
            .filter(|(_, g)| g == group_id)
            .map(|(u, _)| u.clone())
            .collect()
    }

    /// Rebuild a user with memberships read from the association table
    fn read_user(&self, stored: &User) -> User {
        User::reconstruct(
            stored.id().clone(),
            stored.name().to_string(),
            stored.email().clone(),
            stored.role(),
            self.group_ids_of(stored.id()),
            stored.created_at(),
            stored.updated_at(),
        )
    }

    fn read_group(&self, stored: &Group) -> Group {
        Group::reconstruct(
            stored.id().clone(),
            stored.name().to_string(),
            stored.description().map(str::to_string),
            self.member_ids_of(stored.id()),
            stored.created_at(),
            stored.updated_at(),
        )
    }

    /// Reject writes PostgreSQL would refuse: a taken email or a dangling group reference
    fn check_user_write(
        &self,
        user: &User,
        operation: &'static str,
    ) -> Result<(), RepositoryError> {
        let email_taken = self
            .users
            .values()
            .any(|other| other.id() != user.id() && other.email() == user.email());
        if email_taken {
            return Err(RepositoryError::UniqueViolation {
                operation,
                source: DbErr::Custom(format!("users.email {} already exists", user.email())),
            });
        }
        match user.group_ids().iter().find(|g| !self.groups.contains_key(*g)) {
            Some(missing) => Err(foreign_key_violation(operation, "group", missing.as_str())),
            None => Ok(()),
        }
    }

    fn check_group_write(
        &self,
        group: &Group,
        operation: &'static str,
    ) -> Result<(), RepositoryError> {
        match group.member_ids().iter().find(|u| !self.users.contains_key(*u)) {
            Some(missing) => Err(foreign_key_violation(operation, "user", missing.as_str())),
            None => Ok(()),
        }
    }

    fn write_user(&mut self, user: &User) {
        let id = user.id().clone();
        self.user_groups.retain(|(u, _)| *u != id);
        for group_id in user.group_ids() {
            self.user_groups.insert((id.clone(), group_id.clone()));
        }
        self.users.insert(id, user.clone());
    }

    fn write_group(&mut self, group: &Group) {
        let id = group.id().clone();
        self.user_groups.retain(|(_, g)| *g != id);
        for user_id in group.member_ids() {
            self.user_groups.insert((user_id.clone(), id.clone()));
        }
        self.groups.insert(id, group.clone());
    }
}

fn foreign_key_violation(operation: &'static str, entity: &str, id: &str) -> RepositoryError {
    RepositoryError::from_db(
        operation,
        DbErr::Custom(format!("user_groups references missing {entity} {id}")),
    )
}

fn injected_failure(operation: &'static str) -> RepositoryError {
    RepositoryError::from_db(operation, DbErr::Custom("injected write failure".to_string()))
}

// ============================================================================
// In-Memory Database
// ============================================================================

/// Handle on a shared in-memory store; hands out repositories over it
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    store: Arc<RwLock<Store>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository {
            store: Arc::clone(&self.store),
            fail_writes: false,
        }
    }

    pub fn groups(&self) -> InMemoryGroupRepository {
        InMemoryGroupRepository {
            store: Arc::clone(&self.store),
            fail_writes: false,
        }
    }

    /// Pre-populate with a user (and any memberships it carries)
    pub fn with_user(self, user: User) -> Self {
        self.store.write().unwrap().write_user(&user);
        self
    }

    /// Pre-populate with a group (and any memberships it carries)
    pub fn with_group(self, group: Group) -> Self {
        self.store.write().unwrap().write_group(&group);
        self
    }

    /// Pre-populate an association row
    pub fn with_membership(self, user_id: &UserId, group_id: &GroupId) -> Self {
        self.store
            .write()
            .unwrap()
            .user_groups
            .insert((user_id.clone(), group_id.clone()));
        self
    }

    pub fn load_user(&self, id: &UserId) -> Option<User> {
        let store = self.store.read().unwrap();
        store.users.get(id).map(|u| store.read_user(u))
    }

    pub fn load_group(&self, id: &GroupId) -> Option<Group> {
        let store = self.store.read().unwrap();
        store.groups.get(id).map(|g| store.read_group(g))
    }

    pub fn user_count(&self) -> usize {
        self.store.read().unwrap().users.len()
    }

    pub fn group_count(&self) -> usize {
        self.store.read().unwrap().groups.len()
    }

    pub fn membership_rows(&self) -> Vec<(UserId, GroupId)> {
        self.store
            .read()
            .unwrap()
            .user_groups
            .iter()
            .cloned()
            .collect()
    }
}

// ============================================================================
// In-Memory User Repository
// ============================================================================

pub struct InMemoryUserRepository {
    store: Arc<RwLock<Store>>,
    fail_writes: bool,
}

impl InMemoryUserRepository {
    /// Make every write fail with a database error
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, user: &User) -> Result<(), RepositoryError> {
        if self.fail_writes {
            return Err(injected_failure("users.save"));
        }
        let mut store = self.store.write().unwrap();
        store.check_user_write(user, "users.save")?;
        store.write_user(user);
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let store = self.store.read().unwrap();
        Ok(store.users.get(id).map(|u| store.read_user(u)))
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let store = self.store.read().unwrap();
        Ok(store
            .users
            .values()
            .find(|u| u.email() == email)
            .map(|u| store.read_user(u)))
    }

    async fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        let store = self.store.read().unwrap();
        let mut users: Vec<User> = store.users.values().map(|u| store.read_user(u)).collect();
        users.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(users)
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        if self.fail_writes {
            return Err(injected_failure("users.update"));
        }
        let mut store = self.store.write().unwrap();
        if !store.users.contains_key(user.id()) {
            return Err(RepositoryError::NotFound {
                entity: "user",
                id: user.id().to_string(),
            });
        }
        store.check_user_write(user, "users.update")?;
        store.write_user(user);
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<(), RepositoryError> {
        if self.fail_writes {
            return Err(injected_failure("users.delete"));
        }
        let mut store = self.store.write().unwrap();
        store.user_groups.retain(|(u, _)| u != id);
        match store.users.remove(id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound {
                entity: "user",
                id: id.to_string(),
            }),
        }
    }
}

// ============================================================================
// In-Memory Group Repository
// ============================================================================

pub struct InMemoryGroupRepository {
    store: Arc<RwLock<Store>>,
    fail_writes: bool,
}

impl InMemoryGroupRepository {
    /// Make every write fail with a database error
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn save(&self, group: &Group) -> Result<(), RepositoryError> {
        if self.fail_writes {
            return Err(injected_failure("groups.save"));
        }
        let mut store = self.store.write().unwrap();
        store.check_group_write(group, "groups.save")?;
        store.write_group(group);
        Ok(())
    }

    async fn find_by_id(&self, id: &GroupId) -> Result<Option<Group>, RepositoryError> {
        let store = self.store.read().unwrap();
        Ok(store.groups.get(id).map(|g| store.read_group(g)))
    }

    async fn find_all(&self) -> Result<Vec<Group>, RepositoryError> {
        let store = self.store.read().unwrap();
        let mut groups: Vec<Group> = store.groups.values().map(|g| store.read_group(g)).collect();
        groups.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(groups)
    }

    async fn update(&self, group: &Group) -> Result<(), RepositoryError> {
        if self.fail_writes {
            return Err(injected_failure("groups.update"));
        }
        let mut store = self.store.write().unwrap();
        if !store.groups.contains_key(group.id()) {
            return Err(RepositoryError::NotFound {
                entity: "group",
                id: group.id().to_string(),
            });
        }
        store.check_group_write(group, "groups.update")?;
        store.write_group(group);
        Ok(())
    }

    async fn delete(&self, id: &GroupId) -> Result<(), RepositoryError> {
        if self.fail_writes {
            return Err(injected_failure("groups.delete"));
        }
        let mut store = self.store.write().unwrap();
        store.user_groups.retain(|(_, g)| g != id);
        match store.groups.remove(id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound {
                entity: "group",
                id: id.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{test_group, test_user};

    #[tokio::test]
    async fn save_then_find_round_trips() {
        let db = InMemoryDatabase::new();
        let repo = db.users();
        let user = test_user("Ann", "ann@x.com");

        repo.save(&user).await.unwrap();

        assert_eq!(repo.find_by_id(user.id()).await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn group_write_replaces_association_rows() {
        let user = test_user("Ann", "ann@x.com");
        let group = test_group("Readers");
        let db = InMemoryDatabase::new()
            .with_user(user.clone())
            .with_group(group.clone())
            .with_membership(user.id(), group.id());

        // Writing the group with its pre-membership state drops the row.
        db.groups().update(&group).await.unwrap();

        assert!(db.membership_rows().is_empty());
        let reloaded = db.users().find_by_id(user.id()).await.unwrap().unwrap();
        assert!(reloaded.group_ids().is_empty());
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let db = InMemoryDatabase::new();
        let err = db
            .users()
            .update(&test_user("Ann", "ann@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn save_with_taken_email_is_unique_violation() {
        let db = InMemoryDatabase::new().with_user(test_user("Ann", "ann@x.com"));

        let err = db
            .users()
            .save(&test_user("Other Ann", "ann@x.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::UniqueViolation { .. }));
        assert_eq!(db.user_count(), 1);
    }

    #[tokio::test]
    async fn save_referencing_missing_group_is_rejected() {
        let db = InMemoryDatabase::new();
        let mut user = test_user("Ann", "ann@x.com");
        user.join_group(test_group("Ghosts").id().clone()).unwrap();

        let err = db.users().save(&user).await.unwrap_err();

        assert!(matches!(err, RepositoryError::Database { .. }));
        assert_eq!(db.user_count(), 0);
        assert!(db.membership_rows().is_empty());
    }

    #[tokio::test]
    async fn group_update_referencing_missing_user_is_rejected() {
        let mut group = test_group("Readers");
        let db = InMemoryDatabase::new().with_group(group.clone());
        group
            .add_member(test_user("Ann", "ann@x.com").id().clone())
            .unwrap();

        let err = db.groups().update(&group).await.unwrap_err();

        assert!(matches!(err, RepositoryError::Database { .. }));
        assert!(db.membership_rows().is_empty());
    }

    #[tokio::test]
    async fn find_by_email_absent_is_none() {
        let db = InMemoryDatabase::new();
        let email = Email::parse("nobody@x.com").unwrap();
        assert!(db.users().find_by_email(&email).await.unwrap().is_none());
    }
}
