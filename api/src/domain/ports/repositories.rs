//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Implementations are provided by adapters (e.g., PostgreSQL).
//!
//! Membership lives in one association table shared by both repositories.
//! Writing an aggregate replaces all of its association rows with the
//! aggregate's current membership set; reading an aggregate always
//! re-derives the set from that table.

use async_trait::async_trait;

use crate::domain::entities::{Group, User};
use crate::domain::values::{Email, GroupId, UserId};
use crate::error::RepositoryError;

/// Repository for User aggregates
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Insert or overwrite a user and its memberships
    async fn save(&self, user: &User) -> Result<(), RepositoryError>;

    /// Find a user by ID
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;

    /// Find a user by normalized email
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// All users, oldest first
    async fn find_all(&self) -> Result<Vec<User>, RepositoryError>;

    /// Overwrite an existing user; fails with `NotFound` if it is absent
    async fn update(&self, user: &User) -> Result<(), RepositoryError>;

    /// Delete a user and its memberships; fails with `NotFound` if it is absent
    async fn delete(&self, id: &UserId) -> Result<(), RepositoryError>;
}

/// Repository for Group aggregates
#[async_trait]
pub trait GroupRepository: Send + Sync + 'static {
    /// Insert or overwrite a group and its memberships
    async fn save(&self, group: &Group) -> Result<(), RepositoryError>;

    /// Find a group by ID
    async fn find_by_id(&self, id: &GroupId) -> Result<Option<Group>, RepositoryError>;

    /// All groups, oldest first
    async fn find_all(&self) -> Result<Vec<Group>, RepositoryError>;

    /// Overwrite an existing group; fails with `NotFound` if it is absent
    async fn update(&self, group: &Group) -> Result<(), RepositoryError>;

    /// Delete a group and its memberships; fails with `NotFound` if it is absent
    async fn delete(&self, id: &GroupId) -> Result<(), RepositoryError>;
}
