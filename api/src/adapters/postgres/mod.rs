//! PostgreSQL adapters
//!
//! Implementations of repository traits using SeaORM and PostgreSQL.
//! Both repositories read and write the shared `user_groups` table.

pub mod group_repo;
mod memberships;
pub mod schema;
pub mod user_repo;


pub use group_repo::PostgresGroupRepository;
pub use schema::ensure_schema;
pub use user_repo::PostgresUserRepository;
