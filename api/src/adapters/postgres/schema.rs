//! Schema bootstrap
//!
//! The SQL script is idempotent, so running it on every start is safe.

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr};

const USERS_GROUPS: &str = include_str!("../../../migrations/0001_users_groups.sql");

/// Create the `users`, `groups` and `user_groups` tables if they are missing
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute_unprepared(USERS_GROUPS).await?;
    tracing::info!("Database schema ready");
    Ok(())
}
