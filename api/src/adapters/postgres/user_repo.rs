//! PostgreSQL adapter for UserRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use super::memberships::{self, Side};
use crate::domain::entities::User;
use crate::domain::ports::UserRepository;
use crate::domain::values::{Email, GroupId, Role, UserId};
use crate::entity::users;
use crate::error::RepositoryError;

/// PostgreSQL implementation of UserRepository
pub struct PostgresUserRepository {
    db: DatabaseConnection,
}

impl PostgresUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn with_memberships(&self, model: users::Model) -> Result<User, RepositoryError> {
        let group_ids = memberships::linked_ids(&self.db, Side::User, &model.id)
            .await
            .map_err(|e| RepositoryError::from_db("users.find", e))?;
        to_user(model, group_ids)
    }
}

fn active_model(user: &User) -> users::ActiveModel {
    users::ActiveModel {
        id: Set(user.id().to_string()),
        name: Set(user.name().to_string()),
        email: Set(user.email().to_string()),
        role: Set(user.role().to_string()),
        created_at: Set(user.created_at().fixed_offset()),
        updated_at: Set(user.updated_at().fixed_offset()),
    }
}

fn group_id_strings(user: &User) -> impl Iterator<Item = String> + '_ {
    user.group_ids().iter().map(|id| id.to_string())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn save(&self, user: &User) -> Result<(), RepositoryError> {
        let op = "users.save";
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| RepositoryError::from_db(op, e))?;

        users::Entity::insert(active_model(user))
            .on_conflict(
                OnConflict::column(users::Column::Id)
                    .update_columns([
                        users::Column::Name,
                        users::Column::Email,
                        users::Column::Role,
                        users::Column::CreatedAt,
                        users::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(|e| RepositoryError::from_db(op, e))?;

        memberships::replace(&txn, Side::User, user.id().as_str(), group_id_strings(user))
            .await
            .map_err(|e| RepositoryError::from_db(op, e))?;

        txn.commit()
            .await
            .map_err(|e| RepositoryError::from_db(op, e))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let result = users::Entity::find_by_id(id.as_str())
            .one(&self.db)
            .await
            .map_err(|e| RepositoryError::from_db("users.find_by_id", e))?;

        match result {
            Some(model) => self.with_memberships(model).await.map(Some),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let result = users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(&self.db)
            .await
            .map_err(|e| RepositoryError::from_db("users.find_by_email", e))?;

        match result {
            Some(model) => self.with_memberships(model).await.map(Some),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        let op = "users.find_all";
        let models = users::Entity::find()
            .order_by_asc(users::Column::CreatedAt)
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| RepositoryError::from_db(op, e))?;

        let mut linked = memberships::all_linked_ids(&self.db, Side::User)
            .await
            .map_err(|e| RepositoryError::from_db(op, e))?;

        models
            .into_iter()
            .map(|model| {
                let group_ids = linked.remove(&model.id).unwrap_or_default();
                to_user(model, group_ids)
            })
            .collect()
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        let op = "users.update";
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| RepositoryError::from_db(op, e))?;

        match active_model(user).update(&txn).await {
            Ok(_) => {}
            Err(DbErr::RecordNotUpdated) => {
                return Err(RepositoryError::NotFound {
                    entity: "user",
                    id: user.id().to_string(),
                })
            }
            Err(e) => return Err(RepositoryError::from_db(op, e)),
        }

        memberships::replace(&txn, Side::User, user.id().as_str(), group_id_strings(user))
            .await
            .map_err(|e| RepositoryError::from_db(op, e))?;

        txn.commit()
            .await
            .map_err(|e| RepositoryError::from_db(op, e))
    }

    async fn delete(&self, id: &UserId) -> Result<(), RepositoryError> {
        let op = "users.delete";
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| RepositoryError::from_db(op, e))?;

        memberships::clear(&txn, Side::User, id.as_str())
            .await
            .map_err(|e| RepositoryError::from_db(op, e))?;

        let result = users::Entity::delete_by_id(id.as_str())
            .exec(&txn)
            .await
            .map_err(|e| RepositoryError::from_db(op, e))?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "user",
                id: id.to_string(),
            });
        }

        txn.commit()
            .await
            .map_err(|e| RepositoryError::from_db(op, e))
    }
}

/// Convert a stored row plus its association rows into a User
fn to_user(model: users::Model, group_ids: Vec<String>) -> Result<User, RepositoryError> {
    let role = Role::parse(&model.role).map_err(|e| RepositoryError::CorruptRow {
        entity: "user",
        id: model.id.clone(),
        reason: e.to_string(),
    })?;

    Ok(User::reconstruct(
        UserId::from_persisted(model.id),
        model.name,
        Email::from_persisted(model.email),
        role,
        group_ids.into_iter().map(GroupId::from_persisted),
        model.created_at.with_timezone(&Utc),
        model.updated_at.with_timezone(&Utc),
    ))
}
