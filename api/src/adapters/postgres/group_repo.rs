//! PostgreSQL adapter for GroupRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set, TransactionTrait,
};

use super::memberships::{self, Side};
use crate::domain::entities::Group;
use crate::domain::ports::GroupRepository;
use crate::domain::values::{GroupId, UserId};
use crate::entity::groups;
use crate::error::RepositoryError;

/// PostgreSQL implementation of GroupRepository
pub struct PostgresGroupRepository {
    db: DatabaseConnection,
}

impl PostgresGroupRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn active_model(group: &Group) -> groups::ActiveModel {
    groups::ActiveModel {
        id: Set(group.id().to_string()),
        name: Set(group.name().to_string()),
        description: Set(group.description().map(str::to_string)),
        created_at: Set(group.created_at().fixed_offset()),
        updated_at: Set(group.updated_at().fixed_offset()),
    }
}

fn member_id_strings(group: &Group) -> impl Iterator<Item = String> + '_ {
    group.member_ids().iter().map(|id| id.to_string())
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn save(&self, group: &Group) -> Result<(), RepositoryError> {
        let op = "groups.save";
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| RepositoryError::from_db(op, e))?;

        groups::Entity::insert(active_model(group))
            .on_conflict(
                OnConflict::column(groups::Column::Id)
                    .update_columns([
                        groups::Column::Name,
                        groups::Column::Description,
                        groups::Column::CreatedAt,
                        groups::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(|e| RepositoryError::from_db(op, e))?;

        memberships::replace(&txn, Side::Group, group.id().as_str(), member_id_strings(group))
            .await
            .map_err(|e| RepositoryError::from_db(op, e))?;

        txn.commit()
            .await
            .map_err(|e| RepositoryError::from_db(op, e))
    }

    async fn find_by_id(&self, id: &GroupId) -> Result<Option<Group>, RepositoryError> {
        let op = "groups.find_by_id";
        let Some(model) = groups::Entity::find_by_id(id.as_str())
            .one(&self.db)
            .await
            .map_err(|e| RepositoryError::from_db(op, e))?
        else {
            return Ok(None);
        };

        let member_ids = memberships::linked_ids(&self.db, Side::Group, &model.id)
            .await
            .map_err(|e| RepositoryError::from_db(op, e))?;

        Ok(Some(to_group(model, member_ids)))
    }

    async fn find_all(&self) -> Result<Vec<Group>, RepositoryError> {
        let op = "groups.find_all";
        let models = groups::Entity::find()
            .order_by_asc(groups::Column::CreatedAt)
            .order_by_asc(groups::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| RepositoryError::from_db(op, e))?;

        let mut linked = memberships::all_linked_ids(&self.db, Side::Group)
            .await
            .map_err(|e| RepositoryError::from_db(op, e))?;

        Ok(models
            .into_iter()
            .map(|model| {
                let member_ids = linked.remove(&model.id).unwrap_or_default();
                to_group(model, member_ids)
            })
            .collect())
    }

    async fn update(&self, group: &Group) -> Result<(), RepositoryError> {
        let op = "groups.update";
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| RepositoryError::from_db(op, e))?;

        match active_model(group).update(&txn).await {
            Ok(_) => {}
            Err(DbErr::RecordNotUpdated) => {
                return Err(RepositoryError::NotFound {
                    entity: "group",
                    id: group.id().to_string(),
                })
            }
            Err(e) => return Err(RepositoryError::from_db(op, e)),
        }

        memberships::replace(&txn, Side::Group, group.id().as_str(), member_id_strings(group))
            .await
            .map_err(|e| RepositoryError::from_db(op, e))?;

        txn.commit()
            .await
            .map_err(|e| RepositoryError::from_db(op, e))
    }

    async fn delete(&self, id: &GroupId) -> Result<(), RepositoryError> {
        let op = "groups.delete";
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| RepositoryError::from_db(op, e))?;

        memberships::clear(&txn, Side::Group, id.as_str())
            .await
            .map_err(|e| RepositoryError::from_db(op, e))?;

        let result = groups::Entity::delete_by_id(id.as_str())
            .exec(&txn)
            .await
            .map_err(|e| RepositoryError::from_db(op, e))?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "group",
                id: id.to_string(),
            });
        }

        txn.commit()
            .await
            .map_err(|e| RepositoryError::from_db(op, e))
    }
}

/// Convert a stored row plus its association rows into a Group
fn to_group(model: groups::Model, member_ids: Vec<String>) -> Group {
    Group::reconstruct(
        GroupId::from_persisted(model.id),
        model.name,
        model.description,
        member_ids.into_iter().map(UserId::from_persisted),
        model.created_at.with_timezone(&Utc),
        model.updated_at.with_timezone(&Utc),
    )
}
