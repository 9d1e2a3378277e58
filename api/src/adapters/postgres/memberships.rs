//! Association-row helpers shared by both repositories

use std::collections::HashMap;

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entity::user_groups;

/// Which side of the association an aggregate sits on
#[derive(Debug, Clone, Copy)]
pub(super) enum Side {
    User,
    Group,
}

impl Side {
    fn own_column(self) -> user_groups::Column {
        match self {
            Side::User => user_groups::Column::UserId,
            Side::Group => user_groups::Column::GroupId,
        }
    }

    fn other_column(self) -> user_groups::Column {
        match self {
            Side::User => user_groups::Column::GroupId,
            Side::Group => user_groups::Column::UserId,
        }
    }

    fn split(self, row: user_groups::Model) -> (String, String) {
        match self {
            Side::User => (row.user_id, row.group_id),
            Side::Group => (row.group_id, row.user_id),
        }
    }
}

/// Ids on the other side of the association for one aggregate, ordered
pub(super) async fn linked_ids<C: ConnectionTrait>(
    conn: &C,
    side: Side,
    id: &str,
) -> Result<Vec<String>, DbErr> {
    let rows = user_groups::Entity::find()
        .filter(side.own_column().eq(id))
        .order_by_asc(side.other_column())
        .all(conn)
        .await?;

    Ok(rows.into_iter().map(|row| side.split(row).1).collect())
}

/// Every association row, grouped by this side's id
pub(super) async fn all_linked_ids<C: ConnectionTrait>(
    conn: &C,
    side: Side,
) -> Result<HashMap<String, Vec<String>>, DbErr> {
    let rows = user_groups::Entity::find()
        .order_by_asc(side.own_column())
        .order_by_asc(side.other_column())
        .all(conn)
        .await?;

    let mut linked: HashMap<String, Vec<String>> = HashMap::new();
    for row in rows {
        let (own, other) = side.split(row);
        linked.entry(own).or_default().push(other);
    }
    Ok(linked)
}

/// Remove every association row for one aggregate
pub(super) async fn clear<C: ConnectionTrait>(conn: &C, side: Side, id: &str) -> Result<(), DbErr> {
    user_groups::Entity::delete_many()
        .filter(side.own_column().eq(id))
        .exec(conn)
        .await?;
    Ok(())
}

/// Replace one aggregate's association rows with `others`
pub(super) async fn replace<C, I>(conn: &C, side: Side, id: &str, others: I) -> Result<(), DbErr>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = String>,
{
    clear(conn, side, id).await?;

    let rows: Vec<user_groups::ActiveModel> = others
        .into_iter()
        .map(|other| {
            let (user_id, group_id) = match side {
                Side::User => (id.to_string(), other),
                Side::Group => (other, id.to_string()),
            };
            user_groups::ActiveModel {
                user_id: Set(user_id),
                group_id: Set(group_id),
            }
        })
        .collect();

    if rows.is_empty() {
        return Ok(());
    }

    user_groups::Entity::insert_many(rows)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}
