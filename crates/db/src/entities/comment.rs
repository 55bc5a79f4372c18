use sea_orm::JsonValue;
use sea_orm::entity::prelude::*;

use crate::{
    policy::{Identified, Scoped, SoftDeletable},
    query::Listable,
};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uuid: Uuid,
    pub workspace_id: i64,
    pub task_id: i64,
    pub author_member_id: i64,
    pub body: String,
    pub mentioned_member_ids: JsonValue,
    pub is_deleted: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Identified for Entity {
    const NAME: &'static str = "comment";

    fn id_column() -> Column {
        Column::Id
    }

    fn uuid_column() -> Column {
        Column::Uuid
    }
}

impl Scoped for Entity {
    fn workspace_column() -> Column {
        Column::WorkspaceId
    }
}

impl SoftDeletable for Entity {
    fn deleted_column() -> Column {
        Column::IsDeleted
    }

    fn updated_at_column() -> Column {
        Column::UpdatedAt
    }
}

impl Listable for Entity {
    fn search_columns() -> &'static [Column] {
        &[Column::Body]
    }

    fn sortable_columns() -> &'static [Column] {
        &[Column::CreatedAt, Column::UpdatedAt]
    }

    fn created_at_column() -> Column {
        Column::CreatedAt
    }
}
