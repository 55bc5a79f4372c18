use sea_orm::entity::prelude::*;

use crate::{
    policy::{Identified, Scoped, SoftDeletable},
    query::Listable,
};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "spaces")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uuid: Uuid,
    pub workspace_id: i64,
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_private: bool,
    pub is_deleted: bool,
    pub creator_member_id: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Identified for Entity {
    const NAME: &'static str = "space";

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
        &[Column::Name]
    }

    fn sortable_columns() -> &'static [Column] {
        &[Column::Name, Column::CreatedAt, Column::UpdatedAt]
    }

    fn created_at_column() -> Column {
        Column::CreatedAt
    }
}
