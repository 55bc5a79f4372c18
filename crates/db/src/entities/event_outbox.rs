//! Append-only log of workspace events waiting to be published.

use sea_orm::JsonValue;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "event_outbox")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uuid: Uuid,
    /// Public id of the workspace the event belongs to.
    pub workspace_uuid: Uuid,
    /// Dotted name such as `task.updated`.
    pub event_type: String,
    pub resource_type: String,
    pub resource_uuid: Uuid,
    pub payload: JsonValue,
    pub created_at: DateTimeUtc,
    pub published_at: Option<DateTimeUtc>,
    pub attempts: i32,
    pub last_error: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
