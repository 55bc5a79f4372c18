//! Parent validation for writes that attach a row to another row.
//!
//! Soft delete does not cascade: a trashed Space keeps its Lists and Tasks
//! untouched, but nothing new may be attached under it.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use crate::{
    entities::{list, space, task},
    models::error::DomainError,
    policy::{Identified, SoftDeletable},
};

/// Resolves `parent` to its row id, provided it is a live row of
/// `workspace_id`.
pub async fn require_parent<E, C>(
    db: &C,
    workspace_id: i64,
    parent: Uuid,
) -> Result<i64, DomainError>
where
    E: SoftDeletable,
    C: ConnectionTrait,
{
    E::find()
        .select_only()
        .column(E::id_column())
        .filter(E::uuid_column().eq(parent))
        .filter(E::workspace_column().eq(workspace_id))
        .filter(E::deleted_column().eq(false))
        .into_tuple::<i64>()
        .one(db)
        .await?
        .ok_or_else(|| DomainError::invalid_parent(E::NAME, parent))
}

/// Row ids for the optional list/space scope of a checklist item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChecklistScope {
    pub space_id: Option<i64>,
    pub list_id: Option<i64>,
}

/// Validates the optional scope of a checklist item against its task: the
/// list must be the task's list and the space must be that list's space.
pub async fn checklist_scope<C: ConnectionTrait>(
    db: &C,
    task: &task::Model,
    space_id: Option<Uuid>,
    list_id: Option<Uuid>,
) -> Result<ChecklistScope, DomainError> {
    let mut scope = ChecklistScope::default();

    if let Some(list_uuid) = list_id {
        let list_row_id = require_parent::<list::Entity, _>(db, task.workspace_id, list_uuid).await?;
        if list_row_id != task.list_id {
            return Err(DomainError::invalid_parent(list::Entity::NAME, list_uuid));
        }
        scope.list_id = Some(list_row_id);
    }

    if let Some(space_uuid) = space_id {
        let space_row_id =
            require_parent::<space::Entity, _>(db, task.workspace_id, space_uuid).await?;
        let task_space_id: Option<i64> = list::Entity::find_by_id(task.list_id)
            .select_only()
            .column(list::Column::SpaceId)
            .into_tuple()
            .one(db)
            .await?;
        if task_space_id != Some(space_row_id) {
            return Err(DomainError::invalid_parent(space::Entity::NAME, space_uuid));
        }
        scope.space_id = Some(space_row_id);
    }

    Ok(scope)
}
