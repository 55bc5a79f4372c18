//! Soft-delete and active-flag rules shared by every workspace resource.
//!
//! Soft-deleted rows stay in their tables. Default reads ([`Lookup::Live`])
//! skip them; trash/restore and explicit audit reads use [`Lookup::Audit`].
//! `is_active` is a separate flag and only gates the `active` list filter.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Select};
use uuid::Uuid;

use crate::models::error::DomainError;

/// An entity addressed publicly by uuid and internally by row id.
pub trait Identified: EntityTrait {
    const NAME: &'static str;

    fn id_column() -> Self::Column;
    fn uuid_column() -> Self::Column;
}

/// An entity owned by a workspace.
pub trait Scoped: Identified {
    fn workspace_column() -> Self::Column;
}

pub trait SoftDeletable: Scoped {
    fn deleted_column() -> Self::Column;
    fn updated_at_column() -> Self::Column;
}

pub trait Activatable: SoftDeletable {
    fn active_column() -> Self::Column;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Only rows that are not soft-deleted.
    Live,
    /// Every row, deleted or not.
    Audit,
}

/// Result of an idempotent flag flip. `changed` is false when the row was
/// already in the requested state.
#[derive(Debug, Clone)]
pub struct Transition<M> {
    pub model: M,
    pub changed: bool,
}

fn by_uuid<E: SoftDeletable>(id: Uuid, lookup: Lookup) -> Select<E> {
    let select = E::find().filter(E::uuid_column().eq(id));
    match lookup {
        Lookup::Live => select.filter(E::deleted_column().eq(false)),
        Lookup::Audit => select,
    }
}

/// Loads a row of `workspace_id` by uuid.
///
/// Rows hidden by `lookup` are `NotFound`; rows that exist in a different
/// workspace are `Forbidden`.
pub async fn find_in_workspace<E, C>(
    db: &C,
    workspace_id: i64,
    id: Uuid,
    lookup: Lookup,
) -> Result<E::Model, DomainError>
where
    E: SoftDeletable,
    C: ConnectionTrait,
{
    let select = by_uuid::<E>(id, lookup);
    if let Some(model) = select
        .clone()
        .filter(E::workspace_column().eq(workspace_id))
        .one(db)
        .await?
    {
        return Ok(model);
    }

    if select.one(db).await?.is_some() {
        return Err(DomainError::Forbidden {
            entity: E::NAME,
            id: id.to_string(),
        });
    }
    Err(DomainError::not_found(E::NAME, id))
}

async fn set_deleted<E, C>(
    db: &C,
    workspace_id: i64,
    id: Uuid,
    deleted: bool,
) -> Result<Transition<E::Model>, DomainError>
where
    E: SoftDeletable,
    C: ConnectionTrait,
{
    find_in_workspace::<E, _>(db, workspace_id, id, Lookup::Audit).await?;

    let result = E::update_many()
        .col_expr(E::deleted_column(), Expr::value(deleted))
        .col_expr(E::updated_at_column(), Expr::value(Utc::now()))
        .filter(E::uuid_column().eq(id))
        .filter(E::workspace_column().eq(workspace_id))
        .filter(E::deleted_column().eq(!deleted))
        .exec(db)
        .await?;

    let model = find_in_workspace::<E, _>(db, workspace_id, id, Lookup::Audit).await?;
    Ok(Transition {
        model,
        changed: result.rows_affected > 0,
    })
}

/// Marks a row deleted. Trashing a trashed row changes nothing.
pub async fn trash<E, C>(
    db: &C,
    workspace_id: i64,
    id: Uuid,
) -> Result<Transition<E::Model>, DomainError>
where
    E: SoftDeletable,
    C: ConnectionTrait,
{
    set_deleted::<E, _>(db, workspace_id, id, true).await
}

/// Clears the deleted flag. Restoring a live row changes nothing.
pub async fn restore<E, C>(
    db: &C,
    workspace_id: i64,
    id: Uuid,
) -> Result<Transition<E::Model>, DomainError>
where
    E: SoftDeletable,
    C: ConnectionTrait,
{
    set_deleted::<E, _>(db, workspace_id, id, false).await
}

/// Sets `is_active` on a live row.
pub async fn set_active<E, C>(
    db: &C,
    workspace_id: i64,
    id: Uuid,
    active: bool,
) -> Result<Transition<E::Model>, DomainError>
where
    E: Activatable,
    C: ConnectionTrait,
{
    find_in_workspace::<E, _>(db, workspace_id, id, Lookup::Live).await?;

    let result = E::update_many()
        .col_expr(E::active_column(), Expr::value(active))
        .col_expr(E::updated_at_column(), Expr::value(Utc::now()))
        .filter(E::uuid_column().eq(id))
        .filter(E::workspace_column().eq(workspace_id))
        .filter(E::deleted_column().eq(false))
        .filter(E::active_column().eq(!active))
        .exec(db)
        .await?;

    let model = find_in_workspace::<E, _>(db, workspace_id, id, Lookup::Live).await?;
    Ok(Transition {
        model,
        changed: result.rows_affected > 0,
    })
}
