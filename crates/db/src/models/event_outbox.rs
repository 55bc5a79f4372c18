use chrono::Utc;
use sea_orm::sea_query::{Expr, ExprTrait, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::event_outbox;

/// Transactional outbox for workspace events.
///
/// Every mutation records its event on the same connection as the write, so
/// an event exists exactly when its change was committed.
pub struct EventOutbox;

impl EventOutbox {
    /// Queues one event for `resource_uuid` in the given workspace.
    pub async fn record<C, P>(
        db: &C,
        workspace_uuid: Uuid,
        event_type: &str,
        resource_type: &str,
        resource_uuid: Uuid,
        payload: &P,
    ) -> Result<(), DbErr>
    where
        C: ConnectionTrait,
        P: Serialize,
    {
        let payload = serde_json::to_value(payload).map_err(|err| DbErr::Json(err.to_string()))?;
        event_outbox::ActiveModel {
            uuid: Set(Uuid::new_v4()),
            workspace_uuid: Set(workspace_uuid),
            event_type: Set(event_type.to_string()),
            resource_type: Set(resource_type.to_string()),
            resource_uuid: Set(resource_uuid),
            payload: Set(payload),
            created_at: Set(Utc::now()),
            published_at: Set(None),
            attempts: Set(0),
            last_error: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::debug!(%workspace_uuid, event_type, %resource_uuid, "Recorded event");
        Ok(())
    }

    /// Oldest unpublished events across all workspaces.
    pub async fn fetch_unpublished<C: ConnectionTrait>(
        db: &C,
        limit: u64,
    ) -> Result<Vec<event_outbox::Model>, DbErr> {
        event_outbox::Entity::find()
            .filter(event_outbox::Column::PublishedAt.is_null())
            .order_by_asc(event_outbox::Column::Id)
            .limit(limit)
            .all(db)
            .await
    }

    /// Event history of one workspace in the order it was recorded.
    pub async fn for_workspace<C: ConnectionTrait>(
        db: &C,
        workspace_uuid: Uuid,
        limit: u64,
    ) -> Result<Vec<event_outbox::Model>, DbErr> {
        event_outbox::Entity::find()
            .filter(event_outbox::Column::WorkspaceUuid.eq(workspace_uuid))
            .order_by_asc(event_outbox::Column::Id)
            .limit(limit)
            .all(db)
            .await
    }

    pub async fn mark_published<C: ConnectionTrait>(db: &C, id: i64) -> Result<(), DbErr> {
        let published_at = Expr::value(Utc::now());
        Self::touch(db, id, [(event_outbox::Column::PublishedAt, published_at)]).await
    }

    /// Counts a failed delivery attempt and keeps the event queued.
    pub async fn mark_failed<C: ConnectionTrait>(
        db: &C,
        id: i64,
        error: &str,
    ) -> Result<(), DbErr> {
        Self::touch(
            db,
            id,
            [
                (
                    event_outbox::Column::Attempts,
                    Expr::col(event_outbox::Column::Attempts).add(1),
                ),
                (event_outbox::Column::LastError, Expr::value(error)),
            ],
        )
        .await
    }

    async fn touch<C, const N: usize>(
        db: &C,
        id: i64,
        changes: [(event_outbox::Column, SimpleExpr); N],
    ) -> Result<(), DbErr>
    where
        C: ConnectionTrait,
    {
        let mut update = event_outbox::Entity::update_many();
        for (column, value) in changes {
            update = update.col_expr(column, value);
        }
        let result = update.filter(event_outbox::Column::Id.eq(id)).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(DbErr::RecordNotFound(format!("outbox event {id}")));
        }
        Ok(())
    }
}
