use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, Set, TransactionSession,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::{
    error::DomainError,
    ids,
    member::Member,
    validation,
    workspace::{Workspace, WorkspaceScope},
};
use crate::{
    entities::{checklist_item, list, member, space, task},
    events::{
        EVENT_CHECKLIST_ITEM_CREATED, EVENT_CHECKLIST_ITEM_RESTORED, EVENT_CHECKLIST_ITEM_TRASHED,
        EVENT_CHECKLIST_ITEM_UPDATED, ResourceEventPayload,
    },
    hierarchy::{checklist_scope, require_parent},
    models::event_outbox::EventOutbox,
    policy::{self, Identified, Lookup},
    query::{ListQuery, Page, paginate},
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ChecklistItem {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub task_id: Uuid,
    pub space_id: Option<Uuid>,
    pub list_id: Option<Uuid>,
    pub name: String,
    pub is_done: bool,
    pub creator_member_id: Uuid,
    pub is_deleted: bool,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

/// `space_id` and `list_id` optionally pin the item to its task's list and
/// that list's space.
#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateChecklistItem {
    pub task_id: Uuid,
    pub space_id: Option<Uuid>,
    pub list_id: Option<Uuid>,
    pub name: String,
    pub creator_member_id: Uuid,
}

#[derive(Debug, Default, Deserialize, TS)]
pub struct UpdateChecklistItem {
    pub name: Option<String>,
    pub is_done: Option<bool>,
}

impl ChecklistItem {
    async fn from_model<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        model: checklist_item::Model,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id: model.uuid,
            workspace_id,
            task_id: ids::uuid_of::<task::Entity, _>(db, model.task_id).await?,
            space_id: ids::optional_uuid_of::<space::Entity, _>(db, model.space_id).await?,
            list_id: ids::optional_uuid_of::<list::Entity, _>(db, model.list_id).await?,
            name: model.name,
            is_done: model.is_done,
            creator_member_id: ids::uuid_of::<member::Entity, _>(db, model.creator_member_id)
                .await?,
            is_deleted: model.is_deleted,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    async fn record_event<C: ConnectionTrait>(
        db: &C,
        event_type: &str,
        scope: WorkspaceScope,
        id: Uuid,
    ) -> Result<(), DomainError> {
        EventOutbox::record(
            db,
            scope.id,
            event_type,
            checklist_item::Entity::NAME,
            id,
            &ResourceEventPayload {
                workspace_id: scope.id,
                id,
            },
        )
        .await?;
        Ok(())
    }

    pub async fn create<C>(
        db: &C,
        workspace_id: Uuid,
        data: &CreateChecklistItem,
        item_id: Uuid,
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let scope = Workspace::scope(db, workspace_id).await?;
        let name = validation::required_text("name", &data.name)?;
        let task_row_id = require_parent::<task::Entity, _>(db, scope.row_id, data.task_id).await?;
        let task = task::Entity::find_by_id(task_row_id)
            .one(db)
            .await?
            .ok_or_else(|| DomainError::invalid_parent(task::Entity::NAME, data.task_id))?;
        let parents = checklist_scope(db, &task, data.space_id, data.list_id).await?;
        let creator = Member::require_current(db, scope, data.creator_member_id).await?;

        let tx = db.begin().await?;
        let now = Utc::now();
        let model = checklist_item::ActiveModel {
            uuid: Set(item_id),
            workspace_id: Set(scope.row_id),
            task_id: Set(task.id),
            space_id: Set(parents.space_id),
            list_id: Set(parents.list_id),
            name: Set(name),
            is_done: Set(false),
            creator_member_id: Set(creator.id),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&tx)
        .await?;

        Self::record_event(&tx, EVENT_CHECKLIST_ITEM_CREATED, scope, item_id).await?;
        tx.commit().await?;
        Self::from_model(db, workspace_id, model).await
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        id: Uuid,
    ) -> Result<Self, DomainError> {
        let scope = Workspace::scope(db, workspace_id).await?;
        let model =
            policy::find_in_workspace::<checklist_item::Entity, _>(db, scope.row_id, id, Lookup::Live)
                .await?;
        Self::from_model(db, workspace_id, model).await
    }

    pub async fn list_for_task<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        task_id: Uuid,
        query: &ListQuery,
    ) -> Result<Page<Self>, DomainError> {
        let scope = Workspace::scope(db, workspace_id).await?;
        let task =
            policy::find_in_workspace::<task::Entity, _>(db, scope.row_id, task_id, Lookup::Audit)
                .await?;
        let condition = Condition::all().add(checklist_item::Column::TaskId.eq(task.id));

        let mut page =
            paginate::<checklist_item::Entity, _>(db, scope.row_id, condition, query).await?;
        let mut docs = Vec::with_capacity(page.docs.len());
        for model in std::mem::take(&mut page.docs) {
            docs.push(Self::from_model(db, workspace_id, model).await?);
        }
        Ok(page.with_docs(docs))
    }

    pub async fn update<C>(
        db: &C,
        workspace_id: Uuid,
        id: Uuid,
        data: &UpdateChecklistItem,
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let scope = Workspace::scope(db, workspace_id).await?;
        let record =
            policy::find_in_workspace::<checklist_item::Entity, _>(db, scope.row_id, id, Lookup::Live)
                .await?;

        let mut active: checklist_item::ActiveModel = record.into();
        if let Some(name) = &data.name {
            active.name = Set(validation::required_text("name", name)?);
        }
        if let Some(is_done) = data.is_done {
            active.is_done = Set(is_done);
        }
        active.updated_at = Set(Utc::now());
        let tx = db.begin().await?;
        let model = active.update(&tx).await?;

        Self::record_event(&tx, EVENT_CHECKLIST_ITEM_UPDATED, scope, id).await?;
        tx.commit().await?;
        Self::from_model(db, workspace_id, model).await
    }

    pub async fn trash<C>(
        db: &C,
        workspace_id: Uuid,
        id: Uuid,
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let scope = Workspace::scope(db, workspace_id).await?;
        let tx = db.begin().await?;
        let transition = policy::trash::<checklist_item::Entity, _>(&tx, scope.row_id, id).await?;
        if transition.changed {
            Self::record_event(&tx, EVENT_CHECKLIST_ITEM_TRASHED, scope, id).await?;
        }
        tx.commit().await?;
        Self::from_model(db, workspace_id, transition.model).await
    }

    pub async fn restore<C>(
        db: &C,
        workspace_id: Uuid,
        id: Uuid,
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let scope = Workspace::scope(db, workspace_id).await?;
        let tx = db.begin().await?;
        let transition = policy::restore::<checklist_item::Entity, _>(&tx, scope.row_id, id).await?;
        if transition.changed {
            Self::record_event(&tx, EVENT_CHECKLIST_ITEM_RESTORED, scope, id).await?;
        }
        tx.commit().await?;
        Self::from_model(db, workspace_id, transition.model).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{Ctx, named_list, named_space, named_task, seed_workspace};

    fn item(
        ctx: &Ctx,
        task_id: Uuid,
        space_id: Option<Uuid>,
        list_id: Option<Uuid>,
    ) -> CreateChecklistItem {
        CreateChecklistItem {
            task_id,
            space_id,
            list_id,
            name: "Write tests".to_string(),
            creator_member_id: ctx.owner_id,
        }
    }

    #[tokio::test]
    async fn scope_must_match_the_task() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let space = named_space(&db, &ctx, "Eng").await;
        let other_space = named_space(&db, &ctx, "Ops").await;
        let list = named_list(&db, &ctx, space.id, "Sprint").await;
        let other_list = named_list(&db, &ctx, space.id, "Backlog").await;
        let task = named_task(&db, &ctx, list.id, "Ship").await;

        let created = ChecklistItem::create(
            &db,
            ctx.workspace_id,
            &item(&ctx, task.id, Some(space.id), Some(list.id)),
            Uuid::new_v4(),
        )
        .await
        .unwrap();
        assert_eq!(created.space_id, Some(space.id));
        assert_eq!(created.list_id, Some(list.id));
        assert!(!created.is_done);

        let err = ChecklistItem::create(
            &db,
            ctx.workspace_id,
            &item(&ctx, task.id, None, Some(other_list.id)),
            Uuid::new_v4(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidParent { parent: "list", .. }));

        let err = ChecklistItem::create(
            &db,
            ctx.workspace_id,
            &item(&ctx, task.id, Some(other_space.id), None),
            Uuid::new_v4(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidParent { parent: "space", .. }));
    }

    #[tokio::test]
    async fn items_can_be_checked_and_trashed() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let space = named_space(&db, &ctx, "Eng").await;
        let list = named_list(&db, &ctx, space.id, "Sprint").await;
        let task = named_task(&db, &ctx, list.id, "Ship").await;
        let created = ChecklistItem::create(
            &db,
            ctx.workspace_id,
            &item(&ctx, task.id, None, None),
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let done = ChecklistItem::update(
            &db,
            ctx.workspace_id,
            created.id,
            &UpdateChecklistItem {
                is_done: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(done.is_done);

        ChecklistItem::trash(&db, ctx.workspace_id, created.id)
            .await
            .unwrap();
        let page = ChecklistItem::list_for_task(&db, ctx.workspace_id, task.id, &ListQuery::default())
            .await
            .unwrap();
        assert_eq!(page.total_docs, 0);
        let restored = ChecklistItem::restore(&db, ctx.workspace_id, created.id)
            .await
            .unwrap();
        assert!(!restored.is_deleted);
    }
}
