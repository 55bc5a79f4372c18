use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, Set, TransactionSession,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::{
    error::DomainError,
    ids::{self, deserialize_some},
    member::Member,
    mention_index::MentionIndex,
    validation,
    workspace::{Workspace, WorkspaceScope},
};
use crate::{
    entities::{list, member, task},
    events::{
        EVENT_TASK_CREATED, EVENT_TASK_RESTORED, EVENT_TASK_TRASHED, EVENT_TASK_UPDATED,
        TaskEventPayload,
    },
    hierarchy::require_parent,
    models::event_outbox::EventOutbox,
    policy::{self, Identified, Lookup},
    query::{ListQuery, Page, paginate},
    types::{MentionSource, TaskPriority, TaskStatus},
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Task {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub list_id: Uuid,
    pub name: String,
    /// Rich-text JSON document.
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Option<TaskPriority>,
    #[ts(type = "Date | null")]
    pub start_at: Option<DateTime<Utc>>,
    #[ts(type = "Date | null")]
    pub due_at: Option<DateTime<Utc>>,
    pub assignee_ids: Vec<Uuid>,
    /// Stored assignees that never resolved to a member, kept verbatim until
    /// the assignee set is replaced.
    pub legacy_assignee_ids: Vec<String>,
    pub mentioned_member_ids: Vec<Uuid>,
    pub creator_member_id: Uuid,
    pub is_deleted: bool,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateTask {
    pub list_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub start_at: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assignee_ids: Vec<Uuid>,
    pub creator_member_id: Uuid,
}

/// Assignees are changed through the assignment operations, not here.
#[derive(Debug, Default, Deserialize, TS)]
pub struct UpdateTask {
    pub list_id: Option<Uuid>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub priority: Option<Option<TaskPriority>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub start_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub due_at: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct TaskFilter {
    pub list_id: Option<Uuid>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

fn check_window(
    start_at: Option<DateTime<Utc>>,
    due_at: Option<DateTime<Utc>>,
) -> Result<(), DomainError> {
    match (start_at, due_at) {
        (Some(start), Some(due)) if start > due => Err(DomainError::validation(
            "due_at",
            format!("due date {due} is before start date {start}"),
        )),
        _ => Ok(()),
    }
}

impl Task {
    pub(crate) async fn from_model<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        model: task::Model,
    ) -> Result<Self, DomainError> {
        let list_id = ids::uuid_of::<list::Entity, _>(db, model.list_id).await?;
        let creator_member_id =
            ids::uuid_of::<member::Entity, _>(db, model.creator_member_id).await?;
        let (assignee_ids, legacy_assignee_ids) = ids::split_ids(&model.assignee_ids);
        Ok(Self {
            id: model.uuid,
            workspace_id,
            list_id,
            name: model.name,
            description: model.description,
            status: model.status,
            priority: model.priority,
            start_at: model.start_at,
            due_at: model.due_at,
            assignee_ids,
            legacy_assignee_ids,
            mentioned_member_ids: ids::decode_uuids(&model.mentioned_member_ids),
            creator_member_id,
            is_deleted: model.is_deleted,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    async fn models_to_page<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        mut page: Page<task::Model>,
    ) -> Result<Page<Self>, DomainError> {
        let mut docs = Vec::with_capacity(page.docs.len());
        for model in std::mem::take(&mut page.docs) {
            docs.push(Self::from_model(db, workspace_id, model).await?);
        }
        Ok(page.with_docs(docs))
    }

    pub(crate) async fn record_event<C: ConnectionTrait>(
        db: &C,
        event_type: &str,
        scope: WorkspaceScope,
        model: &task::Model,
    ) -> Result<(), DomainError> {
        let list_id = ids::uuid_of::<list::Entity, _>(db, model.list_id).await?;
        EventOutbox::record(
            db,
            scope.id,
            event_type,
            task::Entity::NAME,
            model.uuid,
            &TaskEventPayload {
                workspace_id: scope.id,
                task_id: model.uuid,
                list_id,
            },
        )
        .await?;
        Ok(())
    }

    pub async fn create<C>(
        db: &C,
        workspace_id: Uuid,
        data: &CreateTask,
        task_id: Uuid,
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let scope = Workspace::scope(db, workspace_id).await?;
        let name = validation::required_text("name", &data.name)?;
        check_window(data.start_at, data.due_at)?;
        let list_row_id = require_parent::<list::Entity, _>(db, scope.row_id, data.list_id).await?;
        let creator = Member::require_current(db, scope, data.creator_member_id).await?;
        let assignees = Self::validated_assignees(db, scope, &data.assignee_ids).await?;
        let description = validation::optional_text(data.description.as_deref());

        let tx = db.begin().await?;
        let mentions = MentionIndex::resolve(&tx, scope.row_id, description.as_deref()).await?;
        let now = Utc::now();
        let model = task::ActiveModel {
            uuid: Set(task_id),
            workspace_id: Set(scope.row_id),
            list_id: Set(list_row_id),
            name: Set(name),
            description: Set(description),
            status: Set(data.status.unwrap_or_default()),
            priority: Set(data.priority),
            start_at: Set(data.start_at),
            due_at: Set(data.due_at),
            assignee_ids: Set(ids::encode_uuids(&assignees)),
            mentioned_member_ids: Set(ids::encode_uuids(&mentions.member_ids)),
            creator_member_id: Set(creator.id),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&tx)
        .await?;
        MentionIndex::replace(
            &tx,
            scope.row_id,
            MentionSource::Task,
            model.id,
            &mentions.member_row_ids,
        )
        .await?;
        Self::record_event(&tx, EVENT_TASK_CREATED, scope, &model).await?;
        tx.commit().await?;

        tracing::debug!(%task_id, list_id = %data.list_id, "Created task");
        Self::from_model(db, workspace_id, model).await
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        id: Uuid,
    ) -> Result<Self, DomainError> {
        Self::find(db, workspace_id, id, Lookup::Live).await
    }

    pub async fn find_for_audit<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        id: Uuid,
    ) -> Result<Self, DomainError> {
        Self::find(db, workspace_id, id, Lookup::Audit).await
    }

    async fn find<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        id: Uuid,
        lookup: Lookup,
    ) -> Result<Self, DomainError> {
        let scope = Workspace::scope(db, workspace_id).await?;
        let model = policy::find_in_workspace::<task::Entity, _>(db, scope.row_id, id, lookup).await?;
        Self::from_model(db, workspace_id, model).await
    }

    pub async fn list<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        filter: &TaskFilter,
        query: &ListQuery,
    ) -> Result<Page<Self>, DomainError> {
        let scope = Workspace::scope(db, workspace_id).await?;
        let mut condition = Condition::all();
        if let Some(list_id) = filter.list_id {
            let list_row_id = ids::row_id::<list::Entity, _>(db, list_id)
                .await?
                .ok_or_else(|| DomainError::not_found(list::Entity::NAME, list_id))?;
            condition = condition.add(task::Column::ListId.eq(list_row_id));
        }
        if let Some(status) = filter.status {
            condition = condition.add(task::Column::Status.eq(status));
        }
        if let Some(priority) = filter.priority {
            condition = condition.add(task::Column::Priority.eq(priority));
        }

        let page = paginate::<task::Entity, _>(db, scope.row_id, condition, query).await?;
        Self::models_to_page(db, workspace_id, page).await
    }

    /// Live tasks whose description mentions `member_id`.
    pub async fn find_mentioning<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        member_id: Uuid,
        query: &ListQuery,
    ) -> Result<Page<Self>, DomainError> {
        let scope = Workspace::scope(db, workspace_id).await?;
        let member =
            policy::find_in_workspace::<member::Entity, _>(db, scope.row_id, member_id, Lookup::Audit)
                .await?;
        let condition = Condition::all().add(
            task::Column::Id.in_subquery(MentionIndex::sources_mentioning(
                MentionSource::Task,
                member.id,
            )),
        );

        let page = paginate::<task::Entity, _>(db, scope.row_id, condition, query).await?;
        Self::models_to_page(db, workspace_id, page).await
    }

    pub async fn update<C>(
        db: &C,
        workspace_id: Uuid,
        id: Uuid,
        data: &UpdateTask,
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let scope = Workspace::scope(db, workspace_id).await?;
        let record =
            policy::find_in_workspace::<task::Entity, _>(db, scope.row_id, id, Lookup::Live).await?;

        let start_at = data.start_at.unwrap_or(record.start_at);
        let due_at = data.due_at.unwrap_or(record.due_at);
        check_window(start_at, due_at)?;

        let mut active: task::ActiveModel = record.into();
        if let Some(list_id) = data.list_id {
            let list_row_id = require_parent::<list::Entity, _>(db, scope.row_id, list_id).await?;
            active.list_id = Set(list_row_id);
        }
        if let Some(name) = &data.name {
            active.name = Set(validation::required_text("name", name)?);
        }
        if let Some(status) = data.status {
            active.status = Set(status);
        }
        if let Some(priority) = data.priority {
            active.priority = Set(priority);
        }
        active.start_at = Set(start_at);
        active.due_at = Set(due_at);

        let tx = db.begin().await?;
        let mut reindex = None;
        if let Some(description) = &data.description {
            let description = validation::optional_text(description.as_deref());
            let mentions = MentionIndex::resolve(&tx, scope.row_id, description.as_deref()).await?;
            active.mentioned_member_ids = Set(ids::encode_uuids(&mentions.member_ids));
            active.description = Set(description);
            reindex = Some(mentions.member_row_ids);
        }
        active.updated_at = Set(Utc::now());
        let model = active.update(&tx).await?;
        if let Some(member_row_ids) = reindex {
            MentionIndex::replace(
                &tx,
                scope.row_id,
                MentionSource::Task,
                model.id,
                &member_row_ids,
            )
            .await?;
        }
        Self::record_event(&tx, EVENT_TASK_UPDATED, scope, &model).await?;
        tx.commit().await?;

        Self::from_model(db, workspace_id, model).await
    }

    /// Soft-deletes the task. Comments and checklist items are left as they
    /// are.
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
        let transition = policy::trash::<task::Entity, _>(&tx, scope.row_id, id).await?;
        if transition.changed {
            Self::record_event(&tx, EVENT_TASK_TRASHED, scope, &transition.model).await?;
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
        let transition = policy::restore::<task::Entity, _>(&tx, scope.row_id, id).await?;
        if transition.changed {
            Self::record_event(&tx, EVENT_TASK_RESTORED, scope, &transition.model).await?;
        }
        tx.commit().await?;
        Self::from_model(db, workspace_id, transition.model).await
    }
}
