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
    ids,
    member::Member,
    mention_index::{MentionIndex, ResolvedMentions},
    workspace::{Workspace, WorkspaceScope},
};
use crate::{
    entities::{comment, member, task},
    events::{
        CommentEventPayload, EVENT_COMMENT_CREATED, EVENT_COMMENT_RESTORED,
        EVENT_COMMENT_TRASHED, EVENT_COMMENT_UPDATED,
    },
    hierarchy::require_parent,
    models::event_outbox::EventOutbox,
    policy::{self, Identified, Lookup},
    query::{ListQuery, Page, paginate},
    types::MentionSource,
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Comment {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub task_id: Uuid,
    pub author_member_id: Uuid,
    /// Rich-text JSON document, stored as written.
    pub body: String,
    pub mentioned_member_ids: Vec<Uuid>,
    pub is_deleted: bool,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateComment {
    pub task_id: Uuid,
    pub author_member_id: Uuid,
    pub body: String,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct UpdateComment {
    pub body: String,
}

fn check_body(body: &str) -> Result<(), DomainError> {
    if body.trim().is_empty() {
        return Err(DomainError::validation("body", "must not be empty"));
    }
    Ok(())
}

impl Comment {
    async fn from_model<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        model: comment::Model,
    ) -> Result<Self, DomainError> {
        let task_id = ids::uuid_of::<task::Entity, _>(db, model.task_id).await?;
        let author_member_id = ids::uuid_of::<member::Entity, _>(db, model.author_member_id).await?;
        Ok(Self {
            id: model.uuid,
            workspace_id,
            task_id,
            author_member_id,
            body: model.body,
            mentioned_member_ids: ids::decode_uuids(&model.mentioned_member_ids),
            is_deleted: model.is_deleted,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    async fn models_to_page<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        mut page: Page<comment::Model>,
    ) -> Result<Page<Self>, DomainError> {
        let mut docs = Vec::with_capacity(page.docs.len());
        for model in std::mem::take(&mut page.docs) {
            docs.push(Self::from_model(db, workspace_id, model).await?);
        }
        Ok(page.with_docs(docs))
    }

    async fn record_event<C: ConnectionTrait>(
        db: &C,
        event_type: &str,
        scope: WorkspaceScope,
        model: &comment::Model,
    ) -> Result<(), DomainError> {
        let task_id = ids::uuid_of::<task::Entity, _>(db, model.task_id).await?;
        EventOutbox::record(
            db,
            scope.id,
            event_type,
            comment::Entity::NAME,
            model.uuid,
            &CommentEventPayload {
                workspace_id: scope.id,
                comment_id: model.uuid,
                task_id,
                mentioned_member_ids: ids::decode_uuids(&model.mentioned_member_ids),
            },
        )
        .await?;
        Ok(())
    }

    pub async fn create<C>(
        db: &C,
        workspace_id: Uuid,
        data: &CreateComment,
        comment_id: Uuid,
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let scope = Workspace::scope(db, workspace_id).await?;
        check_body(&data.body)?;
        let task_row_id = require_parent::<task::Entity, _>(db, scope.row_id, data.task_id).await?;
        let author = Member::require_current(db, scope, data.author_member_id).await?;

        let tx = db.begin().await?;
        let mentions: ResolvedMentions =
            MentionIndex::resolve(&tx, scope.row_id, Some(&data.body)).await?;
        let now = Utc::now();
        let model = comment::ActiveModel {
            uuid: Set(comment_id),
            workspace_id: Set(scope.row_id),
            task_id: Set(task_row_id),
            author_member_id: Set(author.id),
            body: Set(data.body.clone()),
            mentioned_member_ids: Set(ids::encode_uuids(&mentions.member_ids)),
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
            MentionSource::Comment,
            model.id,
            &mentions.member_row_ids,
        )
        .await?;
        Self::record_event(&tx, EVENT_COMMENT_CREATED, scope, &model).await?;
        tx.commit().await?;

        tracing::debug!(
            %comment_id,
            task_id = %data.task_id,
            mentions = mentions.member_ids.len(),
            "Created comment"
        );
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
        let model =
            policy::find_in_workspace::<comment::Entity, _>(db, scope.row_id, id, lookup).await?;
        Self::from_model(db, workspace_id, model).await
    }

    /// Live comments of a task. The task itself may be trashed.
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
        let condition = Condition::all().add(comment::Column::TaskId.eq(task.id));

        let page = paginate::<comment::Entity, _>(db, scope.row_id, condition, query).await?;
        Self::models_to_page(db, workspace_id, page).await
    }

    /// Live comments whose body mentions `member_id`.
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
        let condition = Condition::all().add(comment::Column::Id.in_subquery(
            MentionIndex::sources_mentioning(MentionSource::Comment, member.id),
        ));

        let page = paginate::<comment::Entity, _>(db, scope.row_id, condition, query).await?;
        Self::models_to_page(db, workspace_id, page).await
    }

    /// Replaces the body and re-derives its mentions in the same transaction.
    pub async fn update<C>(
        db: &C,
        workspace_id: Uuid,
        id: Uuid,
        data: &UpdateComment,
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let scope = Workspace::scope(db, workspace_id).await?;
        check_body(&data.body)?;
        let record =
            policy::find_in_workspace::<comment::Entity, _>(db, scope.row_id, id, Lookup::Live)
                .await?;

        let tx = db.begin().await?;
        let mentions = MentionIndex::resolve(&tx, scope.row_id, Some(&data.body)).await?;
        let mut active: comment::ActiveModel = record.into();
        active.body = Set(data.body.clone());
        active.mentioned_member_ids = Set(ids::encode_uuids(&mentions.member_ids));
        active.updated_at = Set(Utc::now());
        let model = active.update(&tx).await?;
        MentionIndex::replace(
            &tx,
            scope.row_id,
            MentionSource::Comment,
            model.id,
            &mentions.member_row_ids,
        )
        .await?;
        Self::record_event(&tx, EVENT_COMMENT_UPDATED, scope, &model).await?;
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
        let transition = policy::trash::<comment::Entity, _>(&tx, scope.row_id, id).await?;
        if transition.changed {
            Self::record_event(&tx, EVENT_COMMENT_TRASHED, scope, &transition.model).await?;
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
        let transition = policy::restore::<comment::Entity, _>(&tx, scope.row_id, id).await?;
        if transition.changed {
            Self::record_event(&tx, EVENT_COMMENT_RESTORED, scope, &transition.model).await?;
        }
        tx.commit().await?;
        Self::from_model(db, workspace_id, transition.model).await
    }
}
