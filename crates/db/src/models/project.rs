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
    validation,
    workspace::{Workspace, WorkspaceScope},
};
use crate::{
    entities::{project, team},
    events::{
        EVENT_PROJECT_CREATED, EVENT_PROJECT_RESTORED, EVENT_PROJECT_TRASHED,
        EVENT_PROJECT_UPDATED, ResourceEventPayload,
    },
    hierarchy::require_parent,
    models::event_outbox::EventOutbox,
    policy::{self, Identified, Lookup, Transition},
    query::{ListQuery, Page, paginate},
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Project {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub team_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub is_deleted: bool,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateProject {
    pub team_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, TS)]
pub struct UpdateProject {
    #[serde(default, deserialize_with = "deserialize_some")]
    pub team_id: Option<Option<Uuid>>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct ProjectFilter {
    pub team_id: Option<Uuid>,
    pub active: Option<bool>,
}

impl Project {
    async fn from_model<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        model: project::Model,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id: model.uuid,
            workspace_id,
            team_id: ids::optional_uuid_of::<team::Entity, _>(db, model.team_id).await?,
            name: model.name,
            description: model.description,
            is_active: model.is_active,
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
            project::Entity::NAME,
            id,
            &ResourceEventPayload {
                workspace_id: scope.id,
                id,
            },
        )
        .await?;
        Ok(())
    }

    async fn team_row_id<C: ConnectionTrait>(
        db: &C,
        scope: WorkspaceScope,
        team_id: Option<Uuid>,
    ) -> Result<Option<i64>, DomainError> {
        match team_id {
            Some(team_id) => Ok(Some(
                require_parent::<team::Entity, _>(db, scope.row_id, team_id).await?,
            )),
            None => Ok(None),
        }
    }

    pub async fn create<C>(
        db: &C,
        workspace_id: Uuid,
        data: &CreateProject,
        project_id: Uuid,
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let scope = Workspace::scope(db, workspace_id).await?;
        let name = validation::required_text("name", &data.name)?;
        let team_row_id = Self::team_row_id(db, scope, data.team_id).await?;

        let tx = db.begin().await?;
        let now = Utc::now();
        let model = project::ActiveModel {
            uuid: Set(project_id),
            workspace_id: Set(scope.row_id),
            team_id: Set(team_row_id),
            name: Set(name),
            description: Set(validation::optional_text(data.description.as_deref())),
            is_active: Set(true),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&tx)
        .await?;

        Self::record_event(&tx, EVENT_PROJECT_CREATED, scope, project_id).await?;
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
            policy::find_in_workspace::<project::Entity, _>(db, scope.row_id, id, Lookup::Live)
                .await?;
        Self::from_model(db, workspace_id, model).await
    }

    pub async fn list<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        filter: &ProjectFilter,
        query: &ListQuery,
    ) -> Result<Page<Self>, DomainError> {
        let scope = Workspace::scope(db, workspace_id).await?;
        let mut condition = Condition::all();
        if let Some(team_id) = filter.team_id {
            let team_row_id = ids::row_id::<team::Entity, _>(db, team_id)
                .await?
                .ok_or_else(|| DomainError::not_found(team::Entity::NAME, team_id))?;
            condition = condition.add(project::Column::TeamId.eq(team_row_id));
        }
        if let Some(active) = filter.active {
            condition = condition.add(project::Column::IsActive.eq(active));
        }

        let mut page = paginate::<project::Entity, _>(db, scope.row_id, condition, query).await?;
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
        data: &UpdateProject,
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let scope = Workspace::scope(db, workspace_id).await?;
        let record =
            policy::find_in_workspace::<project::Entity, _>(db, scope.row_id, id, Lookup::Live)
                .await?;

        let mut active: project::ActiveModel = record.into();
        if let Some(team_id) = data.team_id {
            active.team_id = Set(Self::team_row_id(db, scope, team_id).await?);
        }
        if let Some(name) = &data.name {
            active.name = Set(validation::required_text("name", name)?);
        }
        if let Some(description) = &data.description {
            active.description = Set(validation::optional_text(description.as_deref()));
        }
        active.updated_at = Set(Utc::now());
        let tx = db.begin().await?;
        let model = active.update(&tx).await?;

        Self::record_event(&tx, EVENT_PROJECT_UPDATED, scope, id).await?;
        tx.commit().await?;
        Self::from_model(db, workspace_id, model).await
    }

    pub async fn set_active<C>(
        db: &C,
        workspace_id: Uuid,
        id: Uuid,
        active: bool,
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let scope = Workspace::scope(db, workspace_id).await?;
        let tx = db.begin().await?;
        let Transition { model, changed } =
            policy::set_active::<project::Entity, _>(&tx, scope.row_id, id, active).await?;
        if changed {
            Self::record_event(&tx, EVENT_PROJECT_UPDATED, scope, id).await?;
        }
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
        let transition = policy::trash::<project::Entity, _>(&tx, scope.row_id, id).await?;
        if transition.changed {
            Self::record_event(&tx, EVENT_PROJECT_TRASHED, scope, id).await?;
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
        let transition = policy::restore::<project::Entity, _>(&tx, scope.row_id, id).await?;
        if transition.changed {
            Self::record_event(&tx, EVENT_PROJECT_RESTORED, scope, id).await?;
        }
        tx.commit().await?;
        Self::from_model(db, workspace_id, transition.model).await
    }
}
