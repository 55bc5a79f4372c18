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
    validation,
    workspace::{Workspace, WorkspaceScope},
};
use crate::{
    entities::{member, team},
    events::{
        EVENT_TEAM_CREATED, EVENT_TEAM_RESTORED, EVENT_TEAM_TRASHED, EVENT_TEAM_UPDATED,
        ResourceEventPayload,
    },
    models::event_outbox::EventOutbox,
    policy::{self, Identified, Lookup, Transition},
    query::{ListQuery, Page, paginate},
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Team {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub lead_member_id: Option<Uuid>,
    pub is_active: bool,
    pub is_deleted: bool,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateTeam {
    pub name: String,
    pub description: Option<String>,
    pub lead_member_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, TS)]
pub struct UpdateTeam {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub lead_member_id: Option<Option<Uuid>>,
}

impl Team {
    async fn from_model<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        model: team::Model,
    ) -> Result<Self, DomainError> {
        let lead_member_id =
            ids::optional_uuid_of::<member::Entity, _>(db, model.lead_member_id).await?;
        Ok(Self {
            id: model.uuid,
            workspace_id,
            name: model.name,
            description: model.description,
            lead_member_id,
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
            team::Entity::NAME,
            id,
            &ResourceEventPayload {
                workspace_id: scope.id,
                id,
            },
        )
        .await?;
        Ok(())
    }

    async fn lead_row_id<C: ConnectionTrait>(
        db: &C,
        scope: WorkspaceScope,
        lead: Option<Uuid>,
    ) -> Result<Option<i64>, DomainError> {
        match lead {
            Some(id) => Ok(Some(Member::require_current(db, scope, id).await?.id)),
            None => Ok(None),
        }
    }

    pub async fn create<C>(
        db: &C,
        workspace_id: Uuid,
        data: &CreateTeam,
        team_id: Uuid,
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let scope = Workspace::scope(db, workspace_id).await?;
        let name = validation::required_text("name", &data.name)?;
        let lead = Self::lead_row_id(db, scope, data.lead_member_id).await?;

        let tx = db.begin().await?;
        let now = Utc::now();
        let model = team::ActiveModel {
            uuid: Set(team_id),
            workspace_id: Set(scope.row_id),
            name: Set(name),
            description: Set(validation::optional_text(data.description.as_deref())),
            lead_member_id: Set(lead),
            is_active: Set(true),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&tx)
        .await?;

        Self::record_event(&tx, EVENT_TEAM_CREATED, scope, team_id).await?;
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
            policy::find_in_workspace::<team::Entity, _>(db, scope.row_id, id, Lookup::Live).await?;
        Self::from_model(db, workspace_id, model).await
    }

    /// Lists live teams. `active` narrows to active or inactive teams.
    pub async fn list<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        active: Option<bool>,
        query: &ListQuery,
    ) -> Result<Page<Self>, DomainError> {
        let scope = Workspace::scope(db, workspace_id).await?;
        let mut condition = Condition::all();
        if let Some(active) = active {
            condition = condition.add(team::Column::IsActive.eq(active));
        }

        let mut page = paginate::<team::Entity, _>(db, scope.row_id, condition, query).await?;
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
        data: &UpdateTeam,
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let scope = Workspace::scope(db, workspace_id).await?;
        let record =
            policy::find_in_workspace::<team::Entity, _>(db, scope.row_id, id, Lookup::Live).await?;

        let mut active: team::ActiveModel = record.into();
        if let Some(name) = &data.name {
            active.name = Set(validation::required_text("name", name)?);
        }
        if let Some(description) = &data.description {
            active.description = Set(validation::optional_text(description.as_deref()));
        }
        if let Some(lead) = data.lead_member_id {
            active.lead_member_id = Set(Self::lead_row_id(db, scope, lead).await?);
        }
        active.updated_at = Set(Utc::now());
        let tx = db.begin().await?;
        let model = active.update(&tx).await?;

        Self::record_event(&tx, EVENT_TEAM_UPDATED, scope, id).await?;
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
            policy::set_active::<team::Entity, _>(&tx, scope.row_id, id, active).await?;
        if changed {
            Self::record_event(&tx, EVENT_TEAM_UPDATED, scope, id).await?;
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
        let transition = policy::trash::<team::Entity, _>(&tx, scope.row_id, id).await?;
        if transition.changed {
            Self::record_event(&tx, EVENT_TEAM_TRASHED, scope, id).await?;
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
        let transition = policy::restore::<team::Entity, _>(&tx, scope.row_id, id).await?;
        if transition.changed {
            Self::record_event(&tx, EVENT_TEAM_RESTORED, scope, id).await?;
        }
        tx.commit().await?;
        Self::from_model(db, workspace_id, transition.model).await
    }
}
