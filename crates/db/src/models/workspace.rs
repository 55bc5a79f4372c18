use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
    TransactionSession, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::{
    error::DomainError,
    ids::deserialize_some,
    member::{AddMember, Member},
    validation,
};
use crate::{
    entities::workspace,
    events::{EVENT_WORKSPACE_CREATED, EVENT_WORKSPACE_UPDATED, ResourceEventPayload},
    models::{event_outbox::EventOutbox, ids},
    policy::Identified,
    types::MemberRole,
};

/// A workspace uuid together with its row id, resolved once per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceScope {
    pub id: Uuid,
    pub row_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateWorkspace {
    pub name: String,
    pub description: Option<String>,
    pub owner_user_id: Uuid,
    pub owner_display_name: String,
    pub owner_email: Option<String>,
}

#[derive(Debug, Default, Deserialize, TS)]
pub struct UpdateWorkspace {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
}

impl Workspace {
    fn from_model(model: workspace::Model) -> Self {
        Self {
            id: model.uuid,
            name: model.name,
            description: model.description,
            owner_user_id: model.owner_user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    pub async fn scope<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<WorkspaceScope, DomainError> {
        let row_id = ids::row_id::<workspace::Entity, _>(db, id)
            .await?
            .ok_or_else(|| DomainError::not_found(workspace::Entity::NAME, id))?;
        Ok(WorkspaceScope { id, row_id })
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Self, DomainError> {
        workspace::Entity::find()
            .filter(workspace::Column::Uuid.eq(id))
            .one(db)
            .await?
            .map(Self::from_model)
            .ok_or_else(|| DomainError::not_found(workspace::Entity::NAME, id))
    }

    /// Creates the workspace and its owner membership together.
    pub async fn create<C>(
        db: &C,
        data: &CreateWorkspace,
        workspace_id: Uuid,
        owner_member_id: Uuid,
    ) -> Result<(Self, Member), DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let name = validation::required_text("name", &data.name)?;
        let tx = db.begin().await?;

        let now = Utc::now();
        let model = workspace::ActiveModel {
            uuid: Set(workspace_id),
            name: Set(name),
            description: Set(validation::optional_text(data.description.as_deref())),
            owner_user_id: Set(data.owner_user_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&tx)
        .await?;

        let owner = Member::add(
            &tx,
            workspace_id,
            &AddMember {
                user_id: data.owner_user_id,
                display_name: data.owner_display_name.clone(),
                email: data.owner_email.clone(),
                role: Some(MemberRole::Owner),
            },
            owner_member_id,
        )
        .await?;

        EventOutbox::record(
            &tx,
            workspace_id,
            EVENT_WORKSPACE_CREATED,
            workspace::Entity::NAME,
            workspace_id,
            &ResourceEventPayload {
                workspace_id,
                id: workspace_id,
            },
        )
        .await?;
        tx.commit().await?;

        tracing::debug!(%workspace_id, "Created workspace");
        Ok((Self::from_model(model), owner))
    }

    pub async fn update<C>(
        db: &C,
        id: Uuid,
        data: &UpdateWorkspace,
) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let record = workspace::Entity::find()
            .filter(workspace::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or_else(|| DomainError::not_found(workspace::Entity::NAME, id))?;

        let mut active: workspace::ActiveModel = record.into();
        if let Some(name) = &data.name {
            active.name = Set(validation::required_text("name", name)?);
        }
        if let Some(description) = &data.description {
            active.description = Set(validation::optional_text(description.as_deref()));
        }
        active.updated_at = Set(Utc::now());
        let tx = db.begin().await?;
        let model = active.update(&tx).await?;
        EventOutbox::record(
            &tx,
            id,
            EVENT_WORKSPACE_UPDATED,
            workspace::Entity::NAME,
            id,
            &ResourceEventPayload {
                workspace_id: id,
                id,
            },
        )
        .await?;
        tx.commit().await?;
        Ok(Self::from_model(model))
    }
}
