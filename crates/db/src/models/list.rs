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
    entities::{list, space},
    events::{
        EVENT_LIST_CREATED, EVENT_LIST_RESTORED, EVENT_LIST_TRASHED, EVENT_LIST_UPDATED,
        ResourceEventPayload,
    },
    hierarchy::require_parent,
    models::event_outbox::EventOutbox,
    policy::{self, Identified, Lookup},
    query::{ListQuery, Page, paginate},
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct List {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub space_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_private: bool,
    pub is_deleted: bool,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateList {
    pub space_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_private: Option<bool>,
}

/// Setting `space_id` moves the list to another space of the same workspace.
#[derive(Debug, Default, Deserialize, TS)]
pub struct UpdateList {
    pub space_id: Option<Uuid>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    pub is_private: Option<bool>,
}

impl List {
    async fn from_model<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        model: list::Model,
    ) -> Result<Self, DomainError> {
        let space_id = ids::uuid_of::<space::Entity, _>(db, model.space_id).await?;
        Ok(Self {
            id: model.uuid,
            workspace_id,
            space_id,
            name: model.name,
            description: model.description,
            is_private: model.is_private,
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
            list::Entity::NAME,
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
        data: &CreateList,
        list_id: Uuid,
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let scope = Workspace::scope(db, workspace_id).await?;
        let name = validation::required_text("name", &data.name)?;
        let space_row_id = require_parent::<space::Entity, _>(db, scope.row_id, data.space_id).await?;

        let tx = db.begin().await?;
        let now = Utc::now();
        let model = list::ActiveModel {
            uuid: Set(list_id),
            workspace_id: Set(scope.row_id),
            space_id: Set(space_row_id),
            name: Set(name),
            description: Set(validation::optional_text(data.description.as_deref())),
            is_private: Set(data.is_private.unwrap_or(false)),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&tx)
        .await?;

        Self::record_event(&tx, EVENT_LIST_CREATED, scope, list_id).await?;
        tx.commit().await?;
        tracing::debug!(%list_id, space_id = %data.space_id, "Created list");
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
        let model = policy::find_in_workspace::<list::Entity, _>(db, scope.row_id, id, lookup).await?;
        Self::from_model(db, workspace_id, model).await
    }

    /// Lists live lists, optionally only those of one space. The space's own
    /// deleted flag is not consulted.
    pub async fn list<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        space_id: Option<Uuid>,
        query: &ListQuery,
    ) -> Result<Page<Self>, DomainError> {
        let scope = Workspace::scope(db, workspace_id).await?;
        let mut filter = Condition::all();
        if let Some(space_id) = space_id {
            let space_row_id = ids::row_id::<space::Entity, _>(db, space_id)
                .await?
                .ok_or_else(|| DomainError::not_found(space::Entity::NAME, space_id))?;
            filter = filter.add(list::Column::SpaceId.eq(space_row_id));
        }

        let mut page = paginate::<list::Entity, _>(db, scope.row_id, filter, query).await?;
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
        data: &UpdateList,
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let scope = Workspace::scope(db, workspace_id).await?;
        let record =
            policy::find_in_workspace::<list::Entity, _>(db, scope.row_id, id, Lookup::Live).await?;

        let mut active: list::ActiveModel = record.into();
        if let Some(space_id) = data.space_id {
            let space_row_id = require_parent::<space::Entity, _>(db, scope.row_id, space_id).await?;
            active.space_id = Set(space_row_id);
        }
        if let Some(name) = &data.name {
            active.name = Set(validation::required_text("name", name)?);
        }
        if let Some(description) = &data.description {
            active.description = Set(validation::optional_text(description.as_deref()));
        }
        if let Some(is_private) = data.is_private {
            active.is_private = Set(is_private);
        }
        active.updated_at = Set(Utc::now());
        let tx = db.begin().await?;
        let model = active.update(&tx).await?;

        Self::record_event(&tx, EVENT_LIST_UPDATED, scope, id).await?;
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
        let transition = policy::trash::<list::Entity, _>(&tx, scope.row_id, id).await?;
        if transition.changed {
            Self::record_event(&tx, EVENT_LIST_TRASHED, scope, id).await?;
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
        let transition = policy::restore::<list::Entity, _>(&tx, scope.row_id, id).await?;
        if transition.changed {
            Self::record_event(&tx, EVENT_LIST_RESTORED, scope, id).await?;
        }
        tx.commit().await?;
        Self::from_model(db, workspace_id, transition.model).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fixtures::{named_list, named_space, seed_workspace},
        models::space::Space,
    };

    #[tokio::test]
    async fn list_under_trashed_space_is_rejected() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let space = named_space(&db, &ctx, "Archive").await;
        Space::trash(&db, ctx.workspace_id, space.id).await.unwrap();

        let err = List::create(
            &db,
            ctx.workspace_id,
            &CreateList {
                space_id: space.id,
                name: "Backlog".to_string(),
                description: None,
                is_private: None,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidParent { parent: "space", .. }));
    }

    #[tokio::test]
    async fn list_under_foreign_space_is_rejected() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let other = seed_workspace(&db).await;
        let foreign = named_space(&db, &other, "Theirs").await;

        let err = List::create(
            &db,
            ctx.workspace_id,
            &CreateList {
                space_id: foreign.id,
                name: "Backlog".to_string(),
                description: None,
                is_private: None,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidParent { .. }));
    }

    #[tokio::test]
    async fn moving_revalidates_the_new_space() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let from = named_space(&db, &ctx, "From").await;
        let to = named_space(&db, &ctx, "To").await;
        let gone = named_space(&db, &ctx, "Gone").await;
        Space::trash(&db, ctx.workspace_id, gone.id).await.unwrap();
        let list = named_list(&db, &ctx, from.id, "Backlog").await;

        let moved = List::update(
            &db,
            ctx.workspace_id,
            list.id,
            &UpdateList {
                space_id: Some(to.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(moved.space_id, to.id);
        assert_eq!(moved.workspace_id, ctx.workspace_id);

        let err = List::update(
            &db,
            ctx.workspace_id,
            list.id,
            &UpdateList {
                space_id: Some(gone.id),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidParent { .. }));
    }

    #[tokio::test]
    async fn trashing_a_space_does_not_cascade() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let space = named_space(&db, &ctx, "Ops").await;
        named_list(&db, &ctx, space.id, "Runbooks").await;
        named_list(&db, &ctx, space.id, "Incidents").await;
        Space::trash(&db, ctx.workspace_id, space.id).await.unwrap();

        let page = List::list(&db, ctx.workspace_id, Some(space.id), &ListQuery::default())
            .await
            .unwrap();
        assert_eq!(page.total_docs, 2);
    }
}
