use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, Condition, ConnectionTrait, Set, TransactionSession, TransactionTrait,
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
    entities::{member, space},
    events::{
        EVENT_SPACE_CREATED, EVENT_SPACE_RESTORED, EVENT_SPACE_TRASHED, EVENT_SPACE_UPDATED,
        ResourceEventPayload,
    },
    models::event_outbox::EventOutbox,
    policy::{self, Identified, Lookup},
    query::{ListQuery, Page, paginate},
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Space {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_private: bool,
    pub is_deleted: bool,
    pub creator_member_id: Uuid,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateSpace {
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_private: Option<bool>,
    pub creator_member_id: Uuid,
}

#[derive(Debug, Default, Deserialize, TS)]
pub struct UpdateSpace {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub color: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub icon: Option<Option<String>>,
    pub is_private: Option<bool>,
}

impl Space {
    async fn from_model<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        model: space::Model,
    ) -> Result<Self, DomainError> {
        let creator_member_id = ids::uuid_of::<member::Entity, _>(db, model.creator_member_id).await?;
        Ok(Self {
            id: model.uuid,
            workspace_id,
            name: model.name,
            color: model.color,
            icon: model.icon,
            is_private: model.is_private,
            is_deleted: model.is_deleted,
            creator_member_id,
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
            space::Entity::NAME,
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
        data: &CreateSpace,
        space_id: Uuid,
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let scope = Workspace::scope(db, workspace_id).await?;
        let name = validation::required_text("name", &data.name)?;
        let color = validation::color(data.color.as_deref())?;
        let creator = Member::require_current(db, scope, data.creator_member_id).await?;

        let tx = db.begin().await?;
        let now = Utc::now();
        let model = space::ActiveModel {
            uuid: Set(space_id),
            workspace_id: Set(scope.row_id),
            name: Set(name),
            color: Set(color),
            icon: Set(validation::optional_text(data.icon.as_deref())),
            is_private: Set(data.is_private.unwrap_or(false)),
            is_deleted: Set(false),
            creator_member_id: Set(creator.id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&tx)
        .await?;

        Self::record_event(&tx, EVENT_SPACE_CREATED, scope, space_id).await?;
        tx.commit().await?;
        tracing::debug!(%space_id, %workspace_id, "Created space");
        Self::from_model(db, workspace_id, model).await
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        id: Uuid,
    ) -> Result<Self, DomainError> {
        Self::find(db, workspace_id, id, Lookup::Live).await
    }

    /// Reads a space whether or not it is trashed.
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
        let model = policy::find_in_workspace::<space::Entity, _>(db, scope.row_id, id, lookup).await?;
        Self::from_model(db, workspace_id, model).await
    }

    pub async fn list<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        query: &ListQuery,
    ) -> Result<Page<Self>, DomainError> {
        let scope = Workspace::scope(db, workspace_id).await?;
        let mut page = paginate::<space::Entity, _>(db, scope.row_id, Condition::all(), query).await?;
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
        data: &UpdateSpace,
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let scope = Workspace::scope(db, workspace_id).await?;
        let record =
            policy::find_in_workspace::<space::Entity, _>(db, scope.row_id, id, Lookup::Live).await?;

        let mut active: space::ActiveModel = record.into();
        if let Some(name) = &data.name {
            active.name = Set(validation::required_text("name", name)?);
        }
        if let Some(color) = &data.color {
            active.color = Set(validation::color(color.as_deref())?);
        }
        if let Some(icon) = &data.icon {
            active.icon = Set(validation::optional_text(icon.as_deref()));
        }
        if let Some(is_private) = data.is_private {
            active.is_private = Set(is_private);
        }
        active.updated_at = Set(Utc::now());
        let tx = db.begin().await?;
        let model = active.update(&tx).await?;

        Self::record_event(&tx, EVENT_SPACE_UPDATED, scope, id).await?;
        tx.commit().await?;
        Self::from_model(db, workspace_id, model).await
    }

    /// Soft-deletes the space. Its lists and tasks are left as they are.
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
        let transition = policy::trash::<space::Entity, _>(&tx, scope.row_id, id).await?;
        if transition.changed {
            Self::record_event(&tx, EVENT_SPACE_TRASHED, scope, id).await?;
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
        let transition = policy::restore::<space::Entity, _>(&tx, scope.row_id, id).await?;
        if transition.changed {
            Self::record_event(&tx, EVENT_SPACE_RESTORED, scope, id).await?;
        }
        tx.commit().await?;
        Self::from_model(db, workspace_id, transition.model).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fixtures::{named_space, seed_workspace},
        models::event_outbox::EventOutbox,
    };

    #[tokio::test]
    async fn trash_is_undone_when_its_event_cannot_be_recorded() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let space = named_space(&db, &ctx, "Design").await;

        db.execute_unprepared("DROP TABLE event_outbox").await.unwrap();
        assert!(Space::trash(&db, ctx.workspace_id, space.id).await.is_err());
        let live = Space::find_by_id(&db, ctx.workspace_id, space.id).await.unwrap();
        assert!(!live.is_deleted);
    }

    #[tokio::test]
    async fn trash_and_restore_are_idempotent() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let space = named_space(&db, &ctx, "Design").await;
        let events_before = EventOutbox::fetch_unpublished(&db, 100).await.unwrap().len();

        let trashed = Space::trash(&db, ctx.workspace_id, space.id).await.unwrap();
        assert!(trashed.is_deleted);
        let again = Space::trash(&db, ctx.workspace_id, space.id).await.unwrap();
        assert!(again.is_deleted);
        let events = EventOutbox::fetch_unpublished(&db, 100).await.unwrap();
        assert_eq!(events.len(), events_before + 1);

        assert!(matches!(
            Space::find_by_id(&db, ctx.workspace_id, space.id).await,
            Err(DomainError::NotFound { entity: "space", .. })
        ));
        let audited = Space::find_for_audit(&db, ctx.workspace_id, space.id)
            .await
            .unwrap();
        assert!(audited.is_deleted);

        let restored = Space::restore(&db, ctx.workspace_id, space.id).await.unwrap();
        assert!(!restored.is_deleted);
        Space::restore(&db, ctx.workspace_id, space.id).await.unwrap();
        assert_eq!(
            EventOutbox::fetch_unpublished(&db, 100).await.unwrap().len(),
            events_before + 2
        );
    }

    #[tokio::test]
    async fn invalid_color_is_rejected() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let err = Space::create(
            &db,
            ctx.workspace_id,
            &CreateSpace {
                name: "Ops".to_string(),
                color: Some("red".to_string()),
                icon: None,
                is_private: None,
                creator_member_id: ctx.owner_id,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed { field: "color", .. }));
    }

    #[tokio::test]
    async fn cross_workspace_access_is_forbidden() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let other = seed_workspace(&db).await;
        let space = named_space(&db, &other, "Theirs").await;

        assert!(matches!(
            Space::find_by_id(&db, ctx.workspace_id, space.id).await,
            Err(DomainError::Forbidden { entity: "space", .. })
        ));
        assert!(matches!(
            Space::trash(&db, ctx.workspace_id, space.id).await,
            Err(DomainError::Forbidden { .. })
        ));
    }

    #[tokio::test]
    async fn update_sets_and_clears_fields() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let space = named_space(&db, &ctx, "Design").await;

        let updated = Space::update(
            &db,
            ctx.workspace_id,
            space.id,
            &UpdateSpace {
                name: Some("Product design".to_string()),
                color: Some(Some("#FA0".to_string())),
                icon: Some(Some("palette".to_string())),
                is_private: Some(true),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Product design");
        assert_eq!(updated.color.as_deref(), Some("#fa0"));
        assert!(updated.is_private);

        let cleared = Space::update(
            &db,
            ctx.workspace_id,
            space.id,
            &UpdateSpace {
                color: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(cleared.color, None);
        assert_eq!(cleared.icon.as_deref(), Some("palette"));
    }
}
