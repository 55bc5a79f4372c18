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
    ids::deserialize_some,
    validation,
    workspace::{Workspace, WorkspaceScope},
};
use crate::{
    entities::office,
    events::{
        EVENT_OFFICE_CREATED, EVENT_OFFICE_RESTORED, EVENT_OFFICE_TRASHED, EVENT_OFFICE_UPDATED,
        ResourceEventPayload,
    },
    models::event_outbox::EventOutbox,
    policy::{self, Identified, Lookup, Transition},
    query::{ListQuery, Page, paginate},
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Office {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    /// IANA zone name, as given.
    pub timezone: Option<String>,
    pub is_active: bool,
    pub is_deleted: bool,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateOffice {
    pub name: String,
    pub address: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Default, Deserialize, TS)]
pub struct UpdateOffice {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub timezone: Option<Option<String>>,
}

impl Office {
    fn from_model(workspace_id: Uuid, model: office::Model) -> Self {
        Self {
            id: model.uuid,
            workspace_id,
            name: model.name,
            address: model.address,
            timezone: model.timezone,
            is_active: model.is_active,
            is_deleted: model.is_deleted,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
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
            office::Entity::NAME,
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
        data: &CreateOffice,
        office_id: Uuid,
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let scope = Workspace::scope(db, workspace_id).await?;
        let name = validation::required_text("name", &data.name)?;

        let tx = db.begin().await?;
        let now = Utc::now();
        let model = office::ActiveModel {
            uuid: Set(office_id),
            workspace_id: Set(scope.row_id),
            name: Set(name),
            address: Set(validation::optional_text(data.address.as_deref())),
            timezone: Set(validation::optional_text(data.timezone.as_deref())),
            is_active: Set(true),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&tx)
        .await?;

        Self::record_event(&tx, EVENT_OFFICE_CREATED, scope, office_id).await?;
        tx.commit().await?;
        Ok(Self::from_model(workspace_id, model))
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        id: Uuid,
    ) -> Result<Self, DomainError> {
        let scope = Workspace::scope(db, workspace_id).await?;
        let model =
            policy::find_in_workspace::<office::Entity, _>(db, scope.row_id, id, Lookup::Live)
                .await?;
        Ok(Self::from_model(workspace_id, model))
    }

    pub async fn list<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        active: Option<bool>,
        query: &ListQuery,
    ) -> Result<Page<Self>, DomainError> {
        let scope = Workspace::scope(db, workspace_id).await?;
        let mut condition = Condition::all();
        if let Some(active) = active {
            condition = condition.add(office::Column::IsActive.eq(active));
        }

        let mut page = paginate::<office::Entity, _>(db, scope.row_id, condition, query).await?;
        let docs = std::mem::take(&mut page.docs)
            .into_iter()
            .map(|model| Self::from_model(workspace_id, model))
            .collect();
        Ok(page.with_docs(docs))
    }

    pub async fn update<C>(
        db: &C,
        workspace_id: Uuid,
        id: Uuid,
        data: &UpdateOffice,
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let scope = Workspace::scope(db, workspace_id).await?;
        let record =
            policy::find_in_workspace::<office::Entity, _>(db, scope.row_id, id, Lookup::Live)
                .await?;

        let mut active: office::ActiveModel = record.into();
        if let Some(name) = &data.name {
            active.name = Set(validation::required_text("name", name)?);
        }
        if let Some(address) = &data.address {
            active.address = Set(validation::optional_text(address.as_deref()));
        }
        if let Some(timezone) = &data.timezone {
            active.timezone = Set(validation::optional_text(timezone.as_deref()));
        }
        active.updated_at = Set(Utc::now());
        let tx = db.begin().await?;
        let model = active.update(&tx).await?;

        Self::record_event(&tx, EVENT_OFFICE_UPDATED, scope, id).await?;
        tx.commit().await?;
        Ok(Self::from_model(workspace_id, model))
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
            policy::set_active::<office::Entity, _>(&tx, scope.row_id, id, active).await?;
        if changed {
            Self::record_event(&tx, EVENT_OFFICE_UPDATED, scope, id).await?;
        }
        tx.commit().await?;
        Ok(Self::from_model(workspace_id, model))
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
        let transition = policy::trash::<office::Entity, _>(&tx, scope.row_id, id).await?;
        if transition.changed {
            Self::record_event(&tx, EVENT_OFFICE_TRASHED, scope, id).await?;
        }
        tx.commit().await?;
        Ok(Self::from_model(workspace_id, transition.model))
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
        let transition = policy::restore::<office::Entity, _>(&tx, scope.row_id, id).await?;
        if transition.changed {
            Self::record_event(&tx, EVENT_OFFICE_RESTORED, scope, id).await?;
        }
        tx.commit().await?;
        Ok(Self::from_model(workspace_id, transition.model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fixtures::seed_workspace, models::event_outbox::EventOutbox};

    #[tokio::test]
    async fn active_toggle_is_idempotent_and_independent_of_trash() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let office = Office::create(
            &db,
            ctx.workspace_id,
            &CreateOffice {
                name: "Lisbon".to_string(),
                address: Some("Rua Augusta 1".to_string()),
                timezone: Some("Europe/Lisbon".to_string()),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();
        assert!(office.is_active);

        let before = EventOutbox::fetch_unpublished(&db, 100).await.unwrap().len();
        Office::set_active(&db, ctx.workspace_id, office.id, false)
            .await
            .unwrap();
        let again = Office::set_active(&db, ctx.workspace_id, office.id, false)
            .await
            .unwrap();
        assert!(!again.is_active);
        assert_eq!(
            EventOutbox::fetch_unpublished(&db, 100).await.unwrap().len(),
            before + 1
        );

        let trashed = Office::trash(&db, ctx.workspace_id, office.id).await.unwrap();
        assert!(trashed.is_deleted);
        assert!(!trashed.is_active);
        let restored = Office::restore(&db, ctx.workspace_id, office.id)
            .await
            .unwrap();
        assert!(!restored.is_deleted);
        assert!(!restored.is_active);

        let search = Office::list(
            &db,
            ctx.workspace_id,
            None,
            &ListQuery::default().with_search("augusta"),
        )
        .await
        .unwrap();
        assert_eq!(search.total_docs, 1);
    }
}
