use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionSession, TransactionTrait,
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
    entities::member,
    events::{
        EVENT_MEMBER_ADDED, EVENT_MEMBER_REMOVED, EVENT_MEMBER_UPDATED, ResourceEventPayload,
    },
    models::event_outbox::EventOutbox,
    policy::{self, Identified, Lookup},
    query::{ListQuery, Page, paginate},
    types::MemberRole,
};

/// A user's membership in a workspace. Assignees and mentions refer to
/// members by `id`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Member {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub email: Option<String>,
    pub role: MemberRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct AddMember {
    pub user_id: Uuid,
    pub display_name: String,
    pub email: Option<String>,
    pub role: Option<MemberRole>,
}

#[derive(Debug, Default, Deserialize, TS)]
pub struct UpdateMember {
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub email: Option<Option<String>>,
    pub role: Option<MemberRole>,
}

impl Member {
    pub(crate) fn from_model(workspace_id: Uuid, model: member::Model) -> Self {
        Self {
            id: model.uuid,
            workspace_id,
            user_id: model.user_id,
            display_name: model.display_name,
            email: model.email,
            role: model.role,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    /// Adds `user_id` to the workspace. A previously removed membership is
    /// reinstated under its original id.
    pub async fn add<C>(
        db: &C,
        workspace_id: Uuid,
        data: &AddMember,
        member_id: Uuid,
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let scope = Workspace::scope(db, workspace_id).await?;
        let display_name = validation::required_text("display_name", &data.display_name)?;
        let email = validation::optional_text(data.email.as_deref());
        let role = data.role.unwrap_or_default();
        let now = Utc::now();

        let existing = member::Entity::find()
            .filter(member::Column::WorkspaceId.eq(scope.row_id))
            .filter(member::Column::UserId.eq(data.user_id))
            .one(db)
            .await?;

        let tx = db.begin().await?;
        let model = match existing {
            Some(record) if !record.is_deleted => {
                return Err(DomainError::validation(
                    "user_id",
                    format!("user {} is already a member", data.user_id),
                ));
            }
            Some(record) => {
                let mut active: member::ActiveModel = record.into();
                active.display_name = Set(display_name);
                active.email = Set(email);
                active.role = Set(role);
                active.is_deleted = Set(false);
                active.updated_at = Set(now);
                active.update(&tx).await?
            }
            None => {
                member::ActiveModel {
                    uuid: Set(member_id),
                    workspace_id: Set(scope.row_id),
                    user_id: Set(data.user_id),
                    display_name: Set(display_name),
                    email: Set(email),
                    role: Set(role),
                    is_deleted: Set(false),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&tx)
                .await?
            }
        };
        EventOutbox::record(
            &tx,
            workspace_id,
            EVENT_MEMBER_ADDED,
            member::Entity::NAME,
            model.uuid,
            &ResourceEventPayload {
                workspace_id,
                id: model.uuid,
            },
        )
        .await?;
        tx.commit().await?;

        tracing::debug!(member_id = %model.uuid, %workspace_id, "Added workspace member");
        Ok(Self::from_model(workspace_id, model))
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        id: Uuid,
    ) -> Result<Self, DomainError> {
        let scope = Workspace::scope(db, workspace_id).await?;
        let model =
            policy::find_in_workspace::<member::Entity, _>(db, scope.row_id, id, Lookup::Live)
                .await?;
        Ok(Self::from_model(workspace_id, model))
    }

    pub async fn list<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        query: &ListQuery,
    ) -> Result<Page<Self>, DomainError> {
        let scope = Workspace::scope(db, workspace_id).await?;
        let mut page =
            paginate::<member::Entity, _>(db, scope.row_id, Condition::all(), query).await?;
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
        data: &UpdateMember,
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let scope = Workspace::scope(db, workspace_id).await?;
        let record =
            policy::find_in_workspace::<member::Entity, _>(db, scope.row_id, id, Lookup::Live)
                .await?;

        let mut active: member::ActiveModel = record.into();
        if let Some(display_name) = &data.display_name {
            active.display_name = Set(validation::required_text("display_name", display_name)?);
        }
        if let Some(email) = &data.email {
            active.email = Set(validation::optional_text(email.as_deref()));
        }
        if let Some(role) = data.role {
            active.role = Set(role);
        }
        active.updated_at = Set(Utc::now());
        let tx = db.begin().await?;
        let model = active.update(&tx).await?;
        EventOutbox::record(
            &tx,
            workspace_id,
            EVENT_MEMBER_UPDATED,
            member::Entity::NAME,
            id,
            &ResourceEventPayload { workspace_id, id },
        )
        .await?;
        tx.commit().await?;
        Ok(Self::from_model(workspace_id, model))
    }

    /// Removes the membership. The row stays for history; the member stops
    /// counting as current for assignees and mentions.
    pub async fn remove<C>(
        db: &C,
        workspace_id: Uuid,
        id: Uuid,
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let scope = Workspace::scope(db, workspace_id).await?;
        let record =
            policy::find_in_workspace::<member::Entity, _>(db, scope.row_id, id, Lookup::Audit)
                .await?;
        if record.role == MemberRole::Owner {
            return Err(DomainError::validation(
                "role",
                "the workspace owner cannot be removed",
            ));
        }

        let tx = db.begin().await?;
        let transition = policy::trash::<member::Entity, _>(&tx, scope.row_id, id).await?;
        if transition.changed {
            EventOutbox::record(
                &tx,
                workspace_id,
                EVENT_MEMBER_REMOVED,
                member::Entity::NAME,
                id,
                &ResourceEventPayload { workspace_id, id },
            )
            .await?;
        }
        tx.commit().await?;
        Ok(Self::from_model(workspace_id, transition.model))
    }

    /// Live member row of the workspace, or `NotFound`.
    pub(crate) async fn require_current<C: ConnectionTrait>(
        db: &C,
        scope: WorkspaceScope,
        id: Uuid,
    ) -> Result<member::Model, DomainError> {
        policy::find_in_workspace::<member::Entity, _>(db, scope.row_id, id, Lookup::Live)
            .await
            .map_err(|err| match err {
                DomainError::Forbidden { entity, id } => DomainError::NotFound { entity, id },
                other => other,
            })
    }

    /// The subset of `ids` that are current members, ordered by uuid.
    pub(crate) async fn current_members<C: ConnectionTrait>(
        db: &C,
        workspace_row_id: i64,
        ids: &[Uuid],
    ) -> Result<Vec<member::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        member::Entity::find()
            .filter(member::Column::WorkspaceId.eq(workspace_row_id))
            .filter(member::Column::IsDeleted.eq(false))
            .filter(member::Column::Uuid.is_in(ids.iter().copied()))
            .order_by_asc(member::Column::Uuid)
            .all(db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{add_member, seed_workspace};

    #[tokio::test]
    async fn removed_member_can_be_re_added_under_same_id() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let bob = add_member(&db, &ctx, "Bob").await;

        let removed = Member::remove(&db, ctx.workspace_id, bob.id).await.unwrap();
        assert_eq!(removed.id, bob.id);
        assert!(matches!(
            Member::find_by_id(&db, ctx.workspace_id, bob.id).await,
            Err(DomainError::NotFound { entity: "member", .. })
        ));
        // Removing twice is a no-op.
        Member::remove(&db, ctx.workspace_id, bob.id).await.unwrap();

        let again = Member::add(
            &db,
            ctx.workspace_id,
            &AddMember {
                user_id: bob.user_id,
                display_name: "Robert".to_string(),
                email: None,
                role: Some(MemberRole::Admin),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();
        assert_eq!(again.id, bob.id);
        assert_eq!(again.display_name, "Robert");
        assert_eq!(again.role, MemberRole::Admin);
    }

    #[tokio::test]
    async fn failed_event_leaves_no_membership_behind() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let user_id = Uuid::new_v4();

        db.execute_unprepared("DROP TABLE event_outbox").await.unwrap();
        let added = Member::add(
            &db,
            ctx.workspace_id,
            &AddMember {
                user_id,
                display_name: "Dana".to_string(),
                email: None,
                role: None,
            },
            Uuid::new_v4(),
        )
        .await;
        assert!(matches!(added, Err(DomainError::Database(_))));

        let rows = member::Entity::find()
            .filter(member::Column::UserId.eq(user_id))
            .all(&db)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn duplicate_membership_is_rejected() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let bob = add_member(&db, &ctx, "Bob").await;

        let err = Member::add(
            &db,
            ctx.workspace_id,
            &AddMember {
                user_id: bob.user_id,
                display_name: "Bob".to_string(),
                email: None,
                role: None,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed { field: "user_id", .. }));
    }

    #[tokio::test]
    async fn owner_cannot_be_removed() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let err = Member::remove(&db, ctx.workspace_id, ctx.owner_id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed { field: "role", .. }));
    }

    #[tokio::test]
    async fn members_of_other_workspaces_are_forbidden() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let other = seed_workspace(&db).await;

        assert!(matches!(
            Member::find_by_id(&db, ctx.workspace_id, other.owner_id).await,
            Err(DomainError::Forbidden { entity: "member", .. })
        ));
        let scope = Workspace::scope(&db, ctx.workspace_id).await.unwrap();
        assert!(matches!(
            Member::require_current(&db, scope, other.owner_id).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn list_searches_names_and_emails() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        add_member(&db, &ctx, "Bob").await;
        add_member(&db, &ctx, "Carla").await;

        let page = Member::list(&db, ctx.workspace_id, &ListQuery::default().with_search("carla"))
            .await
            .unwrap();
        assert_eq!(page.total_docs, 1);
        assert_eq!(page.docs[0].display_name, "Carla");

        let page = Member::list(
            &db,
            ctx.workspace_id,
            &ListQuery::default().with_sort("displayName"),
        )
        .await
        .unwrap();
        let names: Vec<&str> = page.docs.iter().map(|m| m.display_name.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Carla", "Owner"]);
    }
}
