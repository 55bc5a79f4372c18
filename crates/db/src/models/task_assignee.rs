//! Set semantics for `Task::assignee_ids`.
//!
//! Each mutation is a read-modify-write of the JSON array; concurrent writers
//! resolve as last write wins. Stored entries that are not member uuids
//! (carried over from the legacy comma-joined column) survive `add` and
//! `remove` untouched and are only dropped by `replace_assignees`.

use std::collections::BTreeSet;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, JsonValue, Set, TransactionSession, TransactionTrait,
};
use uuid::Uuid;

use super::{
    error::DomainError,
    ids,
    member::Member,
    task::Task,
    workspace::{Workspace, WorkspaceScope},
};
use crate::{
    entities::task,
    events::EVENT_TASK_UPDATED,
    policy::{self, Lookup},
};

/// The stored assignee array, read once per mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StoredAssignees {
    members: BTreeSet<Uuid>,
    legacy: Vec<String>,
}

impl StoredAssignees {
    fn read(value: &JsonValue) -> Self {
        let (members, legacy) = ids::split_ids(value);
        Self {
            members: members.into_iter().collect(),
            legacy,
        }
    }

    /// Member uuids in sorted order, then legacy entries as stored.
    fn to_json(&self) -> JsonValue {
        JsonValue::Array(
            self.members
                .iter()
                .map(|id| JsonValue::String(id.to_string()))
                .chain(self.legacy.iter().cloned().map(JsonValue::String))
                .collect(),
        )
    }
}

impl Task {
    /// Deduplicates and sorts `member_ids`, rejecting the first id that is not
    /// a current member of the workspace.
    pub(crate) async fn validated_assignees<C: ConnectionTrait>(
        db: &C,
        scope: WorkspaceScope,
        member_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, DomainError> {
        let wanted: BTreeSet<Uuid> = member_ids.iter().copied().collect();
        let ids: Vec<Uuid> = wanted.into_iter().collect();
        let current: BTreeSet<Uuid> = Member::current_members(db, scope.row_id, &ids)
            .await?
            .into_iter()
            .map(|model| model.uuid)
            .collect();

        if let Some(missing) = member_ids.iter().find(|id| !current.contains(id)) {
            return Err(DomainError::validation(
                "assignee_ids",
                format!("{missing} is not a member of this workspace"),
            ));
        }
        Ok(ids)
    }

    async fn write_assignees<C>(
        db: &C,
        scope: WorkspaceScope,
        record: task::Model,
        assignees: &StoredAssignees,
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let tx = db.begin().await?;
        let mut active: task::ActiveModel = record.into();
        active.assignee_ids = Set(assignees.to_json());
        active.updated_at = Set(Utc::now());
        let model = active.update(&tx).await?;
        Self::record_event(&tx, EVENT_TASK_UPDATED, scope, &model).await?;
        tx.commit().await?;

        tracing::debug!(
            task_id = %model.uuid,
            assignees = assignees.members.len(),
            legacy = assignees.legacy.len(),
            "Updated assignees"
        );
        Self::from_model(db, scope.id, model).await
    }

    /// Ensures `member_id` is assigned. Assigning a member twice writes
    /// nothing.
    pub async fn add_assignee<C>(
        db: &C,
        workspace_id: Uuid,
        task_id: Uuid,
        member_id: Uuid,
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let scope = Workspace::scope(db, workspace_id).await?;
        let record =
            policy::find_in_workspace::<task::Entity, _>(db, scope.row_id, task_id, Lookup::Live)
                .await?;
        Member::require_current(db, scope, member_id).await?;

        let mut assignees = StoredAssignees::read(&record.assignee_ids);
        if !assignees.members.insert(member_id) {
            return Self::from_model(db, workspace_id, record).await;
        }
        Self::write_assignees(db, scope, record, &assignees).await
    }

    /// Ensures `member_id` is not assigned. Removing an absent member writes
    /// nothing.
    pub async fn remove_assignee<C>(
        db: &C,
        workspace_id: Uuid,
        task_id: Uuid,
        member_id: Uuid,
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let scope = Workspace::scope(db, workspace_id).await?;
        let record =
            policy::find_in_workspace::<task::Entity, _>(db, scope.row_id, task_id, Lookup::Live)
                .await?;

        let mut assignees = StoredAssignees::read(&record.assignee_ids);
        if !assignees.members.remove(&member_id) {
            return Self::from_model(db, workspace_id, record).await;
        }
        Self::write_assignees(db, scope, record, &assignees).await
    }

    /// Replaces the whole assignee set, legacy entries included. Every id is
    /// validated before anything is written.
    pub async fn replace_assignees<C>(
        db: &C,
        workspace_id: Uuid,
        task_id: Uuid,
        member_ids: &[Uuid],
    ) -> Result<Self, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let scope = Workspace::scope(db, workspace_id).await?;
        let record =
            policy::find_in_workspace::<task::Entity, _>(db, scope.row_id, task_id, Lookup::Live)
                .await?;
        let assignees = StoredAssignees {
            members: Self::validated_assignees(db, scope, member_ids)
                .await?
                .into_iter()
                .collect(),
            legacy: Vec::new(),
        };

        if StoredAssignees::read(&record.assignee_ids) == assignees {
            return Self::from_model(db, workspace_id, record).await;
        }
        Self::write_assignees(db, scope, record, &assignees).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        fixtures::{Ctx, add_member, named_list, named_space, named_task, seed_workspace},
        models::{event_outbox::EventOutbox, member::Member},
    };

    async fn task_fixture(
        db: &sea_orm::DatabaseConnection,
        ctx: &Ctx,
    ) -> Task {
        let space = named_space(db, ctx, "Eng").await;
        let list = named_list(db, ctx, space.id, "Sprint").await;
        named_task(db, ctx, list.id, "Pair up").await
    }

    #[tokio::test]
    async fn adding_twice_keeps_one_entry() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let alice = add_member(&db, &ctx, "Alice").await;
        let task = task_fixture(&db, &ctx).await;

        let once = Task::add_assignee(&db, ctx.workspace_id, task.id, alice.id)
            .await
            .unwrap();
        let events = EventOutbox::fetch_unpublished(&db, 100).await.unwrap().len();
        let twice = Task::add_assignee(&db, ctx.workspace_id, task.id, alice.id)
            .await
            .unwrap();

        assert_eq!(once.assignee_ids, vec![alice.id]);
        assert_eq!(twice.assignee_ids, vec![alice.id]);
        assert_eq!(twice.updated_at, once.updated_at);
        assert_eq!(
            EventOutbox::fetch_unpublished(&db, 100).await.unwrap().len(),
            events
        );
    }

    #[tokio::test]
    async fn removing_is_idempotent() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let alice = add_member(&db, &ctx, "Alice").await;
        let bob = add_member(&db, &ctx, "Bob").await;
        let task = task_fixture(&db, &ctx).await;
        Task::replace_assignees(&db, ctx.workspace_id, task.id, &[alice.id, bob.id])
            .await
            .unwrap();

        let after = Task::remove_assignee(&db, ctx.workspace_id, task.id, alice.id)
            .await
            .unwrap();
        assert_eq!(after.assignee_ids, vec![bob.id]);
        let again = Task::remove_assignee(&db, ctx.workspace_id, task.id, alice.id)
            .await
            .unwrap();
        assert_eq!(again.assignee_ids, vec![bob.id]);

        let emptied = Task::remove_assignee(&db, ctx.workspace_id, task.id, bob.id)
            .await
            .unwrap();
        assert!(emptied.assignee_ids.is_empty());
    }

    #[tokio::test]
    async fn non_members_cannot_be_assigned() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let alice = add_member(&db, &ctx, "Alice").await;
        let gone = add_member(&db, &ctx, "Gone").await;
        Member::remove(&db, ctx.workspace_id, gone.id).await.unwrap();
        let task = task_fixture(&db, &ctx).await;

        let err = Task::add_assignee(&db, ctx.workspace_id, task.id, gone.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "member", .. }));

        let stranger = Uuid::new_v4();
        let err = Task::replace_assignees(&db, ctx.workspace_id, task.id, &[alice.id, stranger])
            .await
            .unwrap_err();
        match err {
            DomainError::ValidationFailed { field, reason } => {
                assert_eq!(field, "assignee_ids");
                assert!(reason.contains(&stranger.to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let unchanged = Task::find_by_id(&db, ctx.workspace_id, task.id).await.unwrap();
        assert!(unchanged.assignee_ids.is_empty());
    }

    #[tokio::test]
    async fn replace_collapses_duplicates() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let alice = add_member(&db, &ctx, "Alice").await;
        let bob = add_member(&db, &ctx, "Bob").await;
        let task = task_fixture(&db, &ctx).await;

        let replaced =
            Task::replace_assignees(&db, ctx.workspace_id, task.id, &[bob.id, alice.id, bob.id])
                .await
                .unwrap();
        let mut expected = vec![alice.id, bob.id];
        expected.sort();
        assert_eq!(replaced.assignee_ids, expected);

        let cleared = Task::replace_assignees(&db, ctx.workspace_id, task.id, &[])
            .await
            .unwrap();
        assert!(cleared.assignee_ids.is_empty());
    }

    async fn stored_assignees(db: &sea_orm::DatabaseConnection, ctx: &Ctx, task_id: Uuid) -> JsonValue {
        let scope = Workspace::scope(db, ctx.workspace_id).await.unwrap();
        policy::find_in_workspace::<task::Entity, _>(db, scope.row_id, task_id, Lookup::Live)
            .await
            .unwrap()
            .assignee_ids
    }

    #[tokio::test]
    async fn legacy_entries_survive_add_and_remove() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let alice = add_member(&db, &ctx, "Alice").await;
        let task = task_fixture(&db, &ctx).await;

        let scope = Workspace::scope(&db, ctx.workspace_id).await.unwrap();
        let record =
            policy::find_in_workspace::<task::Entity, _>(&db, scope.row_id, task.id, Lookup::Live)
                .await
                .unwrap();
        let mut active: task::ActiveModel = record.into();
        active.assignee_ids = Set(json!(["a", "b"]));
        active.update(&db).await.unwrap();

        let before = Task::find_by_id(&db, ctx.workspace_id, task.id).await.unwrap();
        assert!(before.assignee_ids.is_empty());
        assert_eq!(before.legacy_assignee_ids, vec!["a", "b"]);

        let added = Task::add_assignee(&db, ctx.workspace_id, task.id, alice.id)
            .await
            .unwrap();
        assert_eq!(added.assignee_ids, vec![alice.id]);
        assert_eq!(added.legacy_assignee_ids, vec!["a", "b"]);
        assert_eq!(
            stored_assignees(&db, &ctx, task.id).await,
            json!([alice.id.to_string(), "a", "b"])
        );

        let removed = Task::remove_assignee(&db, ctx.workspace_id, task.id, alice.id)
            .await
            .unwrap();
        assert!(removed.assignee_ids.is_empty());
        assert_eq!(stored_assignees(&db, &ctx, task.id).await, json!(["a", "b"]));

        // An empty replacement still differs from a set holding legacy ids.
        let replaced = Task::replace_assignees(&db, ctx.workspace_id, task.id, &[])
            .await
            .unwrap();
        assert!(replaced.legacy_assignee_ids.is_empty());
        assert_eq!(stored_assignees(&db, &ctx, task.id).await, json!([]));
    }

    #[tokio::test]
    async fn assignee_write_and_event_commit_together() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let alice = add_member(&db, &ctx, "Alice").await;
        let task = task_fixture(&db, &ctx).await;

        db.execute_unprepared("DROP TABLE event_outbox").await.unwrap();
        assert!(
            Task::add_assignee(&db, ctx.workspace_id, task.id, alice.id)
                .await
                .is_err()
        );
        let unchanged = Task::find_by_id(&db, ctx.workspace_id, task.id).await.unwrap();
        assert!(unchanged.assignee_ids.is_empty());
    }

    #[tokio::test]
    async fn trashed_tasks_cannot_be_assigned() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let alice = add_member(&db, &ctx, "Alice").await;
        let task = task_fixture(&db, &ctx).await;
        Task::trash(&db, ctx.workspace_id, task.id).await.unwrap();

        let err = Task::add_assignee(&db, ctx.workspace_id, task.id, alice.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "task", .. }));
    }
}
