use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;
use serde_json::json;

use crate::legacy_assignees::{join_legacy, split_legacy};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    // The column swap must stay on one pooled SQLite connection.
    fn use_transaction(&self) -> Option<bool> {
        Some(true)
    }

    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        let select = Query::select()
            .columns([Tasks::Id, Tasks::Assignees])
            .from(Tasks::Table)
            .to_owned();
        let mut converted = Vec::new();
        for row in db.query_all(&select).await? {
            let id: i64 = row.try_get("", "id")?;
            let legacy: Option<String> = row.try_get("", "assignees")?;
            let ids = split_legacy(legacy.as_deref());
            if !ids.is_empty() {
                converted.push((id, ids));
            }
        }

        manager
            .alter_table(
                Table::alter()
                    .table(Tasks::Table)
                    .add_column(
                        ColumnDef::new(Tasks::AssigneeIdsNext)
                            .json()
                            .not_null()
                            .default(Expr::val("[]")),
                    )
                    .to_owned(),
            )
            .await?;

        for (id, ids) in &converted {
            let update = Query::update()
                .table(Tasks::Table)
                .value(Tasks::AssigneeIdsNext, json!(ids))
                .and_where(Expr::col(Tasks::Id).eq(*id))
                .to_owned();
            db.execute(&update).await?;
        }

        manager
            .alter_table(
                Table::alter()
                    .table(Tasks::Table)
                    .drop_column(Tasks::Assignees)
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Tasks::Table)
                    .rename_column(Tasks::AssigneeIdsNext, Tasks::AssigneeIds)
                    .to_owned(),
            )
            .await?;

        tracing::info!(
            backfilled = converted.len(),
            "Converted legacy task assignees to assignee_ids"
        );
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        let select = Query::select()
            .columns([Tasks::Id, Tasks::AssigneeIds])
            .from(Tasks::Table)
            .to_owned();
        let mut converted = Vec::new();
        for row in db.query_all(&select).await? {
            let id: i64 = row.try_get("", "id")?;
            let value: serde_json::Value = row.try_get("", "assignee_ids")?;
            let ids: Vec<String> = serde_json::from_value(value).map_err(|err| {
                DbErr::Migration(format!("task {id} has malformed assignee_ids: {err}"))
            })?;
            if let Some(joined) = join_legacy(&ids)? {
                converted.push((id, joined));
            }
        }

        manager
            .alter_table(
                Table::alter()
                    .table(Tasks::Table)
                    .add_column(ColumnDef::new(Tasks::Assignees).text())
                    .to_owned(),
            )
            .await?;

        for (id, joined) in &converted {
            let update = Query::update()
                .table(Tasks::Table)
                .value(Tasks::Assignees, joined.clone())
                .and_where(Expr::col(Tasks::Id).eq(*id))
                .to_owned();
            db.execute(&update).await?;
        }

        manager
            .alter_table(
                Table::alter()
                    .table(Tasks::Table)
                    .drop_column(Tasks::AssigneeIds)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Tasks {
    Table,
    Id,
    Assignees,
    AssigneeIds,
    AssigneeIdsNext,
}

#[cfg(test)]
mod tests {
    use sea_orm_migration::sea_orm::{
        ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    };

    use crate::Migrator;

    use super::*;

    async fn seed_legacy(db: &DatabaseConnection) {
        let statements = [
            "INSERT INTO workspaces (id, uuid, name, owner_user_id) \
             VALUES (1, '00000000-0000-0000-0000-000000000001', 'w', '00000000-0000-0000-0000-0000000000aa')",
            "INSERT INTO workspace_members (id, uuid, workspace_id, user_id, display_name) \
             VALUES (1, '00000000-0000-0000-0000-000000000002', 1, '00000000-0000-0000-0000-0000000000aa', 'Ana')",
            "INSERT INTO spaces (id, uuid, workspace_id, name, creator_member_id) \
             VALUES (1, '00000000-0000-0000-0000-000000000003', 1, 's', 1)",
            "INSERT INTO lists (id, uuid, workspace_id, space_id, name) \
             VALUES (1, '00000000-0000-0000-0000-000000000004', 1, 1, 'l')",
            "INSERT INTO tasks (id, uuid, workspace_id, list_id, name, assignees, creator_member_id) VALUES \
               (1, '00000000-0000-0000-0000-000000000011', 1, 1, 't1', 'a,b,c', 1), \
               (2, '00000000-0000-0000-0000-000000000012', 1, 1, 't2', '', 1), \
               (3, '00000000-0000-0000-0000-000000000013', 1, 1, 't3', NULL, 1), \
               (4, '00000000-0000-0000-0000-000000000014', 1, 1, 't4', ' d , ,e', 1)",
        ];
        for statement in statements {
            db.execute_unprepared(statement).await.unwrap();
        }
    }

    async fn assignee_ids(db: &DatabaseConnection, id: i64) -> Vec<String> {
        let select = Query::select()
            .column(Tasks::AssigneeIds)
            .from(Tasks::Table)
            .and_where(Expr::col(Tasks::Id).eq(id))
            .to_owned();
        let row = db.query_one(&select).await.unwrap().unwrap();
        let value: serde_json::Value = row.try_get("", "assignee_ids").unwrap();
        serde_json::from_value(value).unwrap()
    }

    async fn legacy_assignees(db: &DatabaseConnection, id: i64) -> Option<String> {
        let select = Query::select()
            .column(Tasks::Assignees)
            .from(Tasks::Table)
            .and_where(Expr::col(Tasks::Id).eq(id))
            .to_owned();
        let row = db.query_one(&select).await.unwrap().unwrap();
        row.try_get("", "assignees").unwrap()
    }

    #[tokio::test]
    async fn forward_and_rollback_convert_assignees() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, Some(1)).await.unwrap();
        seed_legacy(&db).await;

        Migrator::up(&db, Some(1)).await.unwrap();
        assert_eq!(assignee_ids(&db, 1).await, vec!["a", "b", "c"]);
        assert!(assignee_ids(&db, 2).await.is_empty());
        assert!(assignee_ids(&db, 3).await.is_empty());
        assert_eq!(assignee_ids(&db, 4).await, vec!["d", "e"]);

        Migrator::down(&db, Some(1)).await.unwrap();
        assert_eq!(legacy_assignees(&db, 1).await.as_deref(), Some("a,b,c"));
        assert_eq!(legacy_assignees(&db, 2).await, None);
        assert_eq!(legacy_assignees(&db, 3).await, None);
        assert_eq!(legacy_assignees(&db, 4).await.as_deref(), Some("d,e"));
    }

    #[tokio::test]
    async fn rollback_refuses_ids_containing_the_delimiter() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, Some(1)).await.unwrap();
        seed_legacy(&db).await;
        Migrator::up(&db, Some(1)).await.unwrap();

        db.execute_unprepared(r#"UPDATE tasks SET assignee_ids = '["x,y"]' WHERE id = 2"#)
            .await
            .unwrap();

        let err = Migrator::down(&db, Some(1)).await.unwrap_err();
        assert!(matches!(err, DbErr::Migration(_)));
        // Nothing was rewritten: the array column is still in place.
        assert_eq!(assignee_ids(&db, 1).await, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn converts_a_pooled_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("legacy.sqlite").display());
        let mut options = ConnectOptions::new(url);
        options.max_connections(8).min_connections(4).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();

        Migrator::up(&db, Some(1)).await.unwrap();
        seed_legacy(&db).await;
        Migrator::up(&db, None).await.unwrap();
        assert_eq!(assignee_ids(&db, 1).await, vec!["a", "b", "c"]);
        assert_eq!(assignee_ids(&db, 4).await, vec!["d", "e"]);

        Migrator::down(&db, Some(2)).await.unwrap();
        assert_eq!(legacy_assignees(&db, 1).await.as_deref(), Some("a,b,c"));
        assert_eq!(legacy_assignees(&db, 2).await, None);
    }
}
