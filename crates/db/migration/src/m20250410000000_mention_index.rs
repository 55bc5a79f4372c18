use sea_orm_migration::{prelude::*, sea_orm::DatabaseBackend};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut id = ColumnDef::new(MentionIndex::Id);
        let mut member_id = ColumnDef::new(MentionIndex::MemberId);
        let mut workspace_id = ColumnDef::new(MentionIndex::WorkspaceId);
        let mut source_id = ColumnDef::new(MentionIndex::SourceId);
        match manager.get_database_backend() {
            DatabaseBackend::Sqlite => {
                id.integer();
                member_id.integer();
                workspace_id.integer();
                source_id.integer();
            }
            _ => {
                id.big_integer();
                member_id.big_integer();
                workspace_id.big_integer();
                source_id.big_integer();
            }
        }

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(MentionIndex::Table)
                    .col(id.not_null().auto_increment().primary_key())
                    .col(workspace_id.not_null())
                    .col(
                        ColumnDef::new(MentionIndex::SourceType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(source_id.not_null())
                    .col(member_id.not_null())
                    .col(
                        ColumnDef::new(MentionIndex::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mention_index_workspace_id")
                            .from(MentionIndex::Table, MentionIndex::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mention_index_member_id")
                            .from(MentionIndex::Table, MentionIndex::MemberId)
                            .to(WorkspaceMembers::Table, WorkspaceMembers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_mention_index_source_member")
                    .table(MentionIndex::Table)
                    .col(MentionIndex::SourceType)
                    .col(MentionIndex::SourceId)
                    .col(MentionIndex::MemberId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_mention_index_member")
                    .table(MentionIndex::Table)
                    .col(MentionIndex::MemberId)
                    .col(MentionIndex::SourceType)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Tasks::Table)
                    .add_column(
                        ColumnDef::new(Tasks::MentionedMemberIds)
                            .json()
                            .not_null()
                            .default(Expr::val("[]")),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Tasks::Table)
                    .drop_column(Tasks::MentionedMemberIds)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .if_exists()
                    .name("idx_mention_index_member")
                    .table(MentionIndex::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .if_exists()
                    .name("idx_mention_index_source_member")
                    .table(MentionIndex::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(MentionIndex::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
enum MentionIndex {
    Table,
    Id,
    WorkspaceId,
    SourceType,
    SourceId,
    MemberId,
    CreatedAt,
}

#[derive(Iden)]
enum Workspaces {
    Table,
    Id,
}

#[derive(Iden)]
enum WorkspaceMembers {
    Table,
    Id,
}

#[derive(Iden)]
enum Tasks {
    Table,
    MentionedMemberIds,
}
