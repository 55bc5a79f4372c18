use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Workspaces::Table)
                    .col(pk_id_col(manager, Workspaces::Id))
                    .col(uuid_col(Workspaces::Uuid))
                    .col(ColumnDef::new(Workspaces::Name).string().not_null())
                    .col(ColumnDef::new(Workspaces::Description).text())
                    .col(uuid_col(Workspaces::OwnerUserId))
                    .col(timestamp_col(Workspaces::CreatedAt))
                    .col(timestamp_col(Workspaces::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_workspaces_uuid")
                    .table(Workspaces::Table)
                    .col(Workspaces::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(WorkspaceMembers::Table)
                    .col(pk_id_col(manager, WorkspaceMembers::Id))
                    .col(uuid_col(WorkspaceMembers::Uuid))
                    .col(fk_id_col(manager, WorkspaceMembers::WorkspaceId))
                    .col(uuid_col(WorkspaceMembers::UserId))
                    .col(ColumnDef::new(WorkspaceMembers::DisplayName).string().not_null())
                    .col(ColumnDef::new(WorkspaceMembers::Email).string())
                    .col(
                        ColumnDef::new(WorkspaceMembers::Role)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("member")),
                    )
                    .col(flag_col(WorkspaceMembers::IsDeleted, false))
                    .col(timestamp_col(WorkspaceMembers::CreatedAt))
                    .col(timestamp_col(WorkspaceMembers::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_workspace_members_workspace_id")
                            .from(WorkspaceMembers::Table, WorkspaceMembers::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_workspace_members_uuid")
                    .table(WorkspaceMembers::Table)
                    .col(WorkspaceMembers::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_workspace_members_workspace_user")
                    .table(WorkspaceMembers::Table)
                    .col(WorkspaceMembers::WorkspaceId)
                    .col(WorkspaceMembers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Spaces::Table)
                    .col(pk_id_col(manager, Spaces::Id))
                    .col(uuid_col(Spaces::Uuid))
                    .col(fk_id_col(manager, Spaces::WorkspaceId))
                    .col(ColumnDef::new(Spaces::Name).string().not_null())
                    .col(ColumnDef::new(Spaces::Color).string_len(16))
                    .col(ColumnDef::new(Spaces::Icon).string())
                    .col(flag_col(Spaces::IsPrivate, false))
                    .col(flag_col(Spaces::IsDeleted, false))
                    .col(fk_id_col(manager, Spaces::CreatorMemberId))
                    .col(timestamp_col(Spaces::CreatedAt))
                    .col(timestamp_col(Spaces::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_spaces_workspace_id")
                            .from(Spaces::Table, Spaces::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_spaces_creator_member_id")
                            .from(Spaces::Table, Spaces::CreatorMemberId)
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
                    .name("idx_spaces_uuid")
                    .table(Spaces::Table)
                    .col(Spaces::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_spaces_workspace_deleted")
                    .table(Spaces::Table)
                    .col(Spaces::WorkspaceId)
                    .col(Spaces::IsDeleted)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Lists::Table)
                    .col(pk_id_col(manager, Lists::Id))
                    .col(uuid_col(Lists::Uuid))
                    .col(fk_id_col(manager, Lists::WorkspaceId))
                    .col(fk_id_col(manager, Lists::SpaceId))
                    .col(ColumnDef::new(Lists::Name).string().not_null())
                    .col(ColumnDef::new(Lists::Description).text())
                    .col(flag_col(Lists::IsPrivate, false))
                    .col(flag_col(Lists::IsDeleted, false))
                    .col(timestamp_col(Lists::CreatedAt))
                    .col(timestamp_col(Lists::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lists_workspace_id")
                            .from(Lists::Table, Lists::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lists_space_id")
                            .from(Lists::Table, Lists::SpaceId)
                            .to(Spaces::Table, Spaces::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_lists_uuid")
                    .table(Lists::Table)
                    .col(Lists::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_lists_space_id")
                    .table(Lists::Table)
                    .col(Lists::SpaceId)
                    .to_owned(),
            )
            .await?;

        // `assignees` is the historical comma-joined representation; see
        // m20250301000000_task_assignee_array.
        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Tasks::Table)
                    .col(pk_id_col(manager, Tasks::Id))
                    .col(uuid_col(Tasks::Uuid))
                    .col(fk_id_col(manager, Tasks::WorkspaceId))
                    .col(fk_id_col(manager, Tasks::ListId))
                    .col(ColumnDef::new(Tasks::Name).string().not_null())
                    .col(ColumnDef::new(Tasks::Description).text())
                    .col(
                        ColumnDef::new(Tasks::Status)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("todo")),
                    )
                    .col(ColumnDef::new(Tasks::Priority).string_len(16))
                    .col(ColumnDef::new(Tasks::StartAt).timestamp())
                    .col(ColumnDef::new(Tasks::DueAt).timestamp())
                    .col(ColumnDef::new(Tasks::Assignees).text())
                    .col(fk_id_col(manager, Tasks::CreatorMemberId))
                    .col(flag_col(Tasks::IsDeleted, false))
                    .col(timestamp_col(Tasks::CreatedAt))
                    .col(timestamp_col(Tasks::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_workspace_id")
                            .from(Tasks::Table, Tasks::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_list_id")
                            .from(Tasks::Table, Tasks::ListId)
                            .to(Lists::Table, Lists::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_creator_member_id")
                            .from(Tasks::Table, Tasks::CreatorMemberId)
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
                    .name("idx_tasks_uuid")
                    .table(Tasks::Table)
                    .col(Tasks::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tasks_list_id")
                    .table(Tasks::Table)
                    .col(Tasks::ListId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tasks_workspace_status")
                    .table(Tasks::Table)
                    .col(Tasks::WorkspaceId)
                    .col(Tasks::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Comments::Table)
                    .col(pk_id_col(manager, Comments::Id))
                    .col(uuid_col(Comments::Uuid))
                    .col(fk_id_col(manager, Comments::WorkspaceId))
                    .col(fk_id_col(manager, Comments::TaskId))
                    .col(fk_id_col(manager, Comments::AuthorMemberId))
                    .col(ColumnDef::new(Comments::Body).text().not_null())
                    .col(
                        ColumnDef::new(Comments::MentionedMemberIds)
                            .json()
                            .not_null()
                            .default(Expr::val("[]")),
                    )
                    .col(flag_col(Comments::IsDeleted, false))
                    .col(timestamp_col(Comments::CreatedAt))
                    .col(timestamp_col(Comments::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_workspace_id")
                            .from(Comments::Table, Comments::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_task_id")
                            .from(Comments::Table, Comments::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_author_member_id")
                            .from(Comments::Table, Comments::AuthorMemberId)
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
                    .name("idx_comments_uuid")
                    .table(Comments::Table)
                    .col(Comments::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_comments_task_id")
                    .table(Comments::Table)
                    .col(Comments::TaskId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(ChecklistItems::Table)
                    .col(pk_id_col(manager, ChecklistItems::Id))
                    .col(uuid_col(ChecklistItems::Uuid))
                    .col(fk_id_col(manager, ChecklistItems::WorkspaceId))
                    .col(fk_id_col(manager, ChecklistItems::TaskId))
                    .col(fk_id_nullable_col(manager, ChecklistItems::SpaceId))
                    .col(fk_id_nullable_col(manager, ChecklistItems::ListId))
                    .col(ColumnDef::new(ChecklistItems::Name).string().not_null())
                    .col(flag_col(ChecklistItems::IsDone, false))
                    .col(fk_id_col(manager, ChecklistItems::CreatorMemberId))
                    .col(flag_col(ChecklistItems::IsDeleted, false))
                    .col(timestamp_col(ChecklistItems::CreatedAt))
                    .col(timestamp_col(ChecklistItems::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_checklist_items_workspace_id")
                            .from(ChecklistItems::Table, ChecklistItems::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_checklist_items_task_id")
                            .from(ChecklistItems::Table, ChecklistItems::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_checklist_items_uuid")
                    .table(ChecklistItems::Table)
                    .col(ChecklistItems::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_checklist_items_task_id")
                    .table(ChecklistItems::Table)
                    .col(ChecklistItems::TaskId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Teams::Table)
                    .col(pk_id_col(manager, Teams::Id))
                    .col(uuid_col(Teams::Uuid))
                    .col(fk_id_col(manager, Teams::WorkspaceId))
                    .col(ColumnDef::new(Teams::Name).string().not_null())
                    .col(ColumnDef::new(Teams::Description).text())
                    .col(fk_id_nullable_col(manager, Teams::LeadMemberId))
                    .col(flag_col(Teams::IsActive, true))
                    .col(flag_col(Teams::IsDeleted, false))
                    .col(timestamp_col(Teams::CreatedAt))
                    .col(timestamp_col(Teams::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teams_workspace_id")
                            .from(Teams::Table, Teams::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_teams_uuid")
                    .table(Teams::Table)
                    .col(Teams::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Projects::Table)
                    .col(pk_id_col(manager, Projects::Id))
                    .col(uuid_col(Projects::Uuid))
                    .col(fk_id_col(manager, Projects::WorkspaceId))
                    .col(fk_id_nullable_col(manager, Projects::TeamId))
                    .col(ColumnDef::new(Projects::Name).string().not_null())
                    .col(ColumnDef::new(Projects::Description).text())
                    .col(flag_col(Projects::IsActive, true))
                    .col(flag_col(Projects::IsDeleted, false))
                    .col(timestamp_col(Projects::CreatedAt))
                    .col(timestamp_col(Projects::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projects_workspace_id")
                            .from(Projects::Table, Projects::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_projects_uuid")
                    .table(Projects::Table)
                    .col(Projects::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Offices::Table)
                    .col(pk_id_col(manager, Offices::Id))
                    .col(uuid_col(Offices::Uuid))
                    .col(fk_id_col(manager, Offices::WorkspaceId))
                    .col(ColumnDef::new(Offices::Name).string().not_null())
                    .col(ColumnDef::new(Offices::Address).text())
                    .col(ColumnDef::new(Offices::Timezone).string_len(64))
                    .col(flag_col(Offices::IsActive, true))
                    .col(flag_col(Offices::IsDeleted, false))
                    .col(timestamp_col(Offices::CreatedAt))
                    .col(timestamp_col(Offices::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_offices_workspace_id")
                            .from(Offices::Table, Offices::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_offices_uuid")
                    .table(Offices::Table)
                    .col(Offices::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(EventOutbox::Table)
                    .col(pk_id_col(manager, EventOutbox::Id))
                    .col(uuid_col(EventOutbox::Uuid))
                    .col(uuid_col(EventOutbox::WorkspaceUuid))
                    .col(ColumnDef::new(EventOutbox::EventType).string_len(64).not_null())
                    .col(ColumnDef::new(EventOutbox::ResourceType).string_len(32).not_null())
                    .col(uuid_col(EventOutbox::ResourceUuid))
                    .col(ColumnDef::new(EventOutbox::Payload).json().not_null())
                    .col(timestamp_col(EventOutbox::CreatedAt))
                    .col(ColumnDef::new(EventOutbox::PublishedAt).timestamp())
                    .col(
                        ColumnDef::new(EventOutbox::Attempts)
                            .integer()
                            .not_null()
                            .default(Expr::val(0)),
                    )
                    .col(ColumnDef::new(EventOutbox::LastError).text())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_event_outbox_unpublished")
                    .table(EventOutbox::Table)
                    .col(EventOutbox::PublishedAt)
                    .col(EventOutbox::CreatedAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_event_outbox_workspace")
                    .table(EventOutbox::Table)
                    .col(EventOutbox::WorkspaceUuid)
                    .col(EventOutbox::Id)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventOutbox::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Offices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ChecklistItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Comments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Lists::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Spaces::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WorkspaceMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Workspaces::Table).to_owned())
            .await?;
        Ok(())
    }
}

fn pk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().auto_increment().primary_key().to_owned()
}

fn fk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().to_owned()
}

fn fk_id_nullable_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.to_owned()
}

fn uuid_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().to_owned()
}

fn flag_col<T: Iden>(col: T, default: bool) -> ColumnDef {
    ColumnDef::new(col)
        .boolean()
        .not_null()
        .default(Expr::val(default))
        .to_owned()
}

fn timestamp_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
enum Workspaces {
    Table,
    Id,
    Uuid,
    Name,
    Description,
    OwnerUserId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum WorkspaceMembers {
    Table,
    Id,
    Uuid,
    WorkspaceId,
    UserId,
    DisplayName,
    Email,
    Role,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Spaces {
    Table,
    Id,
    Uuid,
    WorkspaceId,
    Name,
    Color,
    Icon,
    IsPrivate,
    IsDeleted,
    CreatorMemberId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Lists {
    Table,
    Id,
    Uuid,
    WorkspaceId,
    SpaceId,
    Name,
    Description,
    IsPrivate,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Tasks {
    Table,
    Id,
    Uuid,
    WorkspaceId,
    ListId,
    Name,
    Description,
    Status,
    Priority,
    StartAt,
    DueAt,
    Assignees,
    CreatorMemberId,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Comments {
    Table,
    Id,
    Uuid,
    WorkspaceId,
    TaskId,
    AuthorMemberId,
    Body,
    MentionedMemberIds,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ChecklistItems {
    Table,
    Id,
    Uuid,
    WorkspaceId,
    TaskId,
    SpaceId,
    ListId,
    Name,
    IsDone,
    CreatorMemberId,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Teams {
    Table,
    Id,
    Uuid,
    WorkspaceId,
    Name,
    Description,
    LeadMemberId,
    IsActive,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
    Uuid,
    WorkspaceId,
    TeamId,
    Name,
    Description,
    IsActive,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Offices {
    Table,
    Id,
    Uuid,
    WorkspaceId,
    Name,
    Address,
    Timezone,
    IsActive,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum EventOutbox {
    Table,
    Id,
    Uuid,
    WorkspaceUuid,
    EventType,
    ResourceType,
    ResourceUuid,
    Payload,
    CreatedAt,
    PublishedAt,
    Attempts,
    LastError,
}
