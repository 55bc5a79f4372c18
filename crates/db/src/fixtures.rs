//! Seed data for the crate's tests.

use sea_orm::DatabaseConnection;
use serde_json::json;
use uuid::Uuid;

use crate::models::{
    list::{CreateList, List},
    member::{AddMember, Member},
    space::{CreateSpace, Space},
    task::{CreateTask, Task},
    workspace::{CreateWorkspace, Workspace},
};

pub struct Ctx {
    pub workspace_id: Uuid,
    pub workspace_row_id: i64,
    pub owner_id: Uuid,
}

/// A workspace with its owner member, named "Owner".
pub async fn seed_workspace(db: &DatabaseConnection) -> Ctx {
    let (workspace, owner) = Workspace::create(
        db,
        &CreateWorkspace {
            name: "Acme".to_string(),
            description: None,
            owner_user_id: Uuid::new_v4(),
            owner_display_name: "Owner".to_string(),
            owner_email: Some("owner@example.com".to_string()),
        },
        Uuid::new_v4(),
        Uuid::new_v4(),
    )
    .await
    .unwrap();
    let scope = Workspace::scope(db, workspace.id).await.unwrap();
    Ctx {
        workspace_id: workspace.id,
        workspace_row_id: scope.row_id,
        owner_id: owner.id,
    }
}

pub async fn add_member(db: &DatabaseConnection, ctx: &Ctx, name: &str) -> Member {
    Member::add(
        db,
        ctx.workspace_id,
        &AddMember {
            user_id: Uuid::new_v4(),
            display_name: name.to_string(),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            role: None,
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap()
}

pub async fn named_space(db: &DatabaseConnection, ctx: &Ctx, name: &str) -> Space {
    Space::create(
        db,
        ctx.workspace_id,
        &CreateSpace {
            name: name.to_string(),
            color: None,
            icon: None,
            is_private: None,
            creator_member_id: ctx.owner_id,
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap()
}

pub async fn spaces(db: &DatabaseConnection, ctx: &Ctx, count: usize) -> Vec<Space> {
    let mut created = Vec::with_capacity(count);
    for n in 1..=count {
        created.push(named_space(db, ctx, &format!("Space {n:02}")).await);
    }
    created
}

pub async fn named_list(db: &DatabaseConnection, ctx: &Ctx, space_id: Uuid, name: &str) -> List {
    List::create(
        db,
        ctx.workspace_id,
        &CreateList {
            space_id,
            name: name.to_string(),
            description: None,
            is_private: None,
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap()
}

pub async fn named_task(db: &DatabaseConnection, ctx: &Ctx, list_id: Uuid, name: &str) -> Task {
    Task::create(
        db,
        ctx.workspace_id,
        &CreateTask {
            list_id,
            name: name.to_string(),
            description: None,
            status: None,
            priority: None,
            start_at: None,
            due_at: None,
            assignee_ids: Vec::new(),
            creator_member_id: ctx.owner_id,
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap()
}

/// A rich-text document with one paragraph mentioning each of `members`.
pub fn mention_body(members: &[Uuid]) -> String {
    let mut content = vec![json!({"type": "text", "text": "ping "})];
    for id in members {
        content.push(json!({
            "type": "mention",
            "attrs": {"id": id.to_string(), "label": "member"}
        }));
        content.push(json!({"type": "text", "text": " "}));
    }
    json!({
        "type": "doc",
        "content": [{"type": "paragraph", "content": content}]
    })
    .to_string()
}
