use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const EVENT_WORKSPACE_CREATED: &str = "workspace.created";
pub const EVENT_WORKSPACE_UPDATED: &str = "workspace.updated";

pub const EVENT_MEMBER_ADDED: &str = "member.added";
pub const EVENT_MEMBER_UPDATED: &str = "member.updated";
pub const EVENT_MEMBER_REMOVED: &str = "member.removed";

pub const EVENT_SPACE_CREATED: &str = "space.created";
pub const EVENT_SPACE_UPDATED: &str = "space.updated";
pub const EVENT_SPACE_TRASHED: &str = "space.trashed";
pub const EVENT_SPACE_RESTORED: &str = "space.restored";

pub const EVENT_LIST_CREATED: &str = "list.created";
pub const EVENT_LIST_UPDATED: &str = "list.updated";
pub const EVENT_LIST_TRASHED: &str = "list.trashed";
pub const EVENT_LIST_RESTORED: &str = "list.restored";

pub const EVENT_TASK_CREATED: &str = "task.created";
pub const EVENT_TASK_UPDATED: &str = "task.updated";
pub const EVENT_TASK_TRASHED: &str = "task.trashed";
pub const EVENT_TASK_RESTORED: &str = "task.restored";

pub const EVENT_COMMENT_CREATED: &str = "comment.created";
pub const EVENT_COMMENT_UPDATED: &str = "comment.updated";
pub const EVENT_COMMENT_TRASHED: &str = "comment.trashed";
pub const EVENT_COMMENT_RESTORED: &str = "comment.restored";

pub const EVENT_CHECKLIST_ITEM_CREATED: &str = "checklist_item.created";
pub const EVENT_CHECKLIST_ITEM_UPDATED: &str = "checklist_item.updated";
pub const EVENT_CHECKLIST_ITEM_TRASHED: &str = "checklist_item.trashed";
pub const EVENT_CHECKLIST_ITEM_RESTORED: &str = "checklist_item.restored";

pub const EVENT_TEAM_CREATED: &str = "team.created";
pub const EVENT_TEAM_UPDATED: &str = "team.updated";
pub const EVENT_TEAM_TRASHED: &str = "team.trashed";
pub const EVENT_TEAM_RESTORED: &str = "team.restored";

pub const EVENT_PROJECT_CREATED: &str = "project.created";
pub const EVENT_PROJECT_UPDATED: &str = "project.updated";
pub const EVENT_PROJECT_TRASHED: &str = "project.trashed";
pub const EVENT_PROJECT_RESTORED: &str = "project.restored";

pub const EVENT_OFFICE_CREATED: &str = "office.created";
pub const EVENT_OFFICE_UPDATED: &str = "office.updated";
pub const EVENT_OFFICE_TRASHED: &str = "office.trashed";
pub const EVENT_OFFICE_RESTORED: &str = "office.restored";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceEventPayload {
    pub workspace_id: Uuid,
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEventPayload {
    pub workspace_id: Uuid,
    pub task_id: Uuid,
    pub list_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentEventPayload {
    pub workspace_id: Uuid,
    pub comment_id: Uuid,
    pub task_id: Uuid,
    pub mentioned_member_ids: Vec<Uuid>,
}
