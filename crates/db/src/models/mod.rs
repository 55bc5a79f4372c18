pub mod checklist_item;
pub mod comment;
pub mod error;
pub mod event_outbox;
pub mod ids;
pub mod list;
pub mod member;
pub mod mention_index;
pub mod office;
pub mod project;
pub mod space;
pub mod task;
pub mod task_assignee;
pub mod team;
pub(crate) mod validation;
pub mod workspace;
