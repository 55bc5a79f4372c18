pub mod checklist_item;
pub mod comment;
pub mod event_outbox;
pub mod list;
pub mod member;
pub mod mention_index;
pub mod office;
pub mod project;
pub mod space;
pub mod task;
pub mod team;
pub mod workspace;
