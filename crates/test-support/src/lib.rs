//! Helpers shared by the workspace's test suites.

use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
pub use tempfile::TempDir;

/// A fresh in-memory SQLite database with every migration applied.
pub async fn memory_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("connect in-memory sqlite");
    db_migration::Migrator::up(&db, None)
        .await
        .expect("apply migrations");
    db
}

pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}
