use std::time::Duration;

use db_migration::Migrator;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

pub mod entities;
pub mod events;
#[cfg(test)]
mod fixtures;
pub mod hierarchy;
pub mod models;
pub mod policy;
pub mod query;
pub mod types;

pub use sea_orm::{DbErr, TransactionTrait};

use crate::query::PageSettings;

pub type DbPool = DatabaseConnection;

#[derive(Clone)]
pub struct DBService {
    pub pool: DbPool,
    /// Listing defaults to stamp onto incoming `ListQuery` values.
    pub pages: PageSettings,
}

impl DBService {
    /// Connects to the configured database and applies pending migrations.
    pub async fn new(config: &config::Config) -> Result<DBService, DbErr> {
        let mut options = ConnectOptions::new(config.database.url.clone());
        options
            .max_connections(config.database.max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .sqlx_logging(false);

        let pool = Database::connect(options).await?;
        Migrator::up(&pool, None).await?;
        tracing::info!(
            backend = ?pool.get_database_backend(),
            "Database ready"
        );

        Ok(DBService {
            pool,
            pages: PageSettings::from(&config.pagination),
        })
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::{
        fixtures::{named_space, seed_workspace},
        models::{
            error::DomainError,
            list::{CreateList, List},
            space::Space,
        },
        query::ListQuery,
    };

    #[tokio::test]
    async fn service_applies_migrations_and_page_settings() {
        let dir = test_support::temp_dir();
        let mut config = config::Config::default();
        config.database.url = format!("sqlite://{}?mode=rwc", dir.path().join("db.sqlite").display());
        config.pagination.default_limit = 3;

        let service = DBService::new(&config).await.unwrap();
        assert_eq!(service.pages.default_limit, 3);

        let ctx = seed_workspace(&service.pool).await;
        for name in ["a", "b", "c", "d"] {
            named_space(&service.pool, &ctx, name).await;
        }
        let query = ListQuery::default().with_settings(service.pages);
        let page = Space::list(&service.pool, ctx.workspace_id, &query)
            .await
            .unwrap();
        assert_eq!(page.limit, 3);
        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn restoring_a_space_reopens_it_for_children() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let space = named_space(&db, &ctx, "Research").await;
        let create = CreateList {
            space_id: space.id,
            name: "Ideas".to_string(),
            description: None,
            is_private: None,
        };

        Space::trash(&db, ctx.workspace_id, space.id).await.unwrap();
        assert!(matches!(
            List::create(&db, ctx.workspace_id, &create, Uuid::new_v4()).await,
            Err(DomainError::InvalidParent { .. })
        ));

        Space::restore(&db, ctx.workspace_id, space.id).await.unwrap();
        let list = List::create(&db, ctx.workspace_id, &create, Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(list.space_id, space.id);
    }
}
