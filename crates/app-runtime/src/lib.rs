//! Process bootstrap: configuration, tracing and the database service.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, LogConfig};
use db::{DBService, DbErr};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, prelude::*};

pub const CONFIG_PATH_ENV: &str = "COLLAB_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error(transparent)]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

pub struct Runtime {
    pub config: Config,
    pub db: DBService,
}

/// `$COLLAB_CONFIG`, or `config.json` in the working directory.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Filter directives for this workspace's crates at `level`; everything else
/// logs at `warn`.
pub fn filter_directives(level: &str) -> String {
    format!(
        "warn,app_runtime={level},config={level},db={level},db_migration={level},rich_text={level}"
    )
}

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_tracing(log: &LogConfig) -> Result<(), RuntimeError> {
    let level = std::env::var("RUST_LOG").unwrap_or_else(|_| log.level.to_string());
    let env_filter = EnvFilter::try_new(filter_directives(&level))?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .try_init()?;
    Ok(())
}

/// Loads the config file, writing the defaults out when there is none yet.
pub async fn load_config(path: &Path) -> Result<Config, RuntimeError> {
    let config = config::load_config_from_file(path).await;
    if !path.exists() {
        config::save_config_to_file(&config, path).await?;
        tracing::info!(path = %path.display(), "Wrote default config");
    }
    Ok(config)
}

/// Connects to the configured database and runs pending migrations.
pub async fn bootstrap(config: Config) -> Result<Runtime, RuntimeError> {
    let db = DBService::new(&config).await?;
    Ok(Runtime { config, db })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_parse_for_every_level() {
        for level in ["error", "warn", "info", "debug", "trace"] {
            assert!(EnvFilter::try_new(filter_directives(level)).is_ok());
        }
    }

    #[tokio::test]
    async fn missing_config_is_written_with_defaults() {
        let dir = test_support::temp_dir();
        let path = dir.path().join("nested").join("config.json");

        let config = load_config(&path).await.unwrap();
        assert!(path.exists());
        assert_eq!(config.pagination.default_limit, config::DEFAULT_PAGE_LIMIT);

        let reloaded = config::load_config_from_file(&path).await;
        assert_eq!(reloaded.database.url, config.database.url);
    }

    #[tokio::test]
    async fn bootstrap_migrates_a_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.database.url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("collab.sqlite").display()
        );

        let runtime = bootstrap(config).await.unwrap();
        let pending = db::models::event_outbox::EventOutbox::fetch_unpublished(&runtime.db.pool, 10)
            .await
            .unwrap();
        assert!(pending.is_empty());
        assert!(dir.path().join("collab.sqlite").exists());
    }
}
