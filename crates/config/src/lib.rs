use std::path::Path;

use thiserror::Error;

mod schema;

pub use schema::{
    CURRENT_CONFIG_VERSION, Config, DEFAULT_PAGE_LIMIT, DatabaseConfig, LogConfig, LogLevel,
    PaginationConfig,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Will always return config, falling back to defaults on missing/invalid files.
pub async fn load_config_from_file(config_path: &Path) -> Config {
    match std::fs::read_to_string(config_path) {
        Ok(raw_config) => Config::from_raw(&raw_config),
        Err(err) => {
            if err.kind() == std::io::ErrorKind::NotFound {
                tracing::info!(path = %config_path.display(), "No config file found, using defaults");
            } else {
                tracing::warn!("Failed to read config file: {}", err);
            }
            Config::default()
        }
    }
}

/// Saves the config to the given path
pub async fn save_config_to_file(config: &Config, config_path: &Path) -> Result<(), ConfigError> {
    let normalized = config.clone().normalized();
    let raw_config = serde_json::to_string_pretty(&normalized)?;
    if let Some(parent) = config_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(config_path, raw_config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use test_support::temp_dir;

    use super::*;

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = temp_dir();
        let config = load_config_from_file(&dir.path().join("config.json")).await;
        assert_eq!(config.pagination.default_limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(config.config_version, CURRENT_CONFIG_VERSION);
    }

    #[tokio::test]
    async fn save_then_load_keeps_settings() {
        let dir = temp_dir();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.pagination.max_limit = Some(50);
        config.database.url = "sqlite://collab.sqlite?mode=rwc".to_string();
        config.log.level = LogLevel::Debug;
        save_config_to_file(&config, &path).await.unwrap();

        let loaded = load_config_from_file(&path).await;
        assert_eq!(loaded.pagination.max_limit, Some(50));
        assert_eq!(loaded.database.url, "sqlite://collab.sqlite?mode=rwc");
        assert_eq!(loaded.log.level, LogLevel::Debug);
    }
}
