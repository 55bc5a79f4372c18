use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

pub const CURRENT_CONFIG_VERSION: &str = "v1";
pub const DEFAULT_PAGE_LIMIT: u64 = 10;

fn default_database_url() -> String {
    "sqlite://collab.sqlite?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Clone, Debug, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(alias = "maxConnections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

/// Defaults applied to list queries.
#[derive(Clone, Debug, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct PaginationConfig {
    #[serde(alias = "defaultLimit")]
    pub default_limit: u64,
    /// Upper bound for caller-supplied limits. `None` leaves limits uncapped.
    #[serde(alias = "maxLimit")]
    pub max_limit: Option<u64>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_LIMIT,
            max_limit: None,
        }
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, TS, EnumString, Display, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
}

#[derive(Clone, Debug, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct Config {
    #[serde(alias = "configVersion")]
    pub config_version: String,
    pub database: DatabaseConfig,
    pub pagination: PaginationConfig,
    pub log: LogConfig,
}

impl Config {
    pub fn from_raw(raw_config: &str) -> Self {
        match serde_json::from_str::<Config>(raw_config) {
            Ok(config) => config.normalized(),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse config (line {}, column {}): {}, using default",
                    e.line(),
                    e.column(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn normalized(mut self) -> Self {
        self.config_version = CURRENT_CONFIG_VERSION.to_string();

        if self.database.url.trim().is_empty() {
            tracing::warn!("Empty database url, resetting to default");
            self.database.url = default_database_url();
        }

        if self.database.max_connections == 0 {
            self.database.max_connections = default_max_connections();
        }

        if self.pagination.default_limit == 0 {
            tracing::warn!("Default page limit must be positive, resetting to default");
            self.pagination.default_limit = DEFAULT_PAGE_LIMIT;
        }

        if matches!(self.pagination.max_limit, Some(0)) {
            self.pagination.max_limit = None;
        }

        if let Some(max) = self.pagination.max_limit
            && self.pagination.default_limit > max
        {
            tracing::warn!(
                "Default page limit {} exceeds max limit {}, clamping",
                self.pagination.default_limit,
                max
            );
            self.pagination.default_limit = max;
        }

        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_version: CURRENT_CONFIG_VERSION.to_string(),
            database: DatabaseConfig::default(),
            pagination: PaginationConfig::default(),
            log: LogConfig::default(),
        }
    }
}
