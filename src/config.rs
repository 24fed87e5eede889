use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::backend::database::DatabaseBackendConfig;
use crate::backend::DatabaseType;
use crate::error::{AppError, AppResult};

lazy_static! {
    static ref ENV_REFERENCE: Regex =
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").expect("valid env pattern");
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DatabaseConfig {
    #[serde(rename = "type", default)]
    pub db_type: DatabaseType,
    #[serde(default = "default_db_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// SQLite journal mode, e.g. `wal`; the engine default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal_mode: Option<String>,
}

fn default_db_url() -> String {
    "siakad.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DatabaseType::default(),
            url: default_db_url(),
            max_connections: default_max_connections(),
            journal_mode: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from YAML file
    pub fn load_from_file<P: AsRef<Path>>(config_path: P) -> AppResult<Self> {
        let path = config_path.as_ref();

        if !path.exists() {
            return Err(AppError::Configuration(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content).map_err(|e| match e {
            AppError::Configuration(message) => {
                AppError::Configuration(format!("{} ({})", message, path.display()))
            }
            other => other,
        })
    }

    /// Parse configuration text after expanding environment references
    pub fn from_yaml(content: &str) -> AppResult<Self> {
        let expanded_content = Self::expand_env_vars(content)?;

        let app_config: AppConfig = serde_yaml::from_str(&expanded_content)
            .map_err(|e| AppError::Configuration(format!("Failed to parse config file: {}", e)))?;

        app_config.backend_config().validate().map_err(|e| {
            AppError::Configuration(format!("Invalid database configuration: {}", e))
        })?;

        Ok(app_config)
    }

    /// File-backed SQLite in the working directory, info-level text logs
    pub fn default_config() -> Self {
        AppConfig {
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Backend-facing view of the database section
    pub fn backend_config(&self) -> DatabaseBackendConfig {
        let config = DatabaseBackendConfig::new(self.database.db_type, &self.database.url)
            .with_max_connections(self.database.max_connections);
        match &self.database.journal_mode {
            Some(mode) => config.with_option("journal_mode", mode.to_lowercase()),
            None => config,
        }
    }

    /// Expand environment variables in format ${VAR_NAME} or ${VAR_NAME:-default}
    fn expand_env_vars(content: &str) -> AppResult<String> {
        let mut missing = None;

        let expanded = ENV_REFERENCE.replace_all(content, |caps: &Captures| {
            let var_name = &caps[1];
            match (std::env::var(var_name), caps.get(2)) {
                (Ok(value), _) => value,
                (Err(_), Some(default)) => default.as_str().to_string(),
                (Err(_), None) => {
                    missing.get_or_insert_with(|| var_name.to_string());
                    String::new()
                }
            }
        });

        if let Some(var_name) = missing {
            return Err(AppError::Configuration(format!(
                "Environment variable {} not found and no default provided",
                var_name
            )));
        }

        Ok(expanded.into_owned())
    }
}
