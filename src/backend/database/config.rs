use std::collections::HashMap;

use crate::backend::DatabaseType;

/// Connection string for a private in-memory database
pub const MEMORY_URL: &str = ":memory:";

/// Configuration for database backends
///
/// This is the backend-facing view of the `database` configuration section,
/// with a few knobs the file format does not expose.
#[derive(Debug, Clone)]
pub struct DatabaseBackendConfig {
    /// The type of database backend to use
    pub database_type: DatabaseType,

    /// Connection URL for the storage backend
    /// Examples:
    /// - SQLite file: "sqlite:./siakad.db" or "siakad.db"
    /// - In-memory: ":memory:"
    pub connection_url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Connection timeout in seconds
    pub connection_timeout: u64,

    /// Additional backend-specific options
    pub options: HashMap<String, String>,
}

impl DatabaseBackendConfig {
    /// Create a new storage configuration
    pub fn new(database_type: DatabaseType, connection_url: impl Into<String>) -> Self {
        Self {
            database_type,
            connection_url: connection_url.into(),
            max_connections: 5,
            connection_timeout: 30,
            options: HashMap::new(),
        }
    }

    /// Create a SQLite configuration
    pub fn sqlite(connection_url: impl Into<String>) -> Self {
        Self::new(DatabaseType::SQLite, connection_url)
    }

    /// Create an in-memory SQLite configuration for testing
    pub fn memory_sqlite() -> Self {
        Self::new(DatabaseType::SQLite, MEMORY_URL)
    }

    /// Set maximum connections
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Set connection timeout
    pub fn with_connection_timeout(mut self, timeout_seconds: u64) -> Self {
        self.connection_timeout = timeout_seconds;
        self
    }

    /// Add a backend-specific option
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Get a backend-specific option
    pub fn get_option(&self, key: &str) -> Option<&String> {
        self.options.get(key)
    }

    /// Check if this is an in-memory database
    pub fn is_memory_database(&self) -> bool {
        self.connection_url == MEMORY_URL || self.connection_url == "sqlite::memory:"
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.connection_url.is_empty() {
            return Err("Connection URL cannot be empty".to_string());
        }

        if self.max_connections == 0 {
            return Err("Max connections must be greater than 0".to_string());
        }

        if !self.connection_url.starts_with("sqlite:")
            && self.connection_url != MEMORY_URL
            && !self.connection_url.ends_with(".db")
            && !self.connection_url.ends_with(".sqlite")
        {
            return Err("SQLite connection URL must start with 'sqlite:', be ':memory:', or end with '.db' or '.sqlite'".to_string());
        }

        Ok(())
    }
}

impl Default for DatabaseBackendConfig {
    fn default() -> Self {
        Self::memory_sqlite()
    }
}
