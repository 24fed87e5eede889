//! Database layer for the records store
//!
//! Logic shared by every database backend (error mapping, search clauses,
//! write bookkeeping) lives next to this file; SQL specific to one engine
//! lives in its own submodule.
//!
//! # Architecture
//!
//! ```text
//! Common logic (record_write.rs, record_query.rs)
//!     ↓
//! Database-specific implementations
//!     └── sqlite/ (SQLite-specific code)
//! ```

pub mod config;
pub mod record_query;
pub mod record_write;
pub mod sqlite;


pub use config::DatabaseBackendConfig;
pub use record_query::SearchClause;
pub use record_write::{map_database_error, RecordWriteProcessor};
pub use sqlite::SqliteBackend;
