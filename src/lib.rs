pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod parser;
pub mod resource;
pub mod schema;

// Re-export commonly used types for easier access
pub use error::{AppError, AppResult};
pub use models::{Course, Lecturer, Major, Record, RecordId, RecordQuery, Student};
pub use parser::{EntityKind, FieldMap};
