use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use tracing::{debug, error};

use crate::models::RecordId;
use crate::parser::EntityKind;

/// Target used for diagnostics that concern the whole record rather than one field
pub const ENTITY_TARGET: &str = "__all__";

/// Fixed diagnostic for payloads that cannot be read as a field mapping
pub const MALFORMED_PAYLOAD: &str = "Invalid JSON format";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A single field failed its normalizer or uniqueness check
    Field,
    /// A rule spanning more than one field, or a reference to another record
    CrossField,
}

/// One actionable problem with submitted input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub field: &'static str,
    pub message: String,
    pub kind: ViolationKind,
}

impl Diagnostic {
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
            kind: ViolationKind::Field,
        }
    }

    pub fn cross_field(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
            kind: ViolationKind::CrossField,
        }
    }

    pub fn entity(message: impl Into<String>) -> Self {
        Self::cross_field(ENTITY_TARGET, message)
    }

    pub fn is_entity_wide(&self) -> bool {
        self.field == ENTITY_TARGET
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Ordered collection of diagnostics produced by one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    diagnostics: Vec<Diagnostic>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Whether any diagnostic targets the given field
    pub fn has_field(&self, field: &str) -> bool {
        self.diagnostics.iter().any(|d| d.field == field)
    }

    pub fn messages_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.diagnostics
            .iter()
            .filter(move |d| d.field == field)
            .map(|d| d.message.as_str())
    }

    /// Turn the collected diagnostics into a result, failing when any were recorded
    pub fn into_result(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.diagnostics.iter().map(|d| d.to_string()).collect();
        write!(f, "{}", joined.join(" | "))
    }
}

#[derive(Debug)]
pub enum AppError {
    Database(String),
    Serialization(serde_json::Error),
    Validation(ValidationErrors),
    NotFound { entity: EntityKind, id: RecordId },
    ReferentialConflict(String),
    MalformedRequest(String),
    Configuration(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Database(e) => write!(f, "Database error: {}", e),
            AppError::Serialization(e) => write!(f, "Serialization error: {}", e),
            AppError::Validation(errors) => write!(f, "Validation failed: {}", errors),
            AppError::NotFound { entity, id } => write!(f, "{} #{} not found", entity, id),
            AppError::ReferentialConflict(e) => write!(f, "Referential conflict: {}", e),
            AppError::MalformedRequest(e) => write!(f, "Malformed request: {}", e),
            AppError::Configuration(e) => write!(f, "Configuration error: {}", e),
            AppError::Internal(e) => write!(f, "Internal error: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err)
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Whether this outcome is an expected, user-correctable result rather than a fault
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::NotFound { .. }
                | AppError::ReferentialConflict(_)
                | AppError::MalformedRequest(_)
        )
    }

    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            AppError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Render the outcome in the shape delivery layers hand back to clients
    pub fn to_json(&self) -> Value {
        match self {
            AppError::Validation(errors) => {
                debug!("Validation rejected input: {}", errors);
                json!({
                    "success": false,
                    "error": "Validation failed",
                    "errors": errors,
                })
            }
            AppError::NotFound { entity, id } => {
                debug!("{} #{} not found", entity, id);
                json!({ "success": false, "error": "Record not found" })
            }
            AppError::ReferentialConflict(e) => json!({ "success": false, "error": e }),
            AppError::MalformedRequest(e) => json!({ "success": false, "error": e }),
            AppError::Database(e) => {
                error!("Database error: {}", e);
                json!({ "success": false, "error": "Internal error" })
            }
            AppError::Serialization(e) => {
                error!("Serialization error: {}", e);
                json!({ "success": false, "error": "Internal error" })
            }
            AppError::Configuration(e) => {
                error!("Configuration error: {}", e);
                json!({ "success": false, "error": self.to_string() })
            }
            AppError::Internal(e) => {
                error!("Internal error: {}", e);
                json!({ "success": false, "error": "Internal error" })
            }
        }
    }
}
