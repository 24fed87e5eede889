use chrono::{DateTime, Utc};

use crate::error::{AppError, AppResult, ValidationErrors};
use crate::models::RecordId;
use crate::parser::EntityKind;
use crate::schema::{duplicate_diagnostic, UniqueField};

/// Shared bookkeeping for inserts, updates and deletes
pub struct RecordWriteProcessor;

impl RecordWriteProcessor {
    /// Timestamp stamped on created_at / updated_at
    pub fn timestamp() -> DateTime<Utc> {
        Utc::now()
    }

    /// Reject ids no stored record can have before touching storage
    pub fn validate_record_id(entity: EntityKind, id: RecordId) -> AppResult<()> {
        if id < 1 {
            return Err(AppError::NotFound { entity, id });
        }
        Ok(())
    }
}

/// Map database errors to AppError using common logic
///
/// A unique-constraint failure means another writer claimed the value between
/// validation and commit; it is reported exactly like the validator's own
/// duplicate check. `unique_values` carries the values that were being written.
pub fn map_database_error(
    error: sqlx::Error,
    entity: EntityKind,
    action: &str,
    unique_values: &[(UniqueField, &str)],
) -> AppError {
    let error_str = error.to_string();

    if let Some(constraint) = error_str.split("UNIQUE constraint failed: ").nth(1) {
        let target = constraint.split([',', ' ']).next().unwrap_or_default();
        let field = target
            .split_once('.')
            .and_then(|(table, column)| UniqueField::from_constraint(table, column));
        if let Some(field) = field {
            let value = unique_values
                .iter()
                .find(|(candidate, _)| *candidate == field)
                .map(|(_, value)| *value)
                .unwrap_or_default();
            let mut errors = ValidationErrors::new();
            errors.push(duplicate_diagnostic(field, value));
            return AppError::Validation(errors);
        }
    }

    if error_str.contains("FOREIGN KEY constraint failed") {
        return AppError::ReferentialConflict(format!(
            "Cannot {} {}: it is referenced by other records",
            action,
            entity.as_str()
        ));
    }

    AppError::Database(format!("Failed to {} {}: {}", action, entity.as_str(), error_str))
}
