use sqlx::SqlitePool;
use std::collections::BTreeSet;

use crate::error::{AppError, AppResult};
use crate::models::RecordId;
use crate::schema::UniqueField;

/// Existence checks backing the entity validator
pub struct SqliteLookup {
    pool: SqlitePool,
}

impl SqliteLookup {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn value_taken(
        &self,
        field: UniqueField,
        value: &str,
        exclude: Option<RecordId>,
    ) -> AppResult<bool> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?1 AND (?2 IS NULL OR id != ?2)",
            field.table(),
            field.column()
        );

        let count: i64 = sqlx::query_scalar(&sql)
            .bind(value)
            .bind(exclude)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::Database(format!(
                    "Failed to check duplicate {}: {}",
                    field.field_name(),
                    e
                ))
            })?;

        Ok(count > 0)
    }

    pub async fn lecturer_exists(&self, id: RecordId) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lecturers WHERE id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to look up lecturer: {}", e)))?;

        Ok(count > 0)
    }

    pub async fn missing_students(&self, ids: &[RecordId]) -> AppResult<Vec<RecordId>> {
        let wanted: BTreeSet<RecordId> = ids.iter().copied().collect();
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; wanted.len()].join(", ");
        let sql = format!("SELECT id FROM students WHERE id IN ({})", placeholders);

        let mut select = sqlx::query_scalar::<_, RecordId>(&sql);
        for id in &wanted {
            select = select.bind(*id);
        }

        let found: BTreeSet<RecordId> = select
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to look up students: {}", e)))?
            .into_iter()
            .collect();

        Ok(wanted.difference(&found).copied().collect())
    }
}
