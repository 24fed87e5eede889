use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{AppError, AppResult};
use crate::models::RecordId;
use crate::parser::EntityKind;

/// SQLite access to the course/student join relation
///
/// Both the student side (enroll/withdraw) and the course side
/// (add/remove student) write through this store, so either view sees
/// the same rows.
pub struct SqliteEnrollmentStore {
    pool: SqlitePool,
}

impl SqliteEnrollmentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add one enrollment row; false when the pair already exists
    pub async fn add(&self, course_id: RecordId, student_id: RecordId) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to start transaction: {}", e)))?;

        ensure_exists(&mut *tx, EntityKind::Course, course_id).await?;
        ensure_exists(&mut *tx, EntityKind::Student, student_id).await?;

        let result = sqlx::query(
            "INSERT OR IGNORE INTO enrollments (course_id, student_id, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(course_id)
        .bind(student_id)
        .bind(chrono::Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(format!("Failed to add enrollment: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove one enrollment row; false when the pair did not exist
    pub async fn remove(&self, course_id: RecordId, student_id: RecordId) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to start transaction: {}", e)))?;

        ensure_exists(&mut *tx, EntityKind::Course, course_id).await?;
        ensure_exists(&mut *tx, EntityKind::Student, student_id).await?;

        let result = sqlx::query("DELETE FROM enrollments WHERE course_id = ?1 AND student_id = ?2")
            .bind(course_id)
            .bind(student_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(format!("Failed to remove enrollment: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    /// Ids of the students enrolled in a course, ascending
    pub async fn student_ids(&self, course_id: RecordId) -> AppResult<Vec<RecordId>> {
        sqlx::query_scalar(
            "SELECT student_id FROM enrollments WHERE course_id = ?1 ORDER BY student_id",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to fetch course roster: {}", e)))
    }

    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM enrollments")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to count enrollments: {}", e)))
    }
}

/// Rewrite a course roster on a connection that is already inside a transaction
pub async fn replace_roster(
    conn: &mut SqliteConnection,
    course_id: RecordId,
    student_ids: &[RecordId],
) -> AppResult<()> {
    sqlx::query("DELETE FROM enrollments WHERE course_id = ?1")
        .bind(course_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to clear course roster: {}", e)))?;

    let now = chrono::Utc::now();
    for student_id in student_ids {
        sqlx::query(
            "INSERT OR IGNORE INTO enrollments (course_id, student_id, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(course_id)
        .bind(*student_id)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::ReferentialConflict(format!(
            "Cannot enroll student #{} in course #{}: {}",
            student_id, course_id, e
        )))?;
    }

    Ok(())
}

async fn ensure_exists(
    conn: &mut SqliteConnection,
    entity: EntityKind,
    id: RecordId,
) -> AppResult<()> {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE id = ?1", entity.table());
    let count: i64 = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to look up {}: {}", entity.as_str(), e)))?;

    if count == 0 {
        return Err(AppError::NotFound { entity, id });
    }
    Ok(())
}
