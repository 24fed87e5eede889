use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::super::record_query::SearchClause;
use super::super::record_write::{map_database_error, RecordWriteProcessor};
use crate::error::{AppError, AppResult};
use crate::models::{Lecturer, LecturerDraft, RecordId, RecordQuery};
use crate::parser::EntityKind;
use crate::schema::UniqueField;

const LECTURER_COLUMNS: &str =
    "id, name, lecturer_number, email, phone, department, address, created_at, updated_at";

/// SQLite storage for lecturer records
pub struct SqliteLecturerStore {
    pool: SqlitePool,
}

impl SqliteLecturerStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, draft: &LecturerDraft) -> AppResult<Lecturer> {
        let now = RecordWriteProcessor::timestamp();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to start transaction: {}", e)))?;

        let result = sqlx::query(
            "INSERT INTO lecturers (name, lecturer_number, email, phone, department, address, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&draft.name)
        .bind(&draft.lecturer_number)
        .bind(&draft.email)
        .bind(&draft.phone)
        .bind(&draft.department)
        .bind(&draft.address)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_database_error(e, EntityKind::Lecturer, "create", &unique_values(draft)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;

        Ok(Lecturer {
            id: result.last_insert_rowid(),
            name: draft.name.clone(),
            lecturer_number: draft.lecturer_number.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            department: draft.department.clone(),
            address: draft.address.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn find_by_id(&self, id: RecordId) -> AppResult<Option<Lecturer>> {
        let sql = format!("SELECT {} FROM lecturers WHERE id = ?1", LECTURER_COLUMNS);

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to find lecturer: {}", e)))?;

        Ok(row.map(|row| lecturer_from_row(&row)))
    }

    pub async fn find(&self, query: &RecordQuery) -> AppResult<Vec<Lecturer>> {
        let clause = SearchClause::build(query, &["name", "lecturer_number"], None);
        let sql = format!(
            "SELECT {} FROM lecturers{} ORDER BY id",
            LECTURER_COLUMNS, clause.where_clause
        );

        let mut select = sqlx::query(&sql);
        for parameter in &clause.parameters {
            select = select.bind(parameter);
        }

        let rows = select
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to search lecturers: {}", e)))?;

        Ok(rows.iter().map(lecturer_from_row).collect())
    }

    pub async fn update(&self, id: RecordId, draft: &LecturerDraft) -> AppResult<Option<Lecturer>> {
        let now = RecordWriteProcessor::timestamp();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to start transaction: {}", e)))?;

        let result = sqlx::query(
            "UPDATE lecturers SET name = ?1, lecturer_number = ?2, email = ?3, phone = ?4, department = ?5, address = ?6, updated_at = ?7 WHERE id = ?8",
        )
        .bind(&draft.name)
        .bind(&draft.lecturer_number)
        .bind(&draft.email)
        .bind(&draft.phone)
        .bind(&draft.department)
        .bind(&draft.address)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_database_error(e, EntityKind::Lecturer, "update", &unique_values(draft)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    /// Delete a lecturer unless a course still names it as owner
    pub async fn delete(&self, id: RecordId) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to start transaction: {}", e)))?;

        let taught: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses WHERE lecturer_id = ?1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::Database(format!("Failed to count lecturer courses: {}", e)))?;

        if taught > 0 {
            return Err(AppError::ReferentialConflict(format!(
                "Lecturer #{} still teaches {} course(s); reassign or delete them first",
                id, taught
            )));
        }

        // The foreign key is still checked at delete time for a course added concurrently
        let result = sqlx::query("DELETE FROM lecturers WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_database_error(e, EntityKind::Lecturer, "delete", &[]))?;

        let lecturer_was_deleted = result.rows_affected() > 0;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;

        Ok(lecturer_was_deleted)
    }
}

fn unique_values(draft: &LecturerDraft) -> [(UniqueField, &str); 2] {
    [
        (UniqueField::LecturerNumber, draft.lecturer_number.as_str()),
        (UniqueField::LecturerEmail, draft.email.as_str()),
    ]
}

fn lecturer_from_row(row: &SqliteRow) -> Lecturer {
    Lecturer {
        id: row.get("id"),
        name: row.get("name"),
        lecturer_number: row.get("lecturer_number"),
        email: row.get("email"),
        phone: row.get("phone"),
        department: row.get("department"),
        address: row.get("address"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
