use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::super::record_query::SearchClause;
use super::super::record_write::{map_database_error, RecordWriteProcessor};
use crate::error::{AppError, AppResult};
use crate::models::{Major, RecordId, RecordQuery, Student, StudentDraft};
use crate::parser::EntityKind;
use crate::schema::UniqueField;

const STUDENT_COLUMNS: &str =
    "id, name, student_number, email, phone, major, address, created_at, updated_at";

/// SQLite storage for student records
pub struct SqliteStudentStore {
    pool: SqlitePool,
}

impl SqliteStudentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, draft: &StudentDraft) -> AppResult<Student> {
        let now = RecordWriteProcessor::timestamp();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to start transaction: {}", e)))?;

        let result = sqlx::query(
            "INSERT INTO students (name, student_number, email, phone, major, address, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&draft.name)
        .bind(&draft.student_number)
        .bind(&draft.email)
        .bind(&draft.phone)
        .bind(draft.major.label())
        .bind(&draft.address)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_database_error(e, EntityKind::Student, "create", &unique_values(draft)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;

        Ok(Student {
            id: result.last_insert_rowid(),
            name: draft.name.clone(),
            student_number: draft.student_number.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            major: Some(draft.major),
            address: draft.address.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn find_by_id(&self, id: RecordId) -> AppResult<Option<Student>> {
        let sql = format!("SELECT {} FROM students WHERE id = ?1", STUDENT_COLUMNS);

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to find student: {}", e)))?;

        row.map(|row| student_from_row(&row)).transpose()
    }

    pub async fn find(&self, query: &RecordQuery) -> AppResult<Vec<Student>> {
        let clause = SearchClause::build(query, &["name", "student_number"], Some("major"));
        let sql = format!(
            "SELECT {} FROM students{} ORDER BY id",
            STUDENT_COLUMNS, clause.where_clause
        );

        let mut select = sqlx::query(&sql);
        for parameter in &clause.parameters {
            select = select.bind(parameter);
        }

        let rows = select
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to search students: {}", e)))?;

        rows.iter().map(student_from_row).collect()
    }

    /// Students enrolled in a course, ordered by id
    pub async fn find_by_course(&self, course_id: RecordId) -> AppResult<Vec<Student>> {
        let sql = format!(
            "SELECT {} FROM students WHERE id IN (SELECT student_id FROM enrollments WHERE course_id = ?1) ORDER BY id",
            STUDENT_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(course_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to fetch course students: {}", e)))?;

        rows.iter().map(student_from_row).collect()
    }

    pub async fn update(&self, id: RecordId, draft: &StudentDraft) -> AppResult<Option<Student>> {
        let now = RecordWriteProcessor::timestamp();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to start transaction: {}", e)))?;

        let result = sqlx::query(
            "UPDATE students SET name = ?1, student_number = ?2, email = ?3, phone = ?4, major = ?5, address = ?6, updated_at = ?7 WHERE id = ?8",
        )
        .bind(&draft.name)
        .bind(&draft.student_number)
        .bind(&draft.email)
        .bind(&draft.phone)
        .bind(draft.major.label())
        .bind(&draft.address)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_database_error(e, EntityKind::Student, "update", &unique_values(draft)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    /// Delete a student and every enrollment row that names it
    pub async fn delete(&self, id: RecordId) -> AppResult<bool> {
        // Start a transaction so no roster keeps a dangling student
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to start transaction: {}", e)))?;

        sqlx::query("DELETE FROM enrollments WHERE student_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to delete student enrollments: {}", e))
            })?;

        let result = sqlx::query("DELETE FROM students WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_database_error(e, EntityKind::Student, "delete", &[]))?;

        let student_was_deleted = result.rows_affected() > 0;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;

        Ok(student_was_deleted)
    }
}

fn unique_values(draft: &StudentDraft) -> [(UniqueField, &str); 2] {
    [
        (UniqueField::StudentNumber, draft.student_number.as_str()),
        (UniqueField::StudentEmail, draft.email.as_str()),
    ]
}

fn student_from_row(row: &SqliteRow) -> AppResult<Student> {
    let major: Option<String> = row.get("major");
    let major = match major.as_deref() {
        None | Some("") => None,
        Some(label) => Some(Major::from_label(label).ok_or_else(|| {
            AppError::Database(format!("Unknown major '{}' stored for student", label))
        })?),
    };

    Ok(Student {
        id: row.get("id"),
        name: row.get("name"),
        student_number: row.get("student_number"),
        email: row.get("email"),
        phone: row.get("phone"),
        major,
        address: row.get("address"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
