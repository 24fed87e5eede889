use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::super::record_query::SearchClause;
use super::super::record_write::{map_database_error, RecordWriteProcessor};
use super::enrollment_impl::{replace_roster, SqliteEnrollmentStore};
use crate::error::{AppError, AppResult};
use crate::models::{Course, CourseDraft, RecordId, RecordQuery};
use crate::parser::EntityKind;
use crate::schema::UniqueField;

const COURSE_COLUMNS: &str =
    "id, name, code, credits, semester, lecturer_id, created_at, updated_at";

/// SQLite storage for course records and their rosters
pub struct SqliteCourseStore {
    pool: SqlitePool,
    enrollments: SqliteEnrollmentStore,
}

impl SqliteCourseStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            enrollments: SqliteEnrollmentStore::new(pool.clone()),
            pool,
        }
    }

    /// Insert a course and its roster in one transaction
    pub async fn insert(&self, draft: &CourseDraft) -> AppResult<Course> {
        let now = RecordWriteProcessor::timestamp();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to start transaction: {}", e)))?;

        let result = sqlx::query(
            "INSERT INTO courses (name, code, credits, semester, lecturer_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&draft.name)
        .bind(&draft.code)
        .bind(draft.credits)
        .bind(draft.semester)
        .bind(draft.lecturer_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_database_error(e, EntityKind::Course, "create", &unique_values(draft)))?;

        let id = result.last_insert_rowid();
        let roster = draft.student_ids.clone().unwrap_or_default();
        replace_roster(&mut *tx, id, &roster).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;

        Ok(Course {
            id,
            name: draft.name.clone(),
            code: draft.code.clone(),
            credits: draft.credits,
            semester: draft.semester,
            lecturer_id: draft.lecturer_id,
            student_ids: roster,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn find_by_id(&self, id: RecordId) -> AppResult<Option<Course>> {
        let sql = format!("SELECT {} FROM courses WHERE id = ?1", COURSE_COLUMNS);

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to find course: {}", e)))?;

        match row {
            Some(row) => {
                let mut course = course_from_row(&row);
                course.student_ids = self.enrollments.student_ids(course.id).await?;
                Ok(Some(course))
            }
            None => Ok(None),
        }
    }

    pub async fn find(&self, query: &RecordQuery) -> AppResult<Vec<Course>> {
        let clause = SearchClause::build(query, &["name", "code"], None);
        let sql = format!(
            "SELECT {} FROM courses{} ORDER BY id",
            COURSE_COLUMNS, clause.where_clause
        );

        let mut select = sqlx::query(&sql);
        for parameter in &clause.parameters {
            select = select.bind(parameter);
        }

        let rows = select
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to search courses: {}", e)))?;

        self.with_rosters(rows).await
    }

    /// Courses owned by a lecturer, ordered by id
    pub async fn find_by_lecturer(&self, lecturer_id: RecordId) -> AppResult<Vec<Course>> {
        let sql = format!(
            "SELECT {} FROM courses WHERE lecturer_id = ?1 ORDER BY id",
            COURSE_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(lecturer_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to fetch lecturer courses: {}", e)))?;

        self.with_rosters(rows).await
    }

    /// Courses a student is enrolled in, ordered by id
    pub async fn find_by_student(&self, student_id: RecordId) -> AppResult<Vec<Course>> {
        let sql = format!(
            "SELECT {} FROM courses WHERE id IN (SELECT course_id FROM enrollments WHERE student_id = ?1) ORDER BY id",
            COURSE_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(student_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to fetch student courses: {}", e)))?;

        self.with_rosters(rows).await
    }

    /// Update the course fields, and the roster when the draft carries one, in one transaction
    pub async fn update(&self, id: RecordId, draft: &CourseDraft) -> AppResult<Option<Course>> {
        let now = RecordWriteProcessor::timestamp();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to start transaction: {}", e)))?;

        let result = sqlx::query(
            "UPDATE courses SET name = ?1, code = ?2, credits = ?3, semester = ?4, lecturer_id = ?5, updated_at = ?6 WHERE id = ?7",
        )
        .bind(&draft.name)
        .bind(&draft.code)
        .bind(draft.credits)
        .bind(draft.semester)
        .bind(draft.lecturer_id)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_database_error(e, EntityKind::Course, "update", &unique_values(draft)))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        if let Some(roster) = &draft.student_ids {
            replace_roster(&mut *tx, id, roster).await?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;

        self.find_by_id(id).await
    }

    /// Delete a course and its enrollment rows
    pub async fn delete(&self, id: RecordId) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to start transaction: {}", e)))?;

        sqlx::query("DELETE FROM enrollments WHERE course_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete course enrollments: {}", e)))?;

        let result = sqlx::query("DELETE FROM courses WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_database_error(e, EntityKind::Course, "delete", &[]))?;

        let course_was_deleted = result.rows_affected() > 0;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;

        Ok(course_was_deleted)
    }

    async fn with_rosters(&self, rows: Vec<SqliteRow>) -> AppResult<Vec<Course>> {
        let mut courses = Vec::with_capacity(rows.len());
        for row in rows {
            let mut course = course_from_row(&row);
            course.student_ids = self.enrollments.student_ids(course.id).await?;
            courses.push(course);
        }
        Ok(courses)
    }
}

fn unique_values(draft: &CourseDraft) -> [(UniqueField, &str); 1] {
    [(UniqueField::CourseCode, draft.code.as_str())]
}

/// Course row without its roster; callers fill `student_ids`
fn course_from_row(row: &SqliteRow) -> Course {
    Course {
        id: row.get("id"),
        name: row.get("name"),
        code: row.get("code"),
        credits: row.get("credits"),
        semester: row.get("semester"),
        lecturer_id: row.get("lecturer_id"),
        student_ids: Vec::new(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_pool;
    use super::*;
    use assert_matches::assert_matches;

    async fn seeded_store() -> SqliteCourseStore {
        let pool = test_pool().await;
        let now = chrono::Utc::now();
        sqlx::query("INSERT INTO lecturers (name, lecturer_number, email, created_at, updated_at) VALUES ('Ani Wijaya', '0012345678', 'ani@kampus.ac.id', ?1, ?1)")
            .bind(now)
            .execute(&pool)
            .await
            .unwrap();
        for (number, email) in [
            ("2023001", "budi@example.com"),
            ("2023002", "siti@example.com"),
            ("2023003", "rina@example.com"),
        ] {
            sqlx::query("INSERT INTO students (name, student_number, email, created_at, updated_at) VALUES ('Mahasiswa Uji', ?1, ?2, ?3, ?3)")
                .bind(number)
                .bind(email)
                .bind(now)
                .execute(&pool)
                .await
                .unwrap();
        }
        SqliteCourseStore::new(pool)
    }

    fn draft(code: &str, student_ids: Vec<RecordId>) -> CourseDraft {
        CourseDraft {
            name: "Basis Data".to_string(),
            code: code.to_string(),
            credits: 3,
            semester: 2,
            lecturer_id: 1,
            student_ids: Some(student_ids),
        }
    }

    #[tokio::test]
    async fn test_insert_with_roster() {
        let store = seeded_store().await;
        let created = store.insert(&draft("IF201", vec![1, 3])).await.unwrap();

        let found = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.student_ids, vec![1, 3]);
        assert_eq!(store.find_by_student(3).await.unwrap().len(), 1);
        assert!(store.find_by_student(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_rewrites_roster() {
        let store = seeded_store().await;
        let created = store.insert(&draft("IF201", vec![1, 3])).await.unwrap();

        let updated = store
            .update(created.id, &draft("IF201", vec![2]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.student_ids, vec![2]);
        assert!(store.find_by_student(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_without_roster_keeps_enrollments() {
        let store = seeded_store().await;
        let created = store.insert(&draft("IF201", vec![1])).await.unwrap();
        assert!(store.enrollments.add(created.id, 2).await.unwrap());

        let mut credits_only = draft("IF201", Vec::new());
        credits_only.credits = 4;
        credits_only.student_ids = None;

        let updated = store
            .update(created.id, &credits_only)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.credits, 4);
        assert_eq!(updated.student_ids, vec![1, 2]);
        assert_eq!(store.enrollments.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unknown_lecturer_is_rejected_by_storage() {
        let store = seeded_store().await;
        let mut orphan = draft("IF202", Vec::new());
        orphan.lecturer_id = 77;

        let err = store.insert(&orphan).await.unwrap_err();
        assert_matches!(err, AppError::ReferentialConflict(_));
    }

    #[tokio::test]
    async fn test_delete_keeps_students() {
        let store = seeded_store().await;
        let created = store.insert(&draft("IF201", vec![1, 2])).await.unwrap();

        assert!(store.delete(created.id).await.unwrap());
        assert!(store.find_by_id(created.id).await.unwrap().is_none());
        assert_eq!(store.enrollments.count().await.unwrap(), 0);

        let students: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(students, 3);
        assert_eq!(store.find_by_lecturer(1).await.unwrap().len(), 0);
    }
}
