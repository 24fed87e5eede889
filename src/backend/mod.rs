use crate::error::AppResult;
use crate::models::{
    Course, CourseDraft, DashboardStats, Lecturer, LecturerDraft, RecordId, RecordQuery, Student,
    StudentDraft,
};
use crate::schema::UniqueField;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub mod database;

use database::DatabaseBackendConfig;

/// Supported database backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    #[default]
    SQLite,
}

impl DatabaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseType::SQLite => "sqlite",
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core backend abstraction for the records store
///
/// Each storage implementation provides connection handling and schema
/// setup here; entity operations live in the per-entity traits below.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Connect and initialize the storage backend
    async fn connect(config: &DatabaseBackendConfig) -> AppResult<Self>
    where
        Self: Sized;

    /// Check if the storage backend is healthy and accessible
    async fn health_check(&self) -> AppResult<()>;

    /// Create tables and indexes if they do not exist yet
    async fn init_schema(&self) -> AppResult<()>;

    /// Clean up resources when storage is no longer needed
    async fn cleanup(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Storage lookups the entity validator needs
#[async_trait]
pub trait ValidationLookup: Send + Sync {
    /// Whether another record already holds `value` in a unique field
    ///
    /// `exclude` is the record under edit, which never counts as a collision.
    async fn value_taken(
        &self,
        field: UniqueField,
        value: &str,
        exclude: Option<RecordId>,
    ) -> AppResult<bool>;

    async fn lecturer_exists(&self, id: RecordId) -> AppResult<bool>;

    /// The subset of `ids` that has no stored student, ascending
    async fn missing_students(&self, ids: &[RecordId]) -> AppResult<Vec<RecordId>>;
}

/// Student operations, including enrollment from the student side
#[async_trait]
pub trait StudentBackend: Backend {
    async fn create_student(&self, draft: &StudentDraft) -> AppResult<Student>;

    async fn find_student_by_id(&self, id: RecordId) -> AppResult<Option<Student>>;

    /// Students matching a search, ordered by id
    async fn find_students(&self, query: &RecordQuery) -> AppResult<Vec<Student>>;

    /// Replace the stored fields; `None` when the student does not exist
    async fn update_student(&self, id: RecordId, draft: &StudentDraft)
        -> AppResult<Option<Student>>;

    /// Delete a student together with its enrollments
    async fn delete_student(&self, id: RecordId) -> AppResult<bool>;

    /// Enroll a student in a course; false when already enrolled
    async fn enroll_student(&self, student_id: RecordId, course_id: RecordId) -> AppResult<bool>;

    /// Withdraw a student from a course; false when not enrolled
    async fn withdraw_student(&self, student_id: RecordId, course_id: RecordId)
        -> AppResult<bool>;

    async fn courses_for_student(&self, student_id: RecordId) -> AppResult<Vec<Course>>;
}

#[async_trait]
pub trait LecturerBackend: Backend {
    async fn create_lecturer(&self, draft: &LecturerDraft) -> AppResult<Lecturer>;

    async fn find_lecturer_by_id(&self, id: RecordId) -> AppResult<Option<Lecturer>>;

    async fn find_lecturers(&self, query: &RecordQuery) -> AppResult<Vec<Lecturer>>;

    async fn update_lecturer(
        &self,
        id: RecordId,
        draft: &LecturerDraft,
    ) -> AppResult<Option<Lecturer>>;

    /// Delete a lecturer; fails with a referential conflict while courses point at it
    async fn delete_lecturer(&self, id: RecordId) -> AppResult<bool>;

    async fn courses_taught_by(&self, lecturer_id: RecordId) -> AppResult<Vec<Course>>;
}

/// Course operations, including enrollment from the course side
#[async_trait]
pub trait CourseBackend: Backend {
    async fn create_course(&self, draft: &CourseDraft) -> AppResult<Course>;

    async fn find_course_by_id(&self, id: RecordId) -> AppResult<Option<Course>>;

    async fn find_courses(&self, query: &RecordQuery) -> AppResult<Vec<Course>>;

    /// Replace the stored fields and roster; `None` when the course does not exist
    async fn update_course(&self, id: RecordId, draft: &CourseDraft) -> AppResult<Option<Course>>;

    /// Delete a course and its enrollments; lecturer and students stay
    async fn delete_course(&self, id: RecordId) -> AppResult<bool>;

    async fn add_course_student(&self, course_id: RecordId, student_id: RecordId)
        -> AppResult<bool>;

    async fn remove_course_student(
        &self,
        course_id: RecordId,
        student_id: RecordId,
    ) -> AppResult<bool>;

    async fn students_for_course(&self, course_id: RecordId) -> AppResult<Vec<Student>>;
}

#[async_trait]
pub trait StatsBackend: Backend {
    async fn dashboard_stats(&self) -> AppResult<DashboardStats>;
}

/// Combined backend interface covering every record kind
pub trait RecordsBackend:
    StudentBackend + LecturerBackend + CourseBackend + StatsBackend + ValidationLookup
{
}

/// Automatic implementation for any type that implements all the parts
impl<T> RecordsBackend for T where
    T: StudentBackend + LecturerBackend + CourseBackend + StatsBackend + ValidationLookup
{
}

/// Factory for creating backend instances
pub struct BackendFactory;

impl BackendFactory {
    /// Create a backend based on configuration
    pub async fn create(config: &DatabaseBackendConfig) -> AppResult<Arc<dyn RecordsBackend>> {
        let backend = Self::create_backend(config).await?;
        Ok(Arc::from(backend))
    }

    /// Create a backend based on configuration (returns Box)
    pub async fn create_backend(
        config: &DatabaseBackendConfig,
    ) -> AppResult<Box<dyn RecordsBackend>> {
        match config.database_type {
            DatabaseType::SQLite => {
                let backend = database::sqlite::SqliteBackend::connect(config).await?;
                Ok(Box::new(backend))
            }
        }
    }
}
