use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use super::super::config::DatabaseBackendConfig;
use super::{
    SqliteCourseStore, SqliteEnrollmentStore, SqliteLecturerStore, SqliteLookup,
    SqliteStatsReader, SqliteStudentStore,
};
use crate::backend::{
    Backend, CourseBackend, LecturerBackend, StatsBackend, StudentBackend, ValidationLookup,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    Course, CourseDraft, DashboardStats, Lecturer, LecturerDraft, RecordId, RecordQuery, Student,
    StudentDraft,
};
use crate::schema::UniqueField;

/// SQLite database backend implementation
///
/// Holds one store per record kind over a shared pool; every trait method
/// delegates to the store that owns the table.
pub struct SqliteBackend {
    pool: SqlitePool,
    students: SqliteStudentStore,
    lecturers: SqliteLecturerStore,
    courses: SqliteCourseStore,
    enrollments: SqliteEnrollmentStore,
    stats: SqliteStatsReader,
    lookup: SqliteLookup,
}

impl SqliteBackend {
    /// Create a new SQLite backend instance over an existing pool
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            students: SqliteStudentStore::new(pool.clone()),
            lecturers: SqliteLecturerStore::new(pool.clone()),
            courses: SqliteCourseStore::new(pool.clone()),
            enrollments: SqliteEnrollmentStore::new(pool.clone()),
            stats: SqliteStatsReader::new(pool.clone()),
            lookup: SqliteLookup::new(pool.clone()),
            pool,
        }
    }

    /// Get the connection pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Backend for SqliteBackend {
    async fn connect(config: &DatabaseBackendConfig) -> AppResult<Self> {
        config
            .validate()
            .map_err(|e| AppError::Configuration(format!("Invalid backend config: {}", e)))?;

        let mut options = SqliteConnectOptions::from_str(&config.connection_url)
            .map_err(|e| AppError::Configuration(format!("Invalid SQLite URL: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);
        if let Some(mode) = config.get_option("journal_mode") {
            let mode = SqliteJournalMode::from_str(mode).map_err(|e| {
                AppError::Configuration(format!("Invalid journal mode '{}': {}", mode, e))
            })?;
            options = options.journal_mode(mode);
        }

        // Every connection to ":memory:" opens its own database, so the pool
        // must keep exactly one connection alive for the whole run.
        let pool_options = if config.is_memory_database() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections)
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to SQLite: {}", e)))?;

        debug!("Connected to SQLite at {}", config.connection_url);

        let backend = Self::new(pool);
        backend.init_schema().await?;
        Ok(backend)
    }

    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Health check failed: {}", e)))?;

        Ok(())
    }

    async fn init_schema(&self) -> AppResult<()> {
        super::schema::init_schema(&self.pool).await
    }

    async fn cleanup(&self) -> AppResult<()> {
        self.pool.close().await;
        info!("SQLite pool closed");
        Ok(())
    }
}

#[async_trait]
impl ValidationLookup for SqliteBackend {
    async fn value_taken(
        &self,
        field: UniqueField,
        value: &str,
        exclude: Option<RecordId>,
    ) -> AppResult<bool> {
        self.lookup.value_taken(field, value, exclude).await
    }

    async fn lecturer_exists(&self, id: RecordId) -> AppResult<bool> {
        self.lookup.lecturer_exists(id).await
    }

    async fn missing_students(&self, ids: &[RecordId]) -> AppResult<Vec<RecordId>> {
        self.lookup.missing_students(ids).await
    }
}

#[async_trait]
impl StudentBackend for SqliteBackend {
    async fn create_student(&self, draft: &StudentDraft) -> AppResult<Student> {
        self.students.insert(draft).await
    }

    async fn find_student_by_id(&self, id: RecordId) -> AppResult<Option<Student>> {
        self.students.find_by_id(id).await
    }

    async fn find_students(&self, query: &RecordQuery) -> AppResult<Vec<Student>> {
        self.students.find(query).await
    }

    async fn update_student(
        &self,
        id: RecordId,
        draft: &StudentDraft,
    ) -> AppResult<Option<Student>> {
        self.students.update(id, draft).await
    }

    async fn delete_student(&self, id: RecordId) -> AppResult<bool> {
        self.students.delete(id).await
    }

    async fn enroll_student(&self, student_id: RecordId, course_id: RecordId) -> AppResult<bool> {
        self.enrollments.add(course_id, student_id).await
    }

    async fn withdraw_student(
        &self,
        student_id: RecordId,
        course_id: RecordId,
    ) -> AppResult<bool> {
        self.enrollments.remove(course_id, student_id).await
    }

    async fn courses_for_student(&self, student_id: RecordId) -> AppResult<Vec<Course>> {
        self.courses.find_by_student(student_id).await
    }
}

#[async_trait]
impl LecturerBackend for SqliteBackend {
    async fn create_lecturer(&self, draft: &LecturerDraft) -> AppResult<Lecturer> {
        self.lecturers.insert(draft).await
    }

    async fn find_lecturer_by_id(&self, id: RecordId) -> AppResult<Option<Lecturer>> {
        self.lecturers.find_by_id(id).await
    }

    async fn find_lecturers(&self, query: &RecordQuery) -> AppResult<Vec<Lecturer>> {
        self.lecturers.find(query).await
    }

    async fn update_lecturer(
        &self,
        id: RecordId,
        draft: &LecturerDraft,
    ) -> AppResult<Option<Lecturer>> {
        self.lecturers.update(id, draft).await
    }

    async fn delete_lecturer(&self, id: RecordId) -> AppResult<bool> {
        self.lecturers.delete(id).await
    }

    async fn courses_taught_by(&self, lecturer_id: RecordId) -> AppResult<Vec<Course>> {
        self.courses.find_by_lecturer(lecturer_id).await
    }
}

#[async_trait]
impl CourseBackend for SqliteBackend {
    async fn create_course(&self, draft: &CourseDraft) -> AppResult<Course> {
        self.courses.insert(draft).await
    }

    async fn find_course_by_id(&self, id: RecordId) -> AppResult<Option<Course>> {
        self.courses.find_by_id(id).await
    }

    async fn find_courses(&self, query: &RecordQuery) -> AppResult<Vec<Course>> {
        self.courses.find(query).await
    }

    async fn update_course(&self, id: RecordId, draft: &CourseDraft) -> AppResult<Option<Course>> {
        self.courses.update(id, draft).await
    }

    async fn delete_course(&self, id: RecordId) -> AppResult<bool> {
        self.courses.delete(id).await
    }

    async fn add_course_student(
        &self,
        course_id: RecordId,
        student_id: RecordId,
    ) -> AppResult<bool> {
        self.enrollments.add(course_id, student_id).await
    }

    async fn remove_course_student(
        &self,
        course_id: RecordId,
        student_id: RecordId,
    ) -> AppResult<bool> {
        self.enrollments.remove(course_id, student_id).await
    }

    async fn students_for_course(&self, course_id: RecordId) -> AppResult<Vec<Student>> {
        self.students.find_by_course(course_id).await
    }
}

#[async_trait]
impl StatsBackend for SqliteBackend {
    async fn dashboard_stats(&self) -> AppResult<DashboardStats> {
        self.stats.dashboard_stats().await
    }
}
