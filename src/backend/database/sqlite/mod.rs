pub mod backend_impl;
pub mod course_impl;
pub mod enrollment_impl;
pub mod lecturer_impl;
pub mod lookup_impl;
pub mod schema;
pub mod stats_impl;
pub mod student_impl;

pub use backend_impl::SqliteBackend;
pub use course_impl::SqliteCourseStore;
pub use enrollment_impl::SqliteEnrollmentStore;
pub use lecturer_impl::SqliteLecturerStore;
pub use lookup_impl::SqliteLookup;
pub use stats_impl::SqliteStatsReader;
pub use student_impl::SqliteStudentStore;

/// Single-connection in-memory pool with the schema in place
#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect(":memory:")
        .await
        .unwrap();
    schema::init_schema(&pool).await.unwrap();
    pool
}
