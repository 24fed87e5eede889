use tracing::debug;

use crate::backend::RecordsBackend;
use crate::error::AppResult;
use crate::models::DashboardStats;

/// Totals and per-major student counts for the landing page
pub async fn dashboard(backend: &dyn RecordsBackend) -> AppResult<DashboardStats> {
    let stats = backend.dashboard_stats().await?;
    debug!(
        "Dashboard: {} students, {} lecturers, {} courses, {} enrollments",
        stats.total_students, stats.total_lecturers, stats.total_courses, stats.total_enrollments
    );
    Ok(stats)
}
