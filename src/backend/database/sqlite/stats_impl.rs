use sqlx::{Row, SqlitePool};
use std::collections::HashMap;

use crate::error::{AppError, AppResult};
use crate::models::{DashboardStats, Major, MajorCount};

/// Aggregate counts for the dashboard
pub struct SqliteStatsReader {
    pool: SqlitePool,
}

impl SqliteStatsReader {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn dashboard_stats(&self) -> AppResult<DashboardStats> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM students) AS total_students,
                (SELECT COUNT(*) FROM lecturers) AS total_lecturers,
                (SELECT COUNT(*) FROM courses) AS total_courses,
                (SELECT COUNT(*) FROM enrollments) AS total_enrollments
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to count records: {}", e)))?;

        Ok(DashboardStats {
            total_students: row.get("total_students"),
            total_lecturers: row.get("total_lecturers"),
            total_courses: row.get("total_courses"),
            total_enrollments: row.get("total_enrollments"),
            students_per_major: self.students_per_major().await?,
        })
    }

    /// One entry per offered major (zero included), then the unassigned bucket
    async fn students_per_major(&self) -> AppResult<Vec<MajorCount>> {
        let rows = sqlx::query(
            "SELECT NULLIF(major, '') AS major, COUNT(*) AS count FROM students GROUP BY NULLIF(major, '')",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to count students per major: {}", e)))?;

        let mut counts: HashMap<Option<String>, i64> = HashMap::new();
        for row in rows {
            counts.insert(row.get("major"), row.get("count"));
        }

        let mut result: Vec<MajorCount> = Major::ALL
            .into_iter()
            .map(|major| MajorCount {
                major: Some(major),
                count: counts
                    .get(&Some(major.label().to_string()))
                    .copied()
                    .unwrap_or(0),
            })
            .collect();
        result.push(MajorCount {
            major: None,
            count: counts.get(&None).copied().unwrap_or(0),
        });

        Ok(result)
    }
}
