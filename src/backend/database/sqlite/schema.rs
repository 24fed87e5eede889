use crate::error::{AppError, AppResult};
use sqlx::SqlitePool;

/// Initialize the records schema for SQLite
///
/// This creates the students, lecturers, courses and enrollments tables with
/// their unique and foreign key constraints, then the lookup indexes.
pub async fn init_schema(pool: &SqlitePool) -> AppResult<()> {
    let statements = [
        (
            "students",
            r#"
            CREATE TABLE IF NOT EXISTS students (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                student_number TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                phone TEXT,
                major TEXT CHECK (major IS NULL OR major IN ('Teknologi Informasi', 'Sains Data')),
                address TEXT NOT NULL DEFAULT '',
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        ),
        (
            "lecturers",
            r#"
            CREATE TABLE IF NOT EXISTS lecturers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                lecturer_number TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                phone TEXT,
                department TEXT NOT NULL DEFAULT '',
                address TEXT NOT NULL DEFAULT '',
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        ),
        (
            "courses",
            r#"
            CREATE TABLE IF NOT EXISTS courses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                code TEXT NOT NULL UNIQUE,
                credits INTEGER NOT NULL CHECK (credits >= 1),
                semester INTEGER NOT NULL CHECK (semester >= 1),
                lecturer_id INTEGER NOT NULL,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (lecturer_id) REFERENCES lecturers (id) ON DELETE RESTRICT
            )
            "#,
        ),
        (
            "enrollments",
            r#"
            CREATE TABLE IF NOT EXISTS enrollments (
                course_id INTEGER NOT NULL,
                student_id INTEGER NOT NULL,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (course_id, student_id),
                FOREIGN KEY (course_id) REFERENCES courses (id) ON DELETE CASCADE,
                FOREIGN KEY (student_id) REFERENCES students (id) ON DELETE CASCADE
            )
            "#,
        ),
    ];

    for (table, sql) in statements {
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to create {} table: {}", table, e)))?;
    }

    create_indexes(pool).await?;

    Ok(())
}

/// Create lookup indexes for search and join traversal
async fn create_indexes(pool: &SqlitePool) -> AppResult<()> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_students_name ON students (LOWER(name))",
        "CREATE INDEX IF NOT EXISTS idx_students_major ON students (major)",
        "CREATE INDEX IF NOT EXISTS idx_lecturers_name ON lecturers (LOWER(name))",
        "CREATE INDEX IF NOT EXISTS idx_courses_name ON courses (LOWER(name))",
        "CREATE INDEX IF NOT EXISTS idx_courses_lecturer_id ON courses (lecturer_id)",
        "CREATE INDEX IF NOT EXISTS idx_enrollments_student_id ON enrollments (student_id)",
    ];

    for sql in indexes {
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to create index: {}", e)))?;
    }

    Ok(())
}
