#![allow(dead_code)]

use siakad_server::backend::database::DatabaseBackendConfig;
use siakad_server::backend::{BackendFactory, RecordsBackend};
use siakad_server::models::{Course, Lecturer, Student};
use siakad_server::parser::{EntityKind, FieldMap};
use siakad_server::resource::{course, lecturer, student};
use std::sync::Arc;

/// Create backend for testing with in-memory SQLite database
pub async fn setup_test_backend() -> Arc<dyn RecordsBackend> {
    BackendFactory::create(&DatabaseBackendConfig::memory_sqlite())
        .await
        .expect("in-memory backend")
}

/// Form fields of the reference student submission
pub fn sample_student_fields() -> FieldMap {
    FieldMap::new(EntityKind::Student)
        .with("name", "budi santoso sering")
        .with("student_number", "2023001")
        .with("email", "Budi.Santoso@Example.COM")
        .with("phone", "0812-3456-7890")
        .with("major", "Teknologi Informasi")
        .with("address", "  Jl. Merdeka   No. 10,   Bandung ")
}

pub fn student_fields(name: &str, number: &str, email: &str) -> FieldMap {
    FieldMap::new(EntityKind::Student)
        .with("name", name)
        .with("student_number", number)
        .with("email", email)
        .with("major", "Sains Data")
}

pub fn lecturer_fields(name: &str, number: &str, email: &str) -> FieldMap {
    FieldMap::new(EntityKind::Lecturer)
        .with("name", name)
        .with("lecturer_number", number)
        .with("email", email)
        .with("department", "Teknik Informatika")
}

pub fn course_fields(code: &str, lecturer_id: i64, students: &[i64]) -> FieldMap {
    FieldMap::new(EntityKind::Course)
        .with("name", "Basis Data")
        .with("code", code)
        .with("credits", "3")
        .with("semester", "2")
        .with("lecturer", lecturer_id)
        .with(
            "students",
            students.iter().map(|id| id.to_string()).collect::<Vec<String>>(),
        )
}

pub async fn create_test_student(
    backend: &dyn RecordsBackend,
    name: &str,
    number: &str,
    email: &str,
) -> Student {
    student::create_student(backend, &student_fields(name, number, email))
        .await
        .expect("student created")
}

pub async fn create_test_lecturer(backend: &dyn RecordsBackend) -> Lecturer {
    lecturer::create_lecturer(
        backend,
        &lecturer_fields("Ani Wijaya", "0012345678", "ani@kampus.ac.id"),
    )
    .await
    .expect("lecturer created")
}

pub async fn create_test_course(
    backend: &dyn RecordsBackend,
    code: &str,
    lecturer_id: i64,
    students: &[i64],
) -> Course {
    course::create_course(backend, &course_fields(code, lecturer_id, students))
        .await
        .expect("course created")
}
