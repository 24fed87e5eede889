//! Tabular projections of the stored records
//!
//! Tables are built in memory with a fixed column order; turning them into a
//! CSV or spreadsheet file is left to the delivery layer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::backend::RecordsBackend;
use crate::error::AppResult;
use crate::models::{RecordQuery, RecordId};
use crate::parser::EntityKind;

pub const STUDENT_COLUMNS: [&str; 7] = ["No", "Nama", "NPM", "Email", "No. HP", "Jurusan", "Alamat"];
pub const LECTURER_COLUMNS: [&str; 7] =
    ["No", "Nama", "NIDN", "Email", "No. HP", "Homebase", "Alamat"];
pub const COURSE_COLUMNS: [&str; 7] = [
    "No",
    "Nama MK",
    "Kode MK",
    "SKS",
    "Semester",
    "Dosen",
    "Jumlah Mahasiswa",
];

/// Header row plus one row of cells per record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportTable {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    /// Append a row, prefixed with its 1-based sequence number
    fn push_row(&mut self, cells: Vec<String>) {
        let mut row = Vec::with_capacity(cells.len() + 1);
        row.push((self.rows.len() + 1).to_string());
        row.extend(cells);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// File name stem for an export taken at `at`, e.g. `mahasiswa_20261018_093000`
pub fn export_file_stem(kind: EntityKind, at: DateTime<Utc>) -> String {
    format!("{}_{}", kind.local_name(), at.format("%Y%m%d_%H%M%S"))
}

pub async fn export_records(
    backend: &dyn RecordsBackend,
    kind: EntityKind,
    query: &RecordQuery,
) -> AppResult<ExportTable> {
    match kind {
        EntityKind::Student => export_students(backend, query).await,
        EntityKind::Lecturer => export_lecturers(backend, query).await,
        EntityKind::Course => export_courses(backend, query).await,
    }
}

pub async fn export_students(
    backend: &dyn RecordsBackend,
    query: &RecordQuery,
) -> AppResult<ExportTable> {
    let mut table = ExportTable::new(&STUDENT_COLUMNS);
    for student in backend.find_students(query).await? {
        table.push_row(vec![
            student.name,
            student.student_number,
            student.email,
            student.phone.unwrap_or_default(),
            student
                .major
                .map(|major| major.label().to_string())
                .unwrap_or_default(),
            student.address,
        ]);
    }
    Ok(table)
}

pub async fn export_lecturers(
    backend: &dyn RecordsBackend,
    query: &RecordQuery,
) -> AppResult<ExportTable> {
    let mut table = ExportTable::new(&LECTURER_COLUMNS);
    for lecturer in backend.find_lecturers(query).await? {
        table.push_row(vec![
            lecturer.name,
            lecturer.lecturer_number,
            lecturer.email,
            lecturer.phone.unwrap_or_default(),
            lecturer.department,
            lecturer.address,
        ]);
    }
    Ok(table)
}

/// Courses with their lecturer's name and roster size
pub async fn export_courses(
    backend: &dyn RecordsBackend,
    query: &RecordQuery,
) -> AppResult<ExportTable> {
    let lecturer_names: HashMap<RecordId, String> = backend
        .find_lecturers(&RecordQuery::default())
        .await?
        .into_iter()
        .map(|lecturer| (lecturer.id, lecturer.name))
        .collect();

    let mut table = ExportTable::new(&COURSE_COLUMNS);
    for course in backend.find_courses(query).await? {
        table.push_row(vec![
            course.name,
            course.code,
            course.credits.to_string(),
            course.semester.to_string(),
            lecturer_names
                .get(&course.lecturer_id)
                .cloned()
                .unwrap_or_default(),
            course.student_ids.len().to_string(),
        ]);
    }
    Ok(table)
}
