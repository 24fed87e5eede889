//! Record operations shared by every delivery surface
//!
//! Creates take a field mapping (form submission), updates take a JSON
//! payload laid over the stored record (programmatic update). Both paths run
//! the same entity validator before anything is written.

pub mod course;
pub mod dashboard;
pub mod export;
pub mod lecturer;
pub mod student;

use crate::backend::RecordsBackend;
use crate::error::AppResult;
use crate::models::{Course, Record, RecordId, RecordQuery};
use crate::parser::{EntityKind, FieldMap};

pub use dashboard::dashboard;
pub use export::{export_file_stem, export_records, ExportTable};

/// Create a record of whatever kind `fields` was built for
pub async fn create_record(backend: &dyn RecordsBackend, fields: &FieldMap) -> AppResult<Record> {
    Ok(match fields.kind() {
        EntityKind::Student => Record::Student(student::create_student(backend, fields).await?),
        EntityKind::Lecturer => {
            Record::Lecturer(lecturer::create_lecturer(backend, fields).await?)
        }
        EntityKind::Course => Record::Course(course::create_course(backend, fields).await?),
    })
}

pub async fn get_record(
    backend: &dyn RecordsBackend,
    kind: EntityKind,
    id: RecordId,
) -> AppResult<Record> {
    Ok(match kind {
        EntityKind::Student => Record::Student(student::get_student(backend, id).await?),
        EntityKind::Lecturer => Record::Lecturer(lecturer::get_lecturer(backend, id).await?),
        EntityKind::Course => Record::Course(course::get_course(backend, id).await?),
    })
}

/// Courses linked to a person: enrolled in for students, taught for lecturers
///
/// Courses have no related course list and yield `None`.
pub async fn related_courses(
    backend: &dyn RecordsBackend,
    kind: EntityKind,
    id: RecordId,
) -> AppResult<Option<Vec<Course>>> {
    Ok(match kind {
        EntityKind::Student => Some(student::courses_of_student(backend, id).await?),
        EntityKind::Lecturer => Some(lecturer::courses_of_lecturer(backend, id).await?),
        EntityKind::Course => None,
    })
}

pub async fn list_records(
    backend: &dyn RecordsBackend,
    kind: EntityKind,
    query: &RecordQuery,
) -> AppResult<Vec<Record>> {
    Ok(match kind {
        EntityKind::Student => student::search_students(backend, query)
            .await?
            .into_iter()
            .map(Record::Student)
            .collect(),
        EntityKind::Lecturer => lecturer::search_lecturers(backend, query)
            .await?
            .into_iter()
            .map(Record::Lecturer)
            .collect(),
        EntityKind::Course => course::search_courses(backend, query)
            .await?
            .into_iter()
            .map(Record::Course)
            .collect(),
    })
}

pub async fn update_record(
    backend: &dyn RecordsBackend,
    kind: EntityKind,
    id: RecordId,
    payload: &[u8],
) -> AppResult<Record> {
    Ok(match kind {
        EntityKind::Student => {
            Record::Student(student::update_student(backend, id, payload).await?)
        }
        EntityKind::Lecturer => {
            Record::Lecturer(lecturer::update_lecturer(backend, id, payload).await?)
        }
        EntityKind::Course => Record::Course(course::update_course(backend, id, payload).await?),
    })
}

pub async fn delete_record(
    backend: &dyn RecordsBackend,
    kind: EntityKind,
    id: RecordId,
) -> AppResult<()> {
    match kind {
        EntityKind::Student => student::delete_student(backend, id).await,
        EntityKind::Lecturer => lecturer::delete_lecturer(backend, id).await,
        EntityKind::Course => course::delete_course(backend, id).await,
    }
}
