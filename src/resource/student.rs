use tracing::info;

use crate::backend::database::RecordWriteProcessor;
use crate::backend::RecordsBackend;
use crate::error::{AppError, AppResult};
use crate::models::{Course, RecordId, RecordQuery, Student};
use crate::parser::{EntityKind, FieldMap};
use crate::schema::EntityValidator;

/// Form submission: validate every field and store a new student
pub async fn create_student(backend: &dyn RecordsBackend, fields: &FieldMap) -> AppResult<Student> {
    let draft = EntityValidator::new(backend)
        .validate_student(fields, None)
        .await?;
    let student = backend.create_student(&draft).await?;

    info!(
        target: "audit_log",
        entity = "student",
        id = student.id,
        action = "create",
        "Student #{} created ({})",
        student.id,
        student.student_number
    );
    Ok(student)
}

pub async fn get_student(backend: &dyn RecordsBackend, id: RecordId) -> AppResult<Student> {
    RecordWriteProcessor::validate_record_id(EntityKind::Student, id)?;
    backend
        .find_student_by_id(id)
        .await?
        .ok_or(AppError::NotFound {
            entity: EntityKind::Student,
            id,
        })
}

pub async fn search_students(
    backend: &dyn RecordsBackend,
    query: &RecordQuery,
) -> AppResult<Vec<Student>> {
    backend.find_students(query).await
}

/// Programmatic update from a JSON payload
///
/// The payload is decoded before anything is loaded, so a malformed request
/// never reaches storage.
pub async fn update_student(
    backend: &dyn RecordsBackend,
    id: RecordId,
    payload: &[u8],
) -> AppResult<Student> {
    let changes = FieldMap::from_json_slice(EntityKind::Student, payload)?;
    update_student_fields(backend, id, &changes).await
}

/// Lay `changes` over the stored student and run the full validation again
pub async fn update_student_fields(
    backend: &dyn RecordsBackend,
    id: RecordId,
    changes: &FieldMap,
) -> AppResult<Student> {
    let current = get_student(backend, id).await?;
    let mut fields = current.to_field_map();
    fields.overlay(changes);

    let draft = EntityValidator::new(backend)
        .validate_student(&fields, Some(id))
        .await?;
    let student = backend
        .update_student(id, &draft)
        .await?
        .ok_or(AppError::NotFound {
            entity: EntityKind::Student,
            id,
        })?;

    info!(
        target: "audit_log",
        entity = "student",
        id = id,
        action = "update",
        "Student #{} updated",
        id
    );
    Ok(student)
}

/// Delete a student; its enrollments go with it
pub async fn delete_student(backend: &dyn RecordsBackend, id: RecordId) -> AppResult<()> {
    RecordWriteProcessor::validate_record_id(EntityKind::Student, id)?;
    if !backend.delete_student(id).await? {
        return Err(AppError::NotFound {
            entity: EntityKind::Student,
            id,
        });
    }

    info!(
        target: "audit_log",
        entity = "student",
        id = id,
        action = "delete",
        "Student #{} deleted",
        id
    );
    Ok(())
}

/// Enroll a student in a course; `false` when the student was already enrolled
pub async fn enroll(
    backend: &dyn RecordsBackend,
    student_id: RecordId,
    course_id: RecordId,
) -> AppResult<bool> {
    let added = backend.enroll_student(student_id, course_id).await?;
    if added {
        info!(
            target: "audit_log",
            entity = "enrollment",
            id = course_id,
            action = "enroll",
            "Student #{} enrolled in course #{}",
            student_id,
            course_id
        );
    }
    Ok(added)
}

pub async fn withdraw(
    backend: &dyn RecordsBackend,
    student_id: RecordId,
    course_id: RecordId,
) -> AppResult<bool> {
    let removed = backend.withdraw_student(student_id, course_id).await?;
    if removed {
        info!(
            target: "audit_log",
            entity = "enrollment",
            id = course_id,
            action = "withdraw",
            "Student #{} withdrawn from course #{}",
            student_id,
            course_id
        );
    }
    Ok(removed)
}

/// Courses the student is enrolled in, ordered by id
pub async fn courses_of_student(
    backend: &dyn RecordsBackend,
    student_id: RecordId,
) -> AppResult<Vec<Course>> {
    get_student(backend, student_id).await?;
    backend.courses_for_student(student_id).await
}
