use tracing::info;

use crate::backend::database::RecordWriteProcessor;
use crate::backend::RecordsBackend;
use crate::error::{AppError, AppResult};
use crate::models::{Course, RecordId, RecordQuery, Student};
use crate::parser::{EntityKind, FieldMap};
use crate::schema::EntityValidator;

/// Validate and store a new course together with its initial roster
pub async fn create_course(backend: &dyn RecordsBackend, fields: &FieldMap) -> AppResult<Course> {
    let draft = EntityValidator::new(backend)
        .validate_course(fields, None)
        .await?;
    let course = backend.create_course(&draft).await?;

    info!(
        target: "audit_log",
        entity = "course",
        id = course.id,
        action = "create",
        "Course #{} created ({}, {} student(s))",
        course.id,
        course.code,
        course.student_ids.len()
    );
    Ok(course)
}

pub async fn get_course(backend: &dyn RecordsBackend, id: RecordId) -> AppResult<Course> {
    RecordWriteProcessor::validate_record_id(EntityKind::Course, id)?;
    backend
        .find_course_by_id(id)
        .await?
        .ok_or(AppError::NotFound {
            entity: EntityKind::Course,
            id,
        })
}

pub async fn search_courses(
    backend: &dyn RecordsBackend,
    query: &RecordQuery,
) -> AppResult<Vec<Course>> {
    backend.find_courses(query).await
}

pub async fn update_course(
    backend: &dyn RecordsBackend,
    id: RecordId,
    payload: &[u8],
) -> AppResult<Course> {
    let changes = FieldMap::from_json_slice(EntityKind::Course, payload)?;
    update_course_fields(backend, id, &changes).await
}

/// Update a course; the roster is only replaced when `changes` carries `students`
pub async fn update_course_fields(
    backend: &dyn RecordsBackend,
    id: RecordId,
    changes: &FieldMap,
) -> AppResult<Course> {
    let current = get_course(backend, id).await?;
    let mut fields = current.to_field_map();
    fields.overlay(changes);

    let draft = EntityValidator::new(backend)
        .validate_course(&fields, Some(id))
        .await?;
    let course = backend
        .update_course(id, &draft)
        .await?
        .ok_or(AppError::NotFound {
            entity: EntityKind::Course,
            id,
        })?;

    info!(
        target: "audit_log",
        entity = "course",
        id = id,
        action = "update",
        "Course #{} updated",
        id
    );
    Ok(course)
}

pub async fn delete_course(backend: &dyn RecordsBackend, id: RecordId) -> AppResult<()> {
    RecordWriteProcessor::validate_record_id(EntityKind::Course, id)?;
    if !backend.delete_course(id).await? {
        return Err(AppError::NotFound {
            entity: EntityKind::Course,
            id,
        });
    }

    info!(
        target: "audit_log",
        entity = "course",
        id = id,
        action = "delete",
        "Course #{} deleted",
        id
    );
    Ok(())
}

pub async fn add_student(
    backend: &dyn RecordsBackend,
    course_id: RecordId,
    student_id: RecordId,
) -> AppResult<bool> {
    let added = backend.add_course_student(course_id, student_id).await?;
    if added {
        info!(
            target: "audit_log",
            entity = "enrollment",
            id = course_id,
            action = "enroll",
            "Student #{} added to course #{}",
            student_id,
            course_id
        );
    }
    Ok(added)
}

pub async fn remove_student(
    backend: &dyn RecordsBackend,
    course_id: RecordId,
    student_id: RecordId,
) -> AppResult<bool> {
    let removed = backend.remove_course_student(course_id, student_id).await?;
    if removed {
        info!(
            target: "audit_log",
            entity = "enrollment",
            id = course_id,
            action = "withdraw",
            "Student #{} removed from course #{}",
            student_id,
            course_id
        );
    }
    Ok(removed)
}

/// Students on the course roster, ordered by id
pub async fn roster(backend: &dyn RecordsBackend, course_id: RecordId) -> AppResult<Vec<Student>> {
    get_course(backend, course_id).await?;
    backend.students_for_course(course_id).await
}
