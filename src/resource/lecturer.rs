use tracing::info;

use crate::backend::database::RecordWriteProcessor;
use crate::backend::RecordsBackend;
use crate::error::{AppError, AppResult};
use crate::models::{Course, Lecturer, RecordId, RecordQuery};
use crate::parser::{EntityKind, FieldMap};
use crate::schema::EntityValidator;

pub async fn create_lecturer(
    backend: &dyn RecordsBackend,
    fields: &FieldMap,
) -> AppResult<Lecturer> {
    let draft = EntityValidator::new(backend)
        .validate_lecturer(fields, None)
        .await?;
    let lecturer = backend.create_lecturer(&draft).await?;

    info!(
        target: "audit_log",
        entity = "lecturer",
        id = lecturer.id,
        action = "create",
        "Lecturer #{} created ({})",
        lecturer.id,
        lecturer.lecturer_number
    );
    Ok(lecturer)
}

pub async fn get_lecturer(backend: &dyn RecordsBackend, id: RecordId) -> AppResult<Lecturer> {
    RecordWriteProcessor::validate_record_id(EntityKind::Lecturer, id)?;
    backend
        .find_lecturer_by_id(id)
        .await?
        .ok_or(AppError::NotFound {
            entity: EntityKind::Lecturer,
            id,
        })
}

pub async fn search_lecturers(
    backend: &dyn RecordsBackend,
    query: &RecordQuery,
) -> AppResult<Vec<Lecturer>> {
    backend.find_lecturers(query).await
}

pub async fn update_lecturer(
    backend: &dyn RecordsBackend,
    id: RecordId,
    payload: &[u8],
) -> AppResult<Lecturer> {
    let changes = FieldMap::from_json_slice(EntityKind::Lecturer, payload)?;
    update_lecturer_fields(backend, id, &changes).await
}

pub async fn update_lecturer_fields(
    backend: &dyn RecordsBackend,
    id: RecordId,
    changes: &FieldMap,
) -> AppResult<Lecturer> {
    let current = get_lecturer(backend, id).await?;
    let mut fields = current.to_field_map();
    fields.overlay(changes);

    let draft = EntityValidator::new(backend)
        .validate_lecturer(&fields, Some(id))
        .await?;
    let lecturer = backend
        .update_lecturer(id, &draft)
        .await?
        .ok_or(AppError::NotFound {
            entity: EntityKind::Lecturer,
            id,
        })?;

    info!(
        target: "audit_log",
        entity = "lecturer",
        id = id,
        action = "update",
        "Lecturer #{} updated",
        id
    );
    Ok(lecturer)
}

/// Delete a lecturer who no longer teaches any course
pub async fn delete_lecturer(backend: &dyn RecordsBackend, id: RecordId) -> AppResult<()> {
    RecordWriteProcessor::validate_record_id(EntityKind::Lecturer, id)?;
    if !backend.delete_lecturer(id).await? {
        return Err(AppError::NotFound {
            entity: EntityKind::Lecturer,
            id,
        });
    }

    info!(
        target: "audit_log",
        entity = "lecturer",
        id = id,
        action = "delete",
        "Lecturer #{} deleted",
        id
    );
    Ok(())
}

pub async fn courses_of_lecturer(
    backend: &dyn RecordsBackend,
    lecturer_id: RecordId,
) -> AppResult<Vec<Course>> {
    get_lecturer(backend, lecturer_id).await?;
    backend.courses_taught_by(lecturer_id).await
}
