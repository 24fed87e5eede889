use tracing::debug;

use super::definitions::{
    UniqueField, ADDRESS, CODE, CREDITS, DEPARTMENT, EMAIL, LECTURER, LECTURER_NUMBER, MAJOR,
    MAX_NAME_LENGTH, NAME, PHONE, SEMESTER, STUDENTS, STUDENT_NUMBER,
};
use super::normalization::{
    label, normalize_course_code, normalize_course_title, normalize_email, normalize_free_text,
    normalize_identifier, normalize_major, normalize_name, normalize_phone,
    normalize_positive_integer, normalize_reference, normalize_reference_set, Normalized,
};
use crate::backend::ValidationLookup;
use crate::error::{AppError, AppResult, Diagnostic, ValidationErrors};
use crate::models::{CourseDraft, LecturerDraft, RecordId, StudentDraft};
use crate::parser::{EntityKind, FieldMap};

/// Runs normalizers, uniqueness checks and cross-field rules for one submission
///
/// Every write path goes through this type, so creating a record and updating
/// it with the same resulting fields report the same diagnostics. All problems
/// are collected before returning; the first failure does not stop the pass.
pub struct EntityValidator<'a, L: ValidationLookup + ?Sized> {
    lookup: &'a L,
}

impl<'a, L: ValidationLookup + ?Sized> EntityValidator<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        Self { lookup }
    }

    pub async fn validate_student(
        &self,
        fields: &FieldMap,
        editing: Option<RecordId>,
    ) -> AppResult<StudentDraft> {
        let mut errors = ValidationErrors::new();

        let name = accept(&mut errors, normalize_name(NAME, fields.text(NAME)));
        let student_number = accept(
            &mut errors,
            normalize_identifier(STUDENT_NUMBER, fields.text(STUDENT_NUMBER)),
        );
        if let Some(value) = &student_number {
            self.check_unique(&mut errors, UniqueField::StudentNumber, value, editing)
                .await?;
        }
        let email = accept(&mut errors, normalize_email(EMAIL, fields.text(EMAIL)));
        if let Some(value) = &email {
            self.check_unique(&mut errors, UniqueField::StudentEmail, value, editing)
                .await?;
        }
        let phone = accept(&mut errors, normalize_phone(PHONE, fields.text(PHONE)));
        let major = accept(&mut errors, normalize_major(MAJOR, fields.text(MAJOR)));
        let address = accept(
            &mut errors,
            normalize_free_text(ADDRESS, fields.text(ADDRESS), None),
        );

        check_name_not_numeric(&mut errors, name.as_deref());
        if let Some(None) = major {
            errors.push(Diagnostic::cross_field(
                MAJOR,
                format!("{} must be selected", label(MAJOR)),
            ));
        }

        finish(EntityKind::Student, errors)?;
        match (name, student_number, email, phone, major, address) {
            (Some(name), Some(student_number), Some(email), Some(phone), Some(Some(major)), Some(address)) => {
                Ok(StudentDraft {
                    name,
                    student_number,
                    email,
                    phone,
                    major,
                    address,
                })
            }
            _ => Err(incomplete(EntityKind::Student)),
        }
    }

    pub async fn validate_lecturer(
        &self,
        fields: &FieldMap,
        editing: Option<RecordId>,
    ) -> AppResult<LecturerDraft> {
        let mut errors = ValidationErrors::new();

        let name = accept(&mut errors, normalize_name(NAME, fields.text(NAME)));
        let lecturer_number = accept(
            &mut errors,
            normalize_identifier(LECTURER_NUMBER, fields.text(LECTURER_NUMBER)),
        );
        if let Some(value) = &lecturer_number {
            self.check_unique(&mut errors, UniqueField::LecturerNumber, value, editing)
                .await?;
        }
        let email = accept(&mut errors, normalize_email(EMAIL, fields.text(EMAIL)));
        if let Some(value) = &email {
            self.check_unique(&mut errors, UniqueField::LecturerEmail, value, editing)
                .await?;
        }
        let phone = accept(&mut errors, normalize_phone(PHONE, fields.text(PHONE)));
        let department = accept(
            &mut errors,
            normalize_free_text(DEPARTMENT, fields.text(DEPARTMENT), Some(MAX_NAME_LENGTH)),
        );
        let address = accept(
            &mut errors,
            normalize_free_text(ADDRESS, fields.text(ADDRESS), None),
        );

        check_name_not_numeric(&mut errors, name.as_deref());

        finish(EntityKind::Lecturer, errors)?;
        match (name, lecturer_number, email, phone, department, address) {
            (Some(name), Some(lecturer_number), Some(email), Some(phone), Some(department), Some(address)) => {
                Ok(LecturerDraft {
                    name,
                    lecturer_number,
                    email,
                    phone,
                    department,
                    address,
                })
            }
            _ => Err(incomplete(EntityKind::Lecturer)),
        }
    }

    pub async fn validate_course(
        &self,
        fields: &FieldMap,
        editing: Option<RecordId>,
    ) -> AppResult<CourseDraft> {
        let mut errors = ValidationErrors::new();

        let name = accept(&mut errors, normalize_course_title(NAME, fields.text(NAME)));
        let code = accept(&mut errors, normalize_course_code(CODE, fields.text(CODE)));
        if let Some(value) = &code {
            self.check_unique(&mut errors, UniqueField::CourseCode, value, editing)
                .await?;
        }
        let credits = accept(
            &mut errors,
            normalize_positive_integer(CREDITS, fields.text(CREDITS)),
        );
        let semester = accept(
            &mut errors,
            normalize_positive_integer(SEMESTER, fields.text(SEMESTER)),
        );
        let lecturer_id = accept(
            &mut errors,
            normalize_reference(LECTURER, fields.text(LECTURER)),
        );
        // An update that leaves out the roster keeps whatever is enrolled now
        let student_ids = if editing.is_none() || fields.contains(STUDENTS) {
            accept(
                &mut errors,
                normalize_reference_set(STUDENTS, &fields.list(STUDENTS)),
            )
            .map(Some)
        } else {
            Some(None)
        };

        check_name_not_numeric(&mut errors, name.as_deref());
        if let Some(id) = lecturer_id {
            if !self.lookup.lecturer_exists(id).await? {
                errors.push(Diagnostic::cross_field(
                    LECTURER,
                    format!("Lecturer #{} does not exist", id),
                ));
            }
        }
        if let Some(ids) = student_ids
            .as_ref()
            .and_then(Option::as_deref)
            .filter(|ids| !ids.is_empty())
        {
            let missing = self.lookup.missing_students(ids).await?;
            if !missing.is_empty() {
                let listed: Vec<String> = missing.iter().map(|id| id.to_string()).collect();
                errors.push(Diagnostic::cross_field(
                    STUDENTS,
                    format!("Students not found: {}", listed.join(", ")),
                ));
            }
        }

        finish(EntityKind::Course, errors)?;
        match (name, code, credits, semester, lecturer_id, student_ids) {
            (Some(name), Some(code), Some(credits), Some(semester), Some(lecturer_id), Some(student_ids)) => {
                Ok(CourseDraft {
                    name,
                    code,
                    credits,
                    semester,
                    lecturer_id,
                    student_ids,
                })
            }
            _ => Err(incomplete(EntityKind::Course)),
        }
    }

    async fn check_unique(
        &self,
        errors: &mut ValidationErrors,
        field: UniqueField,
        value: &str,
        editing: Option<RecordId>,
    ) -> AppResult<()> {
        if self.lookup.value_taken(field, value, editing).await? {
            errors.push(duplicate_diagnostic(field, value));
        }
        Ok(())
    }
}

/// Diagnostic reported when a unique value already belongs to another record
pub fn duplicate_diagnostic(field: UniqueField, value: &str) -> Diagnostic {
    Diagnostic::field(
        field.field_name(),
        format!("{} '{}' is already registered", label(field.field_name()), value),
    )
}

fn accept<T>(errors: &mut ValidationErrors, result: Normalized<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(rejection) => {
            errors.push(Diagnostic::field(rejection.field, rejection.reason));
            None
        }
    }
}

fn check_name_not_numeric(errors: &mut ValidationErrors, name: Option<&str>) {
    let Some(name) = name else {
        return;
    };
    let mut significant = name.chars().filter(|c| !c.is_whitespace()).peekable();
    if significant.peek().is_some() && significant.all(|c| c.is_ascii_digit()) {
        errors.push(Diagnostic::entity(format!(
            "{} cannot consist of digits only",
            label(NAME)
        )));
    }
}

fn finish(kind: EntityKind, errors: ValidationErrors) -> AppResult<()> {
    if !errors.is_empty() {
        debug!("{} submission rejected with {} problem(s)", kind, errors.len());
    }
    errors.into_result()
}

fn incomplete(kind: EntityKind) -> AppError {
    AppError::Internal(format!("{} fields missing after successful validation", kind))
}
