//! Field definitions for the three record kinds
//!
//! Every field accepted from a payload is declared here with its canonical
//! key, the alias used by the original entry forms, and whether it carries a
//! list of values.

use crate::parser::EntityKind;

pub const NAME: &str = "name";
pub const STUDENT_NUMBER: &str = "student_number";
pub const LECTURER_NUMBER: &str = "lecturer_number";
pub const EMAIL: &str = "email";
pub const PHONE: &str = "phone";
pub const MAJOR: &str = "major";
pub const ADDRESS: &str = "address";
pub const DEPARTMENT: &str = "department";
pub const CODE: &str = "code";
pub const CREDITS: &str = "credits";
pub const SEMESTER: &str = "semester";
pub const LECTURER: &str = "lecturer";
pub const STUDENTS: &str = "students";

/// Upper bound for person names, course names and departments
pub const MAX_NAME_LENGTH: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub alias: Option<&'static str>,
    pub multi_valued: bool,
}

const fn single(name: &'static str, alias: Option<&'static str>) -> FieldDef {
    FieldDef {
        name,
        alias,
        multi_valued: false,
    }
}

pub const STUDENT_FIELDS: &[FieldDef] = &[
    single(NAME, Some("nama")),
    single(STUDENT_NUMBER, Some("npm")),
    single(EMAIL, None),
    single(PHONE, Some("no_hp")),
    single(MAJOR, Some("jurusan")),
    single(ADDRESS, Some("alamat")),
];

pub const LECTURER_FIELDS: &[FieldDef] = &[
    single(NAME, Some("nama")),
    single(LECTURER_NUMBER, Some("nidn")),
    single(EMAIL, None),
    single(PHONE, Some("no_hp")),
    single(DEPARTMENT, Some("homebase")),
    single(ADDRESS, Some("alamat")),
];

pub const COURSE_FIELDS: &[FieldDef] = &[
    single(NAME, Some("nama_mk")),
    single(CODE, Some("kode_mk")),
    single(CREDITS, Some("sks")),
    single(SEMESTER, None),
    single(LECTURER, Some("dosen_mk")),
    FieldDef {
        name: STUDENTS,
        alias: Some("mhs_mk"),
        multi_valued: true,
    },
];

pub fn fields_for(kind: EntityKind) -> &'static [FieldDef] {
    match kind {
        EntityKind::Student => STUDENT_FIELDS,
        EntityKind::Lecturer => LECTURER_FIELDS,
        EntityKind::Course => COURSE_FIELDS,
    }
}

/// Resolve a payload key (canonical or alias) to its field definition
pub fn lookup_field(kind: EntityKind, key: &str) -> Option<&'static FieldDef> {
    fields_for(kind)
        .iter()
        .find(|def| def.name == key || def.alias == Some(key))
}

/// Fields whose normalized value must not be shared by two records of the same kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniqueField {
    StudentNumber,
    StudentEmail,
    LecturerNumber,
    LecturerEmail,
    CourseCode,
}

impl UniqueField {
    pub fn entity(&self) -> EntityKind {
        match self {
            UniqueField::StudentNumber | UniqueField::StudentEmail => EntityKind::Student,
            UniqueField::LecturerNumber | UniqueField::LecturerEmail => EntityKind::Lecturer,
            UniqueField::CourseCode => EntityKind::Course,
        }
    }

    /// Canonical field name reported in diagnostics
    pub fn field_name(&self) -> &'static str {
        match self {
            UniqueField::StudentNumber => STUDENT_NUMBER,
            UniqueField::LecturerNumber => LECTURER_NUMBER,
            UniqueField::StudentEmail | UniqueField::LecturerEmail => EMAIL,
            UniqueField::CourseCode => CODE,
        }
    }

    /// Storage column; matches the canonical field name
    pub fn column(&self) -> &'static str {
        self.field_name()
    }

    pub fn table(&self) -> &'static str {
        self.entity().table()
    }

    /// Map a storage unique-constraint failure ("table.column") back to the field
    pub fn from_constraint(table: &str, column: &str) -> Option<Self> {
        [
            UniqueField::StudentNumber,
            UniqueField::StudentEmail,
            UniqueField::LecturerNumber,
            UniqueField::LecturerEmail,
            UniqueField::CourseCode,
        ]
        .into_iter()
        .find(|field| field.table() == table && field.column() == column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_alias() {
        assert_eq!(lookup_field(EntityKind::Student, "npm").unwrap().name, STUDENT_NUMBER);
        assert_eq!(lookup_field(EntityKind::Student, "jurusan").unwrap().name, MAJOR);
        assert_eq!(lookup_field(EntityKind::Lecturer, "homebase").unwrap().name, DEPARTMENT);
        assert_eq!(lookup_field(EntityKind::Course, "dosen_mk").unwrap().name, LECTURER);
        assert!(lookup_field(EntityKind::Course, "mhs_mk").unwrap().multi_valued);
    }

    #[test]
    fn test_lookup_is_per_entity() {
        assert!(lookup_field(EntityKind::Student, "nidn").is_none());
        assert!(lookup_field(EntityKind::Lecturer, MAJOR).is_none());
        assert!(lookup_field(EntityKind::Course, EMAIL).is_none());
    }

    #[test]
    fn test_unique_field_from_constraint() {
        assert_eq!(
            UniqueField::from_constraint("students", "email"),
            Some(UniqueField::StudentEmail)
        );
        assert_eq!(
            UniqueField::from_constraint("lecturers", "email"),
            Some(UniqueField::LecturerEmail)
        );
        assert_eq!(
            UniqueField::from_constraint("courses", "code"),
            Some(UniqueField::CourseCode)
        );
        assert_eq!(UniqueField::from_constraint("courses", "name"), None);
    }
}
