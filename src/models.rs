use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::parser::{EntityKind, FieldMap};
use crate::schema::definitions::{
    ADDRESS, CODE, CREDITS, DEPARTMENT, EMAIL, LECTURER, LECTURER_NUMBER, MAJOR, NAME, PHONE,
    SEMESTER, STUDENT_NUMBER,
};

/// Storage-assigned record identifier
pub type RecordId = i64;

/// Majors a student can be enrolled in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Major {
    #[serde(rename = "Teknologi Informasi")]
    TeknologiInformasi,
    #[serde(rename = "Sains Data")]
    SainsData,
}

impl Major {
    pub const ALL: [Major; 2] = [Major::TeknologiInformasi, Major::SainsData];

    pub fn label(&self) -> &'static str {
        match self {
            Major::TeknologiInformasi => "Teknologi Informasi",
            Major::SainsData => "Sains Data",
        }
    }

    /// Exact, case-sensitive match against the enumerated labels
    pub fn from_label(label: &str) -> Option<Self> {
        Major::ALL.into_iter().find(|major| major.label() == label)
    }
}

impl fmt::Display for Major {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: RecordId,
    pub name: String,
    pub student_number: String,
    pub email: String,
    pub phone: Option<String>,
    pub major: Option<Major>,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated student fields ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentDraft {
    pub name: String,
    pub student_number: String,
    pub email: String,
    pub phone: Option<String>,
    pub major: Major,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lecturer {
    pub id: RecordId,
    pub name: String,
    pub lecturer_number: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated lecturer fields ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LecturerDraft {
    pub name: String,
    pub lecturer_number: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: RecordId,
    pub name: String,
    pub code: String,
    pub credits: i64,
    pub semester: i64,
    pub lecturer_id: RecordId,
    /// Enrolled students, ascending by id
    pub student_ids: Vec<RecordId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated course fields ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDraft {
    pub name: String,
    pub code: String,
    pub credits: i64,
    pub semester: i64,
    pub lecturer_id: RecordId,
    /// Full roster to store; `None` leaves current enrollments untouched
    pub student_ids: Option<Vec<RecordId>>,
}

impl Student {
    /// Stored values as a field mapping, the base an update payload is laid over
    pub fn to_field_map(&self) -> FieldMap {
        FieldMap::new(EntityKind::Student)
            .with(NAME, self.name.as_str())
            .with(STUDENT_NUMBER, self.student_number.as_str())
            .with(EMAIL, self.email.as_str())
            .with(PHONE, self.phone.clone().unwrap_or_default())
            .with(MAJOR, self.major.map(|m| m.label()).unwrap_or_default())
            .with(ADDRESS, self.address.as_str())
    }
}

impl Lecturer {
    pub fn to_field_map(&self) -> FieldMap {
        FieldMap::new(EntityKind::Lecturer)
            .with(NAME, self.name.as_str())
            .with(LECTURER_NUMBER, self.lecturer_number.as_str())
            .with(EMAIL, self.email.as_str())
            .with(PHONE, self.phone.clone().unwrap_or_default())
            .with(DEPARTMENT, self.department.as_str())
            .with(ADDRESS, self.address.as_str())
    }
}

impl Course {
    /// Scalar fields only; an update that omits `students` keeps current enrollments
    pub fn to_field_map(&self) -> FieldMap {
        FieldMap::new(EntityKind::Course)
            .with(NAME, self.name.as_str())
            .with(CODE, self.code.as_str())
            .with(CREDITS, self.credits)
            .with(SEMESTER, self.semester)
            .with(LECTURER, self.lecturer_id)
    }
}

/// Any stored record, as handed back to delivery layers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Student(Student),
    Lecturer(Lecturer),
    Course(Course),
}

/// Search and filter criteria for listings and exports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQuery {
    /// Case-insensitive substring matched against name and number/code
    pub search: Option<String>,
    /// Students only; ignored for other record kinds
    pub major: Option<Major>,
}

impl RecordQuery {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            major: None,
        }
    }

    pub fn with_major(mut self, major: Major) -> Self {
        self.major = Some(major);
        self
    }

    /// Search term with surrounding whitespace removed, if any remains
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MajorCount {
    /// Major label, or `None` for stored students without one
    pub major: Option<Major>,
    pub count: i64,
}

/// Figures shown on the administration dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_students: i64,
    pub total_lecturers: i64,
    pub total_courses: i64,
    pub total_enrollments: i64,
    pub students_per_major: Vec<MajorCount>,
}
