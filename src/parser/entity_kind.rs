use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Student,
    Lecturer,
    Course,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Student, EntityKind::Lecturer, EntityKind::Course];

    /// Storage table holding records of this kind
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Student => "students",
            EntityKind::Lecturer => "lecturers",
            EntityKind::Course => "courses",
        }
    }

    /// Lowercase name used on the command line and in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Student => "student",
            EntityKind::Lecturer => "lecturer",
            EntityKind::Course => "course",
        }
    }

    /// Local name used for export file names
    pub fn local_name(&self) -> &'static str {
        match self {
            EntityKind::Student => "mahasiswa",
            EntityKind::Lecturer => "dosen",
            EntityKind::Course => "matakuliah",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Student => write!(f, "Student"),
            EntityKind::Lecturer => write!(f, "Lecturer"),
            EntityKind::Course => write!(f, "Course"),
        }
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lowered || kind.local_name() == lowered)
            .ok_or_else(|| {
                format!(
                    "Unknown entity '{}', expected one of: student, lecturer, course",
                    s
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entity_kind() {
        assert_eq!("student".parse::<EntityKind>().unwrap(), EntityKind::Student);
        assert_eq!("Mahasiswa".parse::<EntityKind>().unwrap(), EntityKind::Student);
        assert_eq!("dosen".parse::<EntityKind>().unwrap(), EntityKind::Lecturer);
        assert_eq!(" course ".parse::<EntityKind>().unwrap(), EntityKind::Course);
        assert!("faculty".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_tables() {
        assert_eq!(EntityKind::Student.table(), "students");
        assert_eq!(EntityKind::Lecturer.table(), "lecturers");
        assert_eq!(EntityKind::Course.table(), "courses");
    }
}
