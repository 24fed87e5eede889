//! Field normalizers
//!
//! Each normalizer takes the raw submitted text for one field and returns the
//! canonical value that gets stored, or a [`Rejection`] naming the field and
//! the reason. Normalizers never touch storage and are idempotent: feeding a
//! normalized value back in yields the same value.

use email_address::EmailAddress;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::definitions::{
    ADDRESS, CODE, CREDITS, DEPARTMENT, EMAIL, LECTURER, LECTURER_NUMBER, MAJOR, MAX_NAME_LENGTH,
    NAME, PHONE, SEMESTER, STUDENTS, STUDENT_NUMBER,
};
use crate::models::{Major, RecordId};

pub const MIN_NAME_LENGTH: usize = 3;
pub const MIN_IDENTIFIER_LENGTH: usize = 5;
pub const MAX_IDENTIFIER_LENGTH: usize = 20;
pub const MIN_PHONE_LENGTH: usize = 10;
pub const MAX_PHONE_LENGTH: usize = 15;
pub const PHONE_PREFIXES: [&str; 2] = ["08", "628"];
pub const MIN_CODE_LENGTH: usize = 2;
pub const MAX_CODE_LENGTH: usize = 20;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").expect("valid whitespace pattern");
    static ref PHONE_SEPARATORS: Regex = Regex::new(r"[\s\-()+]").expect("valid separator pattern");
    static ref COURSE_CODE: Regex = Regex::new(r"^[A-Z0-9-]+$").expect("valid course code pattern");
}

/// A single field that failed its normalizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub field: &'static str,
    pub reason: String,
}

impl Rejection {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }

    fn required(field: &'static str) -> Self {
        Self::new(field, format!("{} is required", label(field)))
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

impl std::error::Error for Rejection {}

pub type Normalized<T> = Result<T, Rejection>;

/// Human-readable label used at the start of rejection messages
pub fn label(field: &str) -> &'static str {
    match field {
        NAME => "Name",
        STUDENT_NUMBER => "Student number",
        LECTURER_NUMBER => "Lecturer number",
        EMAIL => "Email",
        PHONE => "Phone number",
        MAJOR => "Major",
        ADDRESS => "Address",
        DEPARTMENT => "Department",
        CODE => "Course code",
        CREDITS => "Credits",
        SEMESTER => "Semester",
        LECTURER => "Lecturer",
        STUDENTS => "Students",
        _ => "Value",
    }
}

/// Collapse every whitespace run to a single space and trim both ends
pub fn collapse_whitespace(raw: &str) -> String {
    WHITESPACE_RUN.replace_all(raw.trim(), " ").into_owned()
}

fn title_case_token(token: &str) -> String {
    let mut chars = token.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    // Multi-char expansions ("ß" -> "SS") keep only their head upper-cased
    let mut upper = first.to_uppercase();
    let mut out = String::with_capacity(token.len());
    out.extend(upper.next());
    out.extend(upper.flat_map(char::to_lowercase));
    out.extend(chars.flat_map(char::to_lowercase));
    out
}

/// Person name: single-spaced, title-cased per token, 3 to 100 characters
pub fn normalize_name(field: &'static str, raw: &str) -> Normalized<String> {
    let collapsed = collapse_whitespace(raw);
    if collapsed.is_empty() {
        return Err(Rejection::required(field));
    }

    let titled = collapsed
        .split(' ')
        .map(title_case_token)
        .collect::<Vec<_>>()
        .join(" ");
    let length = titled.chars().count();

    if length < MIN_NAME_LENGTH {
        return Err(Rejection::new(
            field,
            format!("{} must be at least {} characters", label(field), MIN_NAME_LENGTH),
        ));
    }
    if length > MAX_NAME_LENGTH {
        return Err(Rejection::new(
            field,
            format!("{} must be at most {} characters", label(field), MAX_NAME_LENGTH),
        ));
    }

    Ok(titled)
}

/// Registration number (NPM / NIDN): ASCII digits only, 5 to 20 of them
pub fn normalize_identifier(field: &'static str, raw: &str) -> Normalized<String> {
    let value = raw.trim();

    if value.is_empty() {
        return Err(Rejection::required(field));
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Rejection::new(
            field,
            format!("{} may only contain digits", label(field)),
        ));
    }
    if value.len() < MIN_IDENTIFIER_LENGTH {
        return Err(Rejection::new(
            field,
            format!(
                "{} must be at least {} digits",
                label(field),
                MIN_IDENTIFIER_LENGTH
            ),
        ));
    }
    if value.len() > MAX_IDENTIFIER_LENGTH {
        return Err(Rejection::new(
            field,
            format!(
                "{} must be at most {} digits",
                label(field),
                MAX_IDENTIFIER_LENGTH
            ),
        ));
    }

    Ok(value.to_string())
}

fn has_dotted_domain(email: &str) -> bool {
    match email.rsplit_once('@') {
        Some((_, domain)) => {
            domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
        }
        None => false,
    }
}

/// Email: trimmed, lowercased, well-formed with a dotted domain
pub fn normalize_email(field: &'static str, raw: &str) -> Normalized<String> {
    let value = raw.trim().to_lowercase();

    if value.is_empty() {
        return Err(Rejection::required(field));
    }
    if !EmailAddress::is_valid(&value) || !has_dotted_domain(&value) {
        return Err(Rejection::new(
            field,
            format!("'{}' is not a valid email address", value),
        ));
    }

    Ok(value)
}

/// Indonesian mobile number; an empty value means no phone
pub fn normalize_phone(field: &'static str, raw: &str) -> Normalized<Option<String>> {
    let value = PHONE_SEPARATORS.replace_all(raw, "");

    if value.is_empty() {
        return Ok(None);
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Rejection::new(
            field,
            format!("{} may only contain digits", label(field)),
        ));
    }
    if !PHONE_PREFIXES.iter().any(|prefix| value.starts_with(prefix)) {
        return Err(Rejection::new(
            field,
            format!("{} must start with 08 or 628", label(field)),
        ));
    }
    if value.len() < MIN_PHONE_LENGTH || value.len() > MAX_PHONE_LENGTH {
        return Err(Rejection::new(
            field,
            format!(
                "{} must be {} to {} digits",
                label(field),
                MIN_PHONE_LENGTH,
                MAX_PHONE_LENGTH
            ),
        ));
    }

    Ok(Some(value.into_owned()))
}

/// Optional free text, single-spaced; `max_length` caps the character count
pub fn normalize_free_text(
    field: &'static str,
    raw: &str,
    max_length: Option<usize>,
) -> Normalized<String> {
    let value = collapse_whitespace(raw);

    if let Some(max) = max_length {
        if value.chars().count() > max {
            return Err(Rejection::new(
                field,
                format!("{} must be at most {} characters", label(field), max),
            ));
        }
    }

    Ok(value)
}

/// Major: empty, or an exact match of one of the offered majors
///
/// Whether an empty major is acceptable is decided by the entity validator.
pub fn normalize_major(field: &'static str, raw: &str) -> Normalized<Option<Major>> {
    if raw.is_empty() {
        return Ok(None);
    }

    Major::from_label(raw).map(Some).ok_or_else(|| {
        let offered: Vec<&str> = Major::ALL.iter().map(Major::label).collect();
        Rejection::new(
            field,
            format!(
                "'{}' is not a valid major, choose one of: {}",
                raw,
                offered.join(", ")
            ),
        )
    })
}

/// Course name: single-spaced, 3 to 100 characters, case preserved
pub fn normalize_course_title(field: &'static str, raw: &str) -> Normalized<String> {
    let value = collapse_whitespace(raw);
    let length = value.chars().count();

    if length == 0 {
        return Err(Rejection::required(field));
    }
    if length < MIN_NAME_LENGTH {
        return Err(Rejection::new(
            field,
            format!("{} must be at least {} characters", label(field), MIN_NAME_LENGTH),
        ));
    }
    if length > MAX_NAME_LENGTH {
        return Err(Rejection::new(
            field,
            format!("{} must be at most {} characters", label(field), MAX_NAME_LENGTH),
        ));
    }

    Ok(value)
}

/// Course code: uppercase letters, digits and hyphens, 2 to 20 characters
pub fn normalize_course_code(field: &'static str, raw: &str) -> Normalized<String> {
    let value = raw.trim().to_uppercase();

    if value.is_empty() {
        return Err(Rejection::required(field));
    }
    if !COURSE_CODE.is_match(&value) {
        return Err(Rejection::new(
            field,
            format!(
                "{} may only contain letters, digits and hyphens",
                label(field)
            ),
        ));
    }
    if value.len() < MIN_CODE_LENGTH || value.len() > MAX_CODE_LENGTH {
        return Err(Rejection::new(
            field,
            format!(
                "{} must be {} to {} characters",
                label(field),
                MIN_CODE_LENGTH,
                MAX_CODE_LENGTH
            ),
        ));
    }

    Ok(value)
}

/// Whole number of at least 1 (credits, semester)
pub fn normalize_positive_integer(field: &'static str, raw: &str) -> Normalized<i64> {
    let value = raw.trim();

    if value.is_empty() {
        return Err(Rejection::required(field));
    }
    match i64::from_str(value) {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(Rejection::new(
            field,
            format!("{} must be a whole number of at least 1", label(field)),
        )),
    }
}

fn parse_record_id(raw: &str) -> Option<RecordId> {
    RecordId::from_str(raw.trim()).ok().filter(|id| *id >= 1)
}

/// Reference to another record by id
pub fn normalize_reference(field: &'static str, raw: &str) -> Normalized<RecordId> {
    if raw.trim().is_empty() {
        return Err(Rejection::required(field));
    }

    parse_record_id(raw).ok_or_else(|| {
        Rejection::new(
            field,
            format!("'{}' is not a valid record id", raw.trim()),
        )
    })
}

/// Set of record ids; duplicates collapse and the result is ascending
pub fn normalize_reference_set(field: &'static str, raw: &[String]) -> Normalized<Vec<RecordId>> {
    let mut ids = BTreeSet::new();

    for item in raw {
        let id = parse_record_id(item).ok_or_else(|| {
            Rejection::new(
                field,
                format!("'{}' is not a valid record id", item.trim()),
            )
        })?;
        ids.insert(id);
    }

    Ok(ids.into_iter().collect())
}
