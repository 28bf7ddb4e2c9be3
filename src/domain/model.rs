use crate::utils::error::{EnrollError, Result};
use crate::utils::validation::{optional_text, required_text, validate_positive_number};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type StudentId = u64;
pub type EnrollmentId = u64;

/// Course code, trimmed and uppercased on construction so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseCode(String);

impl CourseCode {
    pub fn new(raw: &str) -> Result<Self> {
        Ok(Self(required_text("course_code", raw)?.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CourseCode {
    type Error = EnrollError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<CourseCode> for String {
    fn from(code: CourseCode) -> Self {
        code.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub identification: String,
    pub name: String,
    pub program: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub identification: String,
    pub program: String,
    pub email: Option<String>,
}

impl NewStudent {
    pub fn new(name: &str, identification: &str, program: &str, email: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            identification: identification.to_string(),
            program: program.to_string(),
            email: email.map(str::to_string),
        }
    }

    /// Trimmed copy with required fields checked; a blank email becomes `None`.
    pub fn normalized(&self) -> Result<Self> {
        Ok(Self {
            name: required_text("name", &self.name)?,
            identification: required_text("identification", &self.identification)?,
            program: required_text("program", &self.program)?,
            email: optional_text(self.email.as_deref()),
        })
    }
}

/// Seat counter of one course. `available <= total` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seats {
    pub total: u32,
    pub available: u32,
}

impl Seats {
    pub fn full(total: u32) -> Self {
        Self {
            total,
            available: total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub code: CourseCode,
    pub name: String,
    pub credits: u32,
    pub instructor: String,
    pub schedule: String,
    pub total_seats: u32,
    pub available_seats: u32,
    pub created_at: DateTime<Utc>,
}

impl Course {
    pub fn has_open_seats(&self) -> bool {
        self.available_seats > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCourse {
    pub code: String,
    pub name: String,
    pub credits: u32,
    pub instructor: String,
    pub schedule: String,
    pub total_seats: u32,
}

impl NewCourse {
    pub fn normalized(&self) -> Result<(CourseCode, Self)> {
        let code = CourseCode::new(&self.code)?;
        validate_positive_number("credits", self.credits, 1)?;
        validate_positive_number("total_seats", self.total_seats, 1)?;
        let normalized = Self {
            code: code.to_string(),
            name: required_text("name", &self.name)?,
            credits: self.credits,
            instructor: required_text("instructor", &self.instructor)?,
            schedule: required_text("schedule", &self.schedule)?,
            total_seats: self.total_seats,
        };
        Ok((code, normalized))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    Active,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_id: StudentId,
    pub course_code: CourseCode,
    pub status: EnrollmentStatus,
    pub enrolled_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Enrollment {
    pub fn is_active(&self) -> bool {
        self.status == EnrollmentStatus::Active
    }
}

/// Enrollment joined with the student and course as they look at read time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentView {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<Student>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<Course>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableCombination {
    pub student_id: StudentId,
    pub student_name: String,
    pub course_code: CourseCode,
    pub course_name: String,
    pub available_seats: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CombinationReport {
    pub combinations: Vec<AvailableCombination>,
    pub total: usize,
    pub existing_enrollments: usize,
}

/// Outcome of reconciling one course's seat counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatReconciliation {
    pub course_code: CourseCode,
    pub total_seats: u32,
    pub active_enrollments: usize,
    pub before: u32,
    pub after: u32,
}

impl SeatReconciliation {
    pub fn drifted(&self) -> bool {
        self.before != self.after
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_code_normalization() {
        let code = CourseCode::new("  is101 ").unwrap();
        assert_eq!(code.as_str(), "IS101");
        assert_eq!(code, CourseCode::new("IS101").unwrap());
        assert!(CourseCode::new("   ").is_err());
        assert_eq!(CourseCode::new(" is 101 ").unwrap().as_str(), "IS 101");
    }

    #[test]
    fn test_course_code_serde_roundtrip_normalizes() {
        let code: CourseCode = serde_json::from_str("\"math101\"").unwrap();
        assert_eq!(code.as_str(), "MATH101");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"MATH101\"");
    }

    #[test]
    fn test_new_student_normalized() {
        let student = NewStudent::new(" Ana ", " 55667788 ", " Systems ", Some("  "));
        let normalized = student.normalized().unwrap();
        assert_eq!(normalized.name, "Ana");
        assert_eq!(normalized.identification, "55667788");
        assert_eq!(normalized.email, None);

        let informal = NewStudent::new("Juan", "1", "Systems", Some(" juan.perez "));
        assert_eq!(informal.normalized().unwrap().email.as_deref(), Some("juan.perez"));

        let missing = NewStudent::new("Ana", "", "Systems", None);
        match missing.normalized() {
            Err(EnrollError::ValidationError { field, .. }) => assert_eq!(field, "identification"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_new_course_rejects_zero_seats() {
        let course = NewCourse {
            code: "is101".to_string(),
            name: "Programming I".to_string(),
            credits: 3,
            instructor: "Dr. Castillo".to_string(),
            schedule: "Mon-Wed-Fri 8:00-10:00".to_string(),
            total_seats: 0,
        };
        assert!(course.normalized().is_err());

        let ok = NewCourse {
            total_seats: 25,
            ..course
        };
        let (code, normalized) = ok.normalized().unwrap();
        assert_eq!(code.as_str(), "IS101");
        assert_eq!(normalized.code, "IS101");
    }

    #[test]
    fn test_new_course_credits_have_no_upper_bound() {
        let course = NewCourse {
            code: "thesis900".to_string(),
            name: "Thesis".to_string(),
            credits: 15,
            instructor: "Dr. Castillo".to_string(),
            schedule: "By arrangement".to_string(),
            total_seats: 5,
        };
        assert_eq!(course.normalized().unwrap().1.credits, 15);

        let zero = NewCourse { credits: 0, ..course };
        match zero.normalized() {
            Err(EnrollError::ValidationError { field, .. }) => assert_eq!(field, "credits"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&EnrollmentStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");
    }
}
