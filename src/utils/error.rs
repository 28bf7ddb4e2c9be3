use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnrollError {
    #[error("Student not found: {student}")]
    StudentNotFound { student: String },

    #[error("Course not found: {course_code}")]
    CourseNotFound { course_code: String },

    #[error("Enrollment not found: {enrollment_id}")]
    EnrollmentNotFound { enrollment_id: u64 },

    #[error("{entity} with key '{key}' already exists")]
    DuplicateKey { entity: &'static str, key: String },

    #[error("Student {student_id} is already enrolled in course {course_code}")]
    DuplicateEnrollment { student_id: u64, course_code: String },

    #[error("No seats available for course {course_code}")]
    NoSeatsAvailable { course_code: String },

    #[error("Enrollment {enrollment_id} is already cancelled")]
    AlreadyCancelled { enrollment_id: u64 },

    #[error("Validation error: {field} - {reason}")]
    ValidationError { field: String, reason: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    Conflict,
    Validation,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EnrollError {
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        EnrollError::ValidationError {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EnrollError::StudentNotFound { .. }
            | EnrollError::CourseNotFound { .. }
            | EnrollError::EnrollmentNotFound { .. } => ErrorCategory::NotFound,
            EnrollError::DuplicateKey { .. }
            | EnrollError::DuplicateEnrollment { .. }
            | EnrollError::NoSeatsAvailable { .. }
            | EnrollError::AlreadyCancelled { .. } => ErrorCategory::Conflict,
            EnrollError::ValidationError { .. } => ErrorCategory::Validation,
            EnrollError::ConfigError { .. } => ErrorCategory::Configuration,
            EnrollError::IoError(_) | EnrollError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::NotFound | ErrorCategory::Conflict => ErrorSeverity::Medium,
            ErrorCategory::Validation | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// HTTP status a request layer should answer with for this error.
    pub fn status_code(&self) -> u16 {
        match self.category() {
            ErrorCategory::NotFound => 404,
            ErrorCategory::Conflict => 409,
            ErrorCategory::Validation => 400,
            ErrorCategory::Configuration | ErrorCategory::System => 500,
        }
    }

    /// Seat contention can clear up on its own; everything else needs a changed request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EnrollError::NoSeatsAvailable { .. })
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EnrollError::StudentNotFound { .. } => {
                "Check the student id or register the student first".to_string()
            }
            EnrollError::CourseNotFound { .. } => {
                "Check the course code against the course listing".to_string()
            }
            EnrollError::EnrollmentNotFound { .. } => {
                "List the student's enrollments to find a valid enrollment id".to_string()
            }
            EnrollError::DuplicateKey { entity, .. } => {
                format!("Use a different key or look up the existing {}", entity)
            }
            EnrollError::DuplicateEnrollment { .. } => {
                "Cancel the existing enrollment before enrolling again".to_string()
            }
            EnrollError::NoSeatsAvailable { .. } => {
                "Retry later or pick a course from the available listing".to_string()
            }
            EnrollError::AlreadyCancelled { .. } => {
                "No action needed, the enrollment is already cancelled".to_string()
            }
            EnrollError::ValidationError { field, .. } => {
                format!("Provide a valid value for '{}'", field)
            }
            EnrollError::ConfigError { .. } => {
                "Fix the campus configuration file and try again".to_string()
            }
            EnrollError::IoError(_) => "Check file paths and permissions".to_string(),
            EnrollError::SerializationError(_) => "Report this as a bug".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::NotFound => format!("Not found: {}", self),
            ErrorCategory::Conflict => format!("Request refused: {}", self),
            ErrorCategory::Validation => format!("Invalid input: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::System => format!("Internal error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EnrollError>;
