use crate::domain::model::{CourseCode, NewCourse, NewStudent};
use crate::utils::error::{EnrollError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_positive_number, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const DEFAULT_TOTAL_SEATS: u32 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampusConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub students: Vec<StudentSeed>,
    #[serde(default)]
    pub courses: Vec<CourseSeed>,
    #[serde(default)]
    pub enrollments: Vec<EnrollmentSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
    #[serde(default = "default_true")]
    pub recalculate_on_list: bool,
    #[serde(default = "default_total_seats")]
    pub default_total_seats: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            recalculate_on_list: true,
            default_total_seats: DEFAULT_TOTAL_SEATS,
        }
    }
}

fn default_service_name() -> String {
    "course-enroll".to_string()
}

fn default_true() -> bool {
    true
}

fn default_total_seats() -> u32 {
    DEFAULT_TOTAL_SEATS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentSeed {
    pub name: String,
    pub identification: String,
    pub program: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseSeed {
    pub code: String,
    pub name: String,
    pub credits: u32,
    pub instructor: String,
    pub schedule: String,
    pub total_seats: Option<u32>,
}

/// Initial enrollment, keyed by the student's identification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentSeed {
    pub identification: String,
    pub course_code: String,
}

impl CampusConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EnrollError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EnrollError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay verbatim.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EnrollError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("service.name", &self.service.name)?;
        validate_positive_number("service.default_total_seats", self.service.default_total_seats, 1)?;

        let mut identifications = HashSet::new();
        for student in self.new_students() {
            let student = student.normalized()?;
            if !identifications.insert(student.identification.clone()) {
                return Err(EnrollError::ConfigError {
                    message: format!(
                        "Student identification '{}' appears more than once",
                        student.identification
                    ),
                });
            }
        }

        let mut codes = HashSet::new();
        for course in self.new_courses() {
            let (code, _) = course.normalized()?;
            if !codes.insert(code.clone()) {
                return Err(EnrollError::ConfigError {
                    message: format!("Course code '{}' appears more than once", code),
                });
            }
        }

        for enrollment in &self.enrollments {
            if !identifications.contains(enrollment.identification.trim()) {
                return Err(EnrollError::ConfigError {
                    message: format!(
                        "Enrollment references unknown student '{}'",
                        enrollment.identification
                    ),
                });
            }
            let code = CourseCode::new(&enrollment.course_code)?;
            if !codes.contains(&code) {
                return Err(EnrollError::ConfigError {
                    message: format!("Enrollment references unknown course '{}'", code),
                });
            }
        }

        Ok(())
    }

    pub fn new_students(&self) -> Vec<NewStudent> {
        self.students
            .iter()
            .map(|seed| {
                NewStudent::new(
                    &seed.name,
                    &seed.identification,
                    &seed.program,
                    seed.email.as_deref(),
                )
            })
            .collect()
    }

    /// Course inputs with the service default applied where `total_seats` is omitted.
    pub fn new_courses(&self) -> Vec<NewCourse> {
        self.courses
            .iter()
            .map(|seed| NewCourse {
                code: seed.code.clone(),
                name: seed.name.clone(),
                credits: seed.credits,
                instructor: seed.instructor.clone(),
                schedule: seed.schedule.clone(),
                total_seats: seed.total_seats.unwrap_or(self.service.default_total_seats),
            })
            .collect()
    }

    /// Demo campus: four students, five courses and four initial enrollments.
    pub fn sample() -> Self {
        let student = |name: &str, identification: &str, program: &str, email: &str| StudentSeed {
            name: name.to_string(),
            identification: identification.to_string(),
            program: program.to_string(),
            email: Some(email.to_string()),
        };
        let course = |code: &str,
                      name: &str,
                      credits: u32,
                      instructor: &str,
                      schedule: &str,
                      total_seats: u32| CourseSeed {
            code: code.to_string(),
            name: name.to_string(),
            credits,
            instructor: instructor.to_string(),
            schedule: schedule.to_string(),
            total_seats: Some(total_seats),
        };
        let enrollment = |identification: &str, course_code: &str| EnrollmentSeed {
            identification: identification.to_string(),
            course_code: course_code.to_string(),
        };

        Self {
            service: ServiceConfig::default(),
            students: vec![
                student("Juan Carlos Perez", "12345678", "Systems Engineering", "juan.perez@university.edu"),
                student("Maria Fernanda Garcia", "87654321", "Industrial Engineering", "maria.garcia@university.edu"),
                student("Carlos Andres Lopez", "11223344", "Business Administration", "carlos.lopez@university.edu"),
                student("Ana Sofia Rodriguez", "55667788", "Systems Engineering", "ana.rodriguez@university.edu"),
            ],
            courses: vec![
                course("IS101", "Programming I", 3, "Dr. Ana Maria Castillo", "Mon-Wed-Fri 8:00-10:00", 25),
                course("IS102", "Databases I", 4, "Dra. Carmen Mendieta", "Tue-Thu 10:00-12:00", 30),
                course("IS103", "Algorithms and Data Structures", 3, "Dr. Roberto Castellano", "Mon-Wed 14:00-16:00", 20),
                course("MATH101", "Differential Calculus", 4, "Dra. Patricia Castro", "Tue-Thu 8:00-10:00", 35),
                course("PHYS101", "Physics I", 3, "Dr. Luis Hernandez", "Mon-Wed-Fri 10:00-11:30", 30),
            ],
            enrollments: vec![
                enrollment("12345678", "IS101"),
                enrollment("87654321", "IS102"),
                enrollment("11223344", "MATH101"),
                enrollment("12345678", "PHYS101"),
            ],
        }
    }
}

impl Validate for CampusConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
