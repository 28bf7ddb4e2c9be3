//! Combined read models for front ends. They own no state and are built
//! only from coordinator calls.

use crate::core::coordinator::EnrollmentCoordinator;
use crate::domain::model::{Course, EnrollmentView, Student, StudentId};
use crate::utils::error::Result;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct StudentProfile {
    pub student: Student,
    pub enrollments: Vec<EnrollmentView>,
    pub total_enrollments: usize,
    pub active_enrollments: usize,
}

impl StudentProfile {
    pub fn load(coordinator: &EnrollmentCoordinator, student_id: StudentId) -> Result<Self> {
        let student = coordinator.student(student_id)?;
        let enrollments = coordinator.list_by_student(student_id)?;
        let active_enrollments = enrollments
            .iter()
            .filter(|view| view.enrollment.is_active())
            .count();

        Ok(Self {
            student,
            total_enrollments: enrollments.len(),
            active_enrollments,
            enrollments,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseDetails {
    pub course: Course,
    pub enrollments: Vec<EnrollmentView>,
    pub total_enrolled: usize,
}

impl CourseDetails {
    pub fn load(coordinator: &EnrollmentCoordinator, course_code: &str) -> Result<Self> {
        let course = coordinator.course(course_code)?;
        let enrollments = coordinator.list_by_course(course_code)?;
        let total_enrolled = enrollments
            .iter()
            .filter(|view| view.enrollment.is_active())
            .count();

        Ok(Self {
            course,
            enrollments,
            total_enrolled,
        })
    }
}
