use crate::domain::model::{
    Course, CourseCode, Enrollment, EnrollmentId, NewCourse, NewStudent, Seats, Student, StudentId,
};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

pub trait StudentDirectory: Send + Sync {
    /// Fails with `DuplicateKey` when the identification is taken.
    fn create(&self, student: NewStudent) -> Result<Student>;
    fn get(&self, id: StudentId) -> Result<Student>;
    fn get_by_identification(&self, identification: &str) -> Result<Student>;
    /// All students in creation order.
    fn list(&self) -> Result<Vec<Student>>;
}

pub trait CourseDirectory: Send + Sync {
    /// Fails with `DuplicateKey` when the code is taken.
    fn create(&self, course: NewCourse) -> Result<Course>;
    fn get(&self, code: &CourseCode) -> Result<Course>;
    /// All courses in creation order.
    fn list(&self) -> Result<Vec<Course>>;

    /// Runs `update` against the course's seat counter while holding that
    /// course's lock. Changes are kept only when `update` returns true.
    fn update_seats(
        &self,
        code: &CourseCode,
        update: &mut dyn FnMut(&mut Seats) -> bool,
    ) -> Result<bool>;
}

/// Enrollment records. Only the coordinator writes through this port.
pub trait EnrollmentStore: Send + Sync {
    /// Inserts a new ACTIVE record. The duplicate check and the insert are one
    /// atomic step per (student, course) pair; fails with `DuplicateEnrollment`.
    fn insert_active(
        &self,
        student_id: StudentId,
        course_code: &CourseCode,
        enrolled_at: DateTime<Utc>,
    ) -> Result<Enrollment>;

    fn get(&self, id: EnrollmentId) -> Result<Enrollment>;

    /// ACTIVE -> CANCELLED as a compare-and-set; fails with `AlreadyCancelled`
    /// when the record has already left ACTIVE.
    fn mark_cancelled(&self, id: EnrollmentId, cancelled_at: DateTime<Utc>) -> Result<Enrollment>;

    /// All records in creation order.
    fn list(&self) -> Result<Vec<Enrollment>>;
    fn list_by_student(&self, student_id: StudentId) -> Result<Vec<Enrollment>>;
    fn list_by_course(&self, course_code: &CourseCode) -> Result<Vec<Enrollment>>;

    fn active_pairs(&self) -> Result<HashSet<(StudentId, CourseCode)>>;
    fn count_active(&self, course_code: &CourseCode) -> Result<usize>;
}
