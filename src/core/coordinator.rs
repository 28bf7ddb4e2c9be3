use crate::adapters::memory::{
    InMemoryCourseDirectory, InMemoryEnrollmentStore, InMemoryStudentDirectory,
};
use crate::core::seat_ledger::SeatLedger;
use crate::domain::model::{
    AvailableCombination, CombinationReport, Course, CourseCode, Enrollment, EnrollmentId,
    EnrollmentView, NewCourse, NewStudent, SeatReconciliation, Student, StudentId,
};
use crate::domain::ports::{CourseDirectory, EnrollmentStore, StudentDirectory};
use crate::utils::error::{EnrollError, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

/// Owns the enrollment collection and enforces the invariants that span
/// students, courses and enrollments: no course over capacity, and at most
/// one ACTIVE enrollment per (student, course) pair.
pub struct EnrollmentCoordinator {
    students: Arc<dyn StudentDirectory>,
    courses: Arc<dyn CourseDirectory>,
    enrollments: Arc<dyn EnrollmentStore>,
    ledger: SeatLedger,
    recalculate_on_list: bool,
}

impl EnrollmentCoordinator {
    pub fn new(
        students: Arc<dyn StudentDirectory>,
        courses: Arc<dyn CourseDirectory>,
        enrollments: Arc<dyn EnrollmentStore>,
    ) -> Self {
        let ledger = SeatLedger::new(Arc::clone(&courses));
        Self {
            students,
            courses,
            enrollments,
            ledger,
            recalculate_on_list: true,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryStudentDirectory::new()),
            Arc::new(InMemoryCourseDirectory::new()),
            Arc::new(InMemoryEnrollmentStore::new()),
        )
    }

    /// Whether `list_courses` reconciles seat counts before listing.
    pub fn with_recalculate_on_list(mut self, enabled: bool) -> Self {
        self.recalculate_on_list = enabled;
        self
    }

    pub fn ledger(&self) -> &SeatLedger {
        &self.ledger
    }

    // Directory pass-throughs

    pub fn register_student(&self, student: NewStudent) -> Result<Student> {
        let student = self.students.create(student)?;
        tracing::info!(
            student_id = student.id,
            identification = %student.identification,
            "Student registered"
        );
        Ok(student)
    }

    pub fn student(&self, id: StudentId) -> Result<Student> {
        self.students.get(id)
    }

    pub fn student_by_identification(&self, identification: &str) -> Result<Student> {
        self.students.get_by_identification(identification)
    }

    pub fn list_students(&self) -> Result<Vec<Student>> {
        self.students.list()
    }

    pub fn create_course(&self, course: NewCourse) -> Result<Course> {
        let course = self.courses.create(course)?;
        tracing::info!(
            course_code = %course.code,
            total_seats = course.total_seats,
            "Course created"
        );
        Ok(course)
    }

    pub fn course(&self, code: &str) -> Result<Course> {
        self.courses.get(&CourseCode::new(code)?)
    }

    pub fn list_courses(&self) -> Result<Vec<Course>> {
        if self.recalculate_on_list {
            self.recalculate_seats()?;
        }
        self.courses.list()
    }

    pub fn list_available_courses(&self) -> Result<Vec<Course>> {
        Ok(self
            .courses
            .list()?
            .into_iter()
            .filter(Course::has_open_seats)
            .collect())
    }

    /// Case-insensitive substring match on the instructor name.
    pub fn courses_by_instructor(&self, fragment: &str) -> Result<Vec<Course>> {
        let needle = fragment.trim().to_lowercase();
        Ok(self
            .courses
            .list()?
            .into_iter()
            .filter(|course| course.instructor.to_lowercase().contains(&needle))
            .collect())
    }

    // Enrollment operations

    /// Reserves a seat, then records the enrollment. When the record cannot be
    /// created the reserved seat is handed back before the error is returned.
    pub fn enroll(&self, student_id: StudentId, course_code: &str) -> Result<Enrollment> {
        let code = CourseCode::new(course_code)?;
        self.students.get(student_id)?;
        self.courses.get(&code)?;

        self.ledger.hold(&code, || -> Result<Enrollment> {
            if !self.ledger.reserve(&code)? {
                tracing::warn!(student_id, course_code = %code, "Enrollment refused: no seats");
                return Err(EnrollError::NoSeatsAvailable {
                    course_code: code.to_string(),
                });
            }

            match self.enrollments.insert_active(student_id, &code, Utc::now()) {
                Ok(enrollment) => {
                    tracing::info!(
                        enrollment_id = enrollment.id,
                        student_id,
                        course_code = %code,
                        "Enrollment created"
                    );
                    Ok(enrollment)
                }
                Err(err) => {
                    self.release_reserved(&code);
                    tracing::warn!(student_id, course_code = %code, error = %err, "Enrollment refused");
                    Err(err)
                }
            }
        })
    }

    /// ACTIVE -> CANCELLED, then the seat goes back to the pool.
    pub fn cancel(&self, enrollment_id: EnrollmentId) -> Result<Enrollment> {
        let enrollment = self.enrollments.get(enrollment_id)?;
        if !enrollment.is_active() {
            tracing::warn!(enrollment_id, "Cancellation refused: already cancelled");
            return Err(EnrollError::AlreadyCancelled { enrollment_id });
        }
        let code = enrollment.course_code;

        let (cancelled, released) = self.ledger.hold(&code, || -> Result<_> {
            let cancelled = self.enrollments.mark_cancelled(enrollment_id, Utc::now())?;
            let released = self.ledger.release(&code)?;
            Ok((cancelled, released))
        })?;

        if !released {
            tracing::warn!(
                enrollment_id,
                course_code = %code,
                "Seat counter already full on release, reconciling course"
            );
            self.ledger
                .recalculate_course(&code, &|c| self.enrollments.count_active(c))?;
        }

        tracing::info!(enrollment_id, course_code = %code, "Enrollment cancelled");
        Ok(cancelled)
    }

    pub fn get_enrollment(&self, enrollment_id: EnrollmentId) -> Result<EnrollmentView> {
        let enrollment = self.enrollments.get(enrollment_id)?;
        let student = self.lookup_student(enrollment.student_id)?;
        let course = self.lookup_course(&enrollment.course_code)?;
        Ok(EnrollmentView {
            enrollment,
            student,
            course,
        })
    }

    pub fn list_by_student(&self, student_id: StudentId) -> Result<Vec<EnrollmentView>> {
        let student = self.students.get(student_id)?;
        let enrollments = self.enrollments.list_by_student(student_id)?;

        let mut courses = HashMap::new();
        enrollments
            .into_iter()
            .map(|enrollment| {
                let course = self.cached_course(&mut courses, &enrollment.course_code)?;
                Ok(EnrollmentView {
                    enrollment,
                    student: Some(student.clone()),
                    course,
                })
            })
            .collect()
    }

    pub fn list_by_course(&self, course_code: &str) -> Result<Vec<EnrollmentView>> {
        let code = CourseCode::new(course_code)?;
        let course = self.courses.get(&code)?;

        self.enrollments
            .list_by_course(&code)?
            .into_iter()
            .map(|enrollment| {
                let student = self.lookup_student(enrollment.student_id)?;
                Ok(EnrollmentView {
                    enrollment,
                    student,
                    course: Some(course.clone()),
                })
            })
            .collect()
    }

    pub fn list_enrollments(&self) -> Result<Vec<EnrollmentView>> {
        let mut courses = HashMap::new();
        self.enrollments
            .list()?
            .into_iter()
            .map(|enrollment| {
                let student = self.lookup_student(enrollment.student_id)?;
                let course = self.cached_course(&mut courses, &enrollment.course_code)?;
                Ok(EnrollmentView {
                    enrollment,
                    student,
                    course,
                })
            })
            .collect()
    }

    /// Every (student, course) pair without an ACTIVE enrollment whose course
    /// still has seats.
    ///
    /// Cost is students x courses; an index of open pairs would be needed if
    /// either collection grows large.
    pub fn available_combinations(&self) -> Result<CombinationReport> {
        let students = self.students.list()?;
        let open_courses: Vec<Course> = self
            .courses
            .list()?
            .into_iter()
            .filter(Course::has_open_seats)
            .collect();
        let active = self.enrollments.active_pairs()?;

        let mut combinations = Vec::new();
        for student in &students {
            for course in &open_courses {
                if active.contains(&(student.id, course.code.clone())) {
                    continue;
                }
                combinations.push(AvailableCombination {
                    student_id: student.id,
                    student_name: student.name.clone(),
                    course_code: course.code.clone(),
                    course_name: course.name.clone(),
                    available_seats: course.available_seats,
                });
            }
        }

        tracing::debug!(
            combinations = combinations.len(),
            existing_enrollments = active.len(),
            "Available combinations computed"
        );
        Ok(CombinationReport {
            total: combinations.len(),
            existing_enrollments: active.len(),
            combinations,
        })
    }

    pub fn recalculate_seats(&self) -> Result<Vec<SeatReconciliation>> {
        self.ledger
            .recalculate(&|code| self.enrollments.count_active(code))
    }

    fn release_reserved(&self, code: &CourseCode) {
        match self.ledger.release(code) {
            Ok(true) => {}
            Ok(false) => {
                tracing::error!(course_code = %code, "Reserved seat could not be released")
            }
            Err(err) => {
                tracing::error!(course_code = %code, error = %err, "Releasing reserved seat failed")
            }
        }
    }

    fn lookup_student(&self, id: StudentId) -> Result<Option<Student>> {
        match self.students.get(id) {
            Ok(student) => Ok(Some(student)),
            Err(EnrollError::StudentNotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn lookup_course(&self, code: &CourseCode) -> Result<Option<Course>> {
        match self.courses.get(code) {
            Ok(course) => Ok(Some(course)),
            Err(EnrollError::CourseNotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn cached_course(
        &self,
        cache: &mut HashMap<CourseCode, Option<Course>>,
        code: &CourseCode,
    ) -> Result<Option<Course>> {
        if let Some(course) = cache.get(code) {
            return Ok(course.clone());
        }
        let course = self.lookup_course(code)?;
        cache.insert(code.clone(), course.clone());
        Ok(course)
    }
}

impl std::fmt::Debug for EnrollmentCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrollmentCoordinator")
            .field("ledger", &self.ledger)
            .field("recalculate_on_list", &self.recalculate_on_list)
            .finish()
    }
}
