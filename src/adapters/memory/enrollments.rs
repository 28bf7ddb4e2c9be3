use crate::domain::model::{CourseCode, Enrollment, EnrollmentId, EnrollmentStatus, StudentId};
use crate::domain::ports::EnrollmentStore;
use crate::utils::error::{EnrollError, Result};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
struct EnrollmentTable {
    rows: Vec<Enrollment>,
    by_student: HashMap<StudentId, Vec<EnrollmentId>>,
    by_course: HashMap<CourseCode, Vec<EnrollmentId>>,
}

impl EnrollmentTable {
    fn index(id: EnrollmentId) -> Option<usize> {
        usize::try_from(id.checked_sub(1)?).ok()
    }

    fn row(&self, id: EnrollmentId) -> Option<&Enrollment> {
        self.rows.get(Self::index(id)?)
    }

    fn row_mut(&mut self, id: EnrollmentId) -> Option<&mut Enrollment> {
        let index = Self::index(id)?;
        self.rows.get_mut(index)
    }

    fn collect(&self, ids: Option<&Vec<EnrollmentId>>) -> Vec<Enrollment> {
        ids.into_iter()
            .flatten()
            .filter_map(|id| self.row(*id))
            .cloned()
            .collect()
    }
}

/// Enrollment records plus an index of ACTIVE (student, course) pairs.
///
/// The pair index is a `DashMap`, so the duplicate check and the insert for
/// one pair happen under that pair's shard lock without blocking other pairs.
/// Lock order is always pair shard, then table.
#[derive(Debug, Default)]
pub struct InMemoryEnrollmentStore {
    table: RwLock<EnrollmentTable>,
    active: DashMap<(StudentId, CourseCode), EnrollmentId>,
}

impl InMemoryEnrollmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn count(&self) -> usize {
        self.table.read().rows.len()
    }

    fn not_found(id: EnrollmentId) -> EnrollError {
        EnrollError::EnrollmentNotFound { enrollment_id: id }
    }
}

impl EnrollmentStore for InMemoryEnrollmentStore {
    fn insert_active(
        &self,
        student_id: StudentId,
        course_code: &CourseCode,
        enrolled_at: DateTime<Utc>,
    ) -> Result<Enrollment> {
        match self.active.entry((student_id, course_code.clone())) {
            Entry::Occupied(_) => Err(EnrollError::DuplicateEnrollment {
                student_id,
                course_code: course_code.to_string(),
            }),
            Entry::Vacant(slot) => {
                let enrollment = {
                    let mut table = self.table.write();
                    let enrollment = Enrollment {
                        id: table.rows.len() as EnrollmentId + 1,
                        student_id,
                        course_code: course_code.clone(),
                        status: EnrollmentStatus::Active,
                        enrolled_at,
                        cancelled_at: None,
                    };
                    table
                        .by_student
                        .entry(student_id)
                        .or_default()
                        .push(enrollment.id);
                    table
                        .by_course
                        .entry(course_code.clone())
                        .or_default()
                        .push(enrollment.id);
                    table.rows.push(enrollment.clone());
                    enrollment
                };
                slot.insert(enrollment.id);
                Ok(enrollment)
            }
        }
    }

    fn get(&self, id: EnrollmentId) -> Result<Enrollment> {
        self.table
            .read()
            .row(id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    fn mark_cancelled(&self, id: EnrollmentId, cancelled_at: DateTime<Utc>) -> Result<Enrollment> {
        let pair = {
            let table = self.table.read();
            let row = table.row(id).ok_or_else(|| Self::not_found(id))?;
            if !row.is_active() {
                return Err(EnrollError::AlreadyCancelled { enrollment_id: id });
            }
            (row.student_id, row.course_code.clone())
        };

        // Whoever removes the pair entry owns the transition.
        match self.active.entry(pair) {
            Entry::Occupied(slot) if *slot.get() == id => {
                let cancelled = {
                    let mut table = self.table.write();
                    let row = table.row_mut(id).ok_or_else(|| Self::not_found(id))?;
                    row.status = EnrollmentStatus::Cancelled;
                    row.cancelled_at = Some(cancelled_at);
                    row.clone()
                };
                slot.remove();
                Ok(cancelled)
            }
            _ => Err(EnrollError::AlreadyCancelled { enrollment_id: id }),
        }
    }

    fn list(&self) -> Result<Vec<Enrollment>> {
        Ok(self.table.read().rows.clone())
    }

    fn list_by_student(&self, student_id: StudentId) -> Result<Vec<Enrollment>> {
        let table = self.table.read();
        Ok(table.collect(table.by_student.get(&student_id)))
    }

    fn list_by_course(&self, course_code: &CourseCode) -> Result<Vec<Enrollment>> {
        let table = self.table.read();
        Ok(table.collect(table.by_course.get(course_code)))
    }

    fn active_pairs(&self) -> Result<HashSet<(StudentId, CourseCode)>> {
        Ok(self.active.iter().map(|entry| entry.key().clone()).collect())
    }

    fn count_active(&self, course_code: &CourseCode) -> Result<usize> {
        let table = self.table.read();
        Ok(table
            .by_course
            .get(course_code)
            .into_iter()
            .flatten()
            .filter_map(|id| table.row(*id))
            .filter(|enrollment| enrollment.is_active())
            .count())
    }
}
