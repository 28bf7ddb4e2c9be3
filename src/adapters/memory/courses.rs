use crate::domain::model::{Course, CourseCode, NewCourse, Seats};
use crate::domain::ports::CourseDirectory;
use crate::utils::error::{EnrollError, Result};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// Static course fields plus the seat counter, which has its own lock so
/// adjustments on different courses never contend.
#[derive(Debug)]
struct CourseEntry {
    course: Course,
    seats: Mutex<Seats>,
}

impl CourseEntry {
    fn snapshot(&self) -> Course {
        let seats = *self.seats.lock();
        Course {
            total_seats: seats.total,
            available_seats: seats.available,
            ..self.course.clone()
        }
    }
}

#[derive(Debug, Default)]
struct CourseTable {
    order: Vec<CourseCode>,
    entries: HashMap<CourseCode, Arc<CourseEntry>>,
}

#[derive(Debug, Default)]
pub struct InMemoryCourseDirectory {
    table: RwLock<CourseTable>,
}

impl InMemoryCourseDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn count(&self) -> usize {
        self.table.read().order.len()
    }

    fn entry(&self, code: &CourseCode) -> Result<Arc<CourseEntry>> {
        self.table
            .read()
            .entries
            .get(code)
            .cloned()
            .ok_or_else(|| EnrollError::CourseNotFound {
                course_code: code.to_string(),
            })
    }
}

impl CourseDirectory for InMemoryCourseDirectory {
    fn create(&self, course: NewCourse) -> Result<Course> {
        let (code, course) = course.normalized()?;
        let mut table = self.table.write();

        if table.entries.contains_key(&code) {
            return Err(EnrollError::DuplicateKey {
                entity: "Course",
                key: code.to_string(),
            });
        }

        let created = Course {
            code: code.clone(),
            name: course.name,
            credits: course.credits,
            instructor: course.instructor,
            schedule: course.schedule,
            total_seats: course.total_seats,
            available_seats: course.total_seats,
            created_at: Utc::now(),
        };
        let entry = CourseEntry {
            seats: Mutex::new(Seats::full(created.total_seats)),
            course: created.clone(),
        };
        table.entries.insert(code.clone(), Arc::new(entry));
        table.order.push(code);
        Ok(created)
    }

    fn get(&self, code: &CourseCode) -> Result<Course> {
        Ok(self.entry(code)?.snapshot())
    }

    fn list(&self) -> Result<Vec<Course>> {
        let table = self.table.read();
        Ok(table
            .order
            .iter()
            .filter_map(|code| table.entries.get(code))
            .map(|entry| entry.snapshot())
            .collect())
    }

    fn update_seats(
        &self,
        code: &CourseCode,
        update: &mut dyn FnMut(&mut Seats) -> bool,
    ) -> Result<bool> {
        let entry = self.entry(code)?;
        let mut seats = entry.seats.lock();
        let mut candidate = *seats;

        if !update(&mut candidate) {
            return Ok(false);
        }
        // capacity is fixed at creation
        if candidate.total != seats.total || candidate.available > candidate.total {
            return Ok(false);
        }

        *seats = candidate;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn programming() -> NewCourse {
        NewCourse {
            code: "is101".to_string(),
            name: "Programming I".to_string(),
            credits: 3,
            instructor: "Dr. Ana Maria Castillo".to_string(),
            schedule: "Mon-Wed-Fri 8:00-10:00".to_string(),
            total_seats: 25,
        }
    }

    #[test]
    fn test_create_normalizes_code_and_fills_seats() {
        let directory = InMemoryCourseDirectory::new();
        let course = directory.create(programming()).unwrap();

        assert_eq!(course.code.as_str(), "IS101");
        assert_eq!(course.available_seats, 25);
        assert_eq!(course.total_seats, 25);
    }

    #[test]
    fn test_duplicate_code_is_case_insensitive() {
        let directory = InMemoryCourseDirectory::new();
        directory.create(programming()).unwrap();

        let mut again = programming();
        again.code = "IS101".to_string();
        assert!(matches!(
            directory.create(again),
            Err(EnrollError::DuplicateKey { entity: "Course", .. })
        ));
        assert_eq!(directory.count(), 1);
    }

    #[test]
    fn test_update_seats_keeps_only_accepted_changes() {
        let directory = InMemoryCourseDirectory::new();
        directory.create(programming()).unwrap();
        let code = CourseCode::new("IS101").unwrap();

        let applied = directory
            .update_seats(&code, &mut |seats| {
                seats.available -= 1;
                true
            })
            .unwrap();
        assert!(applied);
        assert_eq!(directory.get(&code).unwrap().available_seats, 24);

        let refused = directory
            .update_seats(&code, &mut |seats| {
                seats.available = 0;
                false
            })
            .unwrap();
        assert!(!refused);
        assert_eq!(directory.get(&code).unwrap().available_seats, 24);

        let overflow = directory
            .update_seats(&code, &mut |seats| {
                seats.available = seats.total + 1;
                true
            })
            .unwrap();
        assert!(!overflow);
        assert_eq!(directory.get(&code).unwrap().available_seats, 24);
    }

    #[test]
    fn test_unknown_course() {
        let directory = InMemoryCourseDirectory::new();
        let code = CourseCode::new("NOPE1").unwrap();
        assert!(matches!(
            directory.get(&code),
            Err(EnrollError::CourseNotFound { .. })
        ));
        assert!(directory.update_seats(&code, &mut |_| true).is_err());
    }
}
