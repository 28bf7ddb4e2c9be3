//! In-memory store backends.
//!
//! Each store keeps its rows in creation order behind a `parking_lot` lock
//! and maintains the secondary indices used for uniqueness checks, so a
//! check and the insert it guards happen under the same lock.

mod courses;
mod enrollments;
mod students;

pub use courses::InMemoryCourseDirectory;
pub use enrollments::InMemoryEnrollmentStore;
pub use students::InMemoryStudentDirectory;
