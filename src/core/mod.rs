pub mod coordinator;
pub mod seat_ledger;

pub use crate::domain::model::{Course, CourseCode, Enrollment, EnrollmentStatus, Student};
pub use crate::domain::ports::{CourseDirectory, EnrollmentStore, StudentDirectory};
pub use crate::utils::error::Result;
