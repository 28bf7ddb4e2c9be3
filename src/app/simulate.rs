use crate::core::coordinator::EnrollmentCoordinator;
use crate::domain::model::{CourseCode, EnrollmentId, NewStudent};
use crate::utils::error::{EnrollError, Result};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinSet;

#[derive(Debug, Clone, Serialize)]
pub struct ContentionReport {
    pub course_code: CourseCode,
    pub attempts: usize,
    pub seats_before: u32,
    pub succeeded: usize,
    pub refused_no_seats: usize,
    pub other_failures: usize,
    pub seats_after: u32,
    pub enrollment_ids: Vec<EnrollmentId>,
}

/// Registers `attempts` fresh students and has all of them enroll in
/// `course_code` at once, each call on its own blocking task.
pub async fn contend(
    coordinator: Arc<EnrollmentCoordinator>,
    course_code: &str,
    attempts: usize,
) -> Result<ContentionReport> {
    let course = coordinator.course(course_code)?;
    let base = coordinator.list_students()?.len();

    let mut student_ids = Vec::with_capacity(attempts);
    for n in 1..=attempts {
        let student = coordinator.register_student(NewStudent::new(
            &format!("Simulated Student {}", base + n),
            &format!("SIM-{:05}", base + n),
            "Simulation",
            None,
        ))?;
        student_ids.push(student.id);
    }

    tracing::info!(
        course_code = %course.code,
        attempts,
        available_seats = course.available_seats,
        "Starting contention run"
    );

    let mut tasks = JoinSet::new();
    for student_id in student_ids {
        let coordinator = Arc::clone(&coordinator);
        let code = course.code.to_string();
        tasks.spawn_blocking(move || coordinator.enroll(student_id, &code));
    }

    let mut report = ContentionReport {
        course_code: course.code.clone(),
        attempts,
        seats_before: course.available_seats,
        succeeded: 0,
        refused_no_seats: 0,
        other_failures: 0,
        seats_after: 0,
        enrollment_ids: Vec::new(),
    };

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(enrollment)) => {
                report.succeeded += 1;
                report.enrollment_ids.push(enrollment.id);
            }
            Ok(Err(EnrollError::NoSeatsAvailable { .. })) => report.refused_no_seats += 1,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Simulated enrollment failed");
                report.other_failures += 1;
            }
            Err(e) => {
                tracing::error!(error = %e, "Simulated enrollment task panicked");
                report.other_failures += 1;
            }
        }
    }

    report.enrollment_ids.sort_unstable();
    report.seats_after = coordinator.course(course_code)?.available_seats;

    tracing::info!(
        course_code = %report.course_code,
        succeeded = report.succeeded,
        refused = report.refused_no_seats,
        seats_after = report.seats_after,
        "Contention run finished"
    );
    Ok(report)
}
