use crate::config::toml_config::CampusConfig;
use crate::core::coordinator::EnrollmentCoordinator;
use crate::utils::error::Result;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub students: usize,
    pub courses: usize,
    pub enrollments: usize,
    pub reconciled_courses: usize,
}

/// Loads the campus through the public operations, then reconciles seat counts.
///
/// Reconciliation runs even when loading stops early, so whatever was loaded
/// is left consistent before the loading error is returned.
pub fn seed_campus(
    coordinator: &EnrollmentCoordinator,
    config: &CampusConfig,
) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();
    let loaded = load(coordinator, config, &mut summary);

    let reconciled = coordinator.recalculate_seats()?;
    summary.reconciled_courses = reconciled.len();

    match loaded {
        Ok(()) => {
            tracing::info!(
                students = summary.students,
                courses = summary.courses,
                enrollments = summary.enrollments,
                "Campus data loaded"
            );
            Ok(summary)
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                students = summary.students,
                courses = summary.courses,
                enrollments = summary.enrollments,
                "Campus data only partially loaded"
            );
            Err(e)
        }
    }
}

fn load(
    coordinator: &EnrollmentCoordinator,
    config: &CampusConfig,
    summary: &mut SeedSummary,
) -> Result<()> {
    for student in config.new_students() {
        coordinator.register_student(student)?;
        summary.students += 1;
    }

    for course in config.new_courses() {
        coordinator.create_course(course)?;
        summary.courses += 1;
    }

    for seed in &config.enrollments {
        let student = coordinator.student_by_identification(&seed.identification)?;
        coordinator.enroll(student.id, &seed.course_code)?;
        summary.enrollments += 1;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::EnrollmentSeed;
    use crate::utils::error::EnrollError;

    #[test]
    fn test_seed_sample_campus() {
        let coordinator = EnrollmentCoordinator::in_memory();
        let summary = seed_campus(&coordinator, &CampusConfig::sample()).unwrap();

        assert_eq!(
            summary,
            SeedSummary {
                students: 4,
                courses: 5,
                enrollments: 4,
                reconciled_courses: 5,
            }
        );
        assert_eq!(coordinator.course("IS101").unwrap().available_seats, 24);
        assert_eq!(coordinator.course("IS103").unwrap().available_seats, 20);
        assert_eq!(coordinator.list_by_student(1).unwrap().len(), 2);
    }

    #[test]
    fn test_seeding_twice_reports_duplicate() {
        let coordinator = EnrollmentCoordinator::in_memory();
        seed_campus(&coordinator, &CampusConfig::sample()).unwrap();

        let again = seed_campus(&coordinator, &CampusConfig::sample());
        assert!(matches!(again, Err(EnrollError::DuplicateKey { .. })));
        assert_eq!(coordinator.list_students().unwrap().len(), 4);
        assert_eq!(coordinator.course("IS101").unwrap().available_seats, 24);
    }

    #[test]
    fn test_partial_seed_keeps_loaded_data() {
        let mut config = CampusConfig::sample();
        config.enrollments.push(EnrollmentSeed {
            identification: "12345678".to_string(),
            course_code: "IS101".to_string(),
        });

        let coordinator = EnrollmentCoordinator::in_memory();
        let result = seed_campus(&coordinator, &config);
        assert!(matches!(
            result,
            Err(EnrollError::DuplicateEnrollment { .. })
        ));
        assert_eq!(coordinator.list_enrollments().unwrap().len(), 4);
        assert_eq!(coordinator.course("IS101").unwrap().available_seats, 24);
    }
}
