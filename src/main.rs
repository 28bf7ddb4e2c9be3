use anyhow::Context;
use clap::Parser;
use course_enroll::app::{
    seed::seed_campus,
    simulate::contend,
    views::{CourseDetails, StudentProfile},
};
use course_enroll::utils::error::ErrorSeverity;
use course_enroll::utils::{logger, validation::Validate};
use course_enroll::{CampusConfig, CliConfig, Command, EnrollError, EnrollmentCoordinator};
use serde::Serialize;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::debug!("CLI config: {:?}", config);

    let campus = load_campus(&config)?;
    if let Err(e) = campus.validate() {
        tracing::error!("❌ Campus configuration is invalid: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let coordinator = Arc::new(
        EnrollmentCoordinator::in_memory()
            .with_recalculate_on_list(campus.service.recalculate_on_list),
    );

    // A broken seed is not fatal: keep serving whatever was loaded.
    match seed_campus(&coordinator, &campus) {
        Ok(summary) => tracing::debug!("Seed summary: {:?}", summary),
        Err(e) => tracing::warn!("⚠️ Seed data not fully loaded: {}", e),
    }

    if let Err(e) = run(config.command, coordinator).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?}, Status: {})",
            e,
            e.category(),
            e.severity(),
            e.status_code()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn load_campus(config: &CliConfig) -> anyhow::Result<CampusConfig> {
    match &config.config {
        Some(path) => {
            tracing::info!("📁 Loading campus from: {}", path);
            CampusConfig::from_file(path)
                .with_context(|| format!("failed to load campus file '{}'", path))
        }
        None if config.no_sample_data => Ok(CampusConfig::default()),
        None => Ok(CampusConfig::sample()),
    }
}

async fn run(command: Command, coordinator: Arc<EnrollmentCoordinator>) -> Result<(), EnrollError> {
    match command {
        Command::Students => print_json(&coordinator.list_students()?),
        Command::Student { id, identification } => {
            let student = match (id, identification) {
                (Some(id), _) => coordinator.student(id)?,
                (None, Some(identification)) => coordinator.student_by_identification(&identification)?,
                (None, None) => {
                    return Err(EnrollError::validation(
                        "student",
                        "pass an id or --identification",
                    ))
                }
            };
            print_json(&student)
        }
        Command::Courses {
            available,
            instructor,
        } => {
            let courses = match (available, instructor) {
                (_, Some(fragment)) => {
                    let mut courses = coordinator.courses_by_instructor(&fragment)?;
                    if available {
                        courses.retain(|course| course.has_open_seats());
                    }
                    courses
                }
                (true, None) => coordinator.list_available_courses()?,
                (false, None) => coordinator.list_courses()?,
            };
            print_json(&courses)
        }
        Command::Course { code } => print_json(&coordinator.course(&code)?),
        Command::Enrollments { student, course } => {
            let enrollments = match (student, course) {
                (Some(student_id), _) => coordinator.list_by_student(student_id)?,
                (None, Some(code)) => coordinator.list_by_course(&code)?,
                (None, None) => coordinator.list_enrollments()?,
            };
            print_json(&enrollments)
        }
        Command::Enroll {
            student_id,
            course_code,
        } => {
            let enrollment = coordinator.enroll(student_id, &course_code)?;
            tracing::info!("✅ Enrollment {} created", enrollment.id);
            print_json(&coordinator.get_enrollment(enrollment.id)?)
        }
        Command::Cancel { enrollment_id } => {
            coordinator.cancel(enrollment_id)?;
            tracing::info!("✅ Enrollment {} cancelled", enrollment_id);
            print_json(&coordinator.get_enrollment(enrollment_id)?)
        }
        Command::Combinations => print_json(&coordinator.available_combinations()?),
        Command::Profile { student_id } => {
            print_json(&StudentProfile::load(&coordinator, student_id)?)
        }
        Command::CourseDetails { code } => print_json(&CourseDetails::load(&coordinator, &code)?),
        Command::Recalculate => print_json(&coordinator.recalculate_seats()?),
        Command::Simulate { course, attempts } => {
            let report = contend(Arc::clone(&coordinator), &course, attempts).await?;
            print_json(&report)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), EnrollError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
