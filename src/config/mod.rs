pub mod toml_config;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "course-enroll")]
#[command(about = "Course enrollment coordinator with bounded seat reservation")]
pub struct CliConfig {
    /// Campus TOML file with students, courses and initial enrollments
    #[arg(short, long)]
    pub config: Option<String>,

    /// Start from an empty campus instead of the built-in sample
    #[arg(long)]
    pub no_sample_data: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List all students
    Students,
    /// Show one student by id or identification
    Student {
        id: Option<u64>,
        #[arg(long, conflicts_with = "id")]
        identification: Option<String>,
    },
    /// List courses
    Courses {
        /// Only courses with open seats
        #[arg(long)]
        available: bool,
        /// Case-insensitive instructor name fragment
        #[arg(long)]
        instructor: Option<String>,
    },
    /// Show one course
    Course { code: String },
    /// List enrollments, optionally for one student or course
    Enrollments {
        #[arg(long, conflicts_with = "course")]
        student: Option<u64>,
        #[arg(long)]
        course: Option<String>,
    },
    /// Enroll a student in a course
    Enroll { student_id: u64, course_code: String },
    /// Cancel an enrollment
    Cancel { enrollment_id: u64 },
    /// Student/course pairs that could still be enrolled
    Combinations,
    /// Student with all of their enrollments
    Profile { student_id: u64 },
    /// Course with all of its enrollments
    CourseDetails { code: String },
    /// Recompute every course's available seats from active enrollments
    Recalculate,
    /// Fire concurrent enrollments at one course and report the outcome
    Simulate {
        #[arg(long)]
        course: String,
        #[arg(long, default_value = "10")]
        attempts: usize,
    },
}
