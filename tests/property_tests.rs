use course_enroll::domain::model::{NewCourse, NewStudent};
use course_enroll::EnrollmentCoordinator;
use proptest::prelude::*;
use std::collections::HashMap;

const COURSES: [(&str, u32); 3] = [("IS101", 3), ("IS102", 1), ("MATH101", 2)];
const STUDENTS: u64 = 4;

#[derive(Debug, Clone)]
enum Op {
    Enroll { student: u64, course: usize },
    Cancel { pick: usize },
    Recalculate,
    Drift { course: usize, delta: i64 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        5 => (1..=STUDENTS, 0..COURSES.len()).prop_map(|(student, course)| Op::Enroll { student, course }),
        3 => any::<usize>().prop_map(|pick| Op::Cancel { pick }),
        1 => Just(Op::Recalculate),
        1 => (0..COURSES.len(), -2i64..=2).prop_map(|(course, delta)| Op::Drift { course, delta }),
    ]
}

/// Operations that go through the coordinator only, so counters never drift.
fn ledger_op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        5 => (1..=STUDENTS, 0..COURSES.len()).prop_map(|(student, course)| Op::Enroll { student, course }),
        3 => any::<usize>().prop_map(|pick| Op::Cancel { pick }),
        1 => Just(Op::Recalculate),
    ]
}

fn campus() -> EnrollmentCoordinator {
    let coordinator = EnrollmentCoordinator::in_memory().with_recalculate_on_list(false);
    for n in 1..=STUDENTS {
        coordinator
            .register_student(NewStudent::new(
                &format!("Student {}", n),
                &format!("P-{}", n),
                "Physics",
                None,
            ))
            .unwrap();
    }
    for (code, total_seats) in COURSES {
        coordinator
            .create_course(NewCourse {
                code: code.to_string(),
                name: format!("Course {}", code),
                credits: 3,
                instructor: "Dr. Luis Hernandez".to_string(),
                schedule: "Mon-Wed-Fri 10:00-11:30".to_string(),
                total_seats,
            })
            .unwrap();
    }
    coordinator
}

fn apply(coordinator: &EnrollmentCoordinator, op: &Op) {
    match op {
        Op::Enroll { student, course } => {
            let _ = coordinator.enroll(*student, COURSES[*course].0);
        }
        Op::Cancel { pick } => {
            let all = coordinator.list_enrollments().unwrap();
            if !all.is_empty() {
                let _ = coordinator.cancel(all[pick % all.len()].enrollment.id);
            }
        }
        Op::Recalculate => {
            coordinator.recalculate_seats().unwrap();
        }
        Op::Drift { course, delta } => {
            let code = coordinator.course(COURSES[*course].0).unwrap().code;
            let _ = coordinator.ledger().adjust(&code, *delta);
        }
    }
}

fn seat_counts(coordinator: &EnrollmentCoordinator) -> HashMap<String, u32> {
    COURSES
        .iter()
        .map(|(code, _)| {
            (
                code.to_string(),
                coordinator.course(code).unwrap().available_seats,
            )
        })
        .collect()
}

proptest! {
    #[test]
    fn seats_stay_within_bounds(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let coordinator = campus();
        for op in &ops {
            apply(&coordinator, op);
            for (code, total) in COURSES {
                let course = coordinator.course(code).unwrap();
                prop_assert!(course.available_seats <= total);
                prop_assert_eq!(course.total_seats, total);
            }
        }
    }

    #[test]
    fn at_most_one_active_enrollment_per_pair(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let coordinator = campus();
        for op in &ops {
            apply(&coordinator, op);
        }

        let mut active: HashMap<(u64, String), usize> = HashMap::new();
        for view in coordinator.list_enrollments().unwrap() {
            if view.enrollment.is_active() {
                *active
                    .entry((view.enrollment.student_id, view.enrollment.course_code.to_string()))
                    .or_default() += 1;
            }
        }
        prop_assert!(active.values().all(|count| *count == 1));
    }

    #[test]
    fn active_enrollments_never_exceed_capacity(ops in prop::collection::vec(ledger_op_strategy(), 1..60)) {
        let coordinator = campus();
        for op in &ops {
            apply(&coordinator, op);
        }

        for (code, total) in COURSES {
            let active = coordinator
                .list_by_course(code)
                .unwrap()
                .iter()
                .filter(|v| v.enrollment.is_active())
                .count() as u32;
            let course = coordinator.course(code).unwrap();
            prop_assert!(active <= total);
            prop_assert_eq!(course.available_seats, total - active);
        }
    }

    #[test]
    fn recalculate_is_idempotent(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let coordinator = campus();
        for op in &ops {
            apply(&coordinator, op);
        }

        coordinator.recalculate_seats().unwrap();
        let once = seat_counts(&coordinator);
        let second = coordinator.recalculate_seats().unwrap();
        let twice = seat_counts(&coordinator);

        prop_assert_eq!(once, twice);
        prop_assert!(second.iter().all(|r| !r.drifted()));
    }

    #[test]
    fn enroll_then_cancel_restores_seats(student in 1..=STUDENTS, course in 0..COURSES.len()) {
        let coordinator = campus();
        let code = COURSES[course].0;
        let before = coordinator.course(code).unwrap().available_seats;

        let enrollment = coordinator.enroll(student, code).unwrap();
        coordinator.cancel(enrollment.id).unwrap();

        prop_assert_eq!(coordinator.course(code).unwrap().available_seats, before);
        let still_active = coordinator
            .list_by_course(code)
            .unwrap()
            .iter()
            .any(|v| v.enrollment.is_active() && v.enrollment.student_id == student);
        prop_assert!(!still_active);
    }
}
