use crate::domain::model::{CourseCode, SeatReconciliation};
use crate::domain::ports::CourseDirectory;
use crate::utils::error::Result;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// The only writer of `available_seats`.
///
/// Every adjustment is bounded to `[0, total_seats]` and applied under the
/// course's own seat lock. Next to that lock each course has a gate:
/// enroll and cancel hold it shared for their multi-step sequences, and
/// reconciliation holds it exclusively while it counts and rewrites a course.
pub struct SeatLedger {
    courses: Arc<dyn CourseDirectory>,
    gates: DashMap<CourseCode, Arc<RwLock<()>>>,
}

impl SeatLedger {
    pub fn new(courses: Arc<dyn CourseDirectory>) -> Self {
        Self {
            courses,
            gates: DashMap::new(),
        }
    }

    /// Applies `delta` to the course's available seats.
    ///
    /// Returns `Ok(false)` without mutating anything when the result would
    /// leave `[0, total_seats]`. Errors only for an unknown course.
    pub fn adjust(&self, code: &CourseCode, delta: i64) -> Result<bool> {
        self.courses.update_seats(code, &mut |seats| {
            let next = i64::from(seats.available).checked_add(delta);
            match next.map(u32::try_from) {
                Some(Ok(available)) if available <= seats.total => {
                    seats.available = available;
                    true
                }
                _ => false,
            }
        })
    }

    pub fn reserve(&self, code: &CourseCode) -> Result<bool> {
        self.adjust(code, -1)
    }

    pub fn release(&self, code: &CourseCode) -> Result<bool> {
        self.adjust(code, 1)
    }

    /// Runs `f` while holding the course's gate shared.
    pub fn hold<R>(&self, code: &CourseCode, f: impl FnOnce() -> R) -> R {
        let gate = self.gate(code);
        let _shared = gate.read();
        f()
    }

    /// Rewrites every course's available seats as
    /// `total_seats - active enrollments`, clamped at zero.
    ///
    /// Idempotent. `count_active` must read the authoritative enrollment set.
    pub fn recalculate(
        &self,
        count_active: &dyn Fn(&CourseCode) -> Result<usize>,
    ) -> Result<Vec<SeatReconciliation>> {
        let courses = self.courses.list()?;
        let mut report = Vec::with_capacity(courses.len());
        for course in courses {
            report.push(self.recalculate_course(&course.code, count_active)?);
        }

        let drifted = report.iter().filter(|r| r.drifted()).count();
        if drifted > 0 {
            tracing::warn!(courses = report.len(), drifted, "Seat counts reconciled with drift");
        } else {
            tracing::debug!(courses = report.len(), "Seat counts reconciled");
        }
        Ok(report)
    }

    /// Reconciles a single course. Must not be called while holding that course's gate.
    pub fn recalculate_course(
        &self,
        code: &CourseCode,
        count_active: &dyn Fn(&CourseCode) -> Result<usize>,
    ) -> Result<SeatReconciliation> {
        let gate = self.gate(code);
        let _exclusive = gate.write();

        let active = count_active(code)?;
        let enrolled = u32::try_from(active).unwrap_or(u32::MAX);
        let mut outcome = None;

        self.courses.update_seats(code, &mut |seats| {
            let target = seats.total.saturating_sub(enrolled);
            outcome = Some((seats.total, seats.available, target));
            seats.available = target;
            true
        })?;

        let (total_seats, before, after) = outcome.unwrap_or_default();
        let reconciliation = SeatReconciliation {
            course_code: code.clone(),
            total_seats,
            active_enrollments: active,
            before,
            after,
        };
        if reconciliation.drifted() {
            tracing::warn!(
                course_code = %code,
                before,
                after,
                active_enrollments = active,
                "Seat counter drifted"
            );
        }
        Ok(reconciliation)
    }

    fn gate(&self, code: &CourseCode) -> Arc<RwLock<()>> {
        Arc::clone(self.gates.entry(code.clone()).or_default().value())
    }
}

impl std::fmt::Debug for SeatLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeatLedger")
            .field("gates", &self.gates.len())
            .finish()
    }
}
