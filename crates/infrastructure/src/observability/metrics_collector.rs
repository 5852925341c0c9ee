//! Metrics collector for MachinaTrack
//!
//! Counters are registered through the `metrics` facade; whichever recorder is
//! installed (Prometheus in production, none in tests) receives them.

use metrics::{counter, Counter};
use tracing::debug;

pub const TASKS_COMPLETED_TOTAL: &str = "machinatrack_tasks_completed_total";
pub const RECURRENCES_SPAWNED_TOTAL: &str = "machinatrack_recurrences_spawned_total";
pub const CALIBRATIONS_RECORDED_TOTAL: &str = "machinatrack_calibrations_recorded_total";
pub const STATUS_RECOMMENDATIONS_APPLIED_TOTAL: &str =
    "machinatrack_status_recommendations_applied_total";

#[derive(Clone)]
pub struct MetricsCollector {
    tasks_completed_total: Counter,
    recurrences_spawned_total: Counter,
    status_recommendations_applied_total: Counter,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            tasks_completed_total: counter!(TASKS_COMPLETED_TOTAL),
            recurrences_spawned_total: counter!(RECURRENCES_SPAWNED_TOTAL),
            status_recommendations_applied_total: counter!(STATUS_RECOMMENDATIONS_APPLIED_TOTAL),
        }
    }

    pub fn record_task_completed(&self, spawned_next: bool) {
        self.tasks_completed_total.increment(1);
        if spawned_next {
            self.recurrences_spawned_total.increment(1);
        }
        debug!(spawned_next, "Maintenance task completion recorded");
    }

    /// 按校准结果打标签
    pub fn record_calibration(&self, result: &str) {
        counter!(CALIBRATIONS_RECORDED_TOTAL, "result" => result.to_string()).increment(1);
    }

    pub fn record_status_recommendations(&self, applied: usize) {
        self.status_recommendations_applied_total
            .increment(applied as u64);
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
