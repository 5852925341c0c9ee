pub mod metrics_collector;

pub use metrics_collector::MetricsCollector;

use anyhow::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// 安装全局 Prometheus 记录器，返回用于渲染 `/metrics` 的句柄
pub fn init_metrics() -> Result<PrometheusHandle> {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    metrics::set_global_recorder(recorder)
        .map_err(|e| anyhow::anyhow!("Failed to install metrics recorder: {}", e))?;

    info!("Prometheus metrics recorder installed");
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_without_recorder_is_noop() {
        let collector = MetricsCollector::new();
        collector.record_task_completed(true);
        collector.record_calibration("pass");
        collector.record_status_recommendations(3);
    }

    #[test]
    fn test_local_recorder_renders_counters() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            let collector = MetricsCollector::new();
            collector.record_task_completed(true);
            collector.record_task_completed(false);
        });

        let rendered = handle.render();
        assert!(rendered.contains("machinatrack_tasks_completed_total 2"));
        assert!(rendered.contains("machinatrack_recurrences_spawned_total 1"));
    }
}
