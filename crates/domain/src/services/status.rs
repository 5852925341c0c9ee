use std::sync::Arc;

use machinatrack_errors::{TrackError, TrackResult};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::clock::Clock;
use crate::entities::{MaintenanceTaskFilter, MetrologyToolFilter};
use crate::lifecycle::{recommend_task_status, recommend_tool_status};
use crate::repositories::{MaintenanceTaskRepository, MetrologyToolRepository};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusChange {
    pub id: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusRefreshReport {
    pub tasks: Vec<StatusChange>,
    pub tools: Vec<StatusChange>,
    /// 刷新期间被其他请求修改而跳过的任务与量具
    pub skipped: Vec<String>,
}

impl StatusRefreshReport {
    pub fn applied(&self) -> usize {
        self.tasks.len() + self.tools.len()
    }
}

/// 按到期日期批量修正保养任务与量具状态，只在显式调用时写入
pub struct StatusService {
    tasks: Arc<dyn MaintenanceTaskRepository>,
    tools: Arc<dyn MetrologyToolRepository>,
    clock: Arc<dyn Clock>,
    maintenance_lead_days: u32,
    calibration_lead_days: u32,
}

impl StatusService {
    pub fn new(
        tasks: Arc<dyn MaintenanceTaskRepository>,
        tools: Arc<dyn MetrologyToolRepository>,
        clock: Arc<dyn Clock>,
        maintenance_lead_days: u32,
        calibration_lead_days: u32,
    ) -> Self {
        Self {
            tasks,
            tools,
            clock,
            maintenance_lead_days,
            calibration_lead_days,
        }
    }

    #[instrument(skip(self))]
    pub async fn apply_recommendations(&self) -> TrackResult<StatusRefreshReport> {
        let today = self.clock.today();
        let now = self.clock.now();
        let mut report = StatusRefreshReport::default();

        for task in self.tasks.list(&MaintenanceTaskFilter::default()).await? {
            let Some(recommended) = recommend_task_status(&task, today, self.maintenance_lead_days)
            else {
                continue;
            };
            let previous = task.status;
            let mut updated = task.clone();
            updated.status = recommended;
            updated.updated_at = now;

            match self.tasks.apply_update(&task, &updated, None).await {
                Ok(outcome) => report.tasks.push(StatusChange {
                    id: outcome.task.id,
                    from: previous.to_string(),
                    to: recommended.to_string(),
                }),
                Err(TrackError::Conflict(reason)) => {
                    warn!(task_id = %updated.id, %reason, "任务已被并发修改，跳过");
                    report.skipped.push(updated.id);
                }
                Err(err) => return Err(err),
            }
        }

        for tool in self.tools.list(&MetrologyToolFilter::default()).await? {
            let Some(recommended) = recommend_tool_status(&tool, today, self.calibration_lead_days)
            else {
                continue;
            };
            match self.tools.update_status(&tool, recommended, now).await {
                Ok(saved) => report.tools.push(StatusChange {
                    id: saved.id,
                    from: tool.status.to_string(),
                    to: recommended.to_string(),
                }),
                Err(TrackError::Conflict(reason)) => {
                    warn!(tool_id = %tool.id, %reason, "量具已被并发修改，跳过");
                    report.skipped.push(tool.id);
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            tasks = report.tasks.len(),
            tools = report.tools.len(),
            skipped = report.skipped.len(),
            "状态刷新完成"
        );
        Ok(report)
    }
}
