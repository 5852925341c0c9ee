use std::sync::Arc;

use machinatrack_errors::{TrackError, TrackResult};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::clock::Clock;
use crate::due::{classify, DueState};
use crate::entities::{
    CalibrationLog, CalibrationResult, MetrologyTool, MetrologyToolFilter, MetrologyToolPatch,
    NewCalibrationLog, NewMetrologyTool, ToolStatus,
};
use crate::recurrence::next_due_from;
use crate::repositories::{CalibrationLogRepository, MetrologyToolRepository};

/// 带校准到期分类的量具
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDueEntry {
    pub tool: MetrologyTool,
    pub due_state: DueState,
    pub label: String,
}

pub struct MetrologyService {
    tools: Arc<dyn MetrologyToolRepository>,
    logs: Arc<dyn CalibrationLogRepository>,
    clock: Arc<dyn Clock>,
    lead_days: u32,
}

fn check_interval(interval: Option<i32>) -> TrackResult<()> {
    match interval {
        Some(days) if days < 0 => Err(TrackError::validation_error(format!(
            "校准周期不能为负数: {days}"
        ))),
        _ => Ok(()),
    }
}

impl MetrologyService {
    pub fn new(
        tools: Arc<dyn MetrologyToolRepository>,
        logs: Arc<dyn CalibrationLogRepository>,
        clock: Arc<dyn Clock>,
        lead_days: u32,
    ) -> Self {
        Self {
            tools,
            logs,
            clock,
            lead_days,
        }
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_tool(&self, mut draft: NewMetrologyTool) -> TrackResult<MetrologyTool> {
        if draft.name.trim().is_empty() {
            return Err(TrackError::validation_error("量具名称不能为空"));
        }
        check_interval(draft.calibration_interval_days)?;
        if draft.next_calibration_date.is_none() {
            if let (Some(last), Some(days)) =
                (draft.last_calibration_date, draft.calibration_interval_days)
            {
                draft.next_calibration_date = next_due_from(last, days);
            }
        }
        let tool = MetrologyTool::new(draft, self.clock.now());
        self.tools.create(&tool).await
    }

    pub async fn get_tool(&self, id: &str) -> TrackResult<MetrologyTool> {
        self.tools
            .find_by_id(id)
            .await?
            .ok_or_else(|| TrackError::not_found("量具", id))
    }

    pub async fn list_tools(&self, filter: &MetrologyToolFilter) -> TrackResult<Vec<MetrologyTool>> {
        self.tools.list(filter).await
    }

    #[instrument(skip(self, patch))]
    pub async fn update_tool(&self, id: &str, patch: MetrologyToolPatch) -> TrackResult<MetrologyTool> {
        check_interval(patch.calibration_interval_days)?;
        if matches!(&patch.name, Some(name) if name.trim().is_empty()) {
            return Err(TrackError::validation_error("量具名称不能为空"));
        }
        let mut tool = self.get_tool(id).await?;
        tool.apply_patch(patch, self.clock.now());
        self.tools.update(&tool).await
    }

    /// 已有校准记录的量具不允许删除
    #[instrument(skip(self))]
    pub async fn delete_tool(&self, id: &str) -> TrackResult<()> {
        let history = self.logs.find_by_tool(id).await?;
        if !history.is_empty() {
            return Err(TrackError::conflict(format!(
                "量具 {id} 已有 {} 条校准记录，无法删除",
                history.len()
            )));
        }
        if !self.tools.delete(id).await? {
            return Err(TrackError::not_found("量具", id));
        }
        Ok(())
    }

    /// 记录一次校准并同步更新量具状态
    ///
    /// 合格或调整后合格：状态为 calibrated，下次校准日取记录中的日期，
    /// 否则按校准日期加校准周期推算。不合格：停用并清空下次校准日期。
    #[instrument(skip(self, entry), fields(tool_id = %tool_id, result = %entry.result))]
    pub async fn record_calibration(
        &self,
        tool_id: &str,
        entry: NewCalibrationLog,
    ) -> TrackResult<(MetrologyTool, CalibrationLog)> {
        if entry.performed_by.trim().is_empty() {
            return Err(TrackError::validation_error("校准人员不能为空"));
        }
        let mut tool = self.get_tool(tool_id).await?;
        let now = self.clock.now();

        let next_due = match entry.result {
            CalibrationResult::Pass | CalibrationResult::Adjusted => entry.next_due_date.or_else(|| {
                tool.calibration_interval_days
                    .and_then(|days| next_due_from(entry.calibration_date, days))
            }),
            CalibrationResult::Fail => None,
        };

        tool.last_calibration_date = Some(entry.calibration_date);
        tool.next_calibration_date = next_due;
        tool.status = if entry.result.is_usable() {
            ToolStatus::Calibrated
        } else {
            ToolStatus::OutOfService
        };
        tool.updated_at = now;

        let mut log = CalibrationLog::new(tool_id, entry, now);
        log.next_due_date = next_due;

        let (tool, log) = self.tools.record_calibration(&tool, &log).await?;
        if tool.status == ToolStatus::OutOfService {
            warn!(tool_id = %tool.id, "量具校准不合格，已停用");
        } else {
            info!(tool_id = %tool.id, next_calibration_date = ?tool.next_calibration_date, "校准已记录");
        }
        Ok((tool, log))
    }

    /// 校准历史，最新的在前
    pub async fn calibration_history(&self, tool_id: &str) -> TrackResult<Vec<CalibrationLog>> {
        self.get_tool(tool_id).await?;
        self.logs.find_by_tool(tool_id).await
    }

    pub async fn due_overview(&self) -> TrackResult<Vec<ToolDueEntry>> {
        let today = self.clock.today();
        let mut entries: Vec<ToolDueEntry> = self
            .tools
            .list(&MetrologyToolFilter::default())
            .await?
            .into_iter()
            .map(|tool| {
                let due_state = classify(tool.next_calibration_date, today, self.lead_days);
                ToolDueEntry {
                    label: due_state.calibration_label().to_string(),
                    due_state,
                    tool,
                }
            })
            .collect();
        entries.sort_by_key(|entry| {
            (
                entry.tool.next_calibration_date.is_none(),
                entry.tool.next_calibration_date,
            )
        });
        Ok(entries)
    }
}
