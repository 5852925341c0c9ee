//! 状态流转规则与状态建议

use chrono::NaiveDate;
use machinatrack_errors::{TrackError, TrackResult};

use crate::due::{classify, DueState};
use crate::entities::{MaintenanceStatus, MaintenanceTask, MetrologyTool, ToolStatus};

/// 检查保养任务状态转换是否合法，相同状态视为合法
pub fn validate_transition(from: MaintenanceStatus, to: MaintenanceStatus) -> TrackResult<()> {
    use MaintenanceStatus::*;

    if from == to {
        return Ok(());
    }
    let allowed = match from {
        Pending => matches!(to, InProgress | Completed | Skipped | Overdue),
        InProgress => matches!(to, Completed | Skipped | Overdue),
        Overdue => matches!(to, InProgress | Completed | Skipped),
        Completed | Skipped => false,
    };
    if allowed {
        Ok(())
    } else {
        Err(TrackError::invalid_transition(from, to))
    }
}

/// 未结束且已过期的任务建议标记为 overdue
pub fn recommend_task_status(
    task: &MaintenanceTask,
    today: NaiveDate,
    lead_days: u32,
) -> Option<MaintenanceStatus> {
    if task.status.is_terminal() || task.status == MaintenanceStatus::Overdue {
        return None;
    }
    match classify(task.next_due_date, today, lead_days) {
        DueState::Overdue => Some(MaintenanceStatus::Overdue),
        _ => None,
    }
}

/// 根据校准日期给出量具状态建议；停用状态只能通过新的校准记录解除
pub fn recommend_tool_status(
    tool: &MetrologyTool,
    today: NaiveDate,
    lead_days: u32,
) -> Option<ToolStatus> {
    if tool.status == ToolStatus::OutOfService {
        return None;
    }
    let recommended = match classify(tool.next_calibration_date, today, lead_days) {
        DueState::Overdue => ToolStatus::DueCalibration,
        DueState::Unscheduled => ToolStatus::AwaitingCalibration,
        DueState::DueSoon | DueState::OnTrack => ToolStatus::Calibrated,
    };
    (recommended != tool.status).then_some(recommended)
}
