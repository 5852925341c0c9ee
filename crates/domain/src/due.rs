//! 到期分类
//!
//! 根据下次到期日期与"今天"的关系把保养任务或量具分到四个桶中。
//! 只比较日期部分，不关心时刻；分类永远不会失败。

use chrono::{DateTime, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// 默认预警天数
pub const DEFAULT_LEAD_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueState {
    OnTrack,
    DueSoon,
    Overdue,
    Unscheduled,
}

impl DueState {
    /// 保养任务使用的标签
    pub fn maintenance_label(&self) -> &'static str {
        match self {
            DueState::OnTrack => "on_track",
            DueState::DueSoon => "due_soon",
            DueState::Overdue => "overdue",
            DueState::Unscheduled => "unscheduled",
        }
    }

    /// 量具校准使用的标签，正常状态称为 calibrated
    pub fn calibration_label(&self) -> &'static str {
        match self {
            DueState::OnTrack => "calibrated",
            other => other.maintenance_label(),
        }
    }

    pub fn needs_attention(&self) -> bool {
        matches!(self, DueState::DueSoon | DueState::Overdue)
    }
}

impl std::fmt::Display for DueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.maintenance_label())
    }
}

pub fn classify(next_due: Option<NaiveDate>, today: NaiveDate, lead_days: u32) -> DueState {
    let Some(due) = next_due else {
        return DueState::Unscheduled;
    };
    if due < today {
        return DueState::Overdue;
    }
    match today.checked_add_signed(Duration::days(i64::from(lead_days))) {
        Some(horizon) if due > horizon => DueState::OnTrack,
        _ => DueState::DueSoon,
    }
}

/// 与 [`classify`] 相同，但输入为字符串；无法解析时视为未排期
pub fn classify_str(next_due: Option<&str>, today: NaiveDate, lead_days: u32) -> DueState {
    classify(next_due.and_then(parse_date_lenient), today, lead_days)
}

/// 接受 `YYYY-MM-DD` 或 RFC 3339 时间戳，取其日期部分
pub fn parse_date_lenient(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}
