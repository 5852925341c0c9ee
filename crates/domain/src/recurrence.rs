//! 保养任务周期规则
//!
//! 任务首次进入 `completed` 且周期天数大于0时，生成下一次待办任务草稿。
//! 纯函数：不访问存储，也不读取系统时间。

use chrono::{Duration, NaiveDate};

use crate::entities::{MaintenanceStatus, MaintenanceTask, MaintenanceTaskUpdate, NewMaintenanceTask};

/// 上次执行日期加周期天数；周期不大于0或日期溢出时返回 None
pub fn next_due_from(last_performed: NaiveDate, frequency_days: i32) -> Option<NaiveDate> {
    if frequency_days <= 0 {
        return None;
    }
    last_performed.checked_add_signed(Duration::days(i64::from(frequency_days)))
}

/// 根据更新前的任务与本次更新计算下一次任务
///
/// - 更新前已是 `completed` 的任务不会再次生成（重复提交幂等）
/// - 周期取更新中的值，缺省时取任务原值
/// - 更新未给出执行日期时以 `today` 作为执行日期
pub fn schedule_next_occurrence(
    previous: &MaintenanceTask,
    update: &MaintenanceTaskUpdate,
    today: NaiveDate,
) -> Option<NewMaintenanceTask> {
    if previous.status == MaintenanceStatus::Completed {
        return None;
    }
    if update.status != Some(MaintenanceStatus::Completed) {
        return None;
    }

    let frequency_days = update
        .frequency_days
        .or(previous.frequency_days)
        .filter(|days| *days > 0)?;
    let last_performed = update.last_performed_date.unwrap_or(today);
    let next_due = next_due_from(last_performed, frequency_days)?;

    Some(NewMaintenanceTask {
        equipment_id: previous.equipment_id.clone(),
        description: update
            .description
            .clone()
            .unwrap_or_else(|| previous.description.clone()),
        frequency_days: Some(frequency_days),
        last_performed_date: Some(last_performed),
        next_due_date: Some(next_due),
        assigned_to: update
            .assigned_to
            .clone()
            .or_else(|| previous.assigned_to.clone()),
        status: MaintenanceStatus::Pending,
        parts_used: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PartUsed;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(status: MaintenanceStatus, frequency_days: Option<i32>) -> MaintenanceTask {
        MaintenanceTask::new(
            NewMaintenanceTask {
                equipment_id: "haas-vf2".to_string(),
                description: "Grease ballscrews".to_string(),
                frequency_days,
                assigned_to: Some("kim".to_string()),
                status,
                parts_used: vec![PartUsed {
                    name: "Way lube".to_string(),
                    quantity: 1,
                }],
                ..Default::default()
            },
            Utc::now(),
        )
    }

    fn completion(last_performed: Option<NaiveDate>) -> MaintenanceTaskUpdate {
        MaintenanceTaskUpdate {
            status: Some(MaintenanceStatus::Completed),
            last_performed_date: last_performed,
            ..Default::default()
        }
    }

    #[test]
    fn test_completion_spawns_after_frequency() {
        let previous = task(MaintenanceStatus::InProgress, Some(30));
        let performed = date(2024, 2, 10);

        let next = schedule_next_occurrence(&previous, &completion(Some(performed)), date(2024, 2, 12))
            .expect("completion should spawn");

        assert_eq!(next.next_due_date, Some(date(2024, 3, 11)));
        assert_eq!(next.last_performed_date, Some(performed));
        assert_eq!(next.status, MaintenanceStatus::Pending);
        assert_eq!(next.equipment_id, "haas-vf2");
        assert_eq!(next.frequency_days, Some(30));
        assert_eq!(next.assigned_to.as_deref(), Some("kim"));
        assert!(next.parts_used.is_empty());
    }

    #[test]
    fn test_ninety_day_scenario() {
        let previous = task(MaintenanceStatus::InProgress, Some(90));
        let next =
            schedule_next_occurrence(&previous, &completion(Some(date(2024, 1, 1))), date(2024, 1, 2))
                .unwrap();
        assert_eq!(next.next_due_date, Some(date(2024, 3, 31)));
    }

    #[test]
    fn test_missing_performed_date_uses_today() {
        let previous = task(MaintenanceStatus::Pending, Some(7));
        let today = date(2024, 12, 28);
        let next = schedule_next_occurrence(&previous, &completion(None), today).unwrap();
        assert_eq!(next.last_performed_date, Some(today));
        assert_eq!(next.next_due_date, Some(date(2025, 1, 4)));
    }

    #[test]
    fn test_update_frequency_overrides_stored() {
        let previous = task(MaintenanceStatus::InProgress, None);
        let update = MaintenanceTaskUpdate {
            frequency_days: Some(14),
            description: Some("Grease ballscrews and check backlash".to_string()),
            ..completion(Some(date(2024, 4, 1)))
        };
        let next = schedule_next_occurrence(&previous, &update, date(2024, 4, 1)).unwrap();
        assert_eq!(next.next_due_date, Some(date(2024, 4, 15)));
        assert_eq!(next.description, "Grease ballscrews and check backlash");
    }

    #[test]
    fn test_no_frequency_never_spawns() {
        for frequency in [None, Some(0), Some(-30)] {
            let previous = task(MaintenanceStatus::InProgress, frequency);
            assert!(schedule_next_occurrence(&previous, &completion(None), date(2024, 1, 1)).is_none());
        }

        let previous = task(MaintenanceStatus::InProgress, Some(30));
        let update = MaintenanceTaskUpdate {
            frequency_days: Some(0),
            ..completion(None)
        };
        assert!(schedule_next_occurrence(&previous, &update, date(2024, 1, 1)).is_none());
    }

    #[test]
    fn test_already_completed_does_not_spawn_again() {
        let previous = task(MaintenanceStatus::Completed, Some(30));
        assert!(schedule_next_occurrence(&previous, &completion(None), date(2024, 1, 1)).is_none());
    }

    #[test]
    fn test_non_completion_updates_do_not_spawn() {
        let previous = task(MaintenanceStatus::Pending, Some(30));
        for status in [
            None,
            Some(MaintenanceStatus::InProgress),
            Some(MaintenanceStatus::Skipped),
            Some(MaintenanceStatus::Overdue),
        ] {
            let update = MaintenanceTaskUpdate {
                status,
                ..Default::default()
            };
            assert!(schedule_next_occurrence(&previous, &update, date(2024, 1, 1)).is_none());
        }
    }

    #[test]
    fn test_next_due_from() {
        assert_eq!(next_due_from(date(2024, 1, 31), 29), Some(date(2024, 2, 29)));
        assert_eq!(next_due_from(date(2024, 1, 31), 0), None);
        assert_eq!(next_due_from(NaiveDate::MAX, 1), None);
    }
}
