use std::sync::Arc;

use machinatrack_errors::{TrackError, TrackResult};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::clock::Clock;
use crate::due::{classify, DueState};
use crate::entities::{
    MaintenanceStatus, MaintenanceTask, MaintenanceTaskFilter, MaintenanceTaskUpdate,
    NewMaintenanceTask,
};
use crate::lifecycle::validate_transition;
use crate::recurrence::{next_due_from, schedule_next_occurrence};
use crate::repositories::{EquipmentRepository, MaintenanceTaskRepository, TaskUpdateOutcome};

/// 带到期分类的保养任务
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskDueEntry {
    pub task: MaintenanceTask,
    pub due_state: DueState,
}

pub struct MaintenanceService {
    tasks: Arc<dyn MaintenanceTaskRepository>,
    equipment: Arc<dyn EquipmentRepository>,
    clock: Arc<dyn Clock>,
    lead_days: u32,
}

fn check_frequency(frequency_days: Option<i32>) -> TrackResult<()> {
    match frequency_days {
        Some(days) if days < 0 => Err(TrackError::validation_error(format!(
            "保养周期不能为负数: {days}"
        ))),
        _ => Ok(()),
    }
}

impl MaintenanceService {
    pub fn new(
        tasks: Arc<dyn MaintenanceTaskRepository>,
        equipment: Arc<dyn EquipmentRepository>,
        clock: Arc<dyn Clock>,
        lead_days: u32,
    ) -> Self {
        Self {
            tasks,
            equipment,
            clock,
            lead_days,
        }
    }

    pub fn lead_days(&self) -> u32 {
        self.lead_days
    }

    /// 创建保养任务；给出上次执行日期和周期但未给到期日时自动推算到期日
    #[instrument(skip(self, draft), fields(equipment_id = %draft.equipment_id))]
    pub async fn create(&self, mut draft: NewMaintenanceTask) -> TrackResult<MaintenanceTask> {
        if draft.description.trim().is_empty() {
            return Err(TrackError::validation_error("保养内容不能为空"));
        }
        check_frequency(draft.frequency_days)?;
        if self.equipment.find_by_id(&draft.equipment_id).await?.is_none() {
            return Err(TrackError::not_found("设备", draft.equipment_id.clone()));
        }

        if draft.next_due_date.is_none() {
            if let (Some(last), Some(days)) = (draft.last_performed_date, draft.frequency_days) {
                draft.next_due_date = next_due_from(last, days);
            }
        }

        let task = MaintenanceTask::new(draft, self.clock.now());
        let created = self.tasks.create(&task).await?;
        info!(task_id = %created.id, "保养任务已创建");
        Ok(created)
    }

    pub async fn get(&self, id: &str) -> TrackResult<MaintenanceTask> {
        self.tasks
            .find_by_id(id)
            .await?
            .ok_or_else(|| TrackError::not_found("保养任务", id))
    }

    pub async fn list(&self, filter: &MaintenanceTaskFilter) -> TrackResult<Vec<MaintenanceTask>> {
        self.tasks.list(filter).await
    }

    /// 更新保养任务
    ///
    /// 读取当前任务 → 检查状态转换 → 合并字段 → 计算下一次任务 → 单事务写入。
    /// 首次完成且周期大于0时，返回结果中带有新生成的待办任务。
    #[instrument(skip(self, update), fields(task_id = %id))]
    pub async fn update(
        &self,
        id: &str,
        update: MaintenanceTaskUpdate,
    ) -> TrackResult<TaskUpdateOutcome> {
        check_frequency(update.frequency_days)?;
        if matches!(&update.description, Some(d) if d.trim().is_empty()) {
            return Err(TrackError::validation_error("保养内容不能为空"));
        }

        let current = self.get(id).await?;
        let target = update.status.unwrap_or(current.status);
        if let Err(err) = validate_transition(current.status, target) {
            warn!(from = %current.status, to = %target, "拒绝非法的状态转换");
            return Err(err);
        }

        let today = self.clock.today();
        let now = self.clock.now();
        let next_occurrence = schedule_next_occurrence(&current, &update, today);

        let mut effective = update;
        let completing = target == MaintenanceStatus::Completed
            && current.status != MaintenanceStatus::Completed;
        if completing && effective.last_performed_date.is_none() {
            effective.last_performed_date = Some(today);
        }

        let mut updated = current.clone();
        updated.apply_update(&effective, now);
        let next_task = next_occurrence.map(|draft| MaintenanceTask::new(draft, now));

        let outcome = self
            .tasks
            .apply_update(&current, &updated, next_task.as_ref())
            .await?;

        if current.status != outcome.task.status {
            info!(from = %current.status, to = %outcome.task.status, "保养任务状态已变更");
        }
        if let Some(next) = &outcome.next_task {
            info!(
                next_task_id = %next.id,
                next_due_date = ?next.next_due_date,
                "已生成下一次保养任务"
            );
        }
        Ok(outcome)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> TrackResult<()> {
        if !self.tasks.delete(id).await? {
            return Err(TrackError::not_found("保养任务", id));
        }
        Ok(())
    }

    /// 未结束任务的到期概览，按到期日升序，未排期的排在最后
    pub async fn due_overview(&self) -> TrackResult<Vec<TaskDueEntry>> {
        let today = self.clock.today();
        let mut entries: Vec<TaskDueEntry> = self
            .tasks
            .list(&MaintenanceTaskFilter::default())
            .await?
            .into_iter()
            .filter(|task| !task.status.is_terminal())
            .map(|task| TaskDueEntry {
                due_state: classify(task.next_due_date, today, self.lead_days),
                task,
            })
            .collect();
        entries.sort_by_key(|entry| (entry.task.next_due_date.is_none(), entry.task.next_due_date));
        Ok(entries)
    }
}
