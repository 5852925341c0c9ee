//! 领域仓储抽象
//!
//! 定义数据访问的抽象接口；SQLite 实现位于基础设施层，内存实现位于测试工具中

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use machinatrack_errors::TrackResult;
use serde::{Deserialize, Serialize};

use crate::entities::{
    CalibrationLog, Consumable, ConsumableFilter, Equipment, EquipmentFilter, MaintenanceStatus,
    MaintenanceTask, MaintenanceTaskFilter, MetrologyTool, MetrologyToolFilter, ToolStatus,
};

/// 设备仓储抽象
#[async_trait]
pub trait EquipmentRepository: Send + Sync {
    async fn create(&self, equipment: &Equipment) -> TrackResult<Equipment>;
    async fn find_by_id(&self, id: &str) -> TrackResult<Option<Equipment>>;
    async fn list(&self, filter: &EquipmentFilter) -> TrackResult<Vec<Equipment>>;
    async fn update(&self, equipment: &Equipment) -> TrackResult<Equipment>;
    async fn delete(&self, id: &str) -> TrackResult<bool>;
}

/// 耗材库存仓储抽象
#[async_trait]
pub trait ConsumableRepository: Send + Sync {
    async fn create(&self, consumable: &Consumable) -> TrackResult<Consumable>;
    async fn find_by_id(&self, id: &str) -> TrackResult<Option<Consumable>>;
    async fn list(&self, filter: &ConsumableFilter) -> TrackResult<Vec<Consumable>>;
    async fn update(&self, consumable: &Consumable) -> TrackResult<Consumable>;
    async fn delete(&self, id: &str) -> TrackResult<bool>;
    /// 原子地调整数量并写入 `updated_at`；
    /// 结果超出 `0..=MAX_STOCK_QUANTITY` 时返回校验错误且不修改
    async fn adjust_quantity(
        &self,
        id: &str,
        delta: i32,
        updated_at: DateTime<Utc>,
    ) -> TrackResult<Consumable>;
}

/// 一次保养任务更新的持久化结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskUpdateOutcome {
    pub task: MaintenanceTask,
    pub next_task: Option<MaintenanceTask>,
    /// 写入前的状态，仅供调用方判断本次是否首次完成
    #[serde(skip)]
    pub previous_status: MaintenanceStatus,
}

impl TaskUpdateOutcome {
    pub fn new(
        previous_status: MaintenanceStatus,
        task: MaintenanceTask,
        next_task: Option<MaintenanceTask>,
    ) -> Self {
        Self {
            task,
            next_task,
            previous_status,
        }
    }

    pub fn completed_now(&self) -> bool {
        self.previous_status != MaintenanceStatus::Completed
            && self.task.status == MaintenanceStatus::Completed
    }
}

/// 保养任务仓储抽象
#[async_trait]
pub trait MaintenanceTaskRepository: Send + Sync {
    async fn create(&self, task: &MaintenanceTask) -> TrackResult<MaintenanceTask>;
    async fn find_by_id(&self, id: &str) -> TrackResult<Option<MaintenanceTask>>;
    async fn list(&self, filter: &MaintenanceTaskFilter) -> TrackResult<Vec<MaintenanceTask>>;
    async fn update(&self, task: &MaintenanceTask) -> TrackResult<MaintenanceTask>;
    async fn delete(&self, id: &str) -> TrackResult<bool>;
    async fn count_by_equipment(&self, equipment_id: &str) -> TrackResult<i64>;

    /// 在同一事务内写入任务更新并创建下一次任务
    ///
    /// 仅当存储中的状态与 `updated_at` 仍与 `current` 一致时才写入，否则返回 `Conflict`；
    /// 下一次任务创建失败时整体回滚并返回 `RecurrenceScheduling`。
    async fn apply_update(
        &self,
        current: &MaintenanceTask,
        task: &MaintenanceTask,
        next_occurrence: Option<&MaintenanceTask>,
    ) -> TrackResult<TaskUpdateOutcome>;
}

/// 量具仓储抽象
#[async_trait]
pub trait MetrologyToolRepository: Send + Sync {
    async fn create(&self, tool: &MetrologyTool) -> TrackResult<MetrologyTool>;
    async fn find_by_id(&self, id: &str) -> TrackResult<Option<MetrologyTool>>;
    async fn list(&self, filter: &MetrologyToolFilter) -> TrackResult<Vec<MetrologyTool>>;
    async fn update(&self, tool: &MetrologyTool) -> TrackResult<MetrologyTool>;
    async fn delete(&self, id: &str) -> TrackResult<bool>;

    /// 只改写状态与 `updated_at`
    ///
    /// 存储中的状态和两个校准日期须与 `current` 一致，否则返回 `Conflict`，
    /// 并发提交的校准不会被覆盖。
    async fn update_status(
        &self,
        current: &MetrologyTool,
        status: ToolStatus,
        updated_at: DateTime<Utc>,
    ) -> TrackResult<MetrologyTool>;

    /// 在同一事务内追加校准记录并更新量具
    async fn record_calibration(
        &self,
        tool: &MetrologyTool,
        log: &CalibrationLog,
    ) -> TrackResult<(MetrologyTool, CalibrationLog)>;
}

/// 校准记录仓储抽象，只追加
#[async_trait]
pub trait CalibrationLogRepository: Send + Sync {
    async fn create(&self, log: &CalibrationLog) -> TrackResult<CalibrationLog>;
    async fn find_by_id(&self, id: &str) -> TrackResult<Option<CalibrationLog>>;
    /// 按校准日期倒序
    async fn find_by_tool(&self, tool_id: &str) -> TrackResult<Vec<CalibrationLog>>;
}
