//! Mock implementations for all repository traits
//!
//! In-memory repositories backed by `Arc<Mutex<HashMap>>` so that tests can
//! run services without a database. The transactional methods honour the same
//! contract as the SQLite implementation: guarded writes and
//! all-or-nothing spawning.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use machinatrack_domain::{
    CalibrationLog, CalibrationLogRepository, Consumable, ConsumableFilter, ConsumableRepository,
    Equipment, EquipmentFilter, EquipmentRepository, MaintenanceStatus, MaintenanceTask,
    MaintenanceTaskFilter, MaintenanceTaskRepository, MetrologyTool, MetrologyToolFilter,
    MetrologyToolRepository, TaskUpdateOutcome, ToolStatus,
};
use machinatrack_errors::{TrackError, TrackResult};

/// Mock implementation of EquipmentRepository for testing
#[derive(Debug, Clone, Default)]
pub struct MockEquipmentRepository {
    equipment: Arc<Mutex<HashMap<String, Equipment>>>,
}

impl MockEquipmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_equipment(items: Vec<Equipment>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.equipment.lock().unwrap();
            for item in items {
                map.insert(item.id.clone(), item);
            }
        }
        repo
    }

    pub fn count(&self) -> usize {
        self.equipment.lock().unwrap().len()
    }
}

#[async_trait]
impl EquipmentRepository for MockEquipmentRepository {
    async fn create(&self, equipment: &Equipment) -> TrackResult<Equipment> {
        let mut map = self.equipment.lock().unwrap();
        if map.contains_key(&equipment.id) {
            return Err(TrackError::conflict(format!("设备已存在: {}", equipment.id)));
        }
        map.insert(equipment.id.clone(), equipment.clone());
        Ok(equipment.clone())
    }

    async fn find_by_id(&self, id: &str) -> TrackResult<Option<Equipment>> {
        Ok(self.equipment.lock().unwrap().get(id).cloned())
    }

    async fn list(&self, filter: &EquipmentFilter) -> TrackResult<Vec<Equipment>> {
        let map = self.equipment.lock().unwrap();
        let mut items: Vec<Equipment> = map.values().filter(|e| e.matches(filter)).cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn update(&self, equipment: &Equipment) -> TrackResult<Equipment> {
        let mut map = self.equipment.lock().unwrap();
        match map.get_mut(&equipment.id) {
            Some(slot) => {
                *slot = equipment.clone();
                Ok(equipment.clone())
            }
            None => Err(TrackError::not_found("设备", equipment.id.clone())),
        }
    }

    async fn delete(&self, id: &str) -> TrackResult<bool> {
        Ok(self.equipment.lock().unwrap().remove(id).is_some())
    }
}

/// Mock implementation of ConsumableRepository for testing
#[derive(Debug, Clone, Default)]
pub struct MockConsumableRepository {
    consumables: Arc<Mutex<HashMap<String, Consumable>>>,
}

impl MockConsumableRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_consumables(items: Vec<Consumable>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.consumables.lock().unwrap();
            for item in items {
                map.insert(item.id.clone(), item);
            }
        }
        repo
    }
}

#[async_trait]
impl ConsumableRepository for MockConsumableRepository {
    async fn create(&self, consumable: &Consumable) -> TrackResult<Consumable> {
        self.consumables
            .lock()
            .unwrap()
            .insert(consumable.id.clone(), consumable.clone());
        Ok(consumable.clone())
    }

    async fn find_by_id(&self, id: &str) -> TrackResult<Option<Consumable>> {
        Ok(self.consumables.lock().unwrap().get(id).cloned())
    }

    async fn list(&self, filter: &ConsumableFilter) -> TrackResult<Vec<Consumable>> {
        let map = self.consumables.lock().unwrap();
        let mut items: Vec<Consumable> = map.values().filter(|c| c.matches(filter)).cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn update(&self, consumable: &Consumable) -> TrackResult<Consumable> {
        let mut map = self.consumables.lock().unwrap();
        match map.get_mut(&consumable.id) {
            Some(slot) => {
                *slot = consumable.clone();
                Ok(consumable.clone())
            }
            None => Err(TrackError::not_found("耗材", consumable.id.clone())),
        }
    }

    async fn delete(&self, id: &str) -> TrackResult<bool> {
        Ok(self.consumables.lock().unwrap().remove(id).is_some())
    }

    async fn adjust_quantity(
        &self,
        id: &str,
        delta: i32,
        updated_at: DateTime<Utc>,
    ) -> TrackResult<Consumable> {
        let mut map = self.consumables.lock().unwrap();
        let consumable = map
            .get_mut(id)
            .ok_or_else(|| TrackError::not_found("耗材", id))?;
        consumable.quantity = consumable.adjusted_quantity(delta)?;
        consumable.updated_at = updated_at;
        Ok(consumable.clone())
    }
}

/// Mock implementation of MaintenanceTaskRepository for testing
///
/// `fail_next_spawn` makes the next `apply_update` that carries a spawned
/// task fail as if the insert had been rejected, leaving the store untouched.
#[derive(Debug, Clone, Default)]
pub struct MockMaintenanceTaskRepository {
    tasks: Arc<Mutex<HashMap<String, MaintenanceTask>>>,
    fail_next_spawn: Arc<AtomicBool>,
}

impl MockMaintenanceTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<MaintenanceTask>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.tasks.lock().unwrap();
            for task in tasks {
                map.insert(task.id.clone(), task);
            }
        }
        repo
    }

    pub fn fail_next_spawn(&self) {
        self.fail_next_spawn.store(true, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    pub fn get_all_tasks(&self) -> Vec<MaintenanceTask> {
        self.tasks.lock().unwrap().values().cloned().collect()
    }

    /// Overwrite the stored status, simulating a concurrent writer
    pub fn force_status(&self, id: &str, status: MaintenanceStatus) {
        if let Some(task) = self.tasks.lock().unwrap().get_mut(id) {
            task.status = status;
        }
    }
}

#[async_trait]
impl MaintenanceTaskRepository for MockMaintenanceTaskRepository {
    async fn create(&self, task: &MaintenanceTask) -> TrackResult<MaintenanceTask> {
        self.tasks
            .lock()
            .unwrap()
            .insert(task.id.clone(), task.clone());
        Ok(task.clone())
    }

    async fn find_by_id(&self, id: &str) -> TrackResult<Option<MaintenanceTask>> {
        Ok(self.tasks.lock().unwrap().get(id).cloned())
    }

    async fn list(&self, filter: &MaintenanceTaskFilter) -> TrackResult<Vec<MaintenanceTask>> {
        let map = self.tasks.lock().unwrap();
        let mut tasks: Vec<MaintenanceTask> =
            map.values().filter(|t| t.matches(filter)).cloned().collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(tasks)
    }

    async fn update(&self, task: &MaintenanceTask) -> TrackResult<MaintenanceTask> {
        let mut map = self.tasks.lock().unwrap();
        match map.get_mut(&task.id) {
            Some(slot) => {
                *slot = task.clone();
                Ok(task.clone())
            }
            None => Err(TrackError::not_found("保养任务", task.id.clone())),
        }
    }

    async fn delete(&self, id: &str) -> TrackResult<bool> {
        Ok(self.tasks.lock().unwrap().remove(id).is_some())
    }

    async fn count_by_equipment(&self, equipment_id: &str) -> TrackResult<i64> {
        let map = self.tasks.lock().unwrap();
        Ok(map.values().filter(|t| t.equipment_id == equipment_id).count() as i64)
    }

    async fn apply_update(
        &self,
        current: &MaintenanceTask,
        task: &MaintenanceTask,
        next_occurrence: Option<&MaintenanceTask>,
    ) -> TrackResult<TaskUpdateOutcome> {
        let mut map = self.tasks.lock().unwrap();
        let stored = map
            .get(&task.id)
            .ok_or_else(|| TrackError::not_found("保养任务", task.id.clone()))?;
        if stored.status != current.status || stored.updated_at != current.updated_at {
            return Err(TrackError::conflict(format!(
                "保养任务 {} 已被并发修改，当前状态 {}",
                task.id, stored.status
            )));
        }
        if next_occurrence.is_some() && self.fail_next_spawn.swap(false, Ordering::SeqCst) {
            return Err(TrackError::RecurrenceScheduling(
                "simulated insert failure".to_string(),
            ));
        }

        map.insert(task.id.clone(), task.clone());
        if let Some(next) = next_occurrence {
            map.insert(next.id.clone(), next.clone());
        }
        Ok(TaskUpdateOutcome::new(
            current.status,
            task.clone(),
            next_occurrence.cloned(),
        ))
    }
}

/// Mock implementation of CalibrationLogRepository for testing
#[derive(Debug, Clone, Default)]
pub struct MockCalibrationLogRepository {
    logs: Arc<Mutex<Vec<CalibrationLog>>>,
}

impl MockCalibrationLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.logs.lock().unwrap().len()
    }
}

#[async_trait]
impl CalibrationLogRepository for MockCalibrationLogRepository {
    async fn create(&self, log: &CalibrationLog) -> TrackResult<CalibrationLog> {
        self.logs.lock().unwrap().push(log.clone());
        Ok(log.clone())
    }

    async fn find_by_id(&self, id: &str) -> TrackResult<Option<CalibrationLog>> {
        Ok(self.logs.lock().unwrap().iter().find(|l| l.id == id).cloned())
    }

    async fn find_by_tool(&self, tool_id: &str) -> TrackResult<Vec<CalibrationLog>> {
        let logs = self.logs.lock().unwrap();
        let mut found: Vec<CalibrationLog> =
            logs.iter().filter(|l| l.tool_id == tool_id).cloned().collect();
        found.sort_by(|a, b| {
            b.calibration_date
                .cmp(&a.calibration_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(found)
    }
}

/// Mock implementation of MetrologyToolRepository for testing
///
/// Shares its log store with a [`MockCalibrationLogRepository`] so that
/// `record_calibration` is visible through both.
#[derive(Debug, Clone, Default)]
pub struct MockMetrologyToolRepository {
    tools: Arc<Mutex<HashMap<String, MetrologyTool>>>,
    logs: MockCalibrationLogRepository,
}

impl MockMetrologyToolRepository {
    pub fn new(logs: MockCalibrationLogRepository) -> Self {
        Self {
            tools: Arc::default(),
            logs,
        }
    }

    pub fn with_tools(logs: MockCalibrationLogRepository, tools: Vec<MetrologyTool>) -> Self {
        let repo = Self::new(logs);
        {
            let mut map = repo.tools.lock().unwrap();
            for tool in tools {
                map.insert(tool.id.clone(), tool);
            }
        }
        repo
    }
}

#[async_trait]
impl MetrologyToolRepository for MockMetrologyToolRepository {
    async fn create(&self, tool: &MetrologyTool) -> TrackResult<MetrologyTool> {
        self.tools
            .lock()
            .unwrap()
            .insert(tool.id.clone(), tool.clone());
        Ok(tool.clone())
    }

    async fn find_by_id(&self, id: &str) -> TrackResult<Option<MetrologyTool>> {
        Ok(self.tools.lock().unwrap().get(id).cloned())
    }

    async fn list(&self, filter: &MetrologyToolFilter) -> TrackResult<Vec<MetrologyTool>> {
        let map = self.tools.lock().unwrap();
        let mut tools: Vec<MetrologyTool> = map.values().filter(|t| t.matches(filter)).cloned().collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tools)
    }

    async fn update(&self, tool: &MetrologyTool) -> TrackResult<MetrologyTool> {
        let mut map = self.tools.lock().unwrap();
        match map.get_mut(&tool.id) {
            Some(slot) => {
                *slot = tool.clone();
                Ok(tool.clone())
            }
            None => Err(TrackError::not_found("量具", tool.id.clone())),
        }
    }

    async fn delete(&self, id: &str) -> TrackResult<bool> {
        Ok(self.tools.lock().unwrap().remove(id).is_some())
    }

    async fn update_status(
        &self,
        current: &MetrologyTool,
        status: ToolStatus,
        updated_at: DateTime<Utc>,
    ) -> TrackResult<MetrologyTool> {
        let mut map = self.tools.lock().unwrap();
        let slot = map
            .get_mut(&current.id)
            .ok_or_else(|| TrackError::not_found("量具", current.id.clone()))?;
        if slot.status != current.status
            || slot.last_calibration_date != current.last_calibration_date
            || slot.next_calibration_date != current.next_calibration_date
        {
            return Err(TrackError::conflict(format!(
                "量具 {} 已被并发修改，当前状态 {}",
                current.id, slot.status
            )));
        }
        slot.status = status;
        slot.updated_at = updated_at;
        Ok(slot.clone())
    }

    async fn record_calibration(
        &self,
        tool: &MetrologyTool,
        log: &CalibrationLog,
    ) -> TrackResult<(MetrologyTool, CalibrationLog)> {
        let mut map = self.tools.lock().unwrap();
        let slot = map
            .get_mut(&tool.id)
            .ok_or_else(|| TrackError::not_found("量具", tool.id.clone()))?;
        *slot = tool.clone();
        self.logs.logs.lock().unwrap().push(log.clone());
        Ok((tool.clone(), log.clone()))
    }
}

/// All mock repositories wired together, one instance per test
#[derive(Debug, Clone)]
pub struct MockRepositories {
    pub equipment: Arc<MockEquipmentRepository>,
    pub consumables: Arc<MockConsumableRepository>,
    pub tasks: Arc<MockMaintenanceTaskRepository>,
    pub tools: Arc<MockMetrologyToolRepository>,
    pub calibration_logs: Arc<MockCalibrationLogRepository>,
}

impl MockRepositories {
    pub fn new() -> Self {
        let logs = MockCalibrationLogRepository::new();
        Self {
            equipment: Arc::new(MockEquipmentRepository::new()),
            consumables: Arc::new(MockConsumableRepository::new()),
            tasks: Arc::new(MockMaintenanceTaskRepository::new()),
            tools: Arc::new(MockMetrologyToolRepository::new(logs.clone())),
            calibration_logs: Arc::new(logs),
        }
    }
}

impl Default for MockRepositories {
    fn default() -> Self {
        Self::new()
    }
}
