use std::sync::Arc;

use machinatrack_errors::{TrackError, TrackResult};
use tracing::{info, instrument};

use crate::clock::Clock;
use crate::entities::{
    Equipment, EquipmentFilter, EquipmentPatch, MaintenanceTask, MaintenanceTaskFilter, NewEquipment,
};
use crate::repositories::{EquipmentRepository, MaintenanceTaskRepository};

pub struct EquipmentService {
    equipment: Arc<dyn EquipmentRepository>,
    tasks: Arc<dyn MaintenanceTaskRepository>,
    clock: Arc<dyn Clock>,
}

impl EquipmentService {
    pub fn new(
        equipment: Arc<dyn EquipmentRepository>,
        tasks: Arc<dyn MaintenanceTaskRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            equipment,
            tasks,
            clock,
        }
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create(&self, draft: NewEquipment) -> TrackResult<Equipment> {
        if draft.name.trim().is_empty() {
            return Err(TrackError::validation_error("设备名称不能为空"));
        }
        let equipment = Equipment::new(draft, self.clock.now());
        let created = self.equipment.create(&equipment).await?;
        info!(equipment_id = %created.id, "设备已登记");
        Ok(created)
    }

    pub async fn get(&self, id: &str) -> TrackResult<Equipment> {
        self.equipment
            .find_by_id(id)
            .await?
            .ok_or_else(|| TrackError::not_found("设备", id))
    }

    pub async fn list(&self, filter: &EquipmentFilter) -> TrackResult<Vec<Equipment>> {
        self.equipment.list(filter).await
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: EquipmentPatch) -> TrackResult<Equipment> {
        if matches!(&patch.name, Some(name) if name.trim().is_empty()) {
            return Err(TrackError::validation_error("设备名称不能为空"));
        }
        let mut equipment = self.get(id).await?;
        equipment.apply_patch(patch, self.clock.now());
        self.equipment.update(&equipment).await
    }

    /// 仍有保养任务引用该设备时拒绝删除
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> TrackResult<()> {
        let referencing = self.tasks.count_by_equipment(id).await?;
        if referencing > 0 {
            return Err(TrackError::conflict(format!(
                "设备 {id} 仍有 {referencing} 个保养任务，无法删除"
            )));
        }
        if !self.equipment.delete(id).await? {
            return Err(TrackError::not_found("设备", id));
        }
        info!(equipment_id = %id, "设备已删除");
        Ok(())
    }

    /// 设备的全部保养任务（含已完成的历史记录）
    pub async fn maintenance_history(&self, id: &str) -> TrackResult<Vec<MaintenanceTask>> {
        self.get(id).await?;
        let filter = MaintenanceTaskFilter {
            equipment_id: Some(id.to_string()),
            ..Default::default()
        };
        self.tasks.list(&filter).await
    }
}
