use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use machinatrack_errors::TrackResult;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::due::{classify, DueState};
use crate::entities::{
    ConsumableFilter, EquipmentFilter, EquipmentStatus, MaintenanceTaskFilter, MetrologyToolFilter,
};
use crate::repositories::{
    ConsumableRepository, EquipmentRepository, MaintenanceTaskRepository, MetrologyToolRepository,
};

const DUE_STATES: [DueState; 4] = [
    DueState::OnTrack,
    DueState::DueSoon,
    DueState::Overdue,
    DueState::Unscheduled,
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSummary {
    pub equipment_by_status: BTreeMap<String, usize>,
    /// 未结束的保养任务按到期分类计数
    pub maintenance: BTreeMap<String, usize>,
    pub calibration: BTreeMap<String, usize>,
    pub low_stock_consumables: usize,
    pub generated_at: DateTime<Utc>,
}

pub struct DashboardService {
    equipment: Arc<dyn EquipmentRepository>,
    consumables: Arc<dyn ConsumableRepository>,
    tasks: Arc<dyn MaintenanceTaskRepository>,
    tools: Arc<dyn MetrologyToolRepository>,
    clock: Arc<dyn Clock>,
    maintenance_lead_days: u32,
    calibration_lead_days: u32,
}

impl DashboardService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        equipment: Arc<dyn EquipmentRepository>,
        consumables: Arc<dyn ConsumableRepository>,
        tasks: Arc<dyn MaintenanceTaskRepository>,
        tools: Arc<dyn MetrologyToolRepository>,
        clock: Arc<dyn Clock>,
        maintenance_lead_days: u32,
        calibration_lead_days: u32,
    ) -> Self {
        Self {
            equipment,
            consumables,
            tasks,
            tools,
            clock,
            maintenance_lead_days,
            calibration_lead_days,
        }
    }

    pub async fn summary(&self) -> TrackResult<DashboardSummary> {
        let today = self.clock.today();

        let mut equipment_by_status: BTreeMap<String, usize> = EquipmentStatus::ALL
            .iter()
            .map(|status| (status.as_str().to_string(), 0))
            .collect();
        for equipment in self.equipment.list(&EquipmentFilter::default()).await? {
            *equipment_by_status
                .entry(equipment.status.as_str().to_string())
                .or_default() += 1;
        }

        let mut maintenance: BTreeMap<String, usize> = DUE_STATES
            .iter()
            .map(|state| (state.maintenance_label().to_string(), 0))
            .collect();
        for task in self.tasks.list(&MaintenanceTaskFilter::default()).await? {
            if task.status.is_terminal() {
                continue;
            }
            let state = classify(task.next_due_date, today, self.maintenance_lead_days);
            *maintenance
                .entry(state.maintenance_label().to_string())
                .or_default() += 1;
        }

        let mut calibration: BTreeMap<String, usize> = DUE_STATES
            .iter()
            .map(|state| (state.calibration_label().to_string(), 0))
            .collect();
        for tool in self.tools.list(&MetrologyToolFilter::default()).await? {
            let state = classify(tool.next_calibration_date, today, self.calibration_lead_days);
            *calibration
                .entry(state.calibration_label().to_string())
                .or_default() += 1;
        }

        let low_stock_consumables = self
            .consumables
            .list(&ConsumableFilter {
                low_stock_only: true,
                ..Default::default()
            })
            .await?
            .len();

        Ok(DashboardSummary {
            equipment_by_status,
            maintenance,
            calibration,
            low_stock_consumables,
            generated_at: self.clock.now(),
        })
    }
}
